//! Party repository for customers, suppliers and vendors.

use chrono::Utc;
use hisaab_shared::types::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::error::{RepositoryError, RepositoryResult};
use crate::entities::{invoices, parties, sea_orm_active_enums::PartyType, transactions};

/// Input for creating a party.
#[derive(Debug, Clone)]
pub struct CreatePartyInput {
    /// Display name.
    pub name: String,
    /// Customer, supplier or vendor.
    pub party_type: PartyType,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// GST identification number.
    pub gstin: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State; decides intra- or inter-state GST.
    pub state: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// Postal code.
    pub pincode: Option<String>,
    /// Credit limit.
    pub credit_limit: Decimal,
    /// Payment terms in days.
    pub payment_terms: i32,
    /// Whether the party is active.
    pub is_active: bool,
}

/// Input for updating a party. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdatePartyInput {
    /// Display name.
    pub name: Option<String>,
    /// Customer, supplier or vendor.
    pub party_type: Option<PartyType>,
    /// Email address.
    pub email: Option<Option<String>>,
    /// Phone number.
    pub phone: Option<Option<String>>,
    /// GST identification number.
    pub gstin: Option<Option<String>>,
    /// Street address.
    pub address: Option<Option<String>>,
    /// City.
    pub city: Option<Option<String>>,
    /// State.
    pub state: Option<Option<String>>,
    /// Country.
    pub country: Option<Option<String>>,
    /// Postal code.
    pub pincode: Option<Option<String>>,
    /// Credit limit.
    pub credit_limit: Option<Decimal>,
    /// Payment terms in days.
    pub payment_terms: Option<i32>,
    /// Whether the party is active.
    pub is_active: Option<bool>,
}

/// Filter options for listing parties.
#[derive(Debug, Clone, Default)]
pub struct PartyFilter {
    /// Filter by type.
    pub party_type: Option<PartyType>,
    /// Filter by active status.
    pub is_active: Option<bool>,
    /// Substring of the name.
    pub search: Option<String>,
}

/// Party repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct PartyRepository {
    db: DatabaseConnection,
}

impl PartyRepository {
    /// Creates a new party repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a party.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(&self, input: CreatePartyInput) -> RepositoryResult<parties::Model> {
        let now = Utc::now().into();
        let party = parties::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            party_type: Set(input.party_type),
            email: Set(input.email),
            phone: Set(input.phone),
            gstin: Set(input.gstin),
            address: Set(input.address),
            city: Set(input.city),
            state: Set(input.state),
            country: Set(input.country),
            pincode: Set(input.pincode),
            credit_limit: Set(input.credit_limit),
            payment_terms: Set(input.payment_terms),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(party.insert(&self.db).await?)
    }

    /// Gets a party by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the party does not exist.
    pub async fn get(&self, id: Uuid) -> RepositoryResult<parties::Model> {
        parties::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RepositoryError::not_found("Party", id))
    }

    /// Lists parties, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: PartyFilter,
        page: &PageRequest,
    ) -> RepositoryResult<PageResponse<parties::Model>> {
        let mut query = parties::Entity::find().order_by_asc(parties::Column::Name);

        if let Some(party_type) = filter.party_type {
            query = query.filter(parties::Column::PartyType.eq(party_type));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(parties::Column::IsActive.eq(is_active));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            query = query.filter(parties::Column::Name.contains(search.trim()));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(rows, page.page, page.per_page, total))
    }

    /// Updates a party.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the party does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdatePartyInput,
    ) -> RepositoryResult<parties::Model> {
        let party = self.get(id).await?;
        let mut active: parties::ActiveModel = party.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(party_type) = input.party_type {
            active.party_type = Set(party_type);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(phone);
        }
        if let Some(gstin) = input.gstin {
            active.gstin = Set(gstin);
        }
        if let Some(address) = input.address {
            active.address = Set(address);
        }
        if let Some(city) = input.city {
            active.city = Set(city);
        }
        if let Some(state) = input.state {
            active.state = Set(state);
        }
        if let Some(country) = input.country {
            active.country = Set(country);
        }
        if let Some(pincode) = input.pincode {
            active.pincode = Set(pincode);
        }
        if let Some(credit_limit) = input.credit_limit {
            active.credit_limit = Set(credit_limit);
        }
        if let Some(payment_terms) = input.payment_terms {
            active.payment_terms = Set(payment_terms);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a party that no transaction or invoice references.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the party does not exist and `Conflict` while
    /// it is referenced.
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;
        parties::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RepositoryError::not_found("Party", id))?;

        let transaction_count = transactions::Entity::find()
            .filter(
                Condition::any()
                    .add(transactions::Column::CustomerId.eq(id))
                    .add(transactions::Column::SupplierId.eq(id)),
            )
            .count(&txn)
            .await?;
        let invoice_count = invoices::Entity::find()
            .filter(invoices::Column::PartyId.eq(id))
            .count(&txn)
            .await?;

        if transaction_count > 0 || invoice_count > 0 {
            return Err(RepositoryError::Conflict(format!(
                "Party is referenced by {transaction_count} transactions and {invoice_count} invoices"
            )));
        }

        parties::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}
