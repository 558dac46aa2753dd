//! Invoice repository.
//!
//! Invoices are issued from a recorded transaction or built directly from
//! lines. Status changes and the payment they record are written in one
//! database transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use hisaab_core::billing::{BillTotals, BillingService, LineInput, SuppliedTotals, TransactionType};
use hisaab_core::gst::is_inter_state;
use hisaab_core::invoice::{
    InvoiceError, InvoiceLifecycle, InvoiceSnapshot, InvoiceStatus, PaymentDetails, PaymentDraft,
    apply_status_transition,
};
use hisaab_core::numbering::INVOICE_PREFIX;
use hisaab_shared::BillingConfig;
use hisaab_shared::types::{InvoiceId, PageRequest, PageResponse, round_money};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use super::error::{RepositoryError, RepositoryResult};
use super::sequence::next_number;
use super::transaction;
use crate::entities::sea_orm_active_enums::InvoiceStatus as DbInvoiceStatus;
use crate::entities::{invoice_items, invoices, items, parties, payments};

/// Options for issuing an invoice.
#[derive(Debug, Clone, Default)]
pub struct InvoiceOptions {
    /// Defaults to now.
    pub issue_date: Option<DateTime<Utc>>,
    /// Overrides the party's payment terms.
    pub payment_terms_days: Option<u32>,
    /// Free text.
    pub notes: Option<String>,
}

/// Input for an invoice built directly from lines.
#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    /// Billed party.
    pub party_id: Option<Uuid>,
    /// Lines, at least one.
    pub lines: Vec<LineInput>,
    /// Aggregates claimed by the caller, checked against the lines.
    pub supplied: SuppliedTotals,
    /// Dates and notes.
    pub options: InvoiceOptions,
}

/// An invoice with its lines and payments.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceWithDetails {
    /// The header.
    #[serde(flatten)]
    pub invoice: invoices::Model,
    /// The lines, in entry order.
    pub items: Vec<invoice_items::Model>,
    /// Payments recorded against the invoice.
    pub payments: Vec<payments::Model>,
}

/// Result of a status change.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    /// The invoice as written.
    pub invoice: invoices::Model,
    /// The payment recorded with the change, if any.
    pub payment: Option<payments::Model>,
    /// False when the requested status was not applied.
    pub status_changed: bool,
}

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Filter by status.
    pub status: Option<InvoiceStatus>,
    /// Filter by billed party.
    pub party_id: Option<Uuid>,
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
    billing: BillingConfig,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, billing: BillingConfig) -> Self {
        Self { db, billing }
    }

    /// Issues the invoice for a recorded transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown transaction and
    /// `InvoiceError::AlreadyInvoiced` if it already has an invoice.
    pub async fn create_from_transaction(
        &self,
        transaction_id: Uuid,
        options: InvoiceOptions,
    ) -> RepositoryResult<InvoiceWithDetails> {
        let txn = self.db.begin().await?;
        let created = create_from_transaction_in(&txn, &self.billing, transaction_id, &options).await?;
        txn.commit().await?;

        tracing::info!(
            invoice_id = %created.invoice.id,
            invoice_number = %created.invoice.invoice_number,
            %transaction_id,
            "Invoice issued from transaction"
        );
        Ok(created)
    }

    /// Builds an invoice directly from lines.
    ///
    /// # Errors
    ///
    /// Returns a `Billing` error for invalid lines or mismatching totals
    /// and `NotFound` for an unknown party or item.
    pub async fn create(&self, input: CreateInvoiceInput) -> RepositoryResult<InvoiceWithDetails> {
        let (lines, totals) = BillingService::resolve_lines(&input.lines)?;
        BillingService::verify_supplied(&totals, &input.supplied)?;

        let txn = self.db.begin().await?;
        let party = find_party(&txn, input.party_id).await?;
        let names = item_names(&txn, lines.iter().map(|l| l.item_id.into_inner())).await?;
        let lines = lines
            .into_iter()
            .map(|line| {
                let item_id = line.item_id.into_inner();
                Ok(NewLine {
                    item_id,
                    description: describe(&names, item_id)?,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    discount: line.discount,
                    tax_rate: line.tax_rate,
                    tax_amount: line.tax_amount,
                    line_total: line.line_total,
                })
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        let created = insert_invoice(
            &txn,
            &self.billing,
            NewInvoice {
                transaction_id: None,
                party: party.as_ref(),
                totals,
                options: &input.options,
            },
            lines,
        )
        .await?;
        txn.commit().await?;

        tracing::info!(
            invoice_id = %created.invoice.id,
            invoice_number = %created.invoice.invoice_number,
            "Invoice created"
        );
        Ok(created)
    }

    /// Gets an invoice with its lines and payments.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::InvoiceNotFound` if the invoice does not exist.
    pub async fn get(&self, id: Uuid) -> RepositoryResult<InvoiceWithDetails> {
        let invoice = find_invoice(&self.db, id).await?;
        let items = invoice_lines(&self.db, id).await?;
        let payments = invoice_payments(&self.db, id).await?;
        Ok(InvoiceWithDetails {
            invoice,
            items,
            payments,
        })
    }

    /// Lists invoice headers, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: InvoiceFilter,
        page: &PageRequest,
    ) -> RepositoryResult<PageResponse<invoices::Model>> {
        let mut query = invoices::Entity::find()
            .order_by_desc(invoices::Column::IssueDate)
            .order_by_desc(invoices::Column::InvoiceNumber);

        if let Some(status) = filter.status {
            query = query.filter(invoices::Column::Status.eq(DbInvoiceStatus::from(status)));
        }
        if let Some(party_id) = filter.party_id {
            query = query.filter(invoices::Column::PartyId.eq(party_id));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(rows, page.page, page.per_page, total))
    }

    /// Replaces the lines of a draft invoice and recomputes its totals.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotEditable` unless the invoice is `DRAFT`,
    /// and a `Billing` error for invalid lines or mismatching totals.
    pub async fn replace_items(
        &self,
        id: Uuid,
        lines: Vec<LineInput>,
        supplied: SuppliedTotals,
    ) -> RepositoryResult<InvoiceWithDetails> {
        let (resolved, totals) = BillingService::resolve_lines(&lines)?;
        BillingService::verify_supplied(&totals, &supplied)?;

        let txn = self.db.begin().await?;
        let invoice = find_invoice_for_update(&txn, id).await?;
        let status = InvoiceStatus::from(invoice.status);
        if !status.is_editable() {
            return Err(InvoiceError::NotEditable(status).into());
        }

        let names = item_names(&txn, resolved.iter().map(|l| l.item_id.into_inner())).await?;
        invoice_items::Entity::delete_many()
            .filter(invoice_items::Column::InvoiceId.eq(id))
            .exec(&txn)
            .await?;

        let now = Utc::now().into();
        let mut items = Vec::with_capacity(resolved.len());
        for line in resolved {
            let item_id = line.item_id.into_inner();
            let row = NewLine {
                item_id,
                description: describe(&names, item_id)?,
                quantity: line.quantity,
                unit_price: line.unit_price,
                discount: line.discount,
                tax_rate: line.tax_rate,
                tax_amount: line.tax_amount,
                line_total: line.line_total,
            }
            .into_active(id, now)
            .insert(&txn)
            .await?;
            items.push(row);
        }

        let party = find_party(&txn, invoice.party_id).await?;
        let split = totals.gst_split(inter_state(&self.billing, party.as_ref())).rounded();
        let paid = invoice.paid_amount;

        let mut active: invoices::ActiveModel = invoice.into();
        active.subtotal = Set(totals.subtotal);
        active.discount_amount = Set(totals.discount_amount);
        active.tax_amount = Set(totals.tax_amount);
        active.cgst_amount = Set(split.cgst);
        active.sgst_amount = Set(split.sgst);
        active.igst_amount = Set(split.igst);
        active.total_amount = Set(totals.total_amount);
        active.balance_amount = Set(totals.total_amount - paid);
        active.updated_at = Set(now);
        let invoice = active.update(&txn).await?;

        let payments = invoice_payments(&txn, id).await?;
        txn.commit().await?;

        tracing::info!(invoice_id = %id, lines = items.len(), "Invoice lines replaced");
        Ok(InvoiceWithDetails {
            invoice,
            items,
            payments,
        })
    }

    /// Deletes a draft invoice without payments.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotDeletable` unless the invoice is `DRAFT`
    /// and `Conflict` if payments were recorded against it.
    pub async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;
        let invoice = find_invoice_for_update(&txn, id).await?;
        let status = InvoiceStatus::from(invoice.status);
        if !status.is_deletable() {
            return Err(InvoiceError::NotDeletable(status).into());
        }

        let recorded = payments::Entity::find()
            .filter(payments::Column::InvoiceId.eq(id))
            .count(&txn)
            .await?;
        if recorded > 0 {
            return Err(RepositoryError::Conflict(format!(
                "Invoice {} has {recorded} recorded payments",
                invoice.invoice_number
            )));
        }

        invoice_items::Entity::delete_many()
            .filter(invoice_items::Column::InvoiceId.eq(id))
            .exec(&txn)
            .await?;
        invoices::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(invoice_id = %id, "Invoice deleted");
        Ok(())
    }

    /// Moves an invoice to `requested` and records the payment it implies.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::InvoiceNotFound`, `InvoiceError::InvalidStatus`
    /// or `InvoiceError::InvalidPayment`. The invoice update and the payment
    /// are written together or not at all.
    pub async fn update_status(
        &self,
        id: Uuid,
        requested: &str,
        payment: Option<PaymentDetails>,
        now: DateTime<Utc>,
    ) -> RepositoryResult<StatusChange> {
        let txn = self.db.begin().await?;
        let change = update_status_in(&txn, id, requested, payment, now).await?;
        txn.commit().await?;
        Ok(change)
    }

    /// Lists the payments recorded against an invoice.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::InvoiceNotFound` if the invoice does not exist.
    pub async fn list_payments(&self, id: Uuid) -> RepositoryResult<Vec<payments::Model>> {
        find_invoice(&self.db, id).await?;
        invoice_payments(&self.db, id).await
    }
}

/// Issues the invoice for a transaction on an open database transaction.
pub(crate) async fn create_from_transaction_in<C: ConnectionTrait>(
    db: &C,
    billing: &BillingConfig,
    transaction_id: Uuid,
    options: &InvoiceOptions,
) -> RepositoryResult<InvoiceWithDetails> {
    let source = transaction::get_in(db, transaction_id).await?;

    let existing = invoices::Entity::find()
        .filter(invoices::Column::TransactionId.eq(transaction_id))
        .count(db)
        .await?;
    if existing > 0 {
        return Err(InvoiceError::AlreadyInvoiced(transaction_id).into());
    }

    let header = &source.transaction;
    let party_id = match TransactionType::from(header.transaction_type) {
        TransactionType::Sale => header.customer_id,
        TransactionType::Purchase => header.supplier_id,
    };
    let party = find_party(db, party_id).await?;

    let names = item_names(db, source.items.iter().map(|l| l.item_id)).await?;
    let lines = source
        .items
        .iter()
        .map(|line| {
            Ok(NewLine {
                item_id: line.item_id,
                description: describe(&names, line.item_id)?,
                quantity: line.quantity,
                unit_price: line.unit_price,
                discount: line.discount,
                tax_rate: line.tax_rate,
                tax_amount: line.tax_amount,
                line_total: line.line_total,
            })
        })
        .collect::<RepositoryResult<Vec<_>>>()?;

    let totals = BillTotals {
        subtotal: header.subtotal,
        discount_amount: header.discount_amount,
        tax_amount: header.tax_amount,
        total_amount: header.total_amount,
    };

    insert_invoice(
        db,
        billing,
        NewInvoice {
            transaction_id: Some(transaction_id),
            party: party.as_ref(),
            totals,
            options,
        },
        lines,
    )
    .await
}

/// Applies a status transition on an open database transaction.
pub(crate) async fn update_status_in<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    requested: &str,
    payment: Option<PaymentDetails>,
    now: DateTime<Utc>,
) -> RepositoryResult<StatusChange> {
    let invoice = find_invoice_for_update(db, id).await?;
    let transition = apply_status_transition(&snapshot(&invoice), requested, payment, now)?;
    let status_changed = transition.status_changed();
    let update = transition.invoice_update;

    let mut active: invoices::ActiveModel = invoice.into();
    if let Some(status) = update.status {
        active.status = Set(status.into());
    }
    if let Some(sent_date) = update.sent_date {
        active.sent_date = Set(Some(sent_date.into()));
    }
    if let Some(paid) = update.paid_amount {
        active.paid_amount = Set(paid);
    }
    if let Some(balance) = update.balance_amount {
        active.balance_amount = Set(balance);
    }
    active.updated_at = Set(update.updated_at.into());
    let invoice = active.update(db).await?;

    let payment = match transition.payment_to_create {
        Some(draft) => Some(insert_payment(db, draft).await?),
        None => None,
    };

    if status_changed {
        tracing::info!(
            invoice_id = %id,
            status = %transition.requested,
            payment = payment.as_ref().map(|p| p.payment_number.as_str()),
            "Invoice status changed"
        );
    } else {
        tracing::warn!(
            invoice_id = %id,
            requested = %transition.requested,
            due_date = %invoice.due_date,
            "Status not applied; invoice is not past due"
        );
    }

    Ok(StatusChange {
        invoice,
        payment,
        status_changed,
    })
}

/// Returns true when the party sits in a different state from the seller.
///
/// Parties without a state are billed intra-state.
fn inter_state(billing: &BillingConfig, party: Option<&parties::Model>) -> bool {
    party
        .and_then(|p| p.state.as_deref())
        .is_some_and(|state| is_inter_state(state, &billing.seller_state))
}

/// Reads the fields the lifecycle rules look at.
fn snapshot(invoice: &invoices::Model) -> InvoiceSnapshot {
    InvoiceSnapshot {
        id: InvoiceId::from_uuid(invoice.id),
        invoice_number: invoice.invoice_number.clone(),
        status: invoice.status.into(),
        total_amount: invoice.total_amount,
        paid_amount: invoice.paid_amount,
        balance_amount: invoice.balance_amount,
        due_date: invoice.due_date.with_timezone(&Utc),
        sent_date: invoice.sent_date.map(|d| d.with_timezone(&Utc)),
        updated_at: invoice.updated_at.with_timezone(&Utc),
    }
}

struct NewInvoice<'a> {
    transaction_id: Option<Uuid>,
    party: Option<&'a parties::Model>,
    totals: BillTotals,
    options: &'a InvoiceOptions,
}

struct NewLine {
    item_id: Uuid,
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    discount: Decimal,
    tax_rate: Decimal,
    tax_amount: Decimal,
    line_total: Decimal,
}

impl NewLine {
    fn into_active(
        self,
        invoice_id: Uuid,
        now: sea_orm::prelude::DateTimeWithTimeZone,
    ) -> invoice_items::ActiveModel {
        invoice_items::ActiveModel {
            id: Set(Uuid::now_v7()),
            invoice_id: Set(invoice_id),
            item_id: Set(self.item_id),
            description: Set(self.description),
            quantity: Set(self.quantity),
            unit_price: Set(self.unit_price),
            discount: Set(self.discount),
            tax_rate: Set(self.tax_rate),
            tax_amount: Set(self.tax_amount),
            line_total: Set(self.line_total),
            created_at: Set(now),
        }
    }
}

async fn insert_invoice<C: ConnectionTrait>(
    db: &C,
    billing: &BillingConfig,
    new: NewInvoice<'_>,
    lines: Vec<NewLine>,
) -> RepositoryResult<InvoiceWithDetails> {
    let issue_date = new.options.issue_date.unwrap_or_else(Utc::now);
    let terms = new
        .options
        .payment_terms_days
        .or_else(|| new.party.and_then(|p| u32::try_from(p.payment_terms).ok()))
        .unwrap_or(billing.default_payment_terms_days);
    let split = new
        .totals
        .gst_split(inter_state(billing, new.party))
        .rounded();
    let number = next_number::<invoices::Entity, _>(
        db,
        invoices::Column::InvoiceNumber,
        INVOICE_PREFIX,
        issue_date,
    )
    .await?;

    let now = Utc::now().into();
    let invoice_id = Uuid::now_v7();
    let invoice = invoices::ActiveModel {
        id: Set(invoice_id),
        invoice_number: Set(number),
        transaction_id: Set(new.transaction_id),
        party_id: Set(new.party.map(|p| p.id)),
        status: Set(DbInvoiceStatus::Draft),
        issue_date: Set(issue_date.into()),
        due_date: Set(InvoiceLifecycle::due_date(issue_date, terms).into()),
        sent_date: Set(None),
        subtotal: Set(new.totals.subtotal),
        tax_amount: Set(new.totals.tax_amount),
        cgst_amount: Set(split.cgst),
        sgst_amount: Set(split.sgst),
        igst_amount: Set(split.igst),
        discount_amount: Set(new.totals.discount_amount),
        total_amount: Set(new.totals.total_amount),
        paid_amount: Set(Decimal::ZERO),
        balance_amount: Set(new.totals.total_amount),
        notes: Set(new.options.notes.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        items.push(line.into_active(invoice_id, now).insert(db).await?);
    }

    Ok(InvoiceWithDetails {
        invoice,
        items,
        payments: Vec::new(),
    })
}

async fn insert_payment<C: ConnectionTrait>(
    db: &C,
    draft: PaymentDraft,
) -> RepositoryResult<payments::Model> {
    let payment = payments::ActiveModel {
        id: Set(Uuid::now_v7()),
        payment_number: Set(draft.payment_number),
        invoice_id: Set(draft.invoice_id.into_inner()),
        amount: Set(round_money(draft.amount)),
        payment_method: Set(draft.method.into()),
        reference: Set(draft.reference),
        payment_date: Set(draft.payment_date.into()),
        status: Set(draft.status.into()),
        notes: Set(Some(draft.notes)),
        created_at: Set(Utc::now().into()),
    };
    Ok(payment.insert(db).await?)
}

async fn find_invoice<C: ConnectionTrait>(db: &C, id: Uuid) -> RepositoryResult<invoices::Model> {
    invoices::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| InvoiceError::InvoiceNotFound(id).into())
}

async fn find_invoice_for_update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> RepositoryResult<invoices::Model> {
    invoices::Entity::find_by_id(id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or_else(|| InvoiceError::InvoiceNotFound(id).into())
}

async fn find_party<C: ConnectionTrait>(
    db: &C,
    party_id: Option<Uuid>,
) -> RepositoryResult<Option<parties::Model>> {
    let Some(party_id) = party_id else {
        return Ok(None);
    };
    parties::Entity::find_by_id(party_id)
        .one(db)
        .await?
        .map(Some)
        .ok_or(RepositoryError::not_found("Party", party_id))
}

async fn item_names<C: ConnectionTrait>(
    db: &C,
    ids: impl Iterator<Item = Uuid>,
) -> RepositoryResult<HashMap<Uuid, String>> {
    let ids: Vec<Uuid> = ids.collect();
    let rows: Vec<(Uuid, String)> = items::Entity::find()
        .select_only()
        .column(items::Column::Id)
        .column(items::Column::Name)
        .filter(items::Column::Id.is_in(ids))
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows.into_iter().collect())
}

fn describe(names: &HashMap<Uuid, String>, item_id: Uuid) -> RepositoryResult<String> {
    names
        .get(&item_id)
        .cloned()
        .ok_or(RepositoryError::not_found("Item", item_id))
}

async fn invoice_lines<C: ConnectionTrait>(
    db: &C,
    invoice_id: Uuid,
) -> RepositoryResult<Vec<invoice_items::Model>> {
    Ok(invoice_items::Entity::find()
        .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
        .order_by_asc(invoice_items::Column::CreatedAt)
        .order_by_asc(invoice_items::Column::Id)
        .all(db)
        .await?)
}

async fn invoice_payments<C: ConnectionTrait>(
    db: &C,
    invoice_id: Uuid,
) -> RepositoryResult<Vec<payments::Model>> {
    Ok(payments::Entity::find()
        .filter(payments::Column::InvoiceId.eq(invoice_id))
        .order_by_asc(payments::Column::PaymentDate)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn party(state: Option<&str>) -> parties::Model {
        let now = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap().into();
        parties::Model {
            id: Uuid::now_v7(),
            name: "Acme Traders".into(),
            party_type: crate::entities::sea_orm_active_enums::PartyType::Customer,
            email: None,
            phone: None,
            gstin: None,
            address: None,
            city: None,
            state: state.map(str::to_string),
            country: Some("India".into()),
            pincode: None,
            credit_limit: dec!(0),
            payment_terms: 15,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_inter_state_compares_raw_state() {
        let billing = BillingConfig::default();
        assert!(!inter_state(&billing, Some(&party(Some("Maharashtra")))));
        assert!(inter_state(&billing, Some(&party(Some("Karnataka")))));
        // Not normalised: case differences count as another state.
        assert!(inter_state(&billing, Some(&party(Some("maharashtra")))));
    }

    #[test]
    fn test_missing_party_or_state_is_intra_state() {
        let billing = BillingConfig::default();
        assert!(!inter_state(&billing, None));
        assert!(!inter_state(&billing, Some(&party(None))));
    }

    #[test]
    fn test_describe_unknown_item_is_not_found() {
        let known = Uuid::now_v7();
        let names = HashMap::from([(known, "Basmati Rice 5kg".to_string())]);
        assert_eq!(describe(&names, known).unwrap(), "Basmati Rice 5kg");
        assert!(matches!(
            describe(&names, Uuid::now_v7()),
            Err(RepositoryError::NotFound { entity: "Item", .. })
        ));
    }
}
