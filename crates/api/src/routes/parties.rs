//! Party management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use hisaab_db::entities::sea_orm_active_enums::PartyType;
use hisaab_db::repositories::{CreatePartyInput, PartyFilter, PartyRepository, UpdatePartyInput};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::PageQuery;
use crate::validation::{self, double_option};
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiQuery, ValidatedJson},
};

/// Creates the party routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/parties", get(list_parties).post(create_party))
        .route(
            "/parties/{id}",
            get(get_party).patch(update_party).delete(delete_party),
        )
}

/// Query parameters for listing parties.
#[derive(Debug, Deserialize)]
pub struct ListPartiesQuery {
    /// Filter by type.
    pub party_type: Option<PartyType>,
    /// Filter by active status.
    pub is_active: Option<bool>,
    /// Substring of the name.
    pub search: Option<String>,
}

/// Request body for creating a party.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreatePartyRequest {
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// CUSTOMER, SUPPLIER or VENDOR.
    pub party_type: PartyType,
    /// Email address.
    #[validate(email)]
    pub email: Option<String>,
    /// Phone number.
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    /// GSTIN, 15 characters.
    #[validate(length(equal = 15))]
    pub gstin: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    #[validate(length(max = 100))]
    pub city: Option<String>,
    /// State; compared with the seller's state for GST.
    #[validate(length(max = 100))]
    pub state: Option<String>,
    /// Country.
    #[validate(length(max = 100))]
    pub country: Option<String>,
    /// Postal code.
    #[validate(length(max = 10))]
    pub pincode: Option<String>,
    /// Credit limit (default: 0).
    #[validate(custom(function = "validation::non_negative"))]
    pub credit_limit: Option<Decimal>,
    /// Payment terms in days (default: configured terms).
    #[validate(range(min = 0, max = 3650))]
    pub payment_terms: Option<i32>,
    /// Whether the party is active (default: true).
    pub is_active: Option<bool>,
}

/// Request body for updating a party. `null` clears optional fields.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdatePartyRequest {
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    /// CUSTOMER, SUPPLIER or VENDOR.
    pub party_type: Option<PartyType>,
    /// Email address.
    #[serde(default, deserialize_with = "double_option")]
    #[validate(email)]
    pub email: Option<Option<String>>,
    /// Phone number.
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 20))]
    pub phone: Option<Option<String>>,
    /// GSTIN.
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(equal = 15))]
    pub gstin: Option<Option<String>>,
    /// Street address.
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    /// City.
    #[serde(default, deserialize_with = "double_option")]
    pub city: Option<Option<String>>,
    /// State.
    #[serde(default, deserialize_with = "double_option")]
    pub state: Option<Option<String>>,
    /// Country.
    #[serde(default, deserialize_with = "double_option")]
    pub country: Option<Option<String>>,
    /// Postal code.
    #[serde(default, deserialize_with = "double_option")]
    pub pincode: Option<Option<String>>,
    /// Credit limit.
    #[validate(custom(function = "validation::non_negative"))]
    pub credit_limit: Option<Decimal>,
    /// Payment terms in days.
    #[validate(range(min = 0, max = 3650))]
    pub payment_terms: Option<i32>,
    /// Whether the party is active.
    pub is_active: Option<bool>,
}

/// GET `/parties` - List parties.
async fn list_parties(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListPartiesQuery>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let filter = PartyFilter {
        party_type: query.party_type,
        is_active: query.is_active,
        search: query.search,
    };
    let parties = PartyRepository::new(state.conn())
        .list(filter, &page.request())
        .await?;
    Ok(Json(parties))
}

/// POST `/parties` - Create a party.
async fn create_party(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePartyRequest>,
) -> ApiResult<impl IntoResponse> {
    let default_terms = i32::try_from(state.billing.default_payment_terms_days).unwrap_or(0);
    let input = CreatePartyInput {
        name: payload.name,
        party_type: payload.party_type,
        email: payload.email,
        phone: payload.phone,
        gstin: payload.gstin,
        address: payload.address,
        city: payload.city,
        state: payload.state,
        country: payload.country,
        pincode: payload.pincode,
        credit_limit: payload.credit_limit.unwrap_or(Decimal::ZERO),
        payment_terms: payload.payment_terms.unwrap_or(default_terms),
        is_active: payload.is_active.unwrap_or(true),
    };

    let party = PartyRepository::new(state.conn()).create(input).await?;
    info!(party_id = %party.id, party_type = ?party.party_type, "Party created");
    Ok((StatusCode::CREATED, Json(party)))
}

/// GET `/parties/{id}` - Get a party.
async fn get_party(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let party = PartyRepository::new(state.conn()).get(id).await?;
    Ok(Json(party))
}

/// PATCH `/parties/{id}` - Update a party.
async fn update_party(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdatePartyRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = UpdatePartyInput {
        name: payload.name,
        party_type: payload.party_type,
        email: payload.email,
        phone: payload.phone,
        gstin: payload.gstin,
        address: payload.address,
        city: payload.city,
        state: payload.state,
        country: payload.country,
        pincode: payload.pincode,
        credit_limit: payload.credit_limit,
        payment_terms: payload.payment_terms,
        is_active: payload.is_active,
    };

    let party = PartyRepository::new(state.conn()).update(id, input).await?;
    info!(party_id = %id, "Party updated");
    Ok(Json(party))
}

/// DELETE `/parties/{id}` - Delete an unreferenced party.
async fn delete_party(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    PartyRepository::new(state.conn()).delete(id).await?;
    info!(party_id = %id, "Party deleted");
    Ok(StatusCode::NO_CONTENT)
}
