//! Credit balance, ledger, pricing and consumption handlers.

use axum::{Extension, Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::{ADMIN_TAG, CREDIT_TAG};
use crate::api::dto::{
    BalanceResponse, ConsumeCreditsRequest, CreditProductResponse, CreditRecordQuery,
    CreditRecordResponse, ErrorResponse, GrantCreditsRequest, PagedResponse, PaginationParams,
    ServicePriceResponse,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Creates the credit routes, mounted at `/api/credits`.
///
/// # Routes
/// - `GET /balance`
/// - `GET /records`
/// - `GET /products`
/// - `GET /prices`
/// - `POST /consume`
pub fn credit_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_balance))
        .routes(routes!(list_records))
        .routes(routes!(list_products))
        .routes(routes!(list_prices))
        .routes(routes!(consume))
}

/// Admin routes, mounted at `/api/admin/credits`.
pub fn admin_credit_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(grant))
}

/// GET /api/credits/balance - Current balance
#[utoipa::path(
    get,
    path = "/balance",
    tag = CREDIT_TAG,
    responses((status = 200, description = "Current balance", body = BalanceResponse)),
    security(("bearerAuth" = []))
)]
async fn get_balance(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<BalanceResponse>> {
    let credits = state.services.credits.balance(&auth_user.user_id).await?;
    Ok(Json(BalanceResponse { credits }))
}

/// GET /api/credits/records - Caller's ledger, newest first
#[utoipa::path(
    get,
    path = "/records",
    tag = CREDIT_TAG,
    params(PaginationParams, CreditRecordQuery),
    responses((status = 200, description = "Credit records", body = PagedResponse<CreditRecordResponse>)),
    security(("bearerAuth" = []))
)]
async fn list_records(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
    ValidatedQuery(query): ValidatedQuery<CreditRecordQuery>,
) -> AppResult<Json<PagedResponse<CreditRecordResponse>>> {
    let (records, total) = state
        .services
        .credits
        .records(
            &auth_user.user_id,
            query.record_type,
            params.offset(),
            params.limit(),
        )
        .await?;
    Ok(Json(PagedResponse::from_rows(records, &params, total)))
}

/// GET /api/credits/products - Active recharge products
#[utoipa::path(
    get,
    path = "/products",
    tag = CREDIT_TAG,
    responses((status = 200, description = "Active products", body = Vec<CreditProductResponse>)),
    security(("bearerAuth" = []))
)]
async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<CreditProductResponse>>> {
    let products = state.services.credits.products().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /api/credits/prices - Active service prices
#[utoipa::path(
    get,
    path = "/prices",
    tag = CREDIT_TAG,
    responses((status = 200, description = "Active service prices", body = Vec<ServicePriceResponse>)),
    security(("bearerAuth" = []))
)]
async fn list_prices(State(state): State<AppState>) -> AppResult<Json<Vec<ServicePriceResponse>>> {
    let prices = state.services.credits.prices().await?;
    Ok(Json(prices.into_iter().map(Into::into).collect()))
}

/// POST /api/credits/consume - Charge credits for a priced service
#[utoipa::path(
    post,
    path = "/consume",
    tag = CREDIT_TAG,
    request_body = ConsumeCreditsRequest,
    responses(
        (status = 200, description = "Credits consumed", body = CreditRecordResponse),
        (status = 402, description = "Insufficient credits", body = ErrorResponse),
        (status = 404, description = "Unknown or inactive service", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn consume(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<ConsumeCreditsRequest>,
) -> AppResult<Json<CreditRecordResponse>> {
    let record = state
        .services
        .credits
        .consume(&auth_user.user_id, &payload.service_code, payload.units)
        .await?;
    Ok(Json(record.into()))
}

/// POST /api/admin/credits/grant - Adjust a user's balance
#[utoipa::path(
    post,
    path = "/grant",
    tag = ADMIN_TAG,
    request_body = GrantCreditsRequest,
    responses(
        (status = 201, description = "Credits granted", body = CreditRecordResponse),
        (status = 400, description = "Invalid record type or amount", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn grant(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<GrantCreditsRequest>,
) -> AppResult<(StatusCode, Json<CreditRecordResponse>)> {
    let record = state
        .services
        .credits
        .grant(
            &payload.user_id,
            payload.credits,
            payload.record_type,
            payload.description,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}
