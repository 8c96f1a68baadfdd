//! Recharge order handlers.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::{ADMIN_TAG, TRADE_TAG};
use crate::api::dto::{
    CreateTradeRequest, ErrorResponse, MarkPaidRequest, PagedResponse, PaginationParams,
    TradeQuery, TradeResponse,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Creates the trade routes, mounted at `/api/trades`.
///
/// # Routes
/// - `POST /` - Create a pending recharge order
/// - `GET /` - List the caller's orders
/// - `GET /{trade_no}`
/// - `POST /{trade_no}/close`
pub fn trade_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_trade, list_trades))
        .routes(routes!(get_trade))
        .routes(routes!(close_trade))
}

/// Admin routes, mounted at `/api/admin/trades`.
pub fn admin_trade_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(mark_paid))
}

/// POST /api/trades - Create order
#[utoipa::path(
    post,
    path = "/",
    tag = TRADE_TAG,
    request_body = CreateTradeRequest,
    responses(
        (status = 201, description = "Pending order created", body = TradeResponse),
        (status = 404, description = "Unknown or inactive product", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn create_trade(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateTradeRequest>,
) -> AppResult<(StatusCode, Json<TradeResponse>)> {
    let trade = state
        .services
        .billing
        .create_order(&auth_user.user_id, payload.product_id, payload.payment_channel)
        .await?;
    Ok((StatusCode::CREATED, Json(trade.into())))
}

/// GET /api/trades - List the caller's orders
#[utoipa::path(
    get,
    path = "/",
    tag = TRADE_TAG,
    params(PaginationParams, TradeQuery),
    responses((status = 200, description = "Orders", body = PagedResponse<TradeResponse>)),
    security(("bearerAuth" = []))
)]
async fn list_trades(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
    ValidatedQuery(query): ValidatedQuery<TradeQuery>,
) -> AppResult<Json<PagedResponse<TradeResponse>>> {
    let (trades, total) = state
        .services
        .billing
        .list(&auth_user.user_id, query.status, params.offset(), params.limit())
        .await?;
    Ok(Json(PagedResponse::from_rows(trades, &params, total)))
}

/// GET /api/trades/{trade_no} - Get one of the caller's orders
#[utoipa::path(
    get,
    path = "/{trade_no}",
    tag = TRADE_TAG,
    params(("trade_no" = String, Path, description = "Trade number")),
    responses(
        (status = 200, description = "Order found", body = TradeResponse),
        (status = 403, description = "Order belongs to another user", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn get_trade(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(trade_no): Path<String>,
) -> AppResult<Json<TradeResponse>> {
    let trade = state.services.billing.get(&auth_user.user_id, &trade_no).await?;
    Ok(Json(trade.into()))
}

/// POST /api/trades/{trade_no}/close - Close a pending order
#[utoipa::path(
    post,
    path = "/{trade_no}/close",
    tag = TRADE_TAG,
    params(("trade_no" = String, Path, description = "Trade number")),
    responses(
        (status = 200, description = "Order closed", body = TradeResponse),
        (status = 400, description = "Order is not pending", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn close_trade(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(trade_no): Path<String>,
) -> AppResult<Json<TradeResponse>> {
    let trade = state.services.billing.close(&auth_user.user_id, &trade_no).await?;
    Ok(Json(trade.into()))
}

/// POST /api/admin/trades/{trade_no}/paid - Confirm payment
///
/// Idempotent: an already paid order is returned unchanged.
#[utoipa::path(
    post,
    path = "/{trade_no}/paid",
    tag = ADMIN_TAG,
    params(("trade_no" = String, Path, description = "Trade number")),
    request_body(content = MarkPaidRequest, description = "Optional provider reference"),
    responses(
        (status = 200, description = "Order paid", body = TradeResponse),
        (status = 400, description = "Order is closed or failed", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn mark_paid(
    State(state): State<AppState>,
    Path(trade_no): Path<String>,
    ValidatedJson(payload): ValidatedJson<MarkPaidRequest>,
) -> AppResult<Json<TradeResponse>> {
    let trade = state
        .services
        .billing
        .mark_paid(&trade_no, payload.payment_id)
        .await?;
    Ok(Json(trade.into()))
}
