//! Admin analytics handlers, mounted at `/api/admin/analytics`.

use axum::{Json, extract::State};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::ANALYTICS_TAG;
use crate::api::dto::{DateRangeQuery, ErrorResponse, LeaderboardQuery, RankingQuery, TrendQuery};
use crate::error::AppResult;
use crate::services::analytics::{
    AmountPoint, CostAnalysis, CountPoint, InvitationMetrics, InvitationRanking, LeaderboardItem,
    PaymentOverview, SalesRanking, UserOverview,
};
use crate::state::AppState;
use crate::utils::validate::ValidatedQuery;

/// # Routes
/// - `GET /users/overview`, `GET /users/growth`
/// - `GET /payments/overview`, `GET /payments/trend`, `GET /payments/cost`
/// - `GET /rankings/sales`, `GET /rankings/invitations`
/// - `GET /invitations/metrics`, `GET /invitations/leaderboard`
pub fn analytics_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(user_overview))
        .routes(routes!(user_growth))
        .routes(routes!(payment_overview))
        .routes(routes!(payment_trend))
        .routes(routes!(cost_analysis))
        .routes(routes!(sales_ranking))
        .routes(routes!(invitation_ranking))
        .routes(routes!(invitation_metrics))
        .routes(routes!(inviter_leaderboard))
}

/// Totals, VIPs, users active in the last 3 days and signups in range
#[utoipa::path(
    get,
    path = "/users/overview",
    tag = ANALYTICS_TAG,
    params(DateRangeQuery),
    responses(
        (status = 200, description = "User overview", body = UserOverview),
        (status = 400, description = "Malformed date range", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn user_overview(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<DateRangeQuery>,
) -> AppResult<Json<UserOverview>> {
    let report = state.services.analytics.user_overview(query.range()?).await?;
    Ok(Json(report))
}

/// Signups per period bucket, zero buckets included
#[utoipa::path(
    get,
    path = "/users/growth",
    tag = ANALYTICS_TAG,
    params(TrendQuery),
    responses(
        (status = 200, description = "Signups per bucket", body = Vec<CountPoint>),
        (status = 400, description = "Malformed date range or period", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn user_growth(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<TrendQuery>,
) -> AppResult<Json<Vec<CountPoint>>> {
    let (range, period) = query.resolve()?;
    let points = state.services.analytics.user_growth(range, period).await?;
    Ok(Json(points))
}

#[utoipa::path(
    get,
    path = "/payments/overview",
    tag = ANALYTICS_TAG,
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Income and channel breakdown", body = PaymentOverview),
        (status = 400, description = "Malformed date range", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn payment_overview(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<DateRangeQuery>,
) -> AppResult<Json<PaymentOverview>> {
    let report = state.services.analytics.payment_overview(query.range()?).await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/payments/trend",
    tag = ANALYTICS_TAG,
    params(TrendQuery),
    responses(
        (status = 200, description = "Income per bucket", body = Vec<AmountPoint>),
        (status = 400, description = "Malformed date range or period", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn payment_trend(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<TrendQuery>,
) -> AppResult<Json<Vec<AmountPoint>>> {
    let (range, period) = query.resolve()?;
    let points = state.services.analytics.payment_trend(range, period).await?;
    Ok(Json(points))
}

#[utoipa::path(
    get,
    path = "/payments/cost",
    tag = ANALYTICS_TAG,
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Income against credit and commission cost", body = CostAnalysis),
        (status = 400, description = "Malformed date range", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn cost_analysis(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<DateRangeQuery>,
) -> AppResult<Json<CostAnalysis>> {
    let report = state.services.analytics.cost_analysis(query.range()?).await?;
    Ok(Json(report))
}

/// Users ranked by commission earned in range
#[utoipa::path(
    get,
    path = "/rankings/sales",
    tag = ANALYTICS_TAG,
    params(RankingQuery),
    responses(
        (status = 200, description = "Sales ranking", body = SalesRanking),
        (status = 400, description = "Malformed date range", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn sales_ranking(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<RankingQuery>,
) -> AppResult<Json<SalesRanking>> {
    let ranking = state
        .services
        .analytics
        .sales_ranking(query.range()?, query.page, query.page_size)
        .await?;
    Ok(Json(ranking))
}

/// Inviters ranked by invitations made in range
#[utoipa::path(
    get,
    path = "/rankings/invitations",
    tag = ANALYTICS_TAG,
    params(RankingQuery),
    responses(
        (status = 200, description = "Invitation ranking", body = InvitationRanking),
        (status = 400, description = "Malformed date range", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn invitation_ranking(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<RankingQuery>,
) -> AppResult<Json<InvitationRanking>> {
    let ranking = state
        .services
        .analytics
        .invitation_ranking(query.range()?, query.page, query.page_size)
        .await?;
    Ok(Json(ranking))
}

#[utoipa::path(
    get,
    path = "/invitations/metrics",
    tag = ANALYTICS_TAG,
    responses((status = 200, description = "Referral program ratios", body = InvitationMetrics)),
    security(("bearerAuth" = []))
)]
async fn invitation_metrics(State(state): State<AppState>) -> AppResult<Json<InvitationMetrics>> {
    let metrics = state.services.analytics.invitation_metrics().await?;
    Ok(Json(metrics))
}

#[utoipa::path(
    get,
    path = "/invitations/leaderboard",
    tag = ANALYTICS_TAG,
    params(LeaderboardQuery),
    responses((status = 200, description = "Inviters with quality and activity scores", body = Vec<LeaderboardItem>)),
    security(("bearerAuth" = []))
)]
async fn inviter_leaderboard(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<LeaderboardQuery>,
) -> AppResult<Json<Vec<LeaderboardItem>>> {
    let items = state
        .services
        .analytics
        .leaderboard(query.sort(), query.limit)
        .await?;
    Ok(Json(items))
}
