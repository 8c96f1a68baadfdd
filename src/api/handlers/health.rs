//! Health check endpoints for monitoring and load balancers.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::Json};
use diesel_async::RunQueryDsl;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::state::AppState;
use crate::utils::time::{format_timestamp, now};

const CACHE_PROBE_KEY: &str = "health:probe";

pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health_check))
        .routes(routes!(liveness_check))
}

/// GET /api/health - Version plus database and cache reachability
///
/// A failing cache only degrades the service; a failing database makes it
/// unhealthy and answers 503.
#[utoipa::path(
    get,
    path = "/",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is healthy or degraded", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    )
)]
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut checks = BTreeMap::new();
    checks.insert("database".to_string(), check_database(&state).await);
    if state.cache.is_enabled() {
        checks.insert("cache".to_string(), check_cache(&state).await);
    }

    let response = HealthResponse::from_checks(
        env!("CARGO_PKG_VERSION"),
        format_timestamp(now()),
        checks,
    );
    let status = match response.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    (status, Json(response))
}

/// GET /api/health/live - Liveness probe, no dependencies touched
#[utoipa::path(
    get,
    path = "/live",
    tag = HEALTH_TAG,
    responses((status = 200, description = "Service is alive"))
)]
async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

async fn check_database(state: &AppState) -> ComponentHealth {
    let start = Instant::now();
    let result = match state.db_pool.get().await {
        Ok(mut conn) => diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| format!("Query failed: {}", e)),
        Err(e) => Err(format!("Connection failed: {}", e)),
    };
    let elapsed = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => ComponentHealth::new(HealthStatus::Healthy, "Connected", elapsed),
        Err(message) => ComponentHealth::new(HealthStatus::Unhealthy, message, elapsed),
    }
}

async fn check_cache(state: &AppState) -> ComponentHealth {
    let start = Instant::now();
    let result = state.cache.get(CACHE_PROBE_KEY).await;
    let elapsed = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => ComponentHealth::new(HealthStatus::Healthy, "Reachable", elapsed),
        Err(e) => ComponentHealth::new(HealthStatus::Degraded, format!("Cache error: {}", e), elapsed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness_check() {
        assert_eq!(liveness_check().await, StatusCode::OK);
    }
}
