//! Router configuration for the API.
//!
//! Routes are grouped by the authentication they need. Each group gets its
//! own middleware stack and the groups are merged under `/api`.

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers::{
    ai_tasks, analytics, articles, auth, blog, credits, health, invitations, me, templates,
    trades, users,
};
use crate::api::middleware::{
    admin_middleware, auth_middleware, global_error_handler, logging_middleware,
    optional_auth_middleware, request_id_middleware,
};
use crate::config::ServerConfig;
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. Request ID - generates/propagates request IDs
/// 2. Logging - logs requests with request IDs
/// 3. Error handler - turns bare 4xx/5xx responses into `ErrorResponse`
///
/// # Route groups
/// - public: health, auth, blog reader
/// - optional auth: AI task gallery, template gallery
/// - authenticated: profile, credits, trades, AI tasks, templates, articles,
///   invitations, commissions
/// - admin (`/api/admin`): users, credits, trades, templates, blog,
///   commissions, analytics
pub fn create_router(state: AppState) -> Router {
    let public = OpenApiRouter::new()
        .nest("/health", health::health_routes())
        .nest("/auth", auth::auth_routes())
        .nest("/blog", blog::blog_routes());

    let optional_auth = OpenApiRouter::new()
        .nest("/ai-tasks", ai_tasks::public_ai_task_routes())
        .nest("/templates", templates::public_template_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let authenticated = OpenApiRouter::new()
        .nest("/me", me::me_routes())
        .nest("/me/templates", templates::my_template_routes())
        .nest("/credits", credits::credit_routes())
        .nest("/trades", trades::trade_routes())
        .nest("/ai-tasks", ai_tasks::ai_task_routes())
        .nest("/templates", templates::template_routes())
        .nest("/articles", articles::article_routes())
        .nest("/invitations", invitations::invitation_routes())
        .nest("/commissions", invitations::commission_routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin = OpenApiRouter::new()
        .nest("/users", users::admin_user_routes())
        .nest("/credits", credits::admin_credit_routes())
        .nest("/trades", trades::admin_trade_routes())
        .nest("/templates", templates::admin_template_routes())
        .nest("/blog", blog::admin_blog_routes())
        .nest("/commissions", invitations::admin_commission_routes())
        .nest("/analytics", analytics::analytics_routes())
        // admin check needs the AuthUser inserted by auth_middleware
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api_routes = public
        .merge(optional_auth)
        .merge(authenticated)
        .nest("/admin", admin);

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", api_routes)
        .split_for_parts();

    let server = &state.settings.server;
    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout)))
        .layer(CompressionLayer::new())
        .layer(cors_layer(server))
        .with_state(state)
}

/// Any origin when `cors_origins` is empty; unparsable origins are skipped.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if config.cors_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::models::UserRole;
    use crate::state::test_support::offline_state as test_state;

    fn bearer(state: &AppState, role: UserRole) -> String {
        let pair = state.tokens.issue_pair("u-1", "alice", role).unwrap();
        format!("Bearer {}", pair.access_token)
    }

    #[tokio::test]
    async fn test_liveness_is_public() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/api/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/api/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_admin_routes_reject_normal_users() {
        let state = test_state();
        let token = bearer(&state, UserRole::Normal);
        let app = create_router(state);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/admin/analytics/invitations/metrics")
                    .header(header::AUTHORIZATION, token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_validation_runs_before_database() {
        let state = test_state();
        let token = bearer(&state, UserRole::Normal);
        let app = create_router(state);
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/invitations/bind")
                    .header(header::AUTHORIZATION, token)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"code":"SHORT"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_openapi_document_lists_domain_paths() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/blog/{slug}"));
        assert!(paths.contains_key("/api/articles/{id}/publish"));
        assert!(paths.contains_key("/api/admin/analytics/rankings/sales"));
        // same path served by the optional-auth and authenticated groups
        let task = &paths["/api/ai-tasks/{id}"];
        assert!(task.get("get").is_some());
        assert!(task.get("delete").is_some());
    }
}
