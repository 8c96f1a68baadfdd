//! JWT authentication middleware.
//!
//! Provides middleware for validating JWT tokens and extracting user claims.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::UserRole;
use crate::state::AppState;
use crate::utils::jwt::Claims;

/// Extension type for authenticated user information
///
/// This is added to request extensions after successful authentication
/// and can be extracted in handlers using `Extension<AuthUser>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            role: claims.user_role(),
            user_id: claims.sub,
            username: claims.username,
        }
    }
}

/// The caller on routes behind [`optional_auth_middleware`]; `None` for
/// anonymous requests.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn user_id(&self) -> Option<&str> {
        self.0.as_ref().map(|u| u.user_id.as_str())
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(parts.extensions.get::<AuthUser>().cloned()))
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// JWT authentication middleware
///
/// Validates the access token from the Authorization header and adds
/// the authenticated user information to request extensions.
///
/// # Errors
/// Returns 401 Unauthorized if the header is missing or malformed, or if the
/// token is invalid, expired or a refresh token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request.headers().get(header::AUTHORIZATION).is_none() {
        return Err(AppError::unauthorized("Missing authorization header"));
    }
    let token = bearer_token(&request).ok_or_else(|| {
        AppError::unauthorized("Invalid authorization header format. Expected: Bearer <token>")
    })?;

    let claims = state.tokens.validate_access_token(token)?;
    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

/// Like [`auth_middleware`] but lets anonymous requests through. A valid
/// token still populates `AuthUser`, so handlers can tell owners apart.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = bearer_token(&request).and_then(|token| state.tokens.validate_access_token(token).ok());
    if let Some(claims) = claims {
        request.extensions_mut().insert(AuthUser::from(claims));
    }
    next.run(request).await
}

/// Requires an authenticated admin. Must run after [`auth_middleware`].
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| AppError::unauthorized("Authentication required"))?;
    if !user.is_admin() {
        return Err(AppError::forbidden("Administrator role required"));
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::jwt::{TokenIssuer, TokenType};

    fn claims(role: i16) -> Claims {
        Claims {
            sub: "u_0123456789abcdef".to_string(),
            username: "writer".to_string(),
            role,
            token_type: TokenType::Access,
            iat: 0,
            exp: 9999999999,
        }
    }

    #[test]
    fn test_auth_user_from_claims() {
        let user = AuthUser::from(claims(3));
        assert_eq!(user.user_id, "u_0123456789abcdef");
        assert_eq!(user.username, "writer");
        assert!(user.is_admin());
    }

    #[test]
    fn test_unknown_role_is_not_admin() {
        let user = AuthUser::from(claims(42));
        assert_eq!(user.role, UserRole::Normal);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let issuer = TokenIssuer::new("test_secret_key_at_least_32_characters_long", 1, 168);
        let pair = issuer
            .issue_pair("u_0123456789abcdef", "writer", UserRole::Vip)
            .unwrap();
        assert!(issuer.validate_access_token(&pair.refresh_token).is_err());
        let claims = issuer.validate_access_token(&pair.access_token).unwrap();
        assert_eq!(AuthUser::from(claims).role, UserRole::Vip);
    }
    #[tokio::test]
    async fn test_admin_middleware_checks_role() {
        use axum::{Router, body::Body, http::StatusCode, middleware, routing::get};
        use tower::ServiceExt;

        fn app(user: Option<AuthUser>) -> Router {
            Router::new()
                .route("/admin", get(|| async { "ok" }))
                .layer(middleware::from_fn(admin_middleware))
                .layer(middleware::from_fn(move |mut req: Request, next: Next| {
                    let user = user.clone();
                    async move {
                        if let Some(user) = user {
                            req.extensions_mut().insert(user);
                        }
                        next.run(req).await
                    }
                }))
        }

        let request = || Request::builder().uri("/admin").body(Body::empty()).unwrap();

        let anonymous = app(None).oneshot(request()).await.unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let normal = app(Some(AuthUser::from(claims(1)))).oneshot(request()).await.unwrap();
        assert_eq!(normal.status(), StatusCode::FORBIDDEN);

        let admin = app(Some(AuthUser::from(claims(3)))).oneshot(request()).await.unwrap();
        assert_eq!(admin.status(), StatusCode::OK);
    }
}
