//! Extractors that deserialize and then run `validator` rules.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        value.validate().map_err(validation_error)?;
        Ok(ValidatedJson(value))
    }
}

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> AppResult<Self> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        value.validate().map_err(validation_error)?;
        Ok(ValidatedQuery(value))
    }
}

/// Collapses `validator` output into a single field error, picking the
/// alphabetically first field so the response is deterministic.
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    match fields.first() {
        Some((field, errs)) => {
            let reason = errs
                .first()
                .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| {
                    errs.first()
                        .map(|e| format!("failed '{}' check", e.code))
                        .unwrap_or_else(|| "invalid value".to_string())
                });
            AppError::Validation {
                field: field.to_string(),
                reason,
            }
        }
        None => AppError::Validation {
            field: "body".to_string(),
            reason: errors.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Signup {
        #[validate(length(min = 3, max = 20, message = "Username must be between 3 and 20 characters"))]
        username: String,
        #[validate(email(message = "Invalid email format"))]
        email: String,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Paging {
        #[validate(range(min = 1, message = "page must be at least 1"))]
        page: u32,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/test")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_json() {
        let req = json_request(r#"{"username":"alice","email":"alice@example.com"}"#);
        let ValidatedJson(body) = ValidatedJson::<Signup>::from_request(req, &()).await.unwrap();
        assert_eq!(body.username, "alice");
    }

    #[tokio::test]
    async fn test_invalid_json_field() {
        let req = json_request(r#"{"username":"al","email":"alice@example.com"}"#);
        match ValidatedJson::<Signup>::from_request(req, &()).await {
            Err(AppError::Validation { field, reason }) => {
                assert_eq!(field, "username");
                assert!(reason.contains("between 3 and 20"));
            }
            other => panic!("Expected Validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_first_field_is_reported() {
        let req = json_request(r#"{"username":"al","email":"nope"}"#);
        match ValidatedJson::<Signup>::from_request(req, &()).await {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "email"),
            other => panic!("Expected Validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let req = json_request(r#"{"username":"#);
        let result = ValidatedJson::<Signup>::from_request(req, &()).await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })));
    }

    #[tokio::test]
    async fn test_query_validation() {
        let req = Request::builder().uri("/test?page=0").body(Body::empty()).unwrap();
        let (mut parts, _) = req.into_parts();
        let result = ValidatedQuery::<Paging>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Validation { .. })));

        let req = Request::builder().uri("/test?page=2").body(Body::empty()).unwrap();
        let (mut parts, _) = req.into_parts();
        let ValidatedQuery(q) = ValidatedQuery::<Paging>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(q.page, 2);
    }
}
