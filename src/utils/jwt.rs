use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::UserRole;

/// Token type enumeration
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived token sent with every API call
    Access,
    /// Long-lived token exchanged for a new pair
    Refresh,
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub username: String,
    /// Role code, see [`UserRole`]
    pub role: i16,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(
        user_id: &str,
        username: &str,
        role: UserRole,
        token_type: TokenType,
        expiration_hours: i64,
    ) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours);

        Self {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.code(),
            token_type,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Role decoded from the claim; unknown codes fall back to a normal user.
    pub fn user_role(&self) -> UserRole {
        UserRole::from_code(self.role).unwrap_or(UserRole::Normal)
    }
}

/// Signing parameters taken from [`crate::config::JwtConfig`].
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    secret: String,
    access_expiration_hours: i64,
    refresh_expiration_hours: i64,
}

/// An access/refresh token pair with the access token lifetime in seconds.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl TokenIssuer {
    pub fn new(secret: &str, access_expiration_hours: i64, refresh_expiration_hours: i64) -> Self {
        Self {
            secret: secret.to_string(),
            access_expiration_hours,
            refresh_expiration_hours,
        }
    }

    pub fn from_config(config: &crate::config::JwtConfig) -> Self {
        Self::new(
            &config.secret,
            config.access_token_expiration,
            config.refresh_token_expiration,
        )
    }

    pub fn issue_pair(&self, user_id: &str, username: &str, role: UserRole) -> AppResult<TokenPair> {
        let access = Claims::new(
            user_id,
            username,
            role,
            TokenType::Access,
            self.access_expiration_hours,
        );
        let refresh = Claims::new(
            user_id,
            username,
            role,
            TokenType::Refresh,
            self.refresh_expiration_hours,
        );

        Ok(TokenPair {
            access_token: self.encode(&access)?,
            refresh_token: self.encode(&refresh)?,
            expires_in: self.access_expiration_hours * 3600,
        })
    }

    pub fn validate_access_token(&self, token: &str) -> AppResult<Claims> {
        validate_token(token, &self.secret, Some(TokenType::Access))
    }

    pub fn validate_refresh_token(&self, token: &str) -> AppResult<Claims> {
        validate_token(token, &self.secret, Some(TokenType::Refresh))
    }

    fn encode(&self, claims: &Claims) -> AppResult<String> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal {
            source: anyhow::anyhow!("Failed to generate JWT token: {}", e),
        })
    }
}

/// Validates and decodes a JWT, optionally checking its type.
pub fn validate_token(
    token: &str,
    secret: &str,
    expected_type: Option<TokenType>,
) -> AppResult<Claims> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::unauthorized("Token has expired")
        }
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            AppError::unauthorized("Invalid token signature")
        }
        _ => AppError::unauthorized("Invalid token"),
    })?;

    if let Some(expected) = expected_type
        && claims.token_type != expected
    {
        return Err(AppError::unauthorized(format!(
            "Invalid token type: expected {:?}, got {:?}",
            expected, claims.token_type
        )));
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test_secret_key_for_jwt_testing_0123456789";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(TEST_SECRET, 2, 168)
    }

    #[test]
    fn test_issue_pair() {
        let pair = issuer()
            .issue_pair("u_0123456789abcdef", "alice", UserRole::Normal)
            .unwrap();

        assert!(!pair.access_token.is_empty());
        assert_ne!(pair.access_token, pair.refresh_token);
        assert_eq!(pair.expires_in, 7200);
    }

    #[test]
    fn test_access_token_carries_role() {
        let issuer = issuer();
        let pair = issuer.issue_pair("u_1", "root", UserRole::Admin).unwrap();

        let claims = issuer.validate_access_token(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "u_1");
        assert_eq!(claims.username, "root");
        assert_eq!(claims.user_role(), UserRole::Admin);
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn test_wrong_token_type_rejected() {
        let issuer = issuer();
        let pair = issuer.issue_pair("u_1", "alice", UserRole::Normal).unwrap();

        let result = issuer.validate_refresh_token(&pair.access_token);
        match result {
            Err(AppError::Unauthorized { message }) => {
                assert!(message.contains("Invalid token type"))
            }
            other => panic!("Expected Unauthorized error, got {:?}", other),
        }
        assert!(issuer.validate_access_token(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let pair = issuer().issue_pair("u_1", "alice", UserRole::Normal).unwrap();
        let other = TokenIssuer::new("another_secret_key_that_is_long_enough", 2, 168);

        assert!(other.validate_access_token(&pair.access_token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let issuer = TokenIssuer::new(TEST_SECRET, -1, 168);
        let pair = issuer.issue_pair("u_1", "alice", UserRole::Normal).unwrap();

        match issuer.validate_access_token(&pair.access_token) {
            Err(AppError::Unauthorized { message }) => assert!(message.contains("expired")),
            other => panic!("Expected expiry error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_token() {
        assert!(validate_token("not.a.token", TEST_SECRET, None).is_err());
    }

    #[test]
    fn test_unknown_role_code_falls_back() {
        let mut claims = Claims::new("u_1", "a", UserRole::Vip, TokenType::Access, 1);
        claims.role = 42;
        assert_eq!(claims.user_role(), UserRole::Normal);
    }
}
