//! User-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{User, UserRole};
use crate::services::{AdminUserChanges, ProfileChanges};
use crate::utils::money::to_f64;
use crate::utils::time::{format_optional, format_timestamp};

// ============================================================================
// Request DTOs
// ============================================================================

/// Profile fields the user may edit.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 50, message = "Nickname must be between 1 and 50 characters"))]
    pub nickname: Option<String>,
    #[validate(url(message = "Avatar must be a URL"))]
    pub avatar: Option<String>,
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileChanges {
            nickname: req.nickname,
            avatar: req.avatar,
            phone: req.phone,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password cannot be empty"))]
    #[schema(format = "password")]
    pub current_password: String,
    #[validate(length(min = 6, max = 64, message = "Password must be between 6 and 64 characters"))]
    #[schema(format = "password", min_length = 6, max_length = 64)]
    pub new_password: String,
}

/// Admin user search.
#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct AdminUserQuery {
    /// Matches username, email or nickname
    pub keyword: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AdminUpdateUserRequest {
    pub role: Option<UserRole>,
    #[validate(range(min = 0, message = "vip_level must not be negative"))]
    pub vip_level: Option<i32>,
    pub is_active: Option<bool>,
}

impl From<AdminUpdateUserRequest> for AdminUserChanges {
    fn from(req: AdminUpdateUserRequest) -> Self {
        AdminUserChanges {
            role: req.role,
            vip_level: req.vip_level,
            is_active: req.is_active,
        }
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Response body for user data (excludes the password hash).
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "u_3f9a0c1d2e4b5a6c")]
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub utm_source: String,
    pub credits: i32,
    pub role: UserRole,
    pub vip_level: i32,
    pub is_active: bool,
    #[schema(example = 99.9)]
    pub total_consumption: f64,
    pub usage_count: i32,
    pub registration_date: String,
    pub last_login_time: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            total_consumption: to_f64(&user.total_consumption),
            registration_date: format_timestamp(user.registration_date),
            last_login_time: format_optional(user.last_login_time),
            created_at: format_timestamp(user.created_at),
            updated_at: format_timestamp(user.updated_at),
            user_id: user.user_id,
            username: user.username,
            email: user.email,
            nickname: user.nickname,
            avatar: user.avatar,
            phone: user.phone,
            utm_source: user.utm_source,
            credits: user.credits,
            role: user.role,
            vip_level: user.vip_level,
            is_active: user.is_active,
            usage_count: user.usage_count,
        }
    }
}

/// Public facing subset of a user, used where other users are listed.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    pub user_id: String,
    pub username: String,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            nickname: user.nickname,
            avatar: user.avatar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;
    use std::str::FromStr;

    #[test]
    fn test_user_response_hides_hash() {
        let ts = NaiveDate::from_ymd_opt(2025, 7, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let user = User {
            user_id: "u_0123456789abcdef".to_string(),
            username: "writer".to_string(),
            email: "writer@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            nickname: Some("userwriter".to_string()),
            avatar: None,
            phone: None,
            utm_source: "direct".to_string(),
            credits: 100,
            role: UserRole::Vip,
            vip_level: 1,
            is_active: true,
            total_consumption: BigDecimal::from_str("39.90").unwrap(),
            usage_count: 0,
            registration_date: ts,
            last_login_time: None,
            created_at: ts,
            updated_at: ts,
        };
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "vip");
        assert_eq!(json["total_consumption"], 39.9);
        assert_eq!(json["created_at"], "2025-07-01T09:00:00.000Z");
    }

    #[test]
    fn test_admin_update_rejects_negative_level() {
        let req = AdminUpdateUserRequest {
            role: None,
            vip_level: Some(-1),
            is_active: None,
        };
        assert!(req.validate().is_err());
    }
}
