//! Accounts: registration, login, token refresh, profile and admin edits.

use tracing::{debug, info};

use crate::config::{CreditsConfig, InvitationConfig};
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, UpdateUser, User, UserRole};
use crate::repositories::{InvitationRepository, SignupGrant, UserRepository};
use crate::utils::ids;
use crate::utils::jwt::{TokenIssuer, TokenPair};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::time::now;

#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub nickname: Option<String>,
    pub invite_code: Option<String>,
    pub utm_source: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AdminUserChanges {
    pub role: Option<UserRole>,
    pub vip_level: Option<i32>,
    pub is_active: Option<bool>,
}

/// Emails are stored trimmed and lowercased; lookups go through the same form.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// `user` followed by the first eight characters of the username, or of the
/// email's local part when the username is blank.
pub fn default_nickname(username: &str, email: &str) -> String {
    let source = if username.trim().is_empty() {
        email.split('@').next().unwrap_or_default()
    } else {
        username.trim()
    };
    let head: String = source.chars().take(8).collect();
    format!("user{}", head)
}

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    invitations: InvitationRepository,
    tokens: TokenIssuer,
    credits: CreditsConfig,
    invitation: InvitationConfig,
}

impl UserService {
    pub fn new(
        repo: UserRepository,
        invitations: InvitationRepository,
        tokens: TokenIssuer,
        credits: CreditsConfig,
        invitation: InvitationConfig,
    ) -> Self {
        Self {
            repo,
            invitations,
            tokens,
            credits,
            invitation,
        }
    }

    fn issue(&self, user: &User) -> AppResult<TokenPair> {
        self.tokens.issue_pair(&user.user_id, &user.username, user.role)
    }

    /// Creates the account with its signup credits and, when the invite code
    /// resolves, the invitation relation. Unknown codes are ignored.
    pub async fn register(&self, input: Registration) -> AppResult<(User, TokenPair)> {
        let username = input.username.trim().to_string();
        let email = normalize_email(&input.email);

        if self.repo.find_by_username(&username).await?.is_some() {
            return Err(AppError::Duplicate {
                entity: "users".to_string(),
                field: "username".to_string(),
                value: username,
            });
        }
        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Duplicate {
                entity: "users".to_string(),
                field: "email".to_string(),
                value: email,
            });
        }

        let invitation = match input
            .invite_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            Some(code) => {
                let found = self.invitations.find_code(&code.to_uppercase()).await?;
                if found.is_none() {
                    debug!(code, "Ignoring unknown invite code at registration");
                }
                found
            }
            None => None,
        };

        let nickname = input
            .nickname
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| default_nickname(&username, &email));

        let new_user = NewUser {
            user_id: ids::user_id(),
            username,
            email,
            password_hash: hash_password(&input.password)?,
            nickname: Some(nickname),
            utm_source: input
                .utm_source
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "direct".to_string()),
            credits: 0,
            role: UserRole::Normal,
        };

        let grant = SignupGrant {
            initial_credits: self.credits.initial,
            invitation,
            reward_credits: self.invitation.reward_credits,
        };

        let user = self.repo.register(new_user, grant).await?;
        info!(user_id = %user.user_id, username = %user.username, "User registered");

        let tokens = self.issue(&user)?;
        Ok((user, tokens))
    }

    /// Authenticates by username or email.
    pub async fn login(&self, account: &str, password: &str) -> AppResult<(User, TokenPair)> {
        let invalid = || AppError::unauthorized("Invalid account or password");

        let account = account.trim();
        let user = self
            .repo
            .find_by_account(account, &normalize_email(account))
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(invalid());
        }
        if !user.is_active {
            return Err(AppError::forbidden("Account is disabled"));
        }

        let user = self
            .repo
            .update(
                &user.user_id,
                UpdateUser {
                    last_login_time: Some(now()),
                    ..Default::default()
                },
            )
            .await?;

        let tokens = self.issue(&user)?;
        Ok((user, tokens))
    }

    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self.tokens.validate_refresh_token(refresh_token)?;
        let user = self
            .repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;
        if !user.is_active {
            return Err(AppError::forbidden("Account is disabled"));
        }
        self.issue(&user)
    }

    pub async fn get_user(&self, user_id: &str) -> AppResult<User> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("users", "user_id", user_id))
    }

    pub async fn update_profile(&self, user_id: &str, changes: ProfileChanges) -> AppResult<User> {
        self.get_user(user_id).await?;
        self.repo
            .update(
                user_id,
                UpdateUser {
                    nickname: changes.nickname,
                    avatar: changes.avatar,
                    phone: changes.phone,
                    ..Default::default()
                },
            )
            .await
    }

    pub async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self.get_user(user_id).await?;
        if !verify_password(current_password, &user.password_hash)? {
            return Err(AppError::bad_request("Current password is incorrect"));
        }
        self.repo
            .update(
                user_id,
                UpdateUser {
                    password_hash: Some(hash_password(new_password)?),
                    ..Default::default()
                },
            )
            .await?;
        info!(user_id, "Password changed");
        Ok(())
    }

    pub async fn list_users(
        &self,
        keyword: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<User>, i64)> {
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());
        self.repo.list_paginated(keyword, offset, limit).await
    }

    pub async fn admin_update(&self, user_id: &str, changes: AdminUserChanges) -> AppResult<User> {
        self.get_user(user_id).await?;
        if let Some(level) = changes.vip_level
            && level < 0
        {
            return Err(AppError::Validation {
                field: "vip_level".to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        let user = self
            .repo
            .update(
                user_id,
                UpdateUser {
                    role: changes.role,
                    vip_level: changes.vip_level,
                    is_active: changes.is_active,
                    ..Default::default()
                },
            )
            .await?;
        info!(user_id, role = ?user.role, is_active = user.is_active, "User updated by admin");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_nickname_uses_username_prefix() {
        assert_eq!(default_nickname("alexander_the_great", "a@b.c"), "useralexande");
        assert_eq!(default_nickname("bo", "a@b.c"), "userbo");
    }

    #[test]
    fn test_normalize_email_matches_stored_form() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
        assert_eq!(normalize_email("alice@example.com"), "alice@example.com");
    }

    #[test]
    fn test_default_nickname_falls_back_to_email() {
        assert_eq!(default_nickname("  ", "writer.jane@example.com"), "userwriter.j");
    }
}
