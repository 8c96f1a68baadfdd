//! User repository for async database operations.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{CreditRecordType, InvitationCode, NewUser, UpdateUser, User, UserRole};
use crate::repositories::contains_pattern;
use crate::repositories::credit_repo::apply_credit_change;
use crate::repositories::invitation_repo::bind_relation;

/// Credits granted as part of account creation.
#[derive(Debug, Clone)]
pub struct SignupGrant {
    pub initial_credits: i32,
    /// Valid invitation resolved before the transaction starts
    pub invitation: Option<InvitationCode>,
    pub reward_credits: i32,
}

/// User repository holding an async connection pool.
///
/// `AsyncDbPool` is reference counted, so cloning is cheap.
#[derive(Clone)]
pub struct UserRepository {
    pool: AsyncDbPool,
}

impl UserRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Inserts the user, writes the signup bonus and binds the inviter, all
    /// in one transaction.
    pub async fn register(&self, new_user: NewUser, grant: SignupGrant) -> AppResult<User> {
        use crate::schema::users;
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let user = diesel::insert_into(users::table)
                    .values(&NewUser {
                        credits: 0,
                        ..new_user
                    })
                    .returning(User::as_returning())
                    .get_result(conn)
                    .await?;

                if grant.initial_credits > 0 {
                    apply_credit_change(
                        conn,
                        &user.user_id,
                        grant.initial_credits,
                        CreditRecordType::Reward,
                        "registration bonus",
                        None,
                    )
                    .await?;
                }

                if let Some(code) = &grant.invitation {
                    bind_relation(conn, code, &user.user_id, grant.reward_credits).await?;
                }

                users::table
                    .find(user.user_id.as_str())
                    .select(User::as_select())
                    .first(conn)
                    .await
                    .map_err(AppError::from)
            }
            .scope_boxed()
        })
        .await
    }

    pub async fn find_by_id(&self, uid: &str) -> AppResult<Option<User>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        users
            .find(uid)
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn find_by_username(&self, name: &str) -> AppResult<Option<User>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        users
            .filter(username.eq(name))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn find_by_email(&self, address: &str) -> AppResult<Option<User>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        users
            .filter(email.eq(address))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Looks a login account up by username or email.
    /// Matches `name` against usernames and `mail` against the stored
    /// (lowercased) emails.
    pub async fn find_by_account(&self, name: &str, mail: &str) -> AppResult<Option<User>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        users
            .filter(username.eq(name).or(email.eq(mail)))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn find_many(&self, ids: &[String]) -> AppResult<Vec<User>> {
        use crate::schema::users::dsl::*;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;

        users
            .filter(user_id.eq_any(ids))
            .select(User::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Pages through users, optionally filtered by a keyword matched against
    /// username, email and nickname.
    pub async fn list_paginated(
        &self,
        keyword: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<User>, i64)> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        let pattern = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(contains_pattern);

        let mut query = users.into_boxed();
        let mut count_query = users.into_boxed();
        if let Some(pattern) = &pattern {
            query = query.filter(
                username
                    .ilike(pattern.clone())
                    .or(email.ilike(pattern.clone()))
                    .or(nickname.assume_not_null().ilike(pattern.clone())),
            );
            count_query = count_query.filter(
                username
                    .ilike(pattern.clone())
                    .or(email.ilike(pattern.clone()))
                    .or(nickname.assume_not_null().ilike(pattern.clone())),
            );
        }

        let list = query
            .order(created_at.desc())
            .offset(offset)
            .limit(limit)
            .select(User::as_select())
            .load(&mut conn)
            .await?;
        let total = count_query.count().get_result::<i64>(&mut conn).await?;

        Ok((list, total))
    }

    pub async fn update(&self, uid: &str, mut changes: UpdateUser) -> AppResult<User> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        changes.updated_at = Some(crate::utils::time::now());
        diesel::update(users.find(uid))
            .set(&changes)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn count_all(&self) -> AppResult<i64> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        users.count().get_result(&mut conn).await.map_err(AppError::from)
    }

    pub async fn count_logged_in_since(&self, since: NaiveDateTime) -> AppResult<i64> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        users
            .filter(last_login_time.ge(since))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn count_by_role(&self, wanted: UserRole) -> AppResult<i64> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        users
            .filter(role.eq(wanted))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Registration timestamps within `[from, to]`, for bucketing.
    pub async fn registration_dates_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> AppResult<Vec<NaiveDateTime>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        users
            .filter(registration_date.between(from, to))
            .select(registration_date)
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }
}
