use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreditRecordType, InvitationCode, InvitationRelation, NewInvitationCode,
    NewInvitationRelation, User,
};
use crate::repositories::credit_repo::apply_credit_change;

/// Creates the inviter/invitee relation and pays both sides the reward.
///
/// The unique index on `invitee_id` turns a second binding into a
/// `Duplicate` error.
pub(crate) async fn bind_relation(
    conn: &mut AsyncPgConnection,
    code: &InvitationCode,
    invitee: &str,
    reward: i32,
) -> AppResult<InvitationRelation> {
    use crate::schema::invitation_relations;

    let relation = diesel::insert_into(invitation_relations::table)
        .values(&NewInvitationRelation {
            inviter_id: &code.user_id,
            invitee_id: invitee,
            code_id: code.id,
        })
        .returning(InvitationRelation::as_returning())
        .get_result(conn)
        .await?;

    if reward > 0 {
        apply_credit_change(
            conn,
            &code.user_id,
            reward,
            CreditRecordType::Reward,
            "invitation reward",
            None,
        )
        .await?;
        apply_credit_change(
            conn,
            invitee,
            reward,
            CreditRecordType::Reward,
            "invited sign-up reward",
            None,
        )
        .await?;
    }

    Ok(relation)
}

#[derive(Clone)]
pub struct InvitationRepository {
    pool: AsyncDbPool,
}

impl InvitationRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    pub async fn find_code_by_user(&self, uid: &str) -> AppResult<Option<InvitationCode>> {
        use crate::schema::invitation_codes::dsl::*;
        let mut conn = self.pool.get().await?;

        invitation_codes
            .filter(user_id.eq(uid))
            .select(InvitationCode::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn find_code(&self, value: &str) -> AppResult<Option<InvitationCode>> {
        use crate::schema::invitation_codes::dsl::*;
        let mut conn = self.pool.get().await?;

        invitation_codes
            .filter(code.eq(value))
            .select(InvitationCode::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn insert_code(&self, uid: &str, value: &str) -> AppResult<InvitationCode> {
        use crate::schema::invitation_codes::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(invitation_codes)
            .values(&NewInvitationCode {
                user_id: uid,
                code: value,
            })
            .returning(InvitationCode::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn find_relation_by_invitee(
        &self,
        invitee: &str,
    ) -> AppResult<Option<InvitationRelation>> {
        use crate::schema::invitation_relations::dsl::*;
        let mut conn = self.pool.get().await?;

        invitation_relations
            .filter(invitee_id.eq(invitee))
            .select(InvitationRelation::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn bind(
        &self,
        code: &InvitationCode,
        invitee: &str,
        reward: i32,
    ) -> AppResult<InvitationRelation> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move { bind_relation(conn, code, invitee, reward).await }.scope_boxed()
        })
        .await
    }

    pub async fn count_invitees(&self, inviter: &str) -> AppResult<i64> {
        use crate::schema::invitation_relations::dsl::*;
        let mut conn = self.pool.get().await?;

        invitation_relations
            .filter(inviter_id.eq(inviter))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Invitees of `inviter` joined with their user rows, newest first.
    pub async fn list_invitees(
        &self,
        inviter: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<(InvitationRelation, User)>, i64)> {
        use crate::schema::{invitation_relations, users};
        let mut conn = self.pool.get().await?;

        let rows = invitation_relations::table
            .inner_join(users::table.on(users::user_id.eq(invitation_relations::invitee_id)))
            .filter(invitation_relations::inviter_id.eq(inviter))
            .order(invitation_relations::created_at.desc())
            .offset(offset)
            .limit(limit)
            .select((InvitationRelation::as_select(), User::as_select()))
            .load(&mut conn)
            .await?;

        let total = invitation_relations::table
            .filter(invitation_relations::inviter_id.eq(inviter))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        Ok((rows, total))
    }

    pub async fn relations_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> AppResult<Vec<InvitationRelation>> {
        use crate::schema::invitation_relations::dsl::*;
        let mut conn = self.pool.get().await?;

        invitation_relations
            .filter(created_at.between(from, to))
            .order((created_at.asc(), id.asc()))
            .select(InvitationRelation::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn all_relations(&self) -> AppResult<Vec<InvitationRelation>> {
        use crate::schema::invitation_relations::dsl::*;
        let mut conn = self.pool.get().await?;

        invitation_relations
            .order((created_at.asc(), id.asc()))
            .select(InvitationRelation::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }
}
