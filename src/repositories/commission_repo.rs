use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::dsl::sum;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    CommissionRecord, CommissionStatus, NewCommissionRecord, UpdateCommissionRecord,
};

#[derive(Clone)]
pub struct CommissionRepository {
    pool: AsyncDbPool,
}

impl CommissionRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, record: NewCommissionRecord) -> AppResult<CommissionRecord> {
        use crate::schema::commission_records::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(commission_records)
            .values(&record)
            .returning(CommissionRecord::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn find_by_id(&self, record_id: i64) -> AppResult<Option<CommissionRecord>> {
        use crate::schema::commission_records::dsl::*;
        let mut conn = self.pool.get().await?;

        commission_records
            .find(record_id)
            .select(CommissionRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn find_by_order(&self, order: i64) -> AppResult<Option<CommissionRecord>> {
        use crate::schema::commission_records::dsl::*;
        let mut conn = self.pool.get().await?;

        commission_records
            .filter(order_id.eq(order))
            .select(CommissionRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn list_by_user(
        &self,
        uid: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<CommissionRecord>, i64)> {
        use crate::schema::commission_records::dsl::*;
        let mut conn = self.pool.get().await?;

        let records = commission_records
            .filter(user_id.eq(uid))
            .order((created_at.desc(), id.desc()))
            .offset(offset)
            .limit(limit)
            .select(CommissionRecord::as_select())
            .load(&mut conn)
            .await?;

        let total = commission_records
            .filter(user_id.eq(uid))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        Ok((records, total))
    }

    /// `(status, amount)` of every record the user owns.
    pub async fn amounts_for_user(
        &self,
        uid: &str,
    ) -> AppResult<Vec<(CommissionStatus, BigDecimal)>> {
        use crate::schema::commission_records::dsl::*;
        let mut conn = self.pool.get().await?;

        commission_records
            .filter(user_id.eq(uid))
            .select((status, amount))
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn update(
        &self,
        record_id: i64,
        changes: UpdateCommissionRecord,
    ) -> AppResult<CommissionRecord> {
        use crate::schema::commission_records::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::update(commission_records.find(record_id))
            .set(&changes)
            .returning(CommissionRecord::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn created_between(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
        statuses: &[CommissionStatus],
    ) -> AppResult<Vec<CommissionRecord>> {
        use crate::schema::commission_records::dsl::*;
        let mut conn = self.pool.get().await?;

        commission_records
            .filter(created_at.between(from, to))
            .filter(status.eq_any(statuses.to_vec()))
            .select(CommissionRecord::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn with_status(&self, statuses: &[CommissionStatus]) -> AppResult<Vec<CommissionRecord>> {
        use crate::schema::commission_records::dsl::*;
        let mut conn = self.pool.get().await?;

        commission_records
            .filter(status.eq_any(statuses.to_vec()))
            .select(CommissionRecord::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Sum of amounts in the given statuses, optionally restricted to a
    /// creation window.
    pub async fn sum_amount(
        &self,
        statuses: &[CommissionStatus],
        window: Option<(NaiveDateTime, NaiveDateTime)>,
    ) -> AppResult<BigDecimal> {
        use crate::schema::commission_records::dsl::*;
        let mut conn = self.pool.get().await?;

        let mut query = commission_records
            .filter(status.eq_any(statuses.to_vec()))
            .into_boxed();
        if let Some((from, to)) = window {
            query = query.filter(created_at.between(from, to));
        }

        let total: Option<BigDecimal> = query.select(sum(amount)).first(&mut conn).await?;
        Ok(total.unwrap_or_else(|| BigDecimal::from(0)))
    }
}
