//! Credit balances, ledger records, products and service prices.

use chrono::NaiveDateTime;
use diesel::dsl::sum;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreditProduct, CreditRecord, CreditRecordType, CreditServicePrice, NewCreditRecord,
};

/// Applies a signed delta to a user's balance and writes the matching ledger
/// record on the given connection, so callers can compose it inside their
/// own transaction.
///
/// The balance update is guarded with `credits + delta >= 0`; when it
/// matches no row the user is either missing or cannot afford the change.
pub(crate) async fn apply_credit_change(
    conn: &mut AsyncPgConnection,
    uid: &str,
    delta: i32,
    kind: CreditRecordType,
    description: &str,
    service: Option<&str>,
) -> AppResult<CreditRecord> {
    use crate::schema::{credit_records, users};

    let balance: Option<i32> = diesel::update(
        users::table
            .filter(users::user_id.eq(uid))
            .filter(users::credits.ge(-delta)),
    )
    .set((
        users::credits.eq(users::credits + delta),
        users::updated_at.eq(crate::utils::time::now()),
    ))
    .returning(users::credits)
    .get_result(conn)
    .await
    .optional()?;

    let balance = match balance {
        Some(balance) => balance,
        None => {
            let available: Option<i32> = users::table
                .filter(users::user_id.eq(uid))
                .select(users::credits)
                .first(conn)
                .await
                .optional()?;
            return Err(match available {
                Some(available) => AppError::InsufficientCredits {
                    required: -delta,
                    available,
                },
                None => AppError::not_found("user", "user_id", uid),
            });
        }
    };

    let record = NewCreditRecord {
        user_id: uid.to_string(),
        record_type: kind,
        credits: delta,
        balance,
        description: description.to_string(),
        service_code: service.map(str::to_string),
    };

    diesel::insert_into(credit_records::table)
        .values(&record)
        .returning(CreditRecord::as_returning())
        .get_result(conn)
        .await
        .map_err(AppError::from)
}

#[derive(Clone)]
pub struct CreditRepository {
    pool: AsyncDbPool,
}

impl CreditRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    pub async fn balance(&self, uid: &str) -> AppResult<Option<i32>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        users
            .filter(user_id.eq(uid))
            .select(credits)
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Lists a user's ledger, newest first.
    pub async fn list_records(
        &self,
        uid: &str,
        kind: Option<CreditRecordType>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<CreditRecord>, i64)> {
        use crate::schema::credit_records::dsl::*;
        let mut conn = self.pool.get().await?;

        let mut query = credit_records.filter(user_id.eq(uid)).into_boxed();
        let mut count_query = credit_records.filter(user_id.eq(uid)).into_boxed();
        if let Some(kind) = kind {
            query = query.filter(record_type.eq(kind));
            count_query = count_query.filter(record_type.eq(kind));
        }

        let records = query
            .order((created_at.desc(), id.desc()))
            .offset(offset)
            .limit(limit)
            .select(CreditRecord::as_select())
            .load(&mut conn)
            .await?;

        let total = count_query.count().get_result::<i64>(&mut conn).await?;

        Ok((records, total))
    }

    pub async fn list_active_products(&self) -> AppResult<Vec<CreditProduct>> {
        use crate::schema::credit_products::dsl::*;
        let mut conn = self.pool.get().await?;

        credit_products
            .filter(status.eq(true))
            .order((price.asc(), id.asc()))
            .select(CreditProduct::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn find_product(&self, product_id: i32) -> AppResult<Option<CreditProduct>> {
        use crate::schema::credit_products::dsl::*;
        let mut conn = self.pool.get().await?;

        credit_products
            .find(product_id)
            .select(CreditProduct::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn list_active_prices(&self) -> AppResult<Vec<CreditServicePrice>> {
        use crate::schema::credit_service_prices::dsl::*;
        let mut conn = self.pool.get().await?;

        credit_service_prices
            .filter(status.eq(true))
            .order(service_code.asc())
            .select(CreditServicePrice::as_select())
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn find_active_price(&self, code: &str) -> AppResult<Option<CreditServicePrice>> {
        use crate::schema::credit_service_prices::dsl::*;
        let mut conn = self.pool.get().await?;

        credit_service_prices
            .filter(service_code.eq(code))
            .filter(status.eq(true))
            .select(CreditServicePrice::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    /// Deducts `cost` and bumps `usage_count` in one transaction.
    pub async fn consume(
        &self,
        uid: &str,
        cost: i32,
        code: &str,
        description: &str,
    ) -> AppResult<CreditRecord> {
        use crate::schema::users;
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let record = apply_credit_change(
                    conn,
                    uid,
                    -cost,
                    CreditRecordType::Consumption,
                    description,
                    Some(code),
                )
                .await?;

                diesel::update(users::table.filter(users::user_id.eq(uid)))
                    .set(users::usage_count.eq(users::usage_count + 1))
                    .execute(conn)
                    .await?;

                Ok(record)
            }
            .scope_boxed()
        })
        .await
    }

    /// Applies an administrative adjustment.
    pub async fn grant(
        &self,
        uid: &str,
        amount: i32,
        kind: CreditRecordType,
        description: &str,
    ) -> AppResult<CreditRecord> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move { apply_credit_change(conn, uid, amount, kind, description, None).await }
                .scope_boxed()
        })
        .await
    }

    /// Total credits spent on services in `[from, to]`, as a positive number.
    pub async fn consumed_between(&self, from: NaiveDateTime, to: NaiveDateTime) -> AppResult<i64> {
        use crate::schema::credit_records::dsl::*;
        let mut conn = self.pool.get().await?;

        let total: Option<i64> = credit_records
            .filter(record_type.eq(CreditRecordType::Consumption))
            .filter(created_at.between(from, to))
            .select(sum(credits))
            .first(&mut conn)
            .await?;

        Ok(total.map(i64::abs).unwrap_or(0))
    }

    /// Credits handed out through recharge, reward and refund in `[from, to]`.
    pub async fn issued_between(&self, from: NaiveDateTime, to: NaiveDateTime) -> AppResult<i64> {
        use crate::schema::credit_records::dsl::*;
        let mut conn = self.pool.get().await?;

        let total: Option<i64> = credit_records
            .filter(record_type.eq_any([
                CreditRecordType::Recharge,
                CreditRecordType::Reward,
                CreditRecordType::Refund,
            ]))
            .filter(credits.gt(0))
            .filter(created_at.between(from, to))
            .select(sum(credits))
            .first(&mut conn)
            .await?;

        Ok(total.unwrap_or(0))
    }
}
