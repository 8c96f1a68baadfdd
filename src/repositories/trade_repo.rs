use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{CreditRecordType, NewTrade, PaymentChannel, PaymentStatus, Trade};
use crate::repositories::credit_repo::apply_credit_change;

/// A successful payment reduced to what analytics needs.
#[derive(Debug, Clone, Queryable)]
pub struct PaidTrade {
    pub user_id: String,
    pub amount: BigDecimal,
    pub payment_channel: PaymentChannel,
    pub paid_at: NaiveDateTime,
}

/// Outcome of a mark-paid request.
#[derive(Debug, Clone)]
pub enum PaymentTransition {
    /// The trade moved from pending to success in this call
    Paid(Trade),
    /// The trade had already succeeded; nothing changed
    AlreadyPaid(Trade),
}

#[derive(Clone)]
pub struct TradeRepository {
    pool: AsyncDbPool,
}

impl TradeRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new_trade: NewTrade) -> AppResult<Trade> {
        use crate::schema::trades::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(trades)
            .values(&new_trade)
            .returning(Trade::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn find_by_trade_no(&self, no: &str) -> AppResult<Option<Trade>> {
        use crate::schema::trades::dsl::*;
        let mut conn = self.pool.get().await?;

        trades
            .filter(trade_no.eq(no))
            .select(Trade::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    pub async fn list_by_user(
        &self,
        uid: &str,
        status: Option<PaymentStatus>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Trade>, i64)> {
        use crate::schema::trades::dsl::*;
        let mut conn = self.pool.get().await?;

        let mut query = trades.filter(user_id.eq(uid)).into_boxed();
        let mut count_query = trades.filter(user_id.eq(uid)).into_boxed();
        if let Some(status) = status {
            query = query.filter(payment_status.eq(status));
            count_query = count_query.filter(payment_status.eq(status));
        }

        let list = query
            .order((created_at.desc(), id.desc()))
            .offset(offset)
            .limit(limit)
            .select(Trade::as_select())
            .load(&mut conn)
            .await?;
        let total = count_query.count().get_result::<i64>(&mut conn).await?;

        Ok((list, total))
    }

    /// Closes a trade that is still pending. Returns `None` when the trade
    /// was not pending.
    pub async fn close_pending(&self, no: &str) -> AppResult<Option<Trade>> {
        use crate::schema::trades::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::update(
            trades
                .filter(trade_no.eq(no))
                .filter(payment_status.eq(PaymentStatus::Pending)),
        )
        .set((
            payment_status.eq(PaymentStatus::Closed),
            updated_at.eq(crate::utils::time::now()),
        ))
        .returning(Trade::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(AppError::from)
    }

    /// Closes every pending trade created before `cutoff`.
    pub async fn close_expired(&self, cutoff: NaiveDateTime) -> AppResult<usize> {
        use crate::schema::trades::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::update(
            trades
                .filter(payment_status.eq(PaymentStatus::Pending))
                .filter(created_at.lt(cutoff)),
        )
        .set((
            payment_status.eq(PaymentStatus::Closed),
            updated_at.eq(crate::utils::time::now()),
        ))
        .execute(&mut conn)
        .await
        .map_err(AppError::from)
    }

    /// Marks the trade paid, credits the buyer and adds the amount to their
    /// lifetime consumption, all in one transaction.
    ///
    /// Only a pending trade transitions. A trade that already succeeded is
    /// reported as [`PaymentTransition::AlreadyPaid`]; any other state is a
    /// bad request.
    pub async fn mark_paid(
        &self,
        no: &str,
        external_id: Option<String>,
        credits_to_add: i32,
    ) -> AppResult<PaymentTransition> {
        use crate::schema::{trades, users};
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let current = trades::table
                    .filter(trades::trade_no.eq(no))
                    .for_update()
                    .select(Trade::as_select())
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| AppError::not_found("trade", "trade_no", no))?;

                match current.payment_status {
                    PaymentStatus::Success => return Ok(PaymentTransition::AlreadyPaid(current)),
                    PaymentStatus::Pending => {}
                    other => {
                        return Err(AppError::bad_request(format!(
                            "Trade {} cannot be paid in status {:?}",
                            no, other
                        )));
                    }
                }

                let now = crate::utils::time::now();
                let paid = diesel::update(trades::table.find(current.id))
                    .set((
                        trades::payment_status.eq(PaymentStatus::Success),
                        trades::payment_id.eq(external_id),
                        trades::paid_at.eq(Some(now)),
                        trades::updated_at.eq(now),
                    ))
                    .returning(Trade::as_returning())
                    .get_result(conn)
                    .await?;

                if credits_to_add > 0 {
                    apply_credit_change(
                        conn,
                        &paid.user_id,
                        credits_to_add,
                        CreditRecordType::Recharge,
                        &format!("recharge {}", paid.trade_no),
                        None,
                    )
                    .await?;
                }

                diesel::update(users::table.find(paid.user_id.as_str()))
                    .set(users::total_consumption.eq(users::total_consumption + paid.amount.clone()))
                    .execute(conn)
                    .await?;

                Ok(PaymentTransition::Paid(paid))
            }
            .scope_boxed()
        })
        .await
    }

    /// Successful payments through `channels` paid at or after `from` and,
    /// when given, at or before `to`.
    pub async fn paid_between(
        &self,
        channels: &[PaymentChannel],
        from: NaiveDateTime,
        to: Option<NaiveDateTime>,
    ) -> AppResult<Vec<PaidTrade>> {
        use crate::schema::trades::dsl::*;
        let mut conn = self.pool.get().await?;

        let mut query = trades
            .filter(payment_status.eq(PaymentStatus::Success))
            .filter(payment_channel.eq_any(channels.to_vec()))
            .filter(paid_at.ge(from))
            .into_boxed();
        if let Some(to) = to {
            query = query.filter(paid_at.le(to));
        }

        let rows: Vec<(String, BigDecimal, PaymentChannel, Option<NaiveDateTime>)> = query
            .select((user_id, amount, payment_channel, paid_at))
            .load(&mut conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(uid, amt, channel, at)| {
                at.map(|at| PaidTrade {
                    user_id: uid,
                    amount: amt,
                    payment_channel: channel,
                    paid_at: at,
                })
            })
            .collect())
    }

    /// Distinct buyers among `ids` with at least one successful trade.
    pub async fn buyers_among(&self, ids: &[String]) -> AppResult<Vec<String>> {
        use crate::schema::trades::dsl::*;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;

        trades
            .filter(payment_status.eq(PaymentStatus::Success))
            .filter(user_id.eq_any(ids))
            .select(user_id)
            .distinct()
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }
}
