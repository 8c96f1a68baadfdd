use tracing::{error, info};

use crate::error::{AppError, AppResult};
use crate::models::{NewTrade, PaymentChannel, PaymentStatus, Trade, TradeType};
use crate::repositories::{CreditRepository, PaymentTransition, TradeRepository};
use crate::services::CommissionService;
use crate::utils::ids;
use crate::utils::time::now;

#[derive(Clone)]
pub struct BillingService {
    trades: TradeRepository,
    credits: CreditRepository,
    commissions: CommissionService,
}

impl BillingService {
    pub fn new(
        trades: TradeRepository,
        credits: CreditRepository,
        commissions: CommissionService,
    ) -> Self {
        Self {
            trades,
            credits,
            commissions,
        }
    }

    /// Opens a pending credit recharge for an active product.
    pub async fn create_order(
        &self,
        user_id: &str,
        product_id: i32,
        channel: PaymentChannel,
    ) -> AppResult<Trade> {
        let product = self
            .credits
            .find_product(product_id)
            .await?
            .filter(|p| p.status)
            .ok_or_else(|| AppError::not_found("credit_products", "id", product_id))?;

        let trade = self
            .trades
            .create(NewTrade {
                trade_no: ids::trade_no(now()),
                user_id: user_id.to_string(),
                amount: product.price.clone(),
                trade_type: TradeType::CreditRecharge,
                payment_channel: channel,
                payment_status: PaymentStatus::Pending,
                title: product.name.clone(),
                product_id: Some(product.id),
                metadata: Some(serde_json::json!({ "credits": product.credits })),
            })
            .await?;

        info!(
            trade_no = %trade.trade_no,
            user_id,
            amount = %trade.amount,
            channel = channel.as_str(),
            "Order created"
        );
        Ok(trade)
    }

    pub async fn list(
        &self,
        user_id: &str,
        status: Option<PaymentStatus>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Trade>, i64)> {
        self.trades.list_by_user(user_id, status, offset, limit).await
    }

    /// Looks up a trade the caller owns.
    pub async fn get(&self, user_id: &str, trade_no: &str) -> AppResult<Trade> {
        let trade = self
            .trades
            .find_by_trade_no(trade_no)
            .await?
            .ok_or_else(|| AppError::not_found("trades", "trade_no", trade_no))?;
        if trade.user_id != user_id {
            return Err(AppError::forbidden("Trade belongs to another user"));
        }
        Ok(trade)
    }

    pub async fn close(&self, user_id: &str, trade_no: &str) -> AppResult<Trade> {
        let trade = self.get(user_id, trade_no).await?;
        match self.trades.close_pending(&trade.trade_no).await? {
            Some(closed) => {
                info!(trade_no, "Order closed");
                Ok(closed)
            }
            None => Err(AppError::bad_request(format!(
                "Trade {} is not pending",
                trade_no
            ))),
        }
    }

    /// Settles a trade. Repeat calls on a paid trade return it unchanged;
    /// commission is only booked on the first transition.
    pub async fn mark_paid(&self, trade_no: &str, payment_id: Option<String>) -> AppResult<Trade> {
        let trade = self
            .trades
            .find_by_trade_no(trade_no)
            .await?
            .ok_or_else(|| AppError::not_found("trades", "trade_no", trade_no))?;

        let credits = match trade.product_id {
            Some(product_id) => self
                .credits
                .find_product(product_id)
                .await?
                .map(|p| p.credits)
                .unwrap_or_default(),
            None => 0,
        };

        match self.trades.mark_paid(trade_no, payment_id, credits).await? {
            PaymentTransition::AlreadyPaid(trade) => Ok(trade),
            PaymentTransition::Paid(trade) => {
                info!(
                    trade_no,
                    user_id = %trade.user_id,
                    credits,
                    "Trade paid"
                );
                // the payment is committed; a commission failure must not undo it
                if let Err(e) = self.commissions.process_order_commission(&trade).await {
                    error!(trade_no, error = %e, "Commission processing failed");
                }
                Ok(trade)
            }
        }
    }

    pub async fn close_expired(&self, cutoff: chrono::NaiveDateTime) -> AppResult<usize> {
        self.trades.close_expired(cutoff).await
    }
}
