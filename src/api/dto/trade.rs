//! Order (trade) DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{PaymentChannel, PaymentStatus, Trade, TradeType};
use crate::utils::money::to_f64;
use crate::utils::time::{format_optional, format_timestamp};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTradeRequest {
    #[validate(range(min = 1, message = "product_id must be positive"))]
    #[schema(example = 1)]
    pub product_id: i32,
    pub payment_channel: PaymentChannel,
}

#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct TradeQuery {
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct MarkPaidRequest {
    /// Identifier assigned by the payment provider
    #[validate(length(max = 100, message = "payment_id must be at most 100 characters"))]
    pub payment_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TradeResponse {
    pub id: i64,
    #[schema(example = "T20250809101112004211")]
    pub trade_no: String,
    pub user_id: String,
    #[schema(example = 9.9)]
    pub amount: f64,
    pub trade_type: TradeType,
    pub payment_channel: PaymentChannel,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub title: String,
    pub product_id: Option<i32>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<JsonValue>,
    pub paid_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Trade> for TradeResponse {
    fn from(trade: Trade) -> Self {
        Self {
            amount: to_f64(&trade.amount),
            paid_at: format_optional(trade.paid_at),
            created_at: format_timestamp(trade.created_at),
            updated_at: format_timestamp(trade.updated_at),
            id: trade.id,
            trade_no: trade.trade_no,
            user_id: trade.user_id,
            trade_type: trade.trade_type,
            payment_channel: trade.payment_channel,
            payment_status: trade.payment_status,
            payment_id: trade.payment_id,
            title: trade.title,
            product_id: trade.product_id,
            metadata: trade.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_channel_names() {
        let req: CreateTradeRequest =
            serde_json::from_str(r#"{"product_id": 2, "payment_channel": "alipay_qr"}"#).unwrap();
        assert_eq!(req.payment_channel, PaymentChannel::AlipayQr);
        assert!(serde_json::from_str::<CreateTradeRequest>(
            r#"{"product_id": 2, "payment_channel": "paypal"}"#
        )
        .is_err());
    }
}
