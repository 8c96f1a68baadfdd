use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::TradeType")]
#[serde(rename_all = "snake_case")]
pub enum TradeType {
    CreditRecharge,
    Membership,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::PaymentChannel")]
#[serde(rename_all = "snake_case")]
pub enum PaymentChannel {
    WxQr,
    AlipayQr,
    Manual,
}

impl PaymentChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentChannel::WxQr => "wx_qr",
            PaymentChannel::AlipayQr => "alipay_qr",
            PaymentChannel::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "wx_qr" => Some(PaymentChannel::WxQr),
            "alipay_qr" => Some(PaymentChannel::AlipayQr),
            "manual" => Some(PaymentChannel::Manual),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::PaymentStatus")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Closed,
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::trades)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Trade {
    pub id: i64,
    pub trade_no: String,
    pub user_id: String,
    pub amount: BigDecimal,
    pub trade_type: TradeType,
    pub payment_channel: PaymentChannel,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub title: String,
    pub product_id: Option<i32>,
    pub metadata: Option<JsonValue>,
    pub paid_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::trades)]
pub struct NewTrade {
    pub trade_no: String,
    pub user_id: String,
    pub amount: BigDecimal,
    pub trade_type: TradeType,
    pub payment_channel: PaymentChannel,
    pub payment_status: PaymentStatus,
    pub title: String,
    pub product_id: Option<i32>,
    pub metadata: Option<JsonValue>,
}
