//! Credit balance, ledger and pricing DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{CreditProduct, CreditRecord, CreditRecordType, CreditServicePrice, ServiceUnit};
use crate::utils::money::to_f64;
use crate::utils::time::format_timestamp;

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    #[schema(example = 100)]
    pub credits: i32,
}

#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct CreditRecordQuery {
    pub record_type: Option<CreditRecordType>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreditRecordResponse {
    pub id: i64,
    pub record_type: CreditRecordType,
    /// Signed change; negative for consumption
    pub credits: i32,
    /// Balance after the change
    pub balance: i32,
    pub description: String,
    pub service_code: Option<String>,
    pub created_at: String,
}

impl From<CreditRecord> for CreditRecordResponse {
    fn from(record: CreditRecord) -> Self {
        Self {
            id: record.id,
            record_type: record.record_type,
            credits: record.credits,
            balance: record.balance,
            description: record.description,
            service_code: record.service_code,
            created_at: format_timestamp(record.created_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreditProductResponse {
    pub id: i32,
    pub name: String,
    pub credits: i32,
    #[schema(example = 9.9)]
    pub price: f64,
}

impl From<CreditProduct> for CreditProductResponse {
    fn from(product: CreditProduct) -> Self {
        Self {
            id: product.id,
            price: to_f64(&product.price),
            name: product.name,
            credits: product.credits,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ServicePriceResponse {
    #[schema(example = "ai_rewrite")]
    pub service_code: String,
    pub name: String,
    /// Credits charged per unit
    pub credits: i32,
    pub unit: ServiceUnit,
    pub description: Option<String>,
}

impl From<CreditServicePrice> for ServicePriceResponse {
    fn from(price: CreditServicePrice) -> Self {
        Self {
            service_code: price.service_code,
            name: price.name,
            credits: price.credits,
            unit: price.unit,
            description: price.description,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ConsumeCreditsRequest {
    #[validate(length(min = 1, max = 50, message = "service_code cannot be empty"))]
    #[schema(example = "ai_rewrite")]
    pub service_code: String,
    #[validate(range(min = 1, message = "units must be positive"))]
    #[schema(example = 1, minimum = 1)]
    pub units: i32,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct GrantCreditsRequest {
    #[validate(length(min = 1, message = "user_id cannot be empty"))]
    pub user_id: String,
    #[validate(range(min = 1, message = "credits must be positive"))]
    pub credits: i32,
    /// recharge, reward or refund
    pub record_type: CreditRecordType,
    #[validate(length(max = 200, message = "Description must be at most 200 characters"))]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_request_requires_positive_units() {
        let req = ConsumeCreditsRequest {
            service_code: "ai_rewrite".to_string(),
            units: 0,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_grant_request_parses_record_type() {
        let req: GrantCreditsRequest = serde_json::from_value(serde_json::json!({
            "user_id": "u_1",
            "credits": 50,
            "record_type": "refund"
        }))
        .unwrap();
        assert_eq!(req.record_type, CreditRecordType::Refund);
        assert!(req.validate().is_ok());
    }
}
