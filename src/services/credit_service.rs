use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{CreditProduct, CreditRecord, CreditRecordType, CreditServicePrice};
use crate::repositories::CreditRepository;

/// Credits owed for `units` of a priced service.
pub fn service_cost(price: &CreditServicePrice, units: i32) -> AppResult<i32> {
    if units <= 0 {
        return Err(AppError::Validation {
            field: "units".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    price
        .credits
        .checked_mul(units)
        .ok_or_else(|| AppError::bad_request("Requested units exceed the credit limit"))
}

#[derive(Clone)]
pub struct CreditService {
    repo: CreditRepository,
}

impl CreditService {
    pub fn new(repo: CreditRepository) -> Self {
        Self { repo }
    }

    pub async fn balance(&self, user_id: &str) -> AppResult<i32> {
        self.repo
            .balance(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("users", "user_id", user_id))
    }

    pub async fn records(
        &self,
        user_id: &str,
        kind: Option<CreditRecordType>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<CreditRecord>, i64)> {
        self.repo.list_records(user_id, kind, offset, limit).await
    }

    pub async fn products(&self) -> AppResult<Vec<CreditProduct>> {
        self.repo.list_active_products().await
    }

    pub async fn prices(&self) -> AppResult<Vec<CreditServicePrice>> {
        self.repo.list_active_prices().await
    }

    /// Charges the caller for `units` of a service. Fails with
    /// `InsufficientCredits` when the balance does not cover the cost.
    pub async fn consume(&self, user_id: &str, service_code: &str, units: i32) -> AppResult<CreditRecord> {
        let price = self
            .repo
            .find_active_price(service_code)
            .await?
            .ok_or_else(|| AppError::not_found("credit_service_prices", "service_code", service_code))?;

        let cost = service_cost(&price, units)?;
        let description = format!("{} x{}", price.name, units);
        let record = self
            .repo
            .consume(user_id, cost, &price.service_code, &description)
            .await?;

        info!(user_id, service_code, cost, balance = record.balance, "Credits consumed");
        Ok(record)
    }

    /// Admin adjustment. Only recharge, reward and refund can be granted.
    pub async fn grant(
        &self,
        user_id: &str,
        credits: i32,
        kind: CreditRecordType,
        description: Option<String>,
    ) -> AppResult<CreditRecord> {
        if !matches!(
            kind,
            CreditRecordType::Recharge | CreditRecordType::Reward | CreditRecordType::Refund
        ) {
            return Err(AppError::Validation {
                field: "record_type".to_string(),
                reason: "must be recharge, reward or refund".to_string(),
            });
        }
        if credits <= 0 {
            return Err(AppError::Validation {
                field: "credits".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        let description = description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| "admin grant".to_string());
        let record = self.repo.grant(user_id, credits, kind, &description).await?;
        info!(user_id, credits, kind = ?kind, "Credits granted");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceUnit;
    use chrono::NaiveDate;

    fn price(credits: i32) -> CreditServicePrice {
        let ts = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        CreditServicePrice {
            id: 1,
            service_code: "ai_rewrite".into(),
            name: "Rewrite".into(),
            credits,
            unit: ServiceUnit::Count,
            description: None,
            status: true,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_service_cost_multiplies_units() {
        assert_eq!(service_cost(&price(5), 3).unwrap(), 15);
    }

    #[test]
    fn test_service_cost_rejects_bad_units() {
        assert!(matches!(service_cost(&price(5), 0), Err(AppError::Validation { .. })));
        assert!(matches!(
            service_cost(&price(i32::MAX), 2),
            Err(AppError::BadRequest { .. })
        ));
    }
}
