use bigdecimal::{BigDecimal, Zero};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::{
    CommissionRecord, CommissionStatus, NewCommissionRecord, Trade, UpdateCommissionRecord,
};
use crate::repositories::{CommissionRepository, InvitationRepository};
use crate::utils::money::apply_rate;
use crate::utils::time::now;

#[derive(Debug, Clone, PartialEq)]
pub struct CommissionSummary {
    /// Every status except rejected
    pub total_amount: BigDecimal,
    pub pending_amount: BigDecimal,
    pub issued_amount: BigDecimal,
    pub withdrawn_amount: BigDecimal,
    pub record_count: i64,
}

pub fn summarize(amounts: &[(CommissionStatus, BigDecimal)]) -> CommissionSummary {
    let mut summary = CommissionSummary {
        total_amount: BigDecimal::zero(),
        pending_amount: BigDecimal::zero(),
        issued_amount: BigDecimal::zero(),
        withdrawn_amount: BigDecimal::zero(),
        record_count: amounts.len() as i64,
    };
    for (status, amount) in amounts {
        match status {
            CommissionStatus::Rejected => continue,
            CommissionStatus::Pending => summary.pending_amount += amount,
            CommissionStatus::Issued => summary.issued_amount += amount,
            CommissionStatus::Withdrawn => summary.withdrawn_amount += amount,
            CommissionStatus::Applying => {}
        }
        summary.total_amount += amount;
    }
    summary
}

/// Timestamps stamped when a record moves into `status`.
fn status_change(status: CommissionStatus) -> UpdateCommissionRecord {
    let mut changes = UpdateCommissionRecord {
        status: Some(status),
        ..Default::default()
    };
    match status {
        CommissionStatus::Issued => changes.issue_time = Some(now()),
        CommissionStatus::Withdrawn => changes.withdrawal_time = Some(now()),
        _ => {}
    }
    changes
}

#[derive(Clone)]
pub struct CommissionService {
    repo: CommissionRepository,
    invitations: InvitationRepository,
    rate: f64,
}

impl CommissionService {
    pub fn new(repo: CommissionRepository, invitations: InvitationRepository, rate: f64) -> Self {
        Self {
            repo,
            invitations,
            rate,
        }
    }

    pub async fn create_record(&self, record: NewCommissionRecord) -> AppResult<CommissionRecord> {
        self.repo.create(record).await
    }

    pub async fn records(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<CommissionRecord>, i64)> {
        self.repo.list_by_user(user_id, offset, limit).await
    }

    pub async fn summary(&self, user_id: &str) -> AppResult<CommissionSummary> {
        let amounts = self.repo.amounts_for_user(user_id).await?;
        Ok(summarize(&amounts))
    }

    pub async fn update_status(&self, id: i64, status: CommissionStatus) -> AppResult<CommissionRecord> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("commission_records", "id", id))?;

        let record = self.repo.update(id, status_change(status)).await?;
        info!(commission_id = id, status = ?status, "Commission status updated");
        Ok(record)
    }

    /// Books the inviter's share of a paid order. Does nothing when the buyer
    /// was not invited, the share rounds to zero, or the order was already
    /// processed.
    pub async fn process_order_commission(&self, trade: &Trade) -> AppResult<Option<CommissionRecord>> {
        let Some(relation) = self.invitations.find_relation_by_invitee(&trade.user_id).await? else {
            debug!(trade_no = %trade.trade_no, "Buyer has no inviter, no commission");
            return Ok(None);
        };

        if let Some(existing) = self.repo.find_by_order(trade.id).await? {
            return Ok(Some(existing));
        }

        let amount = apply_rate(&trade.amount, self.rate);
        if amount.is_zero() {
            return Ok(None);
        }

        let record = self
            .repo
            .create(NewCommissionRecord {
                user_id: relation.inviter_id.clone(),
                relation_id: relation.id,
                order_id: Some(trade.id),
                amount,
                status: CommissionStatus::Pending,
                description: format!("commission for order {}", trade.trade_no),
            })
            .await?;

        info!(
            trade_no = %trade.trade_no,
            inviter_id = %relation.inviter_id,
            amount = %record.amount,
            "Commission recorded"
        );
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_summary_excludes_rejected_from_total() {
        let rows = vec![
            (CommissionStatus::Pending, dec("1.00")),
            (CommissionStatus::Issued, dec("2.00")),
            (CommissionStatus::Withdrawn, dec("3.00")),
            (CommissionStatus::Rejected, dec("100.00")),
            (CommissionStatus::Applying, dec("0.50")),
        ];
        let s = summarize(&rows);
        assert_eq!(s.total_amount, dec("6.50"));
        assert_eq!(s.issued_amount, dec("2.00"));
        assert_eq!(s.withdrawn_amount, dec("3.00"));
        assert_eq!(s.pending_amount, dec("1.00"));
        assert_eq!(s.record_count, 5);
    }

    #[test]
    fn test_status_change_stamps() {
        assert!(status_change(CommissionStatus::Issued).issue_time.is_some());
        assert!(status_change(CommissionStatus::Withdrawn).withdrawal_time.is_some());
        let rejected = status_change(CommissionStatus::Rejected);
        assert!(rejected.issue_time.is_none() && rejected.withdrawal_time.is_none());
    }
}
