//! Invitation and commission DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::UserSummary;
use crate::models::{CommissionRecord, CommissionStatus, InvitationCode, InvitationRelation, User};
use crate::services::{CommissionSummary, InvitationInfo};
use crate::utils::money::to_f64;
use crate::utils::time::{format_optional, format_timestamp};

#[derive(Debug, Serialize, ToSchema)]
pub struct InvitationCodeResponse {
    #[schema(example = "K7Q2M9XA")]
    pub code: String,
    pub created_at: String,
}

impl From<InvitationCode> for InvitationCodeResponse {
    fn from(code: InvitationCode) -> Self {
        Self {
            code: code.code,
            created_at: format_timestamp(code.created_at),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct BindInvitationRequest {
    #[validate(length(equal = 8, message = "Invitation code must be 8 characters"))]
    #[schema(example = "K7Q2M9XA")]
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvitationRelationResponse {
    pub id: i64,
    pub inviter_id: String,
    pub invitee_id: String,
    pub created_at: String,
}

impl From<InvitationRelation> for InvitationRelationResponse {
    fn from(relation: InvitationRelation) -> Self {
        Self {
            id: relation.id,
            inviter_id: relation.inviter_id,
            invitee_id: relation.invitee_id,
            created_at: format_timestamp(relation.created_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InvitationInfoResponse {
    pub code: String,
    pub invitation_count: i64,
    /// Who invited the caller, if anyone
    pub inviter: Option<UserSummary>,
}

impl From<InvitationInfo> for InvitationInfoResponse {
    fn from(info: InvitationInfo) -> Self {
        Self {
            code: info.code.code,
            invitation_count: info.invitation_count,
            inviter: info.inviter.map(UserSummary::from),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InviteeResponse {
    pub user_id: String,
    pub username: String,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    /// When the invitation relation was created
    pub created_at: String,
}

impl From<(InvitationRelation, User)> for InviteeResponse {
    fn from((relation, user): (InvitationRelation, User)) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            nickname: user.nickname,
            avatar: user.avatar,
            created_at: format_timestamp(relation.created_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommissionRecordResponse {
    pub id: i64,
    pub user_id: String,
    pub relation_id: i64,
    pub order_id: Option<i64>,
    pub amount: f64,
    pub status: CommissionStatus,
    pub description: String,
    pub issue_time: Option<String>,
    pub withdrawal_time: Option<String>,
    pub created_at: String,
}

impl From<CommissionRecord> for CommissionRecordResponse {
    fn from(record: CommissionRecord) -> Self {
        Self {
            amount: to_f64(&record.amount),
            issue_time: format_optional(record.issue_time),
            withdrawal_time: format_optional(record.withdrawal_time),
            created_at: format_timestamp(record.created_at),
            id: record.id,
            user_id: record.user_id,
            relation_id: record.relation_id,
            order_id: record.order_id,
            status: record.status,
            description: record.description,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommissionSummaryResponse {
    pub total_amount: f64,
    pub pending_amount: f64,
    pub issued_amount: f64,
    pub withdrawn_amount: f64,
    pub record_count: i64,
}

impl From<CommissionSummary> for CommissionSummaryResponse {
    fn from(summary: CommissionSummary) -> Self {
        Self {
            total_amount: to_f64(&summary.total_amount),
            pending_amount: to_f64(&summary.pending_amount),
            issued_amount: to_f64(&summary.issued_amount),
            withdrawn_amount: to_f64(&summary.withdrawn_amount),
            record_count: summary.record_count,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CommissionStatusRequest {
    pub status: CommissionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    #[test]
    fn test_bind_request_code_length() {
        let ok = BindInvitationRequest {
            code: "ABCD1234".to_string(),
        };
        assert!(ok.validate().is_ok());
        let short = BindInvitationRequest {
            code: "ABC".to_string(),
        };
        assert!(short.validate().is_err());
    }

    #[test]
    fn test_summary_amounts_are_rounded() {
        let response = CommissionSummaryResponse::from(CommissionSummary {
            total_amount: BigDecimal::from_str("7.98").unwrap(),
            pending_amount: BigDecimal::from_str("7.98").unwrap(),
            issued_amount: BigDecimal::from(0),
            withdrawn_amount: BigDecimal::from(0),
            record_count: 2,
        });
        assert_eq!(response.total_amount, 7.98);
        assert_eq!(response.issued_amount, 0.0);
    }
}
