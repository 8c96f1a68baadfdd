//! Report shapes returned by the admin analytics endpoints.
//!
//! These are serialized both to clients and into the report cache, so they
//! derive `Deserialize` as well.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::User;
use crate::services::analytics::ranking::RankPage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserOverview {
    pub total_users: i64,
    /// Logged in within the active window
    pub active_users: i64,
    pub vip_users: i64,
    /// Registered inside the requested range
    pub new_users: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CountPoint {
    #[schema(example = "2025-07-01")]
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AmountPoint {
    pub date: String,
    pub amount: f64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChannelStat {
    #[schema(example = "wx_qr")]
    pub channel: String,
    pub amount: f64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentOverview {
    pub total_income: f64,
    pub period_income: f64,
    pub period_orders: i64,
    pub channel_stats: Vec<ChannelStat>,
    pub pending_commission: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CostAnalysis {
    pub income: f64,
    pub credits_consumed: i64,
    pub credit_cost: f64,
    pub commission_cost: f64,
    pub gross_profit: f64,
    /// Percent of income
    pub gross_margin: f64,
    pub credits_issued: i64,
    /// Consumed over issued, percent
    pub credit_utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RankPagination {
    pub current_page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl From<RankPage> for RankPagination {
    fn from(page: RankPage) -> Self {
        Self {
            current_page: page.current_page,
            page_size: page.page_size,
            total_count: page.total_count,
            total_pages: page.total_pages,
            has_next: page.has_next,
            has_prev: page.has_prev,
        }
    }
}

/// Display fields for a ranked user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserBrief {
    pub user_id: String,
    pub username: String,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
}

pub const UNKNOWN_USER: &str = "Unknown user";

impl UserBrief {
    /// Falls back to the nickname, then a placeholder, when the username is
    /// blank or the user no longer exists.
    pub fn resolve(user_id: &str, user: Option<&User>) -> Self {
        match user {
            Some(u) => {
                let username = if !u.username.trim().is_empty() {
                    u.username.clone()
                } else {
                    u.nickname
                        .clone()
                        .filter(|n| !n.trim().is_empty())
                        .unwrap_or_else(|| UNKNOWN_USER.to_string())
                };
                Self {
                    user_id: user_id.to_string(),
                    username,
                    nickname: u.nickname.clone(),
                    avatar: u.avatar.clone(),
                }
            }
            None => Self {
                user_id: user_id.to_string(),
                username: UNKNOWN_USER.to_string(),
                nickname: None,
                avatar: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SalesRankingItem {
    pub rank: u64,
    #[serde(flatten)]
    pub user: UserBrief,
    pub total_commission: f64,
    pub commission_count: i64,
    pub pending_commission: f64,
    pub issued_commission: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SalesSummary {
    pub total_users: u64,
    pub total_commission: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SalesRanking {
    pub rankings: Vec<SalesRankingItem>,
    pub pagination: RankPagination,
    pub summary: SalesSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InviteePreview {
    #[serde(flatten)]
    pub user: UserBrief,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvitationRankingItem {
    pub rank: u64,
    #[serde(flatten)]
    pub inviter: UserBrief,
    pub invitation_count: i64,
    pub invitees: Vec<InviteePreview>,
    pub more_invitees: i64,
    pub total_commission: f64,
    pub pending_commission: f64,
    pub issued_commission: f64,
    pub withdrawn_commission: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvitationSummary {
    pub total_inviters: u64,
    pub total_invitations: i64,
    pub total_commission: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvitationRanking {
    pub rankings: Vec<InvitationRankingItem>,
    pub pagination: RankPagination,
    pub summary: InvitationSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvitationMetrics {
    pub total_users: i64,
    pub active_inviters: i64,
    pub total_invitations: i64,
    pub paid_invitees: i64,
    pub share_rate: f64,
    pub avg_viral_coefficient: f64,
    pub conversion_rate: f64,
    pub avg_commission_per_user: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardItem {
    pub rank: u64,
    #[serde(flatten)]
    pub inviter: UserBrief,
    pub total_invitations: i64,
    pub paid_invitations: i64,
    pub recent_invitations: i64,
    pub total_commission: f64,
    pub quality_score: f64,
    pub activity_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    use crate::models::UserRole;

    fn user(username: &str, nickname: Option<&str>) -> User {
        let ts = NaiveDate::from_ymd_opt(2025, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        User {
            user_id: "u_1".into(),
            username: username.into(),
            email: "a@b.c".into(),
            password_hash: String::new(),
            nickname: nickname.map(String::from),
            avatar: None,
            phone: None,
            utm_source: "direct".into(),
            credits: 0,
            role: UserRole::Normal,
            vip_level: 0,
            is_active: true,
            total_consumption: BigDecimal::from(0),
            usage_count: 0,
            registration_date: ts,
            last_login_time: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_user_brief_fallbacks() {
        assert_eq!(UserBrief::resolve("u_1", Some(&user("alice", None))).username, "alice");
        assert_eq!(UserBrief::resolve("u_1", Some(&user(" ", Some("Al")))).username, "Al");
        assert_eq!(UserBrief::resolve("u_1", Some(&user("", None))).username, UNKNOWN_USER);
        assert_eq!(UserBrief::resolve("u_gone", None).username, UNKNOWN_USER);
    }

    #[test]
    fn test_flattened_user_fields_serialize_inline() {
        let item = SalesRankingItem {
            rank: 1,
            user: UserBrief::resolve("u_1", Some(&user("alice", None))),
            total_commission: 1.5,
            commission_count: 1,
            pending_commission: 1.5,
            issued_commission: 0.0,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["username"], "alice");
        assert_eq!(json["rank"], 1);
    }
}
