//! In-memory grouping and ranking over commission and invitation rows.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDateTime;

use crate::models::{CommissionRecord, CommissionStatus, InvitationRelation};

/// How many invitees are listed inline per inviter.
pub const INVITEE_PREVIEW: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct SalesEntry {
    pub user_id: String,
    pub total_commission: BigDecimal,
    pub commission_count: i64,
    pub pending_commission: BigDecimal,
    /// Issued plus withdrawn
    pub issued_commission: BigDecimal,
}

/// Groups commission records per beneficiary.
///
/// Only pending, issued and withdrawn records count. The result is sorted
/// by total commission descending, ties broken by user id.
pub fn aggregate_sales(records: &[CommissionRecord]) -> Vec<SalesEntry> {
    let mut by_user: HashMap<&str, SalesEntry> = HashMap::new();

    for record in records {
        let counted = matches!(
            record.status,
            CommissionStatus::Pending | CommissionStatus::Issued | CommissionStatus::Withdrawn
        );
        if !counted {
            continue;
        }
        let entry = by_user
            .entry(record.user_id.as_str())
            .or_insert_with(|| SalesEntry {
                user_id: record.user_id.clone(),
                total_commission: BigDecimal::zero(),
                commission_count: 0,
                pending_commission: BigDecimal::zero(),
                issued_commission: BigDecimal::zero(),
            });
        entry.total_commission += &record.amount;
        entry.commission_count += 1;
        match record.status {
            CommissionStatus::Pending => entry.pending_commission += &record.amount,
            _ => entry.issued_commission += &record.amount,
        }
    }

    let mut entries: Vec<SalesEntry> = by_user.into_values().collect();
    entries.sort_by(|a, b| {
        b.total_commission
            .cmp(&a.total_commission)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    entries
}

#[derive(Debug, Clone, PartialEq)]
pub struct InviterEntry {
    pub inviter_id: String,
    pub invitation_count: i64,
    /// Earliest invitees first, at most [`INVITEE_PREVIEW`]
    pub invitees: Vec<InvitationRelation>,
    pub total_commission: BigDecimal,
    pub pending_commission: BigDecimal,
    pub issued_commission: BigDecimal,
    pub withdrawn_commission: BigDecimal,
}

impl InviterEntry {
    pub fn more_invitees(&self) -> i64 {
        (self.invitation_count - INVITEE_PREVIEW as i64).max(0)
    }
}

/// Groups relations per inviter and attaches each inviter's commission.
///
/// Rejected commission is ignored. Sorted by invitation count, then total
/// commission, both descending, then inviter id.
pub fn aggregate_invitations(
    relations: &[InvitationRelation],
    commissions: &[CommissionRecord],
) -> Vec<InviterEntry> {
    let mut by_inviter: HashMap<&str, InviterEntry> = HashMap::new();

    let mut ordered: Vec<&InvitationRelation> = relations.iter().collect();
    ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    for relation in ordered {
        let entry = by_inviter
            .entry(relation.inviter_id.as_str())
            .or_insert_with(|| InviterEntry {
                inviter_id: relation.inviter_id.clone(),
                invitation_count: 0,
                invitees: Vec::new(),
                total_commission: BigDecimal::zero(),
                pending_commission: BigDecimal::zero(),
                issued_commission: BigDecimal::zero(),
                withdrawn_commission: BigDecimal::zero(),
            });
        entry.invitation_count += 1;
        if entry.invitees.len() < INVITEE_PREVIEW {
            entry.invitees.push(relation.clone());
        }
    }

    for record in commissions {
        let Some(entry) = by_inviter.get_mut(record.user_id.as_str()) else {
            continue;
        };
        match record.status {
            CommissionStatus::Rejected => continue,
            CommissionStatus::Pending => entry.pending_commission += &record.amount,
            CommissionStatus::Issued => entry.issued_commission += &record.amount,
            CommissionStatus::Withdrawn => entry.withdrawn_commission += &record.amount,
            CommissionStatus::Applying => {}
        }
        entry.total_commission += &record.amount;
    }

    let mut entries: Vec<InviterEntry> = by_inviter.into_values().collect();
    entries.sort_by(|a, b| {
        b.invitation_count
            .cmp(&a.invitation_count)
            .then_with(|| b.total_commission.cmp(&a.total_commission))
            .then_with(|| a.inviter_id.cmp(&b.inviter_id))
    });
    entries
}

/// Page of a ranked list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankPage {
    pub current_page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Slices a sorted list and pairs each item with its 1-based rank.
pub fn paginate<T>(items: Vec<T>, page: u32, page_size: u32) -> (Vec<(u64, T)>, RankPage) {
    let page = page.max(1);
    let page_size = page_size.clamp(1, 100);
    let total_count = items.len() as u64;
    let total_pages = total_count.div_ceil(page_size as u64) as u32;
    let offset = (page as u64 - 1) * page_size as u64;

    let ranked = items
        .into_iter()
        .enumerate()
        .skip(offset as usize)
        .take(page_size as usize)
        .map(|(i, item)| (i as u64 + 1, item))
        .collect();

    (
        ranked,
        RankPage {
            current_page: page,
            page_size,
            total_count,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        },
    )
}

/// Orders leaderboard rows on the requested metric, biggest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaderboardSort {
    #[default]
    Total,
    Paid,
    Commission,
}

impl LeaderboardSort {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("paid") => LeaderboardSort::Paid,
            Some("commission") => LeaderboardSort::Commission,
            _ => LeaderboardSort::Total,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub inviter_id: String,
    pub total_invitations: i64,
    pub paid_invitations: i64,
    pub recent_invitations: i64,
    pub total_commission: BigDecimal,
}

impl LeaderboardEntry {
    pub fn quality_score(&self) -> f64 {
        crate::utils::money::ratio(self.paid_invitations as f64, self.total_invitations as f64, 100.0)
    }

    pub fn activity_score(&self) -> f64 {
        crate::utils::money::ratio(self.recent_invitations as f64, self.total_invitations as f64, 100.0)
    }
}

/// One row per inviter over every relation ever made.
///
/// `paid` holds invitees with a successful trade. Relations created at or
/// after `recent_since` count as recent. Rejected commission is ignored.
pub fn build_leaderboard(
    relations: &[InvitationRelation],
    paid: &HashSet<String>,
    commissions: &[CommissionRecord],
    recent_since: NaiveDateTime,
) -> Vec<LeaderboardEntry> {
    let mut by_inviter: HashMap<&str, LeaderboardEntry> = HashMap::new();

    for relation in relations {
        let entry = by_inviter
            .entry(relation.inviter_id.as_str())
            .or_insert_with(|| LeaderboardEntry {
                inviter_id: relation.inviter_id.clone(),
                total_invitations: 0,
                paid_invitations: 0,
                recent_invitations: 0,
                total_commission: BigDecimal::zero(),
            });
        entry.total_invitations += 1;
        if paid.contains(&relation.invitee_id) {
            entry.paid_invitations += 1;
        }
        if relation.created_at >= recent_since {
            entry.recent_invitations += 1;
        }
    }

    for record in commissions {
        if record.status == CommissionStatus::Rejected {
            continue;
        }
        if let Some(entry) = by_inviter.get_mut(record.user_id.as_str()) {
            entry.total_commission += &record.amount;
        }
    }

    by_inviter.into_values().collect()
}

pub fn sort_leaderboard(entries: &mut [LeaderboardEntry], sort: LeaderboardSort) {
    entries.sort_by(|a, b| {
        let primary = match sort {
            LeaderboardSort::Total => b.total_invitations.cmp(&a.total_invitations),
            LeaderboardSort::Paid => b.paid_invitations.cmp(&a.paid_invitations),
            LeaderboardSort::Commission => b.total_commission.cmp(&a.total_commission),
        };
        match primary {
            Ordering::Equal => a.inviter_id.cmp(&b.inviter_id),
            other => other,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;
    use std::str::FromStr;

    fn ts(minutes: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::minutes(minutes)
    }

    fn commission(id: i64, user: &str, amount: &str, status: CommissionStatus) -> CommissionRecord {
        CommissionRecord {
            id,
            user_id: user.to_string(),
            relation_id: 1,
            order_id: Some(id),
            amount: BigDecimal::from_str(amount).unwrap(),
            status,
            description: String::new(),
            issue_time: None,
            withdrawal_time: None,
            created_at: ts(id),
        }
    }

    fn relation(id: i64, inviter: &str, invitee: &str, minute: i64) -> InvitationRelation {
        InvitationRelation {
            id,
            inviter_id: inviter.to_string(),
            invitee_id: invitee.to_string(),
            code_id: 1,
            created_at: ts(minute),
        }
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_sales_grouping_and_order() {
        let records = vec![
            commission(1, "u_b", "10.00", CommissionStatus::Pending),
            commission(2, "u_a", "6.00", CommissionStatus::Issued),
            commission(3, "u_a", "4.00", CommissionStatus::Withdrawn),
            commission(4, "u_c", "99.00", CommissionStatus::Rejected),
            commission(5, "u_c", "3.00", CommissionStatus::Applying),
        ];

        let ranked = aggregate_sales(&records);
        assert_eq!(ranked.len(), 2);
        // tie on 10.00, user id decides
        assert_eq!(ranked[0].user_id, "u_a");
        assert_eq!(ranked[0].issued_commission, dec("10.00"));
        assert_eq!(ranked[0].commission_count, 2);
        assert_eq!(ranked[1].user_id, "u_b");
        assert_eq!(ranked[1].pending_commission, dec("10.00"));
    }

    #[test]
    fn test_invitation_ranking() {
        let relations = vec![
            relation(1, "u_x", "i1", 5),
            relation(2, "u_y", "i2", 1),
            relation(3, "u_y", "i3", 2),
            relation(4, "u_z", "i4", 3),
        ];
        let commissions = vec![
            commission(1, "u_z", "5.00", CommissionStatus::Issued),
            commission(2, "u_z", "50.00", CommissionStatus::Rejected),
            commission(3, "u_x", "1.00", CommissionStatus::Pending),
        ];

        let ranked = aggregate_invitations(&relations, &commissions);
        let order: Vec<_> = ranked.iter().map(|e| e.inviter_id.as_str()).collect();
        assert_eq!(order, ["u_y", "u_z", "u_x"]);
        assert_eq!(ranked[1].total_commission, dec("5.00"));
        assert_eq!(ranked[1].issued_commission, dec("5.00"));
        assert_eq!(ranked[0].invitees[0].invitee_id, "i2");
    }

    #[test]
    fn test_invitee_preview_capped() {
        let relations: Vec<_> = (0..8)
            .map(|i| relation(i, "u_x", &format!("i{}", i), 10 - i))
            .collect();
        let ranked = aggregate_invitations(&relations, &[]);
        assert_eq!(ranked[0].invitation_count, 8);
        assert_eq!(ranked[0].invitees.len(), INVITEE_PREVIEW);
        assert_eq!(ranked[0].more_invitees(), 3);
        // earliest created first
        assert_eq!(ranked[0].invitees[0].invitee_id, "i7");
    }

    #[test]
    fn test_paginate_ranks_continue_across_pages() {
        let (page, meta) = paginate((0..45).collect::<Vec<_>>(), 3, 20);
        assert_eq!(page.len(), 5);
        assert_eq!(page[0], (41, 40));
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_next);
        assert!(meta.has_prev);

        let (empty, meta) = paginate(Vec::<u8>::new(), 1, 20);
        assert!(empty.is_empty());
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
    }

    #[test]
    fn test_leaderboard_sort() {
        let mut rows = vec![
            LeaderboardEntry {
                inviter_id: "b".into(),
                total_invitations: 3,
                paid_invitations: 1,
                recent_invitations: 0,
                total_commission: dec("9"),
            },
            LeaderboardEntry {
                inviter_id: "a".into(),
                total_invitations: 2,
                paid_invitations: 2,
                recent_invitations: 0,
                total_commission: dec("1"),
            },
        ];
        sort_leaderboard(&mut rows, LeaderboardSort::Paid);
        assert_eq!(rows[0].inviter_id, "a");
        sort_leaderboard(&mut rows, LeaderboardSort::Commission);
        assert_eq!(rows[0].inviter_id, "b");
        assert_eq!(LeaderboardSort::parse(Some("bogus")), LeaderboardSort::Total);
    }

    #[test]
    fn test_build_leaderboard_counts() {
        let relations = vec![
            relation(1, "u_x", "i1", 0),
            relation(2, "u_x", "i2", 100),
            relation(3, "u_y", "i3", 100),
        ];
        let paid: HashSet<String> = ["i2".to_string()].into_iter().collect();
        let commissions = vec![
            commission(1, "u_x", "2.50", CommissionStatus::Pending),
            commission(2, "u_x", "7.00", CommissionStatus::Rejected),
        ];

        let mut rows = build_leaderboard(&relations, &paid, &commissions, ts(50));
        sort_leaderboard(&mut rows, LeaderboardSort::Total);

        let x = &rows[0];
        assert_eq!(x.inviter_id, "u_x");
        assert_eq!(x.total_invitations, 2);
        assert_eq!(x.paid_invitations, 1);
        assert_eq!(x.recent_invitations, 1);
        assert_eq!(x.total_commission, dec("2.50"));
        assert_eq!(x.quality_score(), 50.0);
        assert_eq!(x.activity_score(), 50.0);
        assert_eq!(rows[1].quality_score(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_sales_ranking_sorted_and_conserves_total(
            rows in proptest::collection::vec((0usize..6, 0i64..10_000, 0usize..5), 0..60)
        ) {
            let records: Vec<_> = rows
                .iter()
                .enumerate()
                .map(|(i, (user, cents, status))| {
                    let amount = BigDecimal::new((*cents).into(), 2);
                    let mut r = commission(i as i64, &format!("u_{}", user), "0", CommissionStatus::ALL[*status]);
                    r.amount = amount;
                    r
                })
                .collect();

            let ranked = aggregate_sales(&records);
            for pair in ranked.windows(2) {
                prop_assert!(
                    pair[0].total_commission > pair[1].total_commission
                        || (pair[0].total_commission == pair[1].total_commission
                            && pair[0].user_id < pair[1].user_id)
                );
            }

            let expected: BigDecimal = records
                .iter()
                .filter(|r| matches!(
                    r.status,
                    CommissionStatus::Pending | CommissionStatus::Issued | CommissionStatus::Withdrawn
                ))
                .map(|r| r.amount.clone())
                .sum();
            let actual: BigDecimal = ranked.iter().map(|e| e.total_commission.clone()).sum();
            prop_assert_eq!(expected, actual);
        }
    }
}
