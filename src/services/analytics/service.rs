use std::collections::{HashMap, HashSet};

use bigdecimal::{BigDecimal, Zero};
use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::app_cached;
use crate::cache::CacheManager;
use crate::config::{AnalyticsConfig, BillingConfig};
use crate::error::AppResult;
use crate::models::{CommissionStatus, PaymentChannel, User, UserRole};
use crate::repositories::{
    CommissionRepository, CreditRepository, InvitationRepository, PaidTrade, Repositories,
    TradeRepository, UserRepository,
};
use crate::services::analytics::period::{
    DateRange, Period, bucket_index, build_buckets, parse_date_range,
};
use crate::services::analytics::ranking::{
    LeaderboardSort, aggregate_invitations, aggregate_sales, build_leaderboard, paginate,
    sort_leaderboard,
};
use crate::services::analytics::report::*;
use crate::utils::money::{ratio, round_f64, to_f64};
use crate::utils::time::{format_timestamp, now};

const DEFAULT_RANGE_DAYS: i64 = 30;
const RECENT_INVITATION_DAYS: i64 = 30;
pub const LEADERBOARD_DEFAULT_LIMIT: u32 = 50;
const LEADERBOARD_MAX_LIMIT: u32 = 1000;

const COUNTED_COMMISSION: [CommissionStatus; 4] = [
    CommissionStatus::Pending,
    CommissionStatus::Issued,
    CommissionStatus::Withdrawn,
    CommissionStatus::Applying,
];

/// Resolves the `start_date`/`end_date` query pair against today's date.
pub fn resolve_range(start: Option<&str>, end: Option<&str>) -> AppResult<DateRange> {
    parse_date_range(start, end, DEFAULT_RANGE_DAYS, now().date())
}

fn sum_amounts<'a>(trades: impl Iterator<Item = &'a PaidTrade>) -> BigDecimal {
    trades.fold(BigDecimal::zero(), |acc, t| acc + &t.amount)
}

/// Profit figures for a range. Margin and utilization are percentages that
/// fall to 0 when income or issued credits are 0.
fn cost_report(
    income: f64,
    credits_consumed: i64,
    credits_issued: i64,
    commission_cost: f64,
    unit_cost: f64,
) -> CostAnalysis {
    let credit_cost = round_f64(credits_consumed as f64 * unit_cost);
    let gross_profit = round_f64(income - credit_cost - commission_cost);

    CostAnalysis {
        income,
        credits_consumed,
        credit_cost,
        commission_cost,
        gross_profit,
        gross_margin: ratio(gross_profit, income, 100.0),
        credits_issued,
        credit_utilization: ratio(credits_consumed as f64, credits_issued as f64, 100.0),
    }
}

fn invitation_report(
    total_users: i64,
    active_inviters: i64,
    total_invitations: i64,
    paid_invitees: i64,
    commission: f64,
) -> InvitationMetrics {
    InvitationMetrics {
        total_users,
        active_inviters,
        total_invitations,
        paid_invitees,
        share_rate: ratio(active_inviters as f64, total_users as f64, 100.0),
        avg_viral_coefficient: ratio(total_invitations as f64, active_inviters as f64, 1.0),
        conversion_rate: ratio(paid_invitees as f64, total_invitations as f64, 100.0),
        avg_commission_per_user: ratio(commission, active_inviters as f64, 1.0),
    }
}

fn bucket_counts(range: &DateRange, period: Period, stamps: &[NaiveDateTime]) -> Vec<CountPoint> {
    let buckets = build_buckets(range, period);
    let mut counts = vec![0i64; buckets.len()];
    for ts in stamps {
        if let Some(idx) = bucket_index(&buckets, *ts) {
            counts[idx] += 1;
        }
    }
    buckets
        .into_iter()
        .zip(counts)
        .map(|(b, count)| CountPoint {
            date: b.label,
            count,
        })
        .collect()
}

fn bucket_amounts(range: &DateRange, period: Period, trades: &[PaidTrade]) -> Vec<AmountPoint> {
    let buckets = build_buckets(range, period);
    let mut sums = vec![(BigDecimal::zero(), 0i64); buckets.len()];
    for trade in trades {
        if let Some(idx) = bucket_index(&buckets, trade.paid_at) {
            sums[idx].0 += &trade.amount;
            sums[idx].1 += 1;
        }
    }
    buckets
        .into_iter()
        .zip(sums)
        .map(|(b, (amount, count))| AmountPoint {
            date: b.label,
            amount: to_f64(&amount),
            count,
        })
        .collect()
}

fn channel_breakdown(trades: &[PaidTrade], channels: &[PaymentChannel]) -> Vec<ChannelStat> {
    channels
        .iter()
        .map(|channel| {
            let hits: Vec<&PaidTrade> = trades
                .iter()
                .filter(|t| t.payment_channel == *channel)
                .collect();
            ChannelStat {
                channel: channel.as_str().to_string(),
                amount: to_f64(&sum_amounts(hits.iter().copied())),
                count: hits.len() as i64,
            }
        })
        .collect()
}

app_cached! {
    name = "user_overview",
    ttl = ttl_seconds,
    key = |range: &DateRange| format!("{}:{}", range.start, range.end),
    async fn cached_user_overview(
        cache: &CacheManager,
        ttl_seconds: u64,
        users: &UserRepository,
        range: DateRange,
        active_since: NaiveDateTime,
    ) -> AppResult<UserOverview> {
        let total_users = users.count_all().await?;
        let active_users = users.count_logged_in_since(active_since).await?;
        let vip_users = users.count_by_role(UserRole::Vip).await?;
        let new_users = users
            .registration_dates_between(range.start, range.end)
            .await?
            .len() as i64;
        Ok(UserOverview {
            total_users,
            active_users,
            vip_users,
            new_users,
        })
    }
}

app_cached! {
    name = "payment_overview",
    ttl = ttl_seconds,
    key = |range: &DateRange| format!("{}:{}", range.start, range.end),
    async fn cached_payment_overview(
        cache: &CacheManager,
        ttl_seconds: u64,
        trades: &TradeRepository,
        commissions: &CommissionRepository,
        channels: &[PaymentChannel],
        min_date: NaiveDateTime,
        range: DateRange,
    ) -> AppResult<PaymentOverview> {
        let all_time = trades.paid_between(channels, min_date, None).await?;
        let in_period: Vec<PaidTrade> = all_time
            .iter()
            .filter(|t| range.contains(t.paid_at))
            .cloned()
            .collect();
        let pending = commissions
            .sum_amount(&[CommissionStatus::Pending], Some(range.window()))
            .await?;

        Ok(PaymentOverview {
            total_income: to_f64(&sum_amounts(all_time.iter())),
            period_income: to_f64(&sum_amounts(in_period.iter())),
            period_orders: in_period.len() as i64,
            channel_stats: channel_breakdown(&in_period, channels),
            pending_commission: to_f64(&pending),
        })
    }
}

/// Admin reports computed over loaded rows.
#[derive(Clone)]
pub struct AnalyticsService {
    users: UserRepository,
    trades: TradeRepository,
    credits: CreditRepository,
    invitations: InvitationRepository,
    commissions: CommissionRepository,
    cache: CacheManager,
    billing: BillingConfig,
    config: AnalyticsConfig,
}

impl AnalyticsService {
    pub fn new(
        repos: &Repositories,
        cache: CacheManager,
        billing: BillingConfig,
        config: AnalyticsConfig,
    ) -> Self {
        Self {
            users: repos.users.clone(),
            trades: repos.trades.clone(),
            credits: repos.credits.clone(),
            invitations: repos.invitations.clone(),
            commissions: repos.commissions.clone(),
            cache,
            billing,
            config,
        }
    }

    fn stats_channels(&self) -> Vec<PaymentChannel> {
        self.billing
            .stats_channels
            .iter()
            .filter_map(|c| PaymentChannel::parse(c))
            .collect()
    }

    fn stats_floor(&self) -> NaiveDateTime {
        self.billing.stats_min_date.and_time(NaiveTime::MIN)
    }

    async fn users_by_id(&self, ids: Vec<String>) -> AppResult<HashMap<String, User>> {
        let users = self.users.find_many(&ids).await?;
        Ok(users.into_iter().map(|u| (u.user_id.clone(), u)).collect())
    }

    pub async fn user_overview(&self, range: DateRange) -> AppResult<UserOverview> {
        let active_since = now() - Duration::days(self.config.active_window_days);
        cached_user_overview(
            &self.cache,
            self.config.cache_ttl_seconds,
            &self.users,
            range,
            active_since,
        )
        .await
    }

    pub async fn user_growth(&self, range: DateRange, period: Period) -> AppResult<Vec<CountPoint>> {
        let stamps = self
            .users
            .registration_dates_between(range.start, range.end)
            .await?;
        Ok(bucket_counts(&range, period, &stamps))
    }

    pub async fn payment_overview(&self, range: DateRange) -> AppResult<PaymentOverview> {
        let channels = self.stats_channels();
        cached_payment_overview(
            &self.cache,
            self.config.cache_ttl_seconds,
            &self.trades,
            &self.commissions,
            &channels,
            self.stats_floor(),
            range,
        )
        .await
    }

    /// Income per bucket. Ranges reaching before the stats floor start at it;
    /// a range wholly before the floor yields no buckets.
    pub async fn payment_trend(&self, range: DateRange, period: Period) -> AppResult<Vec<AmountPoint>> {
        let range = range.clamp_start(self.stats_floor());
        if range.start > range.end {
            return Ok(Vec::new());
        }
        let trades = self
            .trades
            .paid_between(&self.stats_channels(), range.start, Some(range.end))
            .await?;
        Ok(bucket_amounts(&range, period, &trades))
    }

    pub async fn cost_analysis(&self, range: DateRange) -> AppResult<CostAnalysis> {
        let all_channels = [
            PaymentChannel::WxQr,
            PaymentChannel::AlipayQr,
            PaymentChannel::Manual,
        ];
        let trades = self
            .trades
            .paid_between(&all_channels, range.start, Some(range.end))
            .await?;
        let income = to_f64(&sum_amounts(trades.iter()));

        let credits_consumed = self.credits.consumed_between(range.start, range.end).await?;
        let credits_issued = self.credits.issued_between(range.start, range.end).await?;
        let commission_cost = to_f64(
            &self
                .commissions
                .sum_amount(&COUNTED_COMMISSION, Some(range.window()))
                .await?,
        );

        Ok(cost_report(
            income,
            credits_consumed,
            credits_issued,
            commission_cost,
            self.config.credit_unit_cost,
        ))
    }

    pub async fn sales_ranking(
        &self,
        range: DateRange,
        page: u32,
        page_size: u32,
    ) -> AppResult<SalesRanking> {
        let records = self
            .commissions
            .created_between(
                range.start,
                range.end,
                &[
                    CommissionStatus::Pending,
                    CommissionStatus::Issued,
                    CommissionStatus::Withdrawn,
                ],
            )
            .await?;

        let entries = aggregate_sales(&records);
        let summary = SalesSummary {
            total_users: entries.len() as u64,
            total_commission: to_f64(
                &entries
                    .iter()
                    .fold(BigDecimal::zero(), |acc, e| acc + &e.total_commission),
            ),
        };

        let (ranked, meta) = paginate(entries, page, page_size);
        let users = self
            .users_by_id(ranked.iter().map(|(_, e)| e.user_id.clone()).collect())
            .await?;

        let rankings = ranked
            .into_iter()
            .map(|(rank, e)| SalesRankingItem {
                rank,
                user: UserBrief::resolve(&e.user_id, users.get(&e.user_id)),
                total_commission: to_f64(&e.total_commission),
                commission_count: e.commission_count,
                pending_commission: to_f64(&e.pending_commission),
                issued_commission: to_f64(&e.issued_commission),
            })
            .collect();

        Ok(SalesRanking {
            rankings,
            pagination: meta.into(),
            summary,
        })
    }

    pub async fn invitation_ranking(
        &self,
        range: DateRange,
        page: u32,
        page_size: u32,
    ) -> AppResult<InvitationRanking> {
        let relations = self.invitations.relations_between(range.start, range.end).await?;
        let commissions = self
            .commissions
            .created_between(range.start, range.end, &COUNTED_COMMISSION)
            .await?;

        let entries = aggregate_invitations(&relations, &commissions);
        let summary = InvitationSummary {
            total_inviters: entries.len() as u64,
            total_invitations: entries.iter().map(|e| e.invitation_count).sum(),
            total_commission: to_f64(
                &entries
                    .iter()
                    .fold(BigDecimal::zero(), |acc, e| acc + &e.total_commission),
            ),
        };

        let (ranked, meta) = paginate(entries, page, page_size);
        let mut ids: Vec<String> = Vec::new();
        for (_, e) in &ranked {
            ids.push(e.inviter_id.clone());
            ids.extend(e.invitees.iter().map(|r| r.invitee_id.clone()));
        }
        let users = self.users_by_id(ids).await?;

        let rankings = ranked
            .into_iter()
            .map(|(rank, e)| {
                let more_invitees = e.more_invitees();
                InvitationRankingItem {
                    rank,
                    inviter: UserBrief::resolve(&e.inviter_id, users.get(&e.inviter_id)),
                    invitation_count: e.invitation_count,
                    invitees: e
                        .invitees
                        .iter()
                        .map(|r| InviteePreview {
                            user: UserBrief::resolve(&r.invitee_id, users.get(&r.invitee_id)),
                            created_at: format_timestamp(r.created_at),
                        })
                        .collect(),
                    more_invitees,
                    total_commission: to_f64(&e.total_commission),
                    pending_commission: to_f64(&e.pending_commission),
                    issued_commission: to_f64(&e.issued_commission),
                    withdrawn_commission: to_f64(&e.withdrawn_commission),
                }
            })
            .collect();

        Ok(InvitationRanking {
            rankings,
            pagination: meta.into(),
            summary,
        })
    }

    pub async fn invitation_metrics(&self) -> AppResult<InvitationMetrics> {
        let total_users = self.users.count_all().await?;
        let relations = self.invitations.all_relations().await?;

        let inviters: HashSet<&str> = relations.iter().map(|r| r.inviter_id.as_str()).collect();
        let invitee_ids: Vec<String> = relations.iter().map(|r| r.invitee_id.clone()).collect();
        let paid_invitees = self.trades.buyers_among(&invitee_ids).await?.len() as i64;
        let commission = self.commissions.sum_amount(&COUNTED_COMMISSION, None).await?;

        Ok(invitation_report(
            total_users,
            inviters.len() as i64,
            relations.len() as i64,
            paid_invitees,
            to_f64(&commission),
        ))
    }

    pub async fn leaderboard(
        &self,
        sort: LeaderboardSort,
        limit: Option<u32>,
    ) -> AppResult<Vec<LeaderboardItem>> {
        let limit = limit
            .unwrap_or(LEADERBOARD_DEFAULT_LIMIT)
            .clamp(1, LEADERBOARD_MAX_LIMIT) as usize;

        let relations = self.invitations.all_relations().await?;
        let invitee_ids: Vec<String> = relations.iter().map(|r| r.invitee_id.clone()).collect();
        let paid: HashSet<String> = self
            .trades
            .buyers_among(&invitee_ids)
            .await?
            .into_iter()
            .collect();
        let commissions = self.commissions.with_status(&COUNTED_COMMISSION).await?;
        let recent_since = now() - Duration::days(RECENT_INVITATION_DAYS);

        let mut rows = build_leaderboard(&relations, &paid, &commissions, recent_since);
        sort_leaderboard(&mut rows, sort);
        rows.truncate(limit);

        let users = self
            .users_by_id(rows.iter().map(|r| r.inviter_id.clone()).collect())
            .await?;

        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| LeaderboardItem {
                rank: i as u64 + 1,
                inviter: UserBrief::resolve(&row.inviter_id, users.get(&row.inviter_id)),
                total_invitations: row.total_invitations,
                paid_invitations: row.paid_invitations,
                recent_invitations: row.recent_invitations,
                total_commission: to_f64(&row.total_commission),
                quality_score: row.quality_score(),
                activity_score: row.activity_score(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn range(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRange {
        let fmt = |(y, m, d): (i32, u32, u32)| format!("{:04}-{:02}-{:02}", y, m, d);
        parse_date_range(
            Some(&fmt(start)),
            Some(&fmt(end)),
            30,
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        )
        .unwrap()
    }

    fn paid(channel: PaymentChannel, amount: &str, day: u32, hour: u32) -> PaidTrade {
        PaidTrade {
            user_id: "u_1".into(),
            amount: BigDecimal::from_str(amount).unwrap(),
            payment_channel: channel,
            paid_at: NaiveDate::from_ymd_opt(2025, 7, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_bucket_counts_include_empty_buckets() {
        let r = range((2025, 7, 1), (2025, 7, 3));
        let stamps = vec![
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap().and_hms_opt(1, 0, 0).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 3).unwrap().and_hms_opt(23, 59, 59).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 3).unwrap().and_hms_opt(8, 0, 0).unwrap(),
        ];
        let points = bucket_counts(&r, Period::Day, &stamps);
        let counts: Vec<i64> = points.iter().map(|p| p.count).collect();
        assert_eq!(counts, [1, 0, 2]);
        assert_eq!(points[1].date, "2025-07-02");
    }

    #[test]
    fn test_bucket_amounts_sum_per_bucket() {
        let r = range((2025, 7, 1), (2025, 7, 14));
        let trades = vec![
            paid(PaymentChannel::WxQr, "10.10", 1, 9),
            paid(PaymentChannel::AlipayQr, "5.00", 7, 23),
            paid(PaymentChannel::WxQr, "1.00", 8, 0),
        ];
        let points = bucket_amounts(&r, Period::Week, &trades);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].amount, 15.1);
        assert_eq!(points[0].count, 2);
        assert_eq!(points[1].amount, 1.0);
    }

    #[test]
    fn test_channel_breakdown_lists_every_channel() {
        let trades = vec![
            paid(PaymentChannel::WxQr, "3.00", 1, 0),
            paid(PaymentChannel::WxQr, "2.50", 2, 0),
        ];
        let stats = channel_breakdown(&trades, &[PaymentChannel::WxQr, PaymentChannel::AlipayQr]);
        assert_eq!(stats[0].channel, "wx_qr");
        assert_eq!(stats[0].amount, 5.5);
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[1].count, 0);
    }

    #[test]
    fn test_cost_report_subtracts_credit_and_commission_cost() {
        let report = cost_report(100.0, 2000, 5000, 10.0, 0.01);
        assert_eq!(report.credit_cost, 20.0);
        assert_eq!(report.gross_profit, 70.0);
        assert_eq!(report.gross_margin, 70.0);
        assert_eq!(report.credit_utilization, 40.0);
    }

    #[test]
    fn test_cost_report_zero_income_and_issued() {
        let report = cost_report(0.0, 300, 0, 0.0, 0.01);
        assert_eq!(report.credit_cost, 3.0);
        assert_eq!(report.gross_profit, -3.0);
        assert_eq!(report.gross_margin, 0.0);
        assert_eq!(report.credit_utilization, 0.0);
    }

    #[test]
    fn test_invitation_report_ratios() {
        let metrics = invitation_report(200, 8, 20, 5, 37.5);
        assert_eq!(metrics.share_rate, 4.0);
        assert_eq!(metrics.avg_viral_coefficient, 2.5);
        assert_eq!(metrics.conversion_rate, 25.0);
        assert_eq!(metrics.avg_commission_per_user, 4.69);
    }

    #[test]
    fn test_invitation_report_without_inviters() {
        let metrics = invitation_report(10, 0, 0, 0, 0.0);
        assert_eq!(metrics.share_rate, 0.0);
        assert_eq!(metrics.avg_viral_coefficient, 0.0);
        assert_eq!(metrics.conversion_rate, 0.0);
        assert_eq!(metrics.avg_commission_per_user, 0.0);
    }
}
