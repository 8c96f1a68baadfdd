//! Query parameters for the admin analytics endpoints. Report bodies are
//! the serializable types in `services::analytics`.

use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::error::AppResult;
use crate::services::analytics::{DateRange, LeaderboardSort, Period, resolve_range};

/// `YYYY-MM-DD` bounds; the range defaults to the last 30 days.
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
pub struct DateRangeQuery {
    #[param(example = "2025-07-01")]
    pub start_date: Option<String>,
    #[param(example = "2025-07-31")]
    pub end_date: Option<String>,
}

impl DateRangeQuery {
    pub fn range(&self) -> AppResult<DateRange> {
        resolve_range(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
pub struct TrendQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// day (default), week or month
    pub period: Option<String>,
}

impl TrendQuery {
    pub fn resolve(&self) -> AppResult<(DateRange, Period)> {
        let range = resolve_range(self.start_date.as_deref(), self.end_date.as_deref())?;
        let period = Period::parse_optional(self.period.as_deref())?;
        Ok((range, period))
    }
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct RankingQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default = "default_page")]
    #[param(minimum = 1, example = 1)]
    pub page: u32,
    /// Clamped to 1..=100
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100, example = 20)]
    pub page_size: u32,
}

impl RankingQuery {
    pub fn range(&self) -> AppResult<DateRange> {
        resolve_range(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
pub struct LeaderboardQuery {
    /// total (default), paid or commission
    pub sort_by: Option<String>,
    /// Defaults to 50, clamped to 1..=1000
    pub limit: Option<u32>,
}

impl LeaderboardQuery {
    pub fn sort(&self) -> LeaderboardSort {
        LeaderboardSort::parse(self.sort_by.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_query_rejects_unknown_period() {
        let query = TrendQuery {
            period: Some("quarter".to_string()),
            ..Default::default()
        };
        assert!(query.resolve().is_err());
    }

    #[test]
    fn test_date_range_rejects_inverted_bounds() {
        let query = DateRangeQuery {
            start_date: Some("2025-08-01".to_string()),
            end_date: Some("2025-07-01".to_string()),
        };
        assert!(query.range().is_err());
    }

    #[test]
    fn test_ranking_query_defaults() {
        let query: RankingQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 20);
    }

    #[test]
    fn test_leaderboard_sort() {
        let query = LeaderboardQuery {
            sort_by: Some("commission".to_string()),
            limit: None,
        };
        assert_eq!(query.sort(), LeaderboardSort::Commission);
    }
}
