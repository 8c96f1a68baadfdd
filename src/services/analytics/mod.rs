//! Admin analytics: date ranges, period buckets and rankings computed in
//! application code over loaded rows.

pub mod period;
pub mod ranking;
pub mod report;
mod service;

pub use period::{DateRange, Period, parse_date_range};
pub use ranking::LeaderboardSort;
pub use report::*;
pub use service::{AnalyticsService, LEADERBOARD_DEFAULT_LIMIT, resolve_range};
