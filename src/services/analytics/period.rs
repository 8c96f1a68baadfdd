//! Date ranges and period buckets for time-series reports.

use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{AppError, AppResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
}

impl FromStr for Period {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(AppError::bad_request(format!(
                "Invalid period '{}', expected day, week or month",
                other
            ))),
        }
    }
}

impl Period {
    pub fn parse_optional(value: Option<&str>) -> AppResult<Self> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => v.parse(),
            None => Ok(Period::Day),
        }
    }
}

/// Inclusive timestamp range. `end` sits on the last microsecond of its day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// First instant after the range.
    pub fn end_exclusive(&self) -> NaiveDateTime {
        self.end + Duration::microseconds(1)
    }

    /// Inclusive `(start, end)` bounds for `created_at` filters.
    pub fn window(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.start, self.end)
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.start && ts <= self.end
    }

    /// Moves `start` forward to `floor` when it lies before it.
    pub fn clamp_start(self, floor: NaiveDateTime) -> Self {
        Self {
            start: self.start.max(floor),
            end: self.end,
        }
    }
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::microseconds(1)
}

fn parse_date(field: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| AppError::Validation {
        field: field.to_string(),
        reason: format!("'{}' is not a YYYY-MM-DD date", value),
    })
}

/// Resolves optional `YYYY-MM-DD` query dates into a range.
///
/// `end` defaults to `today`; `start` defaults to `default_days` before end.
pub fn parse_date_range(
    start: Option<&str>,
    end: Option<&str>,
    default_days: i64,
    today: NaiveDate,
) -> AppResult<DateRange> {
    let end_date = match end.filter(|v| !v.trim().is_empty()) {
        Some(v) => parse_date("end_date", v)?,
        None => today,
    };
    let start_date = match start.filter(|v| !v.trim().is_empty()) {
        Some(v) => parse_date("start_date", v)?,
        None => end_date - Duration::days(default_days),
    };

    if start_date > end_date {
        return Err(AppError::bad_request("start_date must not be after end_date"));
    }

    Ok(DateRange {
        start: start_date.and_time(NaiveTime::MIN),
        end: end_of_day(end_date),
    })
}

/// A half-open `[from, to)` slice of a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub label: String,
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl Bucket {
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.from && ts < self.to
    }
}

fn first_of_next_month(ts: NaiveDateTime) -> NaiveDateTime {
    let (year, month) = if ts.month() == 12 {
        (ts.year() + 1, 1)
    } else {
        (ts.year(), ts.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.and_time(NaiveTime::MIN))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Splits `range` into consecutive buckets covering it exactly once.
pub fn build_buckets(range: &DateRange, period: Period) -> Vec<Bucket> {
    let limit = range.end_exclusive();
    let mut buckets = Vec::new();
    let mut from = range.start;

    while from < limit {
        let (next, label) = match period {
            Period::Day => (from + Duration::days(1), from.format(DATE_FORMAT).to_string()),
            Period::Week => {
                let next = from + Duration::days(7);
                let label = format!(
                    "{} ~ {}",
                    from.format(DATE_FORMAT),
                    (from + Duration::days(6)).format(DATE_FORMAT)
                );
                (next, label)
            }
            Period::Month => (first_of_next_month(from), from.format("%Y-%m").to_string()),
        };
        let to = next.min(limit);
        buckets.push(Bucket { label, from, to });
        from = to;
    }

    buckets
}

/// Index of the bucket holding `ts`. Buckets are sorted and contiguous.
pub fn bucket_index(buckets: &[Bucket], ts: NaiveDateTime) -> Option<usize> {
    let idx = buckets.partition_point(|b| b.to <= ts);
    buckets.get(idx).filter(|b| b.contains(ts)).map(|_| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
        parse_date_range(
            Some(&start.format(DATE_FORMAT).to_string()),
            Some(&end.format(DATE_FORMAT).to_string()),
            30,
            end,
        )
        .unwrap()
    }

    #[test]
    fn test_default_range_is_thirty_days() {
        let r = parse_date_range(None, None, 30, date(2025, 8, 31)).unwrap();
        assert_eq!(r.start, date(2025, 8, 1).and_time(NaiveTime::MIN));
        assert_eq!(
            r.end,
            date(2025, 8, 31).and_hms_micro_opt(23, 59, 59, 999_999).unwrap()
        );
    }

    #[test]
    fn test_window_spans_whole_days() {
        let r = range(date(2025, 7, 1), date(2025, 7, 3));
        let (from, to) = r.window();
        assert_eq!(from, date(2025, 7, 1).and_time(NaiveTime::MIN));
        assert!(r.contains(to));
        assert_eq!(to + Duration::microseconds(1), date(2025, 7, 4).and_time(NaiveTime::MIN));
    }

    #[test]
    fn test_invalid_dates_rejected() {
        assert!(matches!(
            parse_date_range(Some("2025/01/01"), None, 30, date(2025, 2, 1)),
            Err(AppError::Validation { .. })
        ));
        assert!(matches!(
            parse_date_range(Some("2025-03-02"), Some("2025-03-01"), 30, date(2025, 3, 5)),
            Err(AppError::BadRequest { .. })
        ));
    }

    #[test]
    fn test_unknown_period() {
        assert!("year".parse::<Period>().is_err());
        assert_eq!(Period::parse_optional(None).unwrap(), Period::Day);
        assert_eq!(Period::parse_optional(Some("week")).unwrap(), Period::Week);
    }

    #[test]
    fn test_day_buckets() {
        let buckets = build_buckets(&range(date(2025, 7, 1), date(2025, 7, 3)), Period::Day);
        let labels: Vec<_> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["2025-07-01", "2025-07-02", "2025-07-03"]);
    }

    #[test]
    fn test_week_buckets_truncate_last() {
        let buckets = build_buckets(&range(date(2025, 7, 1), date(2025, 7, 10)), Period::Week);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].label, "2025-07-01 ~ 2025-07-07");
        assert_eq!(buckets[1].label, "2025-07-08 ~ 2025-07-14");
        assert_eq!(buckets[1].to, date(2025, 7, 11).and_time(NaiveTime::MIN));
    }

    #[test]
    fn test_month_buckets_align_after_first() {
        let buckets = build_buckets(&range(date(2025, 11, 15), date(2026, 1, 20)), Period::Month);
        let labels: Vec<_> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["2025-11", "2025-12", "2026-01"]);
        assert_eq!(buckets[0].from, date(2025, 11, 15).and_time(NaiveTime::MIN));
        assert_eq!(buckets[1].from, date(2025, 12, 1).and_time(NaiveTime::MIN));
    }

    #[test]
    fn test_bucket_index_edges() {
        let r = range(date(2025, 7, 1), date(2025, 7, 2));
        let buckets = build_buckets(&r, Period::Day);
        assert_eq!(bucket_index(&buckets, r.start), Some(0));
        assert_eq!(bucket_index(&buckets, r.end), Some(1));
        assert_eq!(bucket_index(&buckets, r.end_exclusive()), None);
        assert_eq!(bucket_index(&buckets, r.start - Duration::seconds(1)), None);
    }

    proptest! {
        #[test]
        fn prop_every_timestamp_in_exactly_one_bucket(
            start_offset in 0i64..800,
            span in 0i64..400,
            period_idx in 0usize..3,
            samples in proptest::collection::vec(0i64..86_400, 1..20),
        ) {
            let start = date(2024, 1, 1) + Duration::days(start_offset);
            let end = start + Duration::days(span);
            let r = range(start, end);
            let period = [Period::Day, Period::Week, Period::Month][period_idx];
            let buckets = build_buckets(&r, period);

            prop_assert_eq!(buckets.first().map(|b| b.from), Some(r.start));
            prop_assert_eq!(buckets.last().map(|b| b.to), Some(r.end_exclusive()));
            for pair in buckets.windows(2) {
                prop_assert_eq!(pair[0].to, pair[1].from);
            }

            let total_seconds = (span + 1) * 86_400;
            for p in samples {
                let ts = r.start + Duration::seconds(p * total_seconds / 86_400);
                let hits = buckets.iter().filter(|b| b.contains(ts)).count();
                prop_assert_eq!(hits, 1);
                prop_assert!(bucket_index(&buckets, ts).is_some());
            }
        }
    }
}
