//! Built-in maintenance tasks.

use chrono::{NaiveDateTime, TimeDelta};

use crate::error::{AppError, AppResult};
use crate::utils::time::now;

mod close_expired_trades;
mod fail_stale_ai_tasks;

pub use close_expired_trades::CloseExpiredTradesTask;
pub use fail_stale_ai_tasks::FailStaleAiTasksTask;

/// Upper bound for age thresholds in task payloads: one year.
const MAX_AGE_MINUTES: i64 = 366 * 24 * 60;

fn check_minutes(field: &str, minutes: i64) -> AppResult<()> {
    if (1..=MAX_AGE_MINUTES).contains(&minutes) {
        Ok(())
    } else {
        Err(AppError::Validation {
            field: field.to_string(),
            reason: format!("must be between 1 and {}", MAX_AGE_MINUTES),
        })
    }
}

/// The instant `minutes` before now.
fn minutes_ago(field: &str, minutes: i64) -> AppResult<NaiveDateTime> {
    check_minutes(field, minutes)?;
    TimeDelta::try_minutes(minutes)
        .and_then(|delta| now().checked_sub_signed(delta))
        .ok_or_else(|| AppError::Validation {
            field: field.to_string(),
            reason: "out of range".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_ago_is_in_the_past() {
        let before = now();
        let cutoff = minutes_ago("expire_minutes", 30).unwrap();
        assert!(cutoff <= before - TimeDelta::minutes(29));
        assert!(minutes_ago("expire_minutes", MAX_AGE_MINUTES).is_ok());
    }

    #[test]
    fn test_minutes_ago_rejects_extremes() {
        assert!(minutes_ago("expire_minutes", 0).is_err());
        assert!(minutes_ago("expire_minutes", i64::MAX).is_err());
        assert!(minutes_ago("stale_minutes", MAX_AGE_MINUTES + 1).is_err());
    }
}
