use chrono::{NaiveDateTime, Utc};

/// Wire format for every timestamp in API responses.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Current UTC time without zone, as stored in the database.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_optional(ts: Option<NaiveDateTime>) -> Option<String> {
    ts.map(format_timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_format_timestamp() {
        let ts = NaiveDate::from_ymd_opt(2025, 7, 1)
            .unwrap()
            .and_hms_milli_opt(8, 5, 9, 42)
            .unwrap();
        assert_eq!(format_timestamp(ts), "2025-07-01T08:05:09.042Z");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(None), None);
    }
}
