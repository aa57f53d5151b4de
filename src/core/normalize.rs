//! Pure normalization rules applied while merging a snapshot.

use chrono::NaiveDate;

use crate::api::models::DailyRecord;

/// Normalize a power reading to watts.
///
/// The gateway serves kilowatts or watts for the same field depending on the
/// deployment, with nothing in the payload to tell them apart. Readings
/// under 100 are assumed to be kilowatts; a genuine sub-100 W reading would
/// be misread, but that matches how the gateway has been observed to behave.
#[must_use]
pub fn to_watts(value: f64) -> f64 {
    if value < 100.0 { value * 1000.0 } else { value }
}

/// Round to one decimal place.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Pick today's record by date prefix, falling back to the last element.
///
/// The list arrives oldest-first, but that ordering is not relied upon:
/// today is matched explicitly wherever it sits, and only the fallback
/// treats the last element as the most recent.
#[must_use]
pub fn select_daily(records: &[DailyRecord], today: NaiveDate) -> Option<&DailyRecord> {
    let today = today.format("%Y-%m-%d").to_string();
    records
        .iter()
        .find(|record| {
            record
                .timestamp
                .as_deref()
                .is_some_and(|timestamp| timestamp.get(..10) == Some(today.as_str()))
        })
        .or_else(|| records.last())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timestamp: &str, delivered_kwh: f64) -> DailyRecord {
        DailyRecord {
            timestamp: Some(timestamp.to_string()),
            delivered_kwh: Some(delivered_kwh),
            cumulative_kwh: None,
        }
    }

    #[test]
    fn test_to_watts_scales_kilowatts() {
        assert_eq!(to_watts(3.2), 3200.0);
        assert_eq!(to_watts(0.0), 0.0);
        assert_eq!(to_watts(99.9), 99900.0);
    }

    #[test]
    fn test_to_watts_passes_watts_through() {
        assert_eq!(to_watts(100.0), 100.0);
        assert_eq!(to_watts(150.0), 150.0);
        assert_eq!(to_watts(3200.0), 3200.0);
    }

    #[test]
    fn test_select_daily_prefers_today_over_position() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let records = [
            record("2024-12-30T00:00:00", 1.0),
            record("2025-01-01T00:00:00", 2.0),
            record("2024-12-31T00:00:00", 3.0),
        ];
        let selected = select_daily(&records, today).unwrap();
        assert_eq!(selected.delivered_kwh, Some(2.0));
    }

    #[test]
    fn test_select_daily_falls_back_to_last() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let records = [
            record("2024-12-30T00:00:00", 1.0),
            record("2024-12-28T00:00:00", 2.0),
        ];
        let selected = select_daily(&records, today).unwrap();
        assert_eq!(selected.delivered_kwh, Some(2.0));
    }

    #[test]
    fn test_select_daily_empty() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(select_daily(&[], today).is_none());
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(180.25), 180.3);
        assert_eq!(round1(18.04), 18.0);
    }
}
