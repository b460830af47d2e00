//! Report period helper resolving a time range to concrete date bounds

use chrono::{Datelike, NaiveDate, Utc};
use finview_config::TimeRange;

use crate::error::EngineError;

/// Lower bound used when the range is open-ended ("all time")
const OPEN_RANGE_START: (i32, u32, u32) = (1900, 1, 1);

/// A report period: a named time range plus custom bounds when applicable.
///
/// This is the single place where `date_from <= date_to` is enforced;
/// [`crate::filter::FilterState`] trusts the dates it is handed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportPeriod {
    range: TimeRange,
    custom_start: Option<NaiveDate>,
    custom_end: Option<NaiveDate>,
}

impl Default for ReportPeriod {
    fn default() -> Self {
        Self {
            range: TimeRange::Month,
            custom_start: None,
            custom_end: None,
        }
    }
}

impl ReportPeriod {
    /// Create a period for a named range
    pub fn new(range: TimeRange) -> Self {
        Self {
            range,
            custom_start: None,
            custom_end: None,
        }
    }

    /// Create a custom period; rejects inverted bounds
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self, EngineError> {
        if start > end {
            return Err(EngineError::InvalidDateRange { from: start, to: end });
        }
        Ok(Self {
            range: TimeRange::Custom,
            custom_start: Some(start),
            custom_end: Some(end),
        })
    }

    /// The named range this period was built from
    pub fn range(&self) -> TimeRange {
        self.range
    }

    /// Resolve to concrete inclusive bounds as of `today`
    pub fn bounds_at(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self.range {
            TimeRange::Month => {
                let start = today.with_day(1).unwrap_or(today);
                (start, month_end(today.year(), today.month()).unwrap_or(today))
            }
            TimeRange::Quarter => {
                let quarter_start = (today.month0() / 3) * 3 + 1;
                let quarter_end = ((today.month0() / 3) + 1) * 3;
                let start = NaiveDate::from_ymd_opt(today.year(), quarter_start, 1).unwrap_or(today);
                (start, month_end(today.year(), quarter_end).unwrap_or(today))
            }
            TimeRange::Year => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                let end = NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today);
                (start, end)
            }
            TimeRange::All => {
                let (y, m, d) = OPEN_RANGE_START;
                (NaiveDate::from_ymd_opt(y, m, d).unwrap_or(today), today)
            }
            TimeRange::Custom => {
                // Construction guarantees both bounds are present and ordered
                let start = self.custom_start.unwrap_or(today);
                (start, self.custom_end.unwrap_or(start))
            }
        }
    }

    /// Resolve to concrete inclusive bounds as of the current date
    pub fn bounds(&self) -> (NaiveDate, NaiveDate) {
        self.bounds_at(Utc::now().date_naive())
    }

    /// Check if a date falls within the period
    pub fn contains(&self, date: &NaiveDate) -> bool {
        let (start, end) = self.bounds();
        *date >= start && *date <= end
    }

    /// Human-readable description of the period
    pub fn description(&self) -> String {
        match self.range {
            TimeRange::Month => "Current Month".to_string(),
            TimeRange::Quarter => "Current Quarter".to_string(),
            TimeRange::Year => "Current Year".to_string(),
            TimeRange::All => "All Time".to_string(),
            TimeRange::Custom => {
                if let (Some(start), Some(end)) = (self.custom_start, self.custom_end) {
                    format!("{} to {}", start, end)
                } else {
                    "Custom Range".to_string()
                }
            }
        }
    }
}

/// Last day of a calendar month
fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt())
}

/// Inclusive bounds of a month row named `YYYY-MM`
pub fn month_bounds(name: &str) -> Option<(NaiveDate, NaiveDate)> {
    let (year_str, month_str) = name.split_once('-')?;
    let year: i32 = year_str.parse().ok()?;
    let month: u32 = month_str.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some((start, month_end(year, month)?))
}

/// The `YYYY-MM` month key a date falls into
pub fn month_key(date: &NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_custom_period_enforces_ordering() {
        assert!(ReportPeriod::custom(d(2025, 1, 31), d(2025, 1, 1)).is_err());
        let period = ReportPeriod::custom(d(2025, 1, 1), d(2025, 1, 31)).unwrap();
        assert_eq!(period.bounds_at(d(2025, 6, 15)), (d(2025, 1, 1), d(2025, 1, 31)));
    }

    #[test]
    fn test_month_bounds_of_today() {
        let period = ReportPeriod::new(TimeRange::Month);
        assert_eq!(period.bounds_at(d(2025, 2, 14)), (d(2025, 2, 1), d(2025, 2, 28)));
        // Leap year February
        assert_eq!(period.bounds_at(d(2024, 2, 14)), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(period.bounds_at(d(2025, 12, 5)), (d(2025, 12, 1), d(2025, 12, 31)));
    }

    #[test]
    fn test_quarter_bounds() {
        let period = ReportPeriod::new(TimeRange::Quarter);
        assert_eq!(period.bounds_at(d(2025, 5, 20)), (d(2025, 4, 1), d(2025, 6, 30)));
        assert_eq!(period.bounds_at(d(2025, 11, 2)), (d(2025, 10, 1), d(2025, 12, 31)));
    }

    #[test]
    fn test_year_and_all_bounds() {
        let year = ReportPeriod::new(TimeRange::Year);
        assert_eq!(year.bounds_at(d(2025, 7, 1)), (d(2025, 1, 1), d(2025, 12, 31)));

        let all = ReportPeriod::new(TimeRange::All);
        let (start, end) = all.bounds_at(d(2025, 7, 1));
        assert_eq!(start, d(1900, 1, 1));
        assert_eq!(end, d(2025, 7, 1));
    }

    #[test]
    fn test_month_row_bounds() {
        assert_eq!(month_bounds("2025-01"), Some((d(2025, 1, 1), d(2025, 1, 31))));
        assert_eq!(month_bounds("2024-02"), Some((d(2024, 2, 1), d(2024, 2, 29))));
        assert_eq!(month_bounds("2025-13"), None);
        assert_eq!(month_bounds("enero"), None);
    }

    #[test]
    fn test_month_key_format() {
        assert_eq!(month_key(&d(2025, 3, 9)), "2025-03");
        assert_eq!(month_key(&d(2025, 11, 30)), "2025-11");
    }
}
