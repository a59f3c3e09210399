//! Common types used across the dashboard

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive date range for report queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The trailing `days` days ending on `today`
    pub fn trailing_days(today: NaiveDate, days: u32) -> Self {
        Self {
            start: today - Duration::days(i64::from(days)),
            end: today,
        }
    }
}

/// Eligibility filter applied to the daily sales report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EligibilityFilter {
    /// Show every order
    #[default]
    Any,
    /// Only orders meeting the credit/payment condition
    Meets,
    /// Only orders not meeting it
    DoesNotMeet,
}

impl EligibilityFilter {
    /// Parse the query-string form; anything other than `SI`/`NO` means no filter
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("SI") => EligibilityFilter::Meets,
            Some("NO") => EligibilityFilter::DoesNotMeet,
            _ => EligibilityFilter::Any,
        }
    }

    /// Value the eligibility column must equal, if filtering
    pub fn required_flag(&self) -> Option<&'static str> {
        match self {
            EligibilityFilter::Any => None,
            EligibilityFilter::Meets => Some("SI"),
            EligibilityFilter::DoesNotMeet => Some("NO"),
        }
    }

    pub fn as_param(&self) -> &'static str {
        self.required_flag().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_days() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let range = DateRange::trailing_days(today, 7);
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 2, 27).unwrap());
        assert_eq!(range.end, today);
    }

    #[test]
    fn test_eligibility_filter_from_param() {
        assert_eq!(EligibilityFilter::from_param(Some("SI")), EligibilityFilter::Meets);
        assert_eq!(EligibilityFilter::from_param(Some("NO")), EligibilityFilter::DoesNotMeet);
        assert_eq!(EligibilityFilter::from_param(Some("")), EligibilityFilter::Any);
        assert_eq!(EligibilityFilter::from_param(None), EligibilityFilter::Any);
        assert_eq!(EligibilityFilter::Meets.as_param(), "SI");
    }
}
