//! Validation of report filter input
//!
//! Query-string values arrive as free text. Everything that ends up bound to
//! a query is checked here first.

use chrono::NaiveDate;

use crate::types::DateRange;

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate, &'static str> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| "Date must be in YYYY-MM-DD format")
}

/// Resolve an optional start/end pair, defaulting to the trailing `default_days`
/// days ending on `today`. Empty strings are treated as absent.
pub fn resolve_date_range(
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
    default_days: u32,
) -> Result<DateRange, &'static str> {
    let fallback = DateRange::trailing_days(today, default_days);

    let start = match start.filter(|s| !s.trim().is_empty()) {
        Some(s) => parse_date(s)?,
        None => fallback.start,
    };
    let end = match end.filter(|s| !s.trim().is_empty()) {
        Some(s) => parse_date(s)?,
        None => fallback.end,
    };

    validate_date_range(&DateRange::new(start, end))?;
    Ok(DateRange::new(start, end))
}

pub fn validate_date_range(range: &DateRange) -> Result<(), &'static str> {
    if range.start > range.end {
        return Err("Start date must not be after end date");
    }
    Ok(())
}

/// Store codes are document series prefixes such as `001`
pub fn validate_store_code(code: &str) -> Result<(), &'static str> {
    if code.is_empty() || code.len() > 20 {
        return Err("Store code must be between 1 and 20 characters");
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err("Store code contains invalid characters");
    }
    Ok(())
}

/// Advisor codes are the ERP's numeric salesperson codes
pub fn parse_advisor_code(code: &str) -> Result<i32, &'static str> {
    code.trim()
        .parse::<i32>()
        .map_err(|_| "Advisor code must be an integer")
}

/// Drop blank entries from a multi-select list
pub fn non_blank(values: &[String]) -> impl Iterator<Item = &str> {
    values.iter().map(|v| v.trim()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_valid() {
        assert_eq!(parse_date("2024-01-31"), Ok(day(2024, 1, 31)));
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("31/01/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("2024-01-01' OR 1=1 --").is_err());
    }

    #[test]
    fn test_resolve_date_range_defaults() {
        let today = day(2024, 6, 30);
        let range = resolve_date_range(None, Some(""), today, 30).unwrap();
        assert_eq!(range, DateRange::new(day(2024, 5, 31), today));
    }

    #[test]
    fn test_resolve_date_range_explicit() {
        let range = resolve_date_range(Some("2024-01-01"), Some("2024-01-15"), day(2024, 6, 30), 7).unwrap();
        assert_eq!(range, DateRange::new(day(2024, 1, 1), day(2024, 1, 15)));
    }

    #[test]
    fn test_resolve_date_range_rejects_inverted() {
        let result = resolve_date_range(Some("2024-02-01"), Some("2024-01-01"), day(2024, 6, 30), 7);
        assert!(result.is_err());
    }

    #[test]
    fn test_store_code() {
        assert!(validate_store_code("001").is_ok());
        assert!(validate_store_code("").is_err());
        assert!(validate_store_code("001'); DROP").is_err());
    }

    #[test]
    fn test_advisor_code() {
        assert_eq!(parse_advisor_code(" 42 "), Ok(42));
        assert!(parse_advisor_code("4a").is_err());
    }

    #[test]
    fn test_non_blank() {
        let values = vec!["001".to_string(), " ".to_string(), "003".to_string()];
        let kept: Vec<&str> = non_blank(&values).collect();
        assert_eq!(kept, vec!["001", "003"]);
    }
}
