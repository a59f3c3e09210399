//! Report row models
//!
//! Report queries return rows whose shape is decided by the query text. Rows
//! are kept as ordered column/value pairs so tables render in query order.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single cell of a report row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ReportValue {
    Number(Decimal),
    Text(String),
    Date(NaiveDate),
    #[default]
    Null,
}

impl ReportValue {
    /// Numeric view of the value. Text is parsed leniently; dates and nulls
    /// have no numeric value.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            ReportValue::Number(n) => Some(*n),
            ReportValue::Text(s) => {
                let trimmed = s.trim();
                Decimal::from_str(trimmed)
                    .or_else(|_| Decimal::from_scientific(trimmed))
                    .ok()
            }
            ReportValue::Date(_) | ReportValue::Null => None,
        }
    }

    /// Numeric value, with anything non-numeric counted as zero
    pub fn to_decimal_or_zero(&self) -> Decimal {
        self.as_decimal().unwrap_or(Decimal::ZERO)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ReportValue::Null)
    }
}

impl fmt::Display for ReportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportValue::Number(n) => write!(f, "{}", n.normalize()),
            ReportValue::Text(s) => f.write_str(s),
            ReportValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            ReportValue::Null => Ok(()),
        }
    }
}

impl Serialize for ReportValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ReportValue::Number(n) => Serialize::serialize(n, serializer),
            ReportValue::Text(s) => serializer.serialize_str(s),
            ReportValue::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            ReportValue::Null => serializer.serialize_none(),
        }
    }
}

impl From<Decimal> for ReportValue {
    fn from(value: Decimal) -> Self {
        ReportValue::Number(value)
    }
}

impl From<i64> for ReportValue {
    fn from(value: i64) -> Self {
        ReportValue::Number(Decimal::from(value))
    }
}

impl From<i32> for ReportValue {
    fn from(value: i32) -> Self {
        ReportValue::Number(Decimal::from(value))
    }
}

impl From<&str> for ReportValue {
    fn from(value: &str) -> Self {
        ReportValue::Text(value.to_string())
    }
}

impl From<String> for ReportValue {
    fn from(value: String) -> Self {
        ReportValue::Text(value)
    }
}

impl From<NaiveDate> for ReportValue {
    fn from(value: NaiveDate) -> Self {
        ReportValue::Date(value)
    }
}

impl<T: Into<ReportValue>> From<Option<T>> for ReportValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ReportValue::Null)
    }
}

/// One output record of a report query
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportRow {
    columns: Vec<(String, ReportValue)>,
}

impl ReportRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, used when assembling rows by hand
    pub fn with(mut self, column: impl Into<String>, value: impl Into<ReportValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column, replacing any previous value while keeping its position
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<ReportValue>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.columns.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&ReportValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column value rendered as text; empty when absent
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(ToString::to_string).unwrap_or_default()
    }

    /// Column value coerced to a number; zero when absent or non-numeric
    pub fn number(&self, column: &str) -> Decimal {
        self.get(column)
            .map(ReportValue::to_decimal_or_zero)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReportValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<(String, ReportValue)> for ReportRow {
    fn from_iter<I: IntoIterator<Item = (String, ReportValue)>>(iter: I) -> Self {
        let mut row = ReportRow::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl Serialize for ReportRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Rows partitioned by key; key order is first-seen order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupedRows {
    groups: Vec<(String, Vec<ReportRow>)>,
}

impl GroupedRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row to its group, opening the group if this key is new
    pub fn push(&mut self, key: String, row: ReportRow) {
        match self.groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, rows)) => rows.push(row),
            None => self.groups.push((key, vec![row])),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[ReportRow]> {
        self.groups
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, rows)| rows.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ReportRow])> {
        self.groups.iter().map(|(k, rows)| (k.as_str(), rows.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Serialize for GroupedRows {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (key, rows) in &self.groups {
            map.serialize_entry(key, rows)?;
        }
        map.end()
    }
}

/// Per-group subtotals plus the grand total across all groups
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupTotals {
    totals: Vec<(String, Decimal)>,
    grand_total: Decimal,
}

impl GroupTotals {
    pub(crate) fn from_parts(totals: Vec<(String, Decimal)>, grand_total: Decimal) -> Self {
        Self {
            totals,
            grand_total,
        }
    }

    pub fn get(&self, key: &str) -> Option<Decimal> {
        self.totals
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, total)| *total)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.totals.iter().map(|(k, total)| (k.as_str(), *total))
    }

    pub fn grand_total(&self) -> Decimal {
        self.grand_total
    }
}

impl Serialize for GroupTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.totals.len()))?;
        for (key, total) in &self.totals {
            map.serialize_entry(key, total)?;
        }
        map.end()
    }
}

/// Rows grouped by a key field with per-group and grand totals
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupedReport {
    pub groups: GroupedRows,
    pub totals: GroupTotals,
}

impl GroupedReport {
    pub fn grand_total(&self) -> Decimal {
        self.totals.grand_total()
    }
}

impl Serialize for GroupedReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("groups", &self.groups)?;
        map.serialize_entry("totals", &self.totals)?;
        map.serialize_entry("grandTotal", &self.grand_total())?;
        map.end()
    }
}

/// Store selectable in report filters (document series prefix + name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOption {
    pub code: String,
    pub name: String,
}

impl StoreOption {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Sales advisor selectable in report filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorOption {
    pub code: i32,
    pub name: String,
}

/// Stores offered by the daily cash close page
pub fn cash_close_stores() -> Vec<StoreOption> {
    vec![
        StoreOption::new("001", "Bosque"),
        StoreOption::new("002", "Tumbaco"),
        StoreOption::new("003", "Ibarra"),
        StoreOption::new("004", "Plaza"),
        StoreOption::new("005", "Cuenca"),
        StoreOption::new("006", "Loja"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_values_coerce_to_numbers() {
        assert_eq!(ReportValue::from("12.50").as_decimal(), Some(Decimal::new(1250, 2)));
        assert_eq!(ReportValue::from(" 3 ").as_decimal(), Some(Decimal::from(3)));
        assert_eq!(ReportValue::from("abc").as_decimal(), None);
        assert_eq!(ReportValue::Null.to_decimal_or_zero(), Decimal::ZERO);
    }

    #[test]
    fn test_row_insert_keeps_column_position() {
        let mut row = ReportRow::new().with("a", 1).with("b", "x");
        row.insert("a", 5);

        let names: Vec<&str> = row.column_names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(row.number("a"), Decimal::from(5));
        assert_eq!(row.number("missing"), Decimal::ZERO);
    }

    #[test]
    fn test_row_serializes_in_column_order() {
        let row = ReportRow::new()
            .with("Tienda", "BOSQUE")
            .with("Cantidad", 2_i32)
            .with("Valor Pedido (Cabecera)", Option::<Decimal>::None);

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            r#"{"Tienda":"BOSQUE","Cantidad":"2","Valor Pedido (Cabecera)":null}"#
        );
    }

    #[test]
    fn test_cash_close_store_list() {
        let stores = cash_close_stores();
        assert_eq!(stores.len(), 6);
        assert_eq!(stores[0], StoreOption::new("001", "Bosque"));
        assert_eq!(stores[5].name, "Loja");
    }
}
