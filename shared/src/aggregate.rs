//! Report aggregation
//!
//! Single-pass reductions over rows that have already been fetched. Nothing
//! here performs I/O and nothing fails: a field missing from every row simply
//! contributes zero.

use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::models::{GroupTotals, GroupedReport, GroupedRows, ReportRow, ReportValue};

/// Partition rows by key. Rows keep their input order inside each group and
/// groups appear in the order their key was first seen.
pub fn group_by<F>(rows: impl IntoIterator<Item = ReportRow>, key_fn: F) -> GroupedRows
where
    F: Fn(&ReportRow) -> String,
{
    let mut grouped = GroupedRows::new();
    for row in rows {
        let key = key_fn(&row);
        grouped.push(key, row);
    }
    grouped
}

/// Sum a numeric field; absent or non-numeric values count as zero
pub fn sum_field(rows: &[ReportRow], field: &str) -> Decimal {
    rows.iter().map(|row| row.number(field)).sum()
}

/// Mean of a numeric field over all rows; zero for an empty input
pub fn average_field(rows: &[ReportRow], field: &str) -> Decimal {
    if rows.is_empty() {
        return Decimal::ZERO;
    }
    sum_field(rows, field) / Decimal::from(rows.len())
}

/// Number of distinct non-null values of a field. Values of different kinds
/// are distinct even when they print the same.
pub fn count_distinct(rows: &[ReportRow], field: &str) -> usize {
    rows.iter()
        .filter_map(|row| row.get(field))
        .filter(|value| !value.is_null())
        .collect::<HashSet<&ReportValue>>()
        .len()
}

/// Per-group subtotal of `amount_field` plus the grand total across groups
pub fn compute_totals(groups: &GroupedRows, amount_field: &str) -> GroupTotals {
    let mut grand_total = Decimal::ZERO;
    let totals = groups
        .iter()
        .map(|(key, rows)| {
            let subtotal = sum_field(rows, amount_field);
            grand_total += subtotal;
            (key.to_string(), subtotal)
        })
        .collect();
    GroupTotals::from_parts(totals, grand_total)
}

/// Group rows by the text of `key_field` and total `amount_field` per group
pub fn grouped_report(
    rows: impl IntoIterator<Item = ReportRow>,
    key_field: &str,
    amount_field: &str,
) -> GroupedReport {
    let groups = group_by(rows, |row| row.text(key_field));
    let totals = compute_totals(&groups, amount_field);
    GroupedReport { groups, totals }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kv(k: &str, v: i64) -> ReportRow {
        ReportRow::new().with("k", k).with("v", v)
    }

    #[test]
    fn test_empty_input_yields_zero() {
        assert_eq!(sum_field(&[], "x"), Decimal::ZERO);
        assert_eq!(average_field(&[], "x"), Decimal::ZERO);
        assert_eq!(count_distinct(&[], "x"), 0);
    }

    #[test]
    fn test_missing_field_yields_zero() {
        let rows = vec![kv("a", 1), kv("b", 2)];
        assert_eq!(sum_field(&rows, "missing"), Decimal::ZERO);
        assert_eq!(average_field(&rows, "missing"), Decimal::ZERO);
    }

    #[test]
    fn test_non_numeric_values_count_as_zero() {
        let rows = vec![
            ReportRow::new().with("Importe", "10.5"),
            ReportRow::new().with("Importe", "n/a"),
            ReportRow::new().with("Importe", ReportValue::Null),
            ReportRow::new().with("Importe", 4),
        ];
        assert_eq!(sum_field(&rows, "Importe"), Decimal::new(145, 1));
    }

    #[test]
    fn test_average_divides_by_row_count() {
        let rows = vec![
            ReportRow::new().with("% Descuento", 10),
            ReportRow::new().with("% Descuento", 20),
            ReportRow::new(),
        ];
        assert_eq!(average_field(&rows, "% Descuento"), Decimal::from(10));
    }

    #[test]
    fn test_group_by_preserves_order() {
        let rows = vec![kv("a", 1), kv("b", 2), kv("a", 3)];
        let groups = group_by(rows, |row| row.text("k"));

        let keys: Vec<&str> = groups.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);

        let a: Vec<Decimal> = groups.get("a").unwrap().iter().map(|r| r.number("v")).collect();
        assert_eq!(a, vec![Decimal::from(1), Decimal::from(3)]);
        assert_eq!(groups.get("b").unwrap().len(), 1);
    }

    #[test]
    fn test_count_distinct_ignores_nulls() {
        let rows = vec![
            ReportRow::new().with("Nombre de cliente", "ANA"),
            ReportRow::new().with("Nombre de cliente", "LUIS"),
            ReportRow::new().with("Nombre de cliente", "ANA"),
            ReportRow::new().with("Nombre de cliente", ReportValue::Null),
            ReportRow::new(),
        ];
        assert_eq!(count_distinct(&rows, "Nombre de cliente"), 2);
    }

    #[test]
    fn test_count_distinct_compares_typed_values() {
        let rows = vec![
            ReportRow::new().with("Codigo", Decimal::from(1)),
            ReportRow::new().with("Codigo", "1"),
            ReportRow::new().with("Codigo", Decimal::new(100, 2)),
        ];
        assert_eq!(count_distinct(&rows, "Codigo"), 2);
    }

    #[test]
    fn test_compute_totals_and_grand_total() {
        let rows = vec![
            ReportRow::new().with("Tipo", "EFECTIVO").with("Importe", 100),
            ReportRow::new().with("Tipo", "CHEQUE").with("Importe", 50),
            ReportRow::new().with("Tipo", "EFECTIVO").with("Importe", "25.25"),
        ];
        let report = grouped_report(rows, "Tipo", "Importe");

        assert_eq!(report.totals.get("EFECTIVO"), Some(Decimal::new(12525, 2)));
        assert_eq!(report.totals.get("CHEQUE"), Some(Decimal::from(50)));
        assert_eq!(report.grand_total(), Decimal::new(17525, 2));
        let keys: Vec<&str> = report.totals.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["EFECTIVO", "CHEQUE"]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn amount_strategy() -> impl Strategy<Value = i64> {
            -100_000i64..100_000i64
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            /// The grand total equals the sum over the ungrouped rows
            #[test]
            fn prop_grand_total_matches_flat_sum(
                entries in prop::collection::vec((0u8..4, amount_strategy()), 0..40)
            ) {
                let rows: Vec<ReportRow> = entries
                    .iter()
                    .map(|(k, v)| kv(&format!("g{}", k), *v))
                    .collect();
                let flat = sum_field(&rows, "v");
                let report = grouped_report(rows, "k", "v");

                prop_assert_eq!(report.grand_total(), flat);
            }

            /// Grouping never loses or reorders rows within a key
            #[test]
            fn prop_group_by_is_order_preserving(
                entries in prop::collection::vec((0u8..3, amount_strategy()), 0..40)
            ) {
                let rows: Vec<ReportRow> = entries
                    .iter()
                    .map(|(k, v)| kv(&format!("g{}", k), *v))
                    .collect();
                let groups = group_by(rows.clone(), |row| row.text("k"));

                let regrouped: usize = groups.iter().map(|(_, rows)| rows.len()).sum();
                prop_assert_eq!(regrouped, rows.len());

                for (key, group) in groups.iter() {
                    let expected: Vec<&ReportRow> =
                        rows.iter().filter(|r| r.text("k") == key).collect();
                    let actual: Vec<&ReportRow> = group.iter().collect();
                    prop_assert_eq!(actual, expected);
                }
            }
        }
    }
}
