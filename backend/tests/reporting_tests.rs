//! Reporting tests
//!
//! Tests for the report view models including:
//! - Daily summary figures
//! - Accumulated column totals
//! - Cash close store filtering and payment-type grouping
//! - CSV and Excel export

use calamine::{Data, Reader, Xlsx};
use chrono::NaiveDate;
use dashboard_server::services::reporting::{
    columns, AccumulatedTotals, CashCloseView, DailySummary, XLSX_SHEET_NAME,
};
use dashboard_server::services::ReportingService;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::models::{ReportRow, ReportValue};
use std::io::Cursor;
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn sale(customer: &str, discount: &str, quantity: i64, line: &str, order: &str) -> ReportRow {
    ReportRow::new()
        .with(columns::CUSTOMER_NAME, customer)
        .with(columns::DISCOUNT_PCT, dec(discount))
        .with(columns::QUANTITY, quantity)
        .with(columns::LINE_TOTAL, dec(line))
        .with(columns::ORDER_TOTAL, dec(order))
}

fn payment(store: &str, kind: &str, amount: &str) -> ReportRow {
    ReportRow::new()
        .with(columns::STORE_PREFIX, store)
        .with(columns::PAYMENT_TYPE, kind)
        .with(columns::AMOUNT, dec(amount))
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Daily summary over a handful of order lines
    #[test]
    fn test_daily_summary() {
        let rows = vec![
            sale("ANA", "10", 2, "100.50", "300"),
            sale("ANA", "20", 1, "50", "300"),
            sale("LUIS", "0", 4, "20", "20"),
        ];

        let summary = DailySummary::from_rows(&rows);

        assert_eq!(summary.unique_customers, 2);
        assert_eq!(summary.average_discount, dec("10"));
        assert_eq!(summary.total_sales, dec("170.50"));
        assert_eq!(summary.total_quantity, Decimal::from(7));
        assert_eq!(summary.total_order_value, dec("620"));
    }

    /// An empty report summarises to zeros
    #[test]
    fn test_daily_summary_empty() {
        let summary = DailySummary::from_rows(&[]);
        assert_eq!(summary.unique_customers, 0);
        assert_eq!(summary.average_discount, Decimal::ZERO);
        assert_eq!(summary.total_sales, Decimal::ZERO);
    }

    /// The credit-note adjustment row has a null customer and is not counted
    #[test]
    fn test_adjustment_row_is_not_a_customer() {
        let adjustment = ReportRow::new()
            .with(columns::CUSTOMER_NAME, ReportValue::Null)
            .with(columns::LINE_TOTAL, dec("-15"));
        let rows = vec![sale("ANA", "0", 1, "40", "40"), adjustment];

        let summary = DailySummary::from_rows(&rows);
        assert_eq!(summary.unique_customers, 1);
        assert_eq!(summary.total_sales, dec("25"));
    }

    /// Accumulated totals per column, with text-typed numbers coerced
    #[test]
    fn test_accumulated_totals() {
        let rows = vec![
            ReportRow::new()
                .with(columns::OFFERS, dec("100"))
                .with(columns::INVOICED, "250.25")
                .with(columns::COLLECTED, dec("80")),
            ReportRow::new()
                .with(columns::OFFERS, dec("50"))
                .with(columns::CREDIT_NOTES, dec("-10"))
                .with(columns::COLLECTED, ReportValue::Null),
        ];

        let totals = AccumulatedTotals::from_rows(&rows);
        assert_eq!(totals.offers, dec("150"));
        assert_eq!(totals.invoiced, dec("250.25"));
        assert_eq!(totals.credit_notes, dec("-10"));
        assert_eq!(totals.collected, dec("80"));
        assert_eq!(totals.orders_confirmed, Decimal::ZERO);

        let cols = totals.as_columns();
        assert_eq!(cols[0], (columns::OFFERS, dec("150")));
        assert_eq!(cols[6], (columns::COLLECTED, dec("80")));
    }

    /// Store filter runs before grouping, so totals only cover those stores
    #[test]
    fn test_cash_close_filters_before_grouping() {
        let rows = vec![
            payment("001", "EFECTIVO", "10"),
            payment("002", "EFECTIVO", "99"),
            payment("001", "TARJETA", "5.50"),
            payment("003", "TARJETA", "1"),
        ];

        let view = CashCloseView::from_rows(day(), vec!["001".to_string()], rows);

        let keys: Vec<&str> = view.payments.groups.keys().collect();
        assert_eq!(keys, vec!["EFECTIVO", "TARJETA"]);
        assert_eq!(view.payments.totals.get("EFECTIVO"), Some(dec("10")));
        assert_eq!(view.payments.grand_total(), dec("15.50"));
        assert_eq!(view.rows().len(), 2);
    }

    /// No selected store keeps every payment
    #[test]
    fn test_cash_close_without_store_filter() {
        let rows = vec![
            payment("001", "EFECTIVO", "10"),
            payment("006", "CHEQUE", "20"),
        ];

        let view = CashCloseView::from_rows(day(), vec![], rows);
        assert_eq!(view.payments.groups.len(), 2);
        assert_eq!(view.payments.grand_total(), dec("30"));
        assert_eq!(view.stores.len(), 6);
    }

    /// CSV export uses the first row's columns as header
    #[test]
    fn test_export_to_csv() {
        let rows = vec![
            payment("001", "EFECTIVO", "10.00"),
            payment("002", "TARJETA, CRÉDITO", "5"),
        ];

        let csv = ReportingService::export_to_csv(&rows).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "BeginStr,Tipo,Importe");
        assert_eq!(lines[1], "001,EFECTIVO,10");
        assert_eq!(lines[2], "002,\"TARJETA, CRÉDITO\",5");
    }

    /// No rows, no output
    #[test]
    fn test_export_empty() {
        assert_eq!(ReportingService::export_to_csv(&[]).unwrap(), "");
    }

    /// Excel export keeps numbers numeric, writes text and dates as strings
    /// and leaves nulls blank
    #[test]
    fn test_export_to_xlsx_types_cells() {
        let rows = vec![
            payment("001", "EFECTIVO", "1234.50").with("Fecha", day()),
            payment("002", "TARJETA", "5").with("Fecha", ReportValue::Null),
        ];

        let bytes = ReportingService::export_to_xlsx(&rows).unwrap();
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range(XLSX_SHEET_NAME).unwrap();

        assert_eq!(range.get_value((0, 0)), Some(&Data::String("BeginStr".to_string())));
        assert_eq!(range.get_value((0, 3)), Some(&Data::String("Fecha".to_string())));
        assert_eq!(range.get_value((1, 0)), Some(&Data::String("001".to_string())));
        assert_eq!(range.get_value((1, 2)), Some(&Data::Float(1234.5)));
        assert_eq!(range.get_value((2, 2)), Some(&Data::Float(5.0)));
        assert_eq!(
            range.get_value((1, 3)),
            Some(&Data::String("2024-05-01".to_string()))
        );
        assert!(matches!(range.get_value((2, 3)), None | Some(Data::Empty)));
    }

    /// An empty report still produces a readable workbook
    #[test]
    fn test_export_to_xlsx_empty() {
        let bytes = ReportingService::export_to_xlsx(&[]).unwrap();
        let workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec![XLSX_SHEET_NAME.to_string()]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn arb_payment() -> impl Strategy<Value = ReportRow> {
        (
            prop::sample::select(vec!["001", "002", "003", "004", "005", "006"]),
            prop::sample::select(vec!["EFECTIVO", "TARJETA", "CHEQUE", "TRANSFERENCIA"]),
            -10_000i64..1_000_000,
        )
            .prop_map(|(store, kind, cents)| {
                ReportRow::new()
                    .with(columns::STORE_PREFIX, store)
                    .with(columns::PAYMENT_TYPE, kind)
                    .with(columns::AMOUNT, Decimal::new(cents, 2))
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The cash close grand total equals the sum over the selected stores
        #[test]
        fn prop_cash_close_total_matches_selected_stores(
            rows in prop::collection::vec(arb_payment(), 0..60),
            selected in prop::collection::vec(
                prop::sample::select(vec!["001", "002", "003", "004", "005", "006"]),
                0..3,
            ),
        ) {
            let selected: Vec<String> = selected.into_iter().map(String::from).collect();
            let expected: Decimal = rows
                .iter()
                .filter(|r| selected.is_empty() || selected.contains(&r.text(columns::STORE_PREFIX)))
                .map(|r| r.number(columns::AMOUNT))
                .sum();

            let view = CashCloseView::from_rows(day(), selected, rows);
            prop_assert_eq!(view.payments.grand_total(), expected);

            let subtotal_sum: Decimal = view.payments.totals.iter().map(|(_, t)| t).sum();
            prop_assert_eq!(subtotal_sum, expected);
        }
    }
}
