//! Reporting service for the sales reports and the daily cash close
//!
//! Fetches report rows through the data source and reduces them into the
//! summary figures each page shows.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use shared::aggregate::{average_field, count_distinct, grouped_report, sum_field};
use shared::models::{cash_close_stores, GroupedReport, ReportRow, ReportValue, StoreOption};
use shared::types::DateRange;
use std::sync::Arc;

use crate::data_source::{DataSource, FilterOptions, SalesFilter, SalesReport};
use crate::error::{AppError, AppResult};

/// Name of the single worksheet of an Excel export
pub const XLSX_SHEET_NAME: &str = "Reporte";

/// Column labels produced by the report queries
pub mod columns {
    pub const CUSTOMER_NAME: &str = "Nombre de cliente";
    pub const DISCOUNT_PCT: &str = "% Descuento";
    pub const QUANTITY: &str = "Cantidad";
    pub const LINE_TOTAL: &str = "Valor Venta";
    pub const ORDER_TOTAL: &str = "Valor Pedido (Cabecera)";

    pub const OFFERS: &str = "VALOR OFERTAS";
    pub const ORDERS_NOT_CANCELLED: &str = "Valor Pedidos (No Cancelados)";
    pub const ORDERS_CONFIRMED: &str = "Valor Pedidos Confirmados";
    pub const INVOICED: &str = "VALOR FACTURACIÓN";
    pub const INVOICED_NET: &str = "VALOR FACTURACIÓN - NOTAS DE CREDITO";
    pub const CREDIT_NOTES: &str = "VALOR NOTAS DE CREDITO";
    pub const COLLECTED: &str = "Cobro por Asesor";

    pub const PAYMENT_TYPE: &str = "Tipo";
    pub const STORE_PREFIX: &str = "BeginStr";
    pub const AMOUNT: &str = "Importe";
}

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    data_source: Arc<dyn DataSource>,
}

/// Figures shown above the daily sales table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub unique_customers: usize,
    pub average_discount: Decimal,
    pub total_sales: Decimal,
    pub total_quantity: Decimal,
    pub total_order_value: Decimal,
}

impl DailySummary {
    pub fn from_rows(rows: &[ReportRow]) -> Self {
        Self {
            unique_customers: count_distinct(rows, columns::CUSTOMER_NAME),
            average_discount: average_field(rows, columns::DISCOUNT_PCT),
            total_sales: sum_field(rows, columns::LINE_TOTAL),
            total_quantity: sum_field(rows, columns::QUANTITY),
            total_order_value: sum_field(rows, columns::ORDER_TOTAL),
        }
    }
}

/// Daily sales report view model
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReportView {
    pub range: DateRange,
    pub options: FilterOptions,
    pub selected_stores: Vec<String>,
    pub selected_advisors: Vec<i32>,
    /// `SI`, `NO` or empty
    pub eligibility: String,
    pub rows: Vec<ReportRow>,
    pub summary: DailySummary,
}

/// Column totals of the accumulated report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccumulatedTotals {
    pub offers: Decimal,
    pub orders_not_cancelled: Decimal,
    pub orders_confirmed: Decimal,
    pub invoiced: Decimal,
    pub invoiced_net_of_credit_notes: Decimal,
    pub credit_notes: Decimal,
    pub collected: Decimal,
}

impl AccumulatedTotals {
    pub fn from_rows(rows: &[ReportRow]) -> Self {
        Self {
            offers: sum_field(rows, columns::OFFERS),
            orders_not_cancelled: sum_field(rows, columns::ORDERS_NOT_CANCELLED),
            orders_confirmed: sum_field(rows, columns::ORDERS_CONFIRMED),
            invoiced: sum_field(rows, columns::INVOICED),
            invoiced_net_of_credit_notes: sum_field(rows, columns::INVOICED_NET),
            credit_notes: sum_field(rows, columns::CREDIT_NOTES),
            collected: sum_field(rows, columns::COLLECTED),
        }
    }

    /// Totals in the order the report columns are shown
    pub fn as_columns(&self) -> [(&'static str, Decimal); 7] {
        [
            (columns::OFFERS, self.offers),
            (columns::ORDERS_NOT_CANCELLED, self.orders_not_cancelled),
            (columns::ORDERS_CONFIRMED, self.orders_confirmed),
            (columns::INVOICED, self.invoiced),
            (columns::INVOICED_NET, self.invoiced_net_of_credit_notes),
            (columns::CREDIT_NOTES, self.credit_notes),
            (columns::COLLECTED, self.collected),
        ]
    }
}

/// Accumulated report view model
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccumulatedReportView {
    pub range: DateRange,
    pub options: FilterOptions,
    pub selected_stores: Vec<String>,
    pub selected_advisors: Vec<i32>,
    pub rows: Vec<ReportRow>,
    pub totals: AccumulatedTotals,
}

/// Daily cash close view model: payments grouped by payment type
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashCloseView {
    pub date: NaiveDate,
    pub stores: Vec<StoreOption>,
    pub selected_stores: Vec<String>,
    pub payments: GroupedReport,
}

impl CashCloseView {
    /// Keep only payments of the selected stores (all when none selected),
    /// then group by payment type and total the amounts.
    pub fn from_rows(date: NaiveDate, selected_stores: Vec<String>, rows: Vec<ReportRow>) -> Self {
        let kept = rows.into_iter().filter(|row| {
            selected_stores.is_empty()
                || selected_stores
                    .iter()
                    .any(|store| *store == row.text(columns::STORE_PREFIX))
        });
        let payments = grouped_report(kept, columns::PAYMENT_TYPE, columns::AMOUNT);

        Self {
            date,
            stores: cash_close_stores(),
            selected_stores,
            payments,
        }
    }

    /// All payment rows in group order
    pub fn rows(&self) -> Vec<ReportRow> {
        self.payments
            .groups
            .iter()
            .flat_map(|(_, rows)| rows.iter().cloned())
            .collect()
    }
}

impl ReportingService {
    pub fn new(data_source: Arc<dyn DataSource>) -> Self {
        Self { data_source }
    }

    /// Daily sales report with its filter options
    pub async fn daily_report(&self, filter: SalesFilter) -> AppResult<DailyReportView> {
        let SalesReport { options, rows } = self.data_source.fetch_daily_sales(&filter).await?;
        tracing::debug!(
            "Daily report {}..{}: {} rows",
            filter.range.start,
            filter.range.end,
            rows.len()
        );

        let summary = DailySummary::from_rows(&rows);
        Ok(DailyReportView {
            range: filter.range,
            options,
            selected_stores: filter.stores,
            selected_advisors: filter.advisors,
            eligibility: filter.eligibility.as_param().to_string(),
            rows,
            summary,
        })
    }

    /// Accumulated report per store and advisor
    pub async fn accumulated_report(&self, filter: SalesFilter) -> AppResult<AccumulatedReportView> {
        let SalesReport { options, rows } =
            self.data_source.fetch_accumulated_sales(&filter).await?;
        tracing::debug!(
            "Accumulated report {}..{}: {} rows",
            filter.range.start,
            filter.range.end,
            rows.len()
        );

        let totals = AccumulatedTotals::from_rows(&rows);
        Ok(AccumulatedReportView {
            range: filter.range,
            options,
            selected_stores: filter.stores,
            selected_advisors: filter.advisors,
            rows,
            totals,
        })
    }

    /// Daily cash close for one date
    pub async fn cash_close(&self, date: NaiveDate, stores: Vec<String>) -> AppResult<CashCloseView> {
        let rows = self.data_source.fetch_cash_close(date).await?;
        tracing::debug!("Cash close {}: {} payment rows", date, rows.len());
        Ok(CashCloseView::from_rows(date, stores, rows))
    }

    /// Export report rows as CSV. The header comes from the first row.
    pub fn export_to_csv(rows: &[ReportRow]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        if let Some(first) = rows.first() {
            let header: Vec<&str> = first.column_names().collect();
            wtr.write_record(&header)?;
            for row in rows {
                wtr.write_record(header.iter().map(|column| row.text(column)))?;
            }
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }

    /// Export report rows as an Excel workbook with one sheet.
    ///
    /// Numeric cells are written as numbers so spreadsheet formulas work on
    /// them; dates are written as `YYYY-MM-DD` text and nulls stay blank.
    pub fn export_to_xlsx(rows: &[ReportRow]) -> AppResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let number_format = Format::new().set_num_format("#,##0.00");

        let sheet = workbook.add_worksheet().set_name(XLSX_SHEET_NAME)?;
        if let Some(first) = rows.first() {
            let header: Vec<&str> = first.column_names().collect();
            for (col, name) in header.iter().enumerate() {
                sheet.write_string_with_format(0, col as u16, *name, &header_format)?;
            }

            for (idx, row) in rows.iter().enumerate() {
                let r = idx as u32 + 1;
                for (col, name) in header.iter().enumerate() {
                    let c = col as u16;
                    match row.get(name) {
                        Some(ReportValue::Number(n)) => match n.to_f64() {
                            Some(v) => {
                                sheet.write_number_with_format(r, c, v, &number_format)?;
                            }
                            None => {
                                sheet.write_string(r, c, n.to_string())?;
                            }
                        },
                        Some(value @ (ReportValue::Text(_) | ReportValue::Date(_))) => {
                            sheet.write_string(r, c, value.to_string())?;
                        }
                        Some(ReportValue::Null) | None => {}
                    }
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}
