//! Access to the ERP database
//!
//! The [`DataSource`] trait is the seam between the HTTP layer and the ERP.
//! Every method runs on exactly one pooled connection, which is returned to
//! the pool on every exit path. Report queries come back as [`ReportRow`]s shaped
//! by the query text; the eligibility flag of the daily report is computed
//! entirely inside the query.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use shared::models::{AdvisorOption, InventoryRow, ReportRow, StoreOption};
use shared::types::{DateRange, EligibilityFilter};

use crate::error::AppResult;

mod pg;
pub mod queries;

pub use pg::PgDataSource;

/// Options offered by the store and advisor multi-selects
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterOptions {
    pub stores: Vec<StoreOption>,
    pub advisors: Vec<AdvisorOption>,
}

/// A sales report together with the options of its filter form, read on the
/// same connection
#[derive(Debug, Clone, Default)]
pub struct SalesReport {
    pub options: FilterOptions,
    pub rows: Vec<ReportRow>,
}

/// Filters shared by the sales reports
#[derive(Debug, Clone, PartialEq)]
pub struct SalesFilter {
    pub range: DateRange,
    /// Document series prefixes; empty means every store
    pub stores: Vec<String>,
    /// Salesperson codes; empty means every advisor
    pub advisors: Vec<i32>,
    /// Only honoured by the daily report
    pub eligibility: EligibilityFilter,
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Round-trip check used by the health endpoint
    async fn ping(&self) -> AppResult<()>;

    /// Flat inventory rows, one per item×warehouse
    async fn fetch_inventory(&self) -> AppResult<Vec<InventoryRow>>;

    /// Order lines plus one credit-note adjustment row per store and advisor.
    ///
    /// The options list active stores and advisors, excluding
    /// internal-consumption and clearance salespeople.
    async fn fetch_daily_sales(&self, filter: &SalesFilter) -> AppResult<SalesReport>;

    /// One row per store and advisor with offer, order, invoice, credit-note
    /// and collection totals, plus the filter options
    async fn fetch_accumulated_sales(&self, filter: &SalesFilter) -> AppResult<SalesReport>;

    /// Incoming payments of one day, one row per payment method share
    async fn fetch_cash_close(&self, date: NaiveDate) -> AppResult<Vec<ReportRow>>;
}
