//! sqlx/PostgreSQL implementation of the data source

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use shared::models::{AdvisorOption, InventoryRow, ReportRow, ReportValue, StoreOption};
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, FromRow, Postgres, Row, TypeInfo};
use std::str::FromStr;

use super::{queries, DataSource, FilterOptions, SalesFilter, SalesReport};
use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

/// ERP data source backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgDataSource {
    pool: PgPool,
    schema: String,
}

/// Row shape of `queries::inventory`
#[derive(Debug, FromRow)]
struct InventoryRecord {
    item_code: String,
    item_name: String,
    list_price: Option<Decimal>,
    warehouse_code: String,
    warehouse_name: String,
    on_hand: Decimal,
    committed: Option<Decimal>,
    available: Decimal,
    transit_total: Option<Decimal>,
    transit_available: Option<Decimal>,
}

impl From<InventoryRecord> for InventoryRow {
    fn from(r: InventoryRecord) -> Self {
        InventoryRow {
            item_code: r.item_code,
            item_name: r.item_name,
            list_price: r.list_price,
            warehouse_code: r.warehouse_code,
            warehouse_name: r.warehouse_name,
            on_hand: r.on_hand,
            committed: r.committed,
            available: r.available,
            transit_total: r.transit_total,
            transit_available: r.transit_available,
        }
    }
}

#[derive(Debug, FromRow)]
struct StoreRecord {
    code: String,
    name: String,
}

#[derive(Debug, FromRow)]
struct AdvisorRecord {
    code: i32,
    name: String,
}

impl PgDataSource {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    /// Build a lazily connecting pool. Connections are opened on first use,
    /// so the server starts even while the ERP is unreachable.
    pub fn connect_lazy(config: &DatabaseConfig, schema: impl Into<String>) -> AppResult<Self> {
        let statement_timeout = format!("{}s", config.statement_timeout().as_secs());
        let options = PgConnectOptions::from_str(&config.url)
            .map_err(|e| AppError::Connection(format!("invalid database url: {}", e)))?
            .options([("statement_timeout", statement_timeout.as_str())]);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_lazy_with(options);

        Ok(Self::new(pool, schema))
    }

    /// One connection per call; it goes back to the pool when dropped.
    /// Failures are logged where the error is finally rendered.
    async fn acquire(&self) -> AppResult<PoolConnection<Postgres>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| AppError::Connection(e.to_string()))
    }

    async fn filter_options(&self, conn: &mut PgConnection) -> AppResult<FilterOptions> {
        let stores = sqlx::query_as::<_, StoreRecord>(&queries::store_options(&self.schema))
            .fetch_all(&mut *conn)
            .await?
            .into_iter()
            .map(|r| StoreOption::new(r.code, r.name))
            .collect();

        let advisors = sqlx::query_as::<_, AdvisorRecord>(&queries::advisor_options(&self.schema))
            .fetch_all(&mut *conn)
            .await?
            .into_iter()
            .map(|r| AdvisorOption {
                code: r.code,
                name: r.name,
            })
            .collect();

        Ok(FilterOptions { stores, advisors })
    }
}

#[async_trait]
impl DataSource for PgDataSource {
    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.acquire().await?;
        sqlx::query("SELECT 1").execute(&mut *conn).await?;
        Ok(())
    }

    async fn fetch_inventory(&self) -> AppResult<Vec<InventoryRow>> {
        let mut conn = self.acquire().await?;
        let records = sqlx::query_as::<_, InventoryRecord>(&queries::inventory(&self.schema))
            .fetch_all(&mut *conn)
            .await?;

        tracing::debug!("Fetched {} inventory rows", records.len());
        Ok(records.into_iter().map(InventoryRow::from).collect())
    }

    async fn fetch_daily_sales(&self, filter: &SalesFilter) -> AppResult<SalesReport> {
        let mut conn = self.acquire().await?;
        let options = self.filter_options(&mut conn).await?;
        let rows = sqlx::query(&queries::daily_sales(&self.schema))
            .bind(filter.range.start)
            .bind(filter.range.end)
            .bind(&filter.stores)
            .bind(&filter.advisors)
            .bind(filter.eligibility.required_flag())
            .fetch_all(&mut *conn)
            .await?;

        Ok(SalesReport {
            options,
            rows: decode_rows(&rows)?,
        })
    }

    async fn fetch_accumulated_sales(&self, filter: &SalesFilter) -> AppResult<SalesReport> {
        let mut conn = self.acquire().await?;
        let options = self.filter_options(&mut conn).await?;
        let rows = sqlx::query(&queries::accumulated_sales(&self.schema))
            .bind(filter.range.start)
            .bind(filter.range.end)
            .bind(&filter.stores)
            .bind(&filter.advisors)
            .fetch_all(&mut *conn)
            .await?;

        Ok(SalesReport {
            options,
            rows: decode_rows(&rows)?,
        })
    }

    async fn fetch_cash_close(&self, date: NaiveDate) -> AppResult<Vec<ReportRow>> {
        let mut conn = self.acquire().await?;
        let rows = sqlx::query(&queries::cash_close(&self.schema))
            .bind(date)
            .fetch_all(&mut *conn)
            .await?;

        decode_rows(&rows)
    }
}

fn decode_rows(rows: &[PgRow]) -> AppResult<Vec<ReportRow>> {
    rows.iter()
        .map(|row| decode_row(row).map_err(AppError::from))
        .collect()
}

/// Convert a row of any shape into a report row, keeping column order
fn decode_row(row: &PgRow) -> Result<ReportRow, sqlx::Error> {
    row.columns()
        .iter()
        .map(|column| {
            let idx = column.ordinal();
            let value = match column.type_info().name() {
                "INT2" => row.try_get::<Option<i16>, _>(idx)?.map(|v| ReportValue::from(i64::from(v))),
                "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(ReportValue::from),
                "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(ReportValue::from),
                "NUMERIC" => row.try_get::<Option<Decimal>, _>(idx)?.map(ReportValue::from),
                "FLOAT4" => row
                    .try_get::<Option<f32>, _>(idx)?
                    .and_then(|v| Decimal::try_from(f64::from(v)).ok())
                    .map(ReportValue::from),
                "FLOAT8" => row
                    .try_get::<Option<f64>, _>(idx)?
                    .and_then(|v| Decimal::try_from(v).ok())
                    .map(ReportValue::from),
                "DATE" => row.try_get::<Option<NaiveDate>, _>(idx)?.map(ReportValue::from),
                "TIMESTAMP" => row
                    .try_get::<Option<NaiveDateTime>, _>(idx)?
                    .map(|v| ReportValue::from(v.date())),
                "TIMESTAMPTZ" => row
                    .try_get::<Option<DateTime<Utc>>, _>(idx)?
                    .map(|v| ReportValue::from(v.date_naive())),
                "BOOL" => row
                    .try_get::<Option<bool>, _>(idx)?
                    .map(|v| ReportValue::from(if v { "SI" } else { "NO" })),
                _ => row.try_get::<Option<String>, _>(idx)?.map(ReportValue::from),
            };
            Ok((column.name().to_string(), value.unwrap_or(ReportValue::Null)))
        })
        .collect()
}
