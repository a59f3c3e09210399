//! Report page handlers: daily sales, accumulated sales and the daily cash close

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use shared::models::ReportRow;
use shared::types::EligibilityFilter;
use shared::validation::{non_blank, parse_advisor_code, parse_date, resolve_date_range, validate_store_code};

use crate::data_source::SalesFilter;
use crate::error::{AppError, AppResult};
use crate::handlers::extract::FilterQuery;
use crate::render;
use crate::services::ReportingService;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DailyReportQuery {
    #[serde(rename = "fechaInicio")]
    pub start_date: Option<String>,
    #[serde(rename = "fechaFin")]
    pub end_date: Option<String>,
    #[serde(rename = "tiendas", default)]
    pub stores: Vec<String>,
    #[serde(rename = "asesores", default)]
    pub advisors: Vec<String>,
    #[serde(rename = "cumpleCondicion")]
    pub eligibility: Option<String>,
    pub format: Option<String>, // "html", "json", "csv" or "xlsx"
}

#[derive(Debug, Default, Deserialize)]
pub struct AccumulatedReportQuery {
    #[serde(rename = "fechaInicio")]
    pub start_date: Option<String>,
    #[serde(rename = "fechaFin")]
    pub end_date: Option<String>,
    #[serde(rename = "sucursales", default)]
    pub stores: Vec<String>,
    #[serde(rename = "vendedores", default)]
    pub advisors: Vec<String>,
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CashCloseQuery {
    #[serde(rename = "fecha")]
    pub date: Option<String>,
    #[serde(rename = "tiendas", default)]
    pub stores: Vec<String>,
    pub format: Option<String>,
}

/// Output requested through `format=`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Json,
    Csv,
    Xlsx,
}

impl OutputFormat {
    pub fn from_param(value: Option<&str>) -> AppResult<Self> {
        match value.map(str::trim) {
            None | Some("") | Some("html") => Ok(OutputFormat::Html),
            Some("json") => Ok(OutputFormat::Json),
            Some("csv") => Ok(OutputFormat::Csv),
            Some("xlsx") => Ok(OutputFormat::Xlsx),
            Some(_) => Err(AppError::validation(
                "format",
                "Format must be html, json, csv or xlsx",
            )),
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_stores(field: &str, values: &[String]) -> AppResult<Vec<String>> {
    non_blank(values)
        .map(|code| {
            validate_store_code(code)
                .map(|_| code.to_string())
                .map_err(|msg| AppError::validation(field, msg))
        })
        .collect()
}

fn parse_advisors(field: &str, values: &[String]) -> AppResult<Vec<i32>> {
    non_blank(values)
        .map(|code| parse_advisor_code(code).map_err(|msg| AppError::validation(field, msg)))
        .collect()
}

fn csv_response(rows: &[ReportRow], filename: &str) -> AppResult<Response> {
    let csv = ReportingService::export_to_csv(rows)?;
    let disposition = format!("attachment; filename=\"{}\"", filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn xlsx_response(rows: &[ReportRow], filename: &str) -> AppResult<Response> {
    let workbook = ReportingService::export_to_xlsx(rows)?;
    let disposition = format!("attachment; filename=\"{}\"", filename);
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        workbook,
    )
        .into_response())
}

/// Answer in the requested format. `basename` names the downloaded file.
fn respond<V: Serialize>(
    format: OutputFormat,
    view: &V,
    rows: &[ReportRow],
    basename: &str,
    html: impl FnOnce(&V) -> axum::response::Html<String>,
) -> AppResult<Response> {
    match format {
        OutputFormat::Html => Ok(html(view).into_response()),
        OutputFormat::Json => Ok(Json(view).into_response()),
        OutputFormat::Csv => csv_response(rows, &format!("{}.csv", basename)),
        OutputFormat::Xlsx => xlsx_response(rows, &format!("{}.xlsx", basename)),
    }
}

/// Daily sales report
pub async fn daily_report(
    State(state): State<AppState>,
    FilterQuery(query): FilterQuery<DailyReportQuery>,
) -> AppResult<Response> {
    let format = OutputFormat::from_param(query.format.as_deref())?;
    let range = resolve_date_range(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        today(),
        state.config.reports.daily_default_days,
    )
    .map_err(|msg| AppError::validation("fechaInicio", msg))?;

    let filter = SalesFilter {
        range,
        stores: parse_stores("tiendas", &query.stores)?,
        advisors: parse_advisors("asesores", &query.advisors)?,
        eligibility: EligibilityFilter::from_param(query.eligibility.as_deref()),
    };

    let service = ReportingService::new(state.data_source.clone());
    let view = service.daily_report(filter).await?;
    respond(format, &view, &view.rows, "reporte_diario", render::daily_report)
}

/// Accumulated report per store and advisor
pub async fn accumulated_report(
    State(state): State<AppState>,
    FilterQuery(query): FilterQuery<AccumulatedReportQuery>,
) -> AppResult<Response> {
    let format = OutputFormat::from_param(query.format.as_deref())?;
    let range = resolve_date_range(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        today(),
        state.config.reports.accumulated_default_days,
    )
    .map_err(|msg| AppError::validation("fechaInicio", msg))?;

    let filter = SalesFilter {
        range,
        stores: parse_stores("sucursales", &query.stores)?,
        advisors: parse_advisors("vendedores", &query.advisors)?,
        eligibility: EligibilityFilter::Any,
    };

    let service = ReportingService::new(state.data_source.clone());
    let view = service.accumulated_report(filter).await?;
    respond(format, &view, &view.rows, "reporte_acumulado", render::accumulated_report)
}

/// Daily cash close
pub async fn cash_close(
    State(state): State<AppState>,
    FilterQuery(query): FilterQuery<CashCloseQuery>,
) -> AppResult<Response> {
    let format = OutputFormat::from_param(query.format.as_deref())?;
    let date = match query.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(d) => parse_date(d).map_err(|msg| AppError::validation("fecha", msg))?,
        None => today(),
    };
    let stores = parse_stores("tiendas", &query.stores)?;

    let service = ReportingService::new(state.data_source.clone());
    let view = service.cash_close(date, stores).await?;
    let rows = view.rows();
    respond(format, &view, &rows, "cierre_diario", render::cash_close)
}

/// The accumulated cash close was retired; send visitors back to the menu
pub async fn accumulated_cash_close() -> Redirect {
    Redirect::to("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format() {
        assert_eq!(OutputFormat::from_param(None).unwrap(), OutputFormat::Html);
        assert_eq!(OutputFormat::from_param(Some("csv")).unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_param(Some("json")).unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_param(Some("xlsx")).unwrap(), OutputFormat::Xlsx);
        assert!(OutputFormat::from_param(Some("pdf")).is_err());
    }

    #[test]
    fn test_parse_advisors_rejects_text() {
        let values = vec!["12".to_string(), " ".to_string(), "abc".to_string()];
        let err = parse_advisors("asesores", &values).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "asesores"));
    }

    #[test]
    fn test_parse_stores_skips_blank() {
        let values = vec!["001".to_string(), "".to_string(), "003".to_string()];
        assert_eq!(parse_stores("tiendas", &values).unwrap(), vec!["001", "003"]);
    }
}
