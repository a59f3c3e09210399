//! Route definitions for the retail reporting dashboard

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Dashboard pages. Paths are the ones store staff already bookmark.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::menu))
        .route("/health", get(handlers::health_check))
        // Inventory snapshot
        .route("/inventario", get(handlers::get_inventory))
        .route("/cargar-inventario-manual", get(handlers::refresh_inventory))
        // Sales reports
        .route("/reporte-diario", get(handlers::daily_report))
        .route("/reporte-acumulado", get(handlers::accumulated_report))
        // Cash close
        .route("/cierre-diario", get(handlers::cash_close))
        .route("/cierre-acumulado", get(handlers::accumulated_cash_close))
}
