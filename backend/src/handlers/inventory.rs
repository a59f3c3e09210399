//! Inventory page and manual refresh handlers

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::extract::FilterQuery;
use crate::handlers::reporting::OutputFormat;
use crate::render;
use crate::services::inventory::RefreshOutcome;
use crate::services::InventoryService;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct InventoryQuery {
    pub format: Option<String>,
}

fn service(state: &AppState) -> InventoryService {
    InventoryService::new(
        state.data_source.clone(),
        state.cache.clone(),
        state.config.reports.refresh_timeout(),
    )
}

/// Render the cached inventory snapshot, or the empty state when nothing has
/// been loaded yet. Never touches the ERP.
pub async fn get_inventory(
    State(state): State<AppState>,
    FilterQuery(query): FilterQuery<InventoryQuery>,
) -> AppResult<Response> {
    let format = OutputFormat::from_param(query.format.as_deref())?;
    let view = service(&state).current_view().await;

    let response = match (format, view) {
        (OutputFormat::Json, view) => Json(view).into_response(),
        (_, Some(view)) => render::inventory(&view).into_response(),
        (_, None) => render::inventory_empty().into_response(),
    };
    Ok(response)
}

/// Manual refresh. Always answers 200; the page script reads `success`.
pub async fn refresh_inventory(State(state): State<AppState>) -> Json<RefreshOutcome> {
    match service(&state).refresh().await {
        Ok(snapshot) => Json(RefreshOutcome::succeeded(snapshot.len())),
        Err(e) => {
            tracing::error!("Manual inventory refresh failed: {}", e);
            Json(RefreshOutcome::failed(&e))
        }
    }
}

/// Main menu
pub async fn menu() -> Html<String> {
    render::menu()
}
