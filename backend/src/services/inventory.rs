//! Inventory service: manual refresh of the snapshot cache and the view model
//! of the inventory page

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{InventoryItem, InventorySnapshot};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::SnapshotCache;
use crate::data_source::DataSource;
use crate::error::{AppError, AppResult};

/// Inventory service tying the data source to the snapshot cache
#[derive(Clone)]
pub struct InventoryService {
    data_source: Arc<dyn DataSource>,
    cache: Arc<SnapshotCache>,
    refresh_timeout: Duration,
}

/// Outcome of a manual refresh, as reported to the page script
#[derive(Debug, Serialize)]
pub struct RefreshOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RefreshOutcome {
    pub fn succeeded(items: usize) -> Self {
        Self {
            success: true,
            message: Some("Inventario cargado correctamente".to_string()),
            items: Some(items),
            error: None,
        }
    }

    pub fn failed(error: &AppError) -> Self {
        let (_, detail) = error.detail();
        Self {
            success: false,
            message: None,
            items: None,
            error: Some(detail.message_es),
        }
    }
}

/// Inventory page view model
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryView {
    pub items: Vec<InventoryItem>,
    pub captured_at: DateTime<Utc>,
    /// Minutes since capture
    pub age_minutes: i64,
    pub item_count: usize,
    pub total_on_hand: Decimal,
    pub total_available: Decimal,
    pub total_in_transit: Decimal,
}

impl InventoryView {
    pub fn new(snapshot: &InventorySnapshot, now: DateTime<Utc>) -> Self {
        Self {
            items: snapshot.items.clone(),
            captured_at: snapshot.captured_at,
            age_minutes: (now - snapshot.captured_at).num_minutes().max(0),
            item_count: snapshot.len(),
            total_on_hand: snapshot.items.iter().map(InventoryItem::total_on_hand).sum(),
            total_available: snapshot.items.iter().map(InventoryItem::total_available).sum(),
            total_in_transit: snapshot.items.iter().map(|i| i.transit_available).sum(),
        }
    }
}

impl InventoryService {
    pub fn new(
        data_source: Arc<dyn DataSource>,
        cache: Arc<SnapshotCache>,
        refresh_timeout: Duration,
    ) -> Self {
        Self {
            data_source,
            cache,
            refresh_timeout,
        }
    }

    /// Current inventory view, or `None` when nothing has ever been loaded
    pub async fn current_view(&self) -> Option<InventoryView> {
        let snapshot = self.cache.get().await?;
        Some(InventoryView::new(&snapshot, Utc::now()))
    }

    /// Fetch inventory rows from the ERP and replace the cached snapshot.
    ///
    /// If the snapshot cannot be written to disk the error is returned, but
    /// the new snapshot is already being served from memory.
    pub async fn refresh(&self) -> AppResult<Arc<InventorySnapshot>> {
        tracing::info!("Loading inventory from the ERP (manual refresh)");

        let rows = tokio::time::timeout(self.refresh_timeout, self.data_source.fetch_inventory())
            .await
            .map_err(|_| AppError::Timeout {
                seconds: self.refresh_timeout.as_secs(),
            })??;

        let snapshot = self.cache.refresh(rows).await?;
        tracing::info!("Inventory refreshed: {} items", snapshot.len());
        Ok(snapshot)
    }
}
