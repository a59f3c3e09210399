//! Retail reporting dashboard
//!
//! Read-only reporting over the ERP database for store staff: a manually
//! refreshed inventory snapshot, daily and accumulated sales reports, and the
//! daily cash close.

use axum::{
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Router,
};
use std::{any::Any, sync::Arc};
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer,
    set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

pub mod cache;
pub mod config;
pub mod data_source;
pub mod error;
pub mod handlers;
pub mod render;
pub mod routes;
pub mod services;

pub use crate::cache::SnapshotCache;
pub use crate::config::Config;
pub use crate::data_source::DataSource;

use error::AppError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub data_source: Arc<dyn DataSource>,
    pub cache: Arc<SnapshotCache>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(data_source: Arc<dyn DataSource>, config: Config) -> Self {
        Self {
            data_source,
            cache: Arc::new(SnapshotCache::new(config.cache.file.clone())),
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::dashboard_routes())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("ngrok-skip-browser-warning"),
            HeaderValue::from_static("true"),
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A panicking handler becomes a 500 error page; the server keeps running.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    AppError::Internal(message).into_response()
}
