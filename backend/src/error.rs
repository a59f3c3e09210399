//! Error handling for the retail reporting dashboard
//!
//! Errors are rendered as an HTML error page carrying both an English and a
//! Spanish message. Staff read the Spanish one; the English one goes to logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::QueryRejection;
use serde::Serialize;
use thiserror::Error;

use crate::cache::CacheError;
use crate::render;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Data source errors
    #[error("Cannot reach the ERP database: {0}")]
    Connection(String),

    #[error("Query rejected by the ERP database: {0}")]
    Query(String),

    #[error("Operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    // Snapshot cache errors
    #[error("Snapshot persistence error: {0}")]
    Persistence(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::WorkerCrashed => AppError::Connection(err.to_string()),
            other => AppError::Query(other.to_string()),
        }
    }
}

// A corrupt file only surfaces through `SnapshotCache::load_persisted`, so
// every cache error reaching a handler is a persistence failure.
impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::Persistence(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Internal(format!("CSV serialization error: {}", err))
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Internal(format!("Excel export error: {}", err))
    }
}

/// Malformed query strings (a repeated scalar key, a non-numeric value where
/// a number is expected) get the same 400 page as every other bad filter.
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation("query", rejection.to_string())
    }
}

/// Error detail shown on the error page
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_es: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    /// HTTP status and user-facing detail for this error
    pub fn detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::Connection(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONNECTION_ERROR".to_string(),
                    message_en: format!("Cannot reach the ERP database: {}", msg),
                    message_es: format!("No se pudo conectar a la base de datos: {}", msg),
                    field: None,
                },
            ),
            AppError::Query(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "QUERY_ERROR".to_string(),
                    message_en: format!("The report query failed: {}", msg),
                    message_es: format!("Error al ejecutar la consulta: {}", msg),
                    field: None,
                },
            ),
            AppError::Timeout { seconds } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "TIMEOUT".to_string(),
                    message_en: format!("The query took longer than {} seconds", seconds),
                    message_es: format!("Timeout: La consulta tardó más de {} segundos.", seconds),
                    field: None,
                },
            ),
            AppError::Persistence(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "PERSISTENCE_ERROR".to_string(),
                    message_en: format!("Could not save the inventory cache: {}", msg),
                    message_es: format!("Error al guardar caché en archivo: {}", msg),
                    field: None,
                },
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_es: format!("Parámetro inválido '{}': {}", field, message),
                    field: Some(field.clone()),
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_es: "Error interno del servidor".to_string(),
                    field: None,
                },
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = self.detail();

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, render::error_page(status, &detail)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_connection_error() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::Connection(_)));
    }

    #[test]
    fn test_row_not_found_is_query_error() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::Query(_)));
    }

    #[test]
    fn test_corrupt_cache_file_is_persistence_error() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AppError = CacheError::Parse {
            path: "inventario_cache.json".into(),
            source,
        }
        .into();
        assert!(matches!(err, AppError::Persistence(_)));
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let (status, detail) = AppError::validation("fechaInicio", "bad date").detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.field.as_deref(), Some("fechaInicio"));
    }
}
