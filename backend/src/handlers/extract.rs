//! Request extractors

use axum::extract::FromRequestParts;

use crate::error::AppError;

/// Query string extractor accepting repeated multi-select keys. A query that
/// does not deserialize is answered with the 400 error page instead of
/// axum's plain-text rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum_extra::extract::Query), rejection(AppError))]
pub struct FilterQuery<T>(pub T);
