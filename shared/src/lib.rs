//! Shared types and report logic for the retail reporting dashboard
//!
//! This crate holds the domain models and the pure aggregation functions.
//! It performs no I/O.

pub mod aggregate;
pub mod models;
pub mod types;
pub mod validation;

pub use aggregate::*;
pub use models::*;
pub use types::*;
pub use validation::*;
