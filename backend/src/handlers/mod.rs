//! HTTP handlers for the dashboard pages

pub mod extract;
pub mod health;
pub mod inventory;
pub mod reporting;

pub use extract::FilterQuery;
pub use health::*;
pub use inventory::*;
pub use reporting::*;
