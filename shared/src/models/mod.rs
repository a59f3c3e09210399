//! Domain models for the reporting dashboard

mod inventory;
mod report;

pub use inventory::*;
pub use report::*;
