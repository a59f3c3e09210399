//! Business logic services for the reporting dashboard

pub mod inventory;
pub mod reporting;

pub use inventory::InventoryService;
pub use reporting::ReportingService;
