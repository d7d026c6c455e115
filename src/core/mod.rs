//! Core business logic abstractions

pub mod config;
pub mod error;
pub mod fund;
pub mod log;
pub mod period;
pub mod report;

// Re-export main types for cleaner imports
pub use error::FundError;
pub use fund::{Category, FundDetailRecord, FundRecord, FundRiskRecord};
pub use period::{DateWindow, Period};
pub use report::{Report, ReportRow};
