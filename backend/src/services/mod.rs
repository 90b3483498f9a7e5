//! Services for the Stock Variance Dashboard

pub mod cache;
pub mod dashboard;
pub mod format;
pub mod loader;

pub use cache::SourceCache;
pub use dashboard::{DashboardService, DashboardTable};
