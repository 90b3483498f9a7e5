//! HTTP handlers for the Stock Variance Dashboard

pub mod dashboard;
pub mod health;
pub mod page;

pub use dashboard::{get_categories, get_dashboard, get_records, get_table, reload_source};
pub use health::health_check;
pub use page::dashboard_page;
