//! Inventory models for the Stock Variance Dashboard
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
