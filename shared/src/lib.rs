//! Shared types and computation for the Stock Variance Dashboard
//!
//! This crate contains the record model, the loader normalization step and
//! the variance engine. It is used by the backend server and, via WASM, by
//! the browser dashboard.

pub mod error;
pub mod models;
pub mod normalize;
pub mod types;
pub mod variance;

pub use error::*;
pub use models::*;
pub use normalize::*;
pub use types::*;
pub use variance::*;
