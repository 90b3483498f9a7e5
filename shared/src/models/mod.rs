//! Domain models for the Stock Variance Dashboard

mod stock;

pub use stock::*;
