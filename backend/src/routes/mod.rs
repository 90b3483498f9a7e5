//! Route definitions for the Stock Variance Dashboard

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(handlers::get_categories))
        .nest("/dashboard", dashboard_routes())
        .route("/records", get(handlers::get_records))
        .route("/reload", post(handlers::reload_source))
}

/// Variance view and table export routes
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_dashboard))
        // top | remainder, ?format=csv for a download
        .route("/:table", get(handlers::get_table))
}
