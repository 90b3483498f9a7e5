//! Stock Variance Dashboard - Backend Server
//!
//! Serves the variance dashboard for a stock count file: summary totals,
//! the items with the largest stock difference and the per-category
//! remainder.

use axum::{routing::get, Router};
use std::sync::{Arc, Mutex};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod models;
mod routes;
mod services;

pub use config::Config;

use error::AppError;
use services::{DashboardService, SourceCache};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dashboard: DashboardService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stock_variance_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Stock Variance Dashboard Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Inventory source: {}", config.source.path.display());

    let cache = Arc::new(Mutex::new(SourceCache::new(config.source.path.clone())));
    let dashboard = DashboardService::new(cache);

    // Warm the cache; a missing or broken file is reported per request instead
    match dashboard.session().await {
        Ok((session, _)) => {
            tracing::info!(records = session.dataset().len(), "Inventory source loaded")
        }
        Err(e) => tracing::warn!("Inventory source not loaded at startup: {}", e),
    }

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        dashboard,
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = config.bind_address();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::dashboard_page))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(format!("Route {}", uri.path()))
}
