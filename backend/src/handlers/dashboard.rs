//! Dashboard API handlers: variance views, table export and reload

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{CategoryFilter, SourceInfo, VarianceView};

use crate::error::{AppError, AppResult};
use crate::models::InventoryDataset;
use crate::services::{DashboardService, DashboardTable};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub category: Option<String>,
    pub format: Option<String>, // "json" or "csv"
}

/// Output format of a record table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Json,
    Csv,
}

impl DashboardQuery {
    pub fn filter(&self) -> CategoryFilter {
        CategoryFilter::from_selection(self.category.as_deref())
    }

    /// Requested table format; JSON when absent
    pub fn table_format(&self) -> AppResult<TableFormat> {
        match self.format.as_deref() {
            None | Some("json") => Ok(TableFormat::Json),
            Some("csv") => Ok(TableFormat::Csv),
            Some(other) => Err(AppError::BadRequest(format!(
                "Unsupported format '{}' (expected json or csv)",
                other
            ))),
        }
    }
}

/// Variance view together with the source it was computed from
#[derive(Serialize)]
pub struct DashboardResponse<'a> {
    pub source: SourceInfo,
    #[serde(flatten)]
    pub view: VarianceView<'a>,
}

#[derive(Serialize)]
pub struct RecordsResponse<'a> {
    pub source: SourceInfo,
    #[serde(flatten)]
    pub dataset: &'a InventoryDataset,
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub source: SourceInfo,
    pub records: usize,
}

/// Category selector options
pub async fn get_categories(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    let (session, _) = state.dashboard.session().await?;
    Ok(Json(session.categories()))
}

/// Summary, ranked top items and remainder for a category
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<impl IntoResponse> {
    let (session, source) = state.dashboard.session().await?;
    let filter = query.filter();
    let view = session.view(&filter);

    tracing::debug!(
        category = %filter,
        items = view.filtered_len(),
        "Computed variance view"
    );

    Ok(Json(DashboardResponse { source, view }).into_response())
}

/// One of the two record tables, as JSON or CSV
pub async fn get_table(
    State(state): State<AppState>,
    Path(table): Path<DashboardTable>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<impl IntoResponse> {
    let format = query.table_format()?;
    let (session, _) = state.dashboard.session().await?;
    let view = session.view(&query.filter());
    let records = match table {
        DashboardTable::Top => &view.top_n,
        DashboardTable::Remainder => &view.remainder,
    };

    if format == TableFormat::Csv {
        let csv = DashboardService::export_table(records, session.dataset().has_cost_price)?;
        let disposition = format!("attachment; filename=\"{}\"", table.file_name());
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(records).into_response())
    }
}

/// The full normalized record set
pub async fn get_records(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let (session, source) = state.dashboard.session().await?;
    Ok(Json(RecordsResponse {
        source,
        dataset: session.dataset(),
    })
    .into_response())
}

/// Drop the cached source and read it again
pub async fn reload_source(State(state): State<AppState>) -> AppResult<Json<ReloadResponse>> {
    let loaded = state.dashboard.reload().await?;
    tracing::info!(
        path = %loaded.info.path,
        records = loaded.dataset.len(),
        "Inventory source reloaded"
    );
    Ok(Json(ReloadResponse {
        source: loaded.info,
        records: loaded.dataset.len(),
    }))
}
