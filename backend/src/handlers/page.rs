//! Server-rendered dashboard page

use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use shared::{CategoryFilter, InventoryRecord, SourceInfo, VarianceSummary, TOP_N};

use super::dashboard::DashboardQuery;
use crate::error::AppResult;
use crate::services::format::{format_amount, format_pct};
use crate::AppState;

/// Category option for the selector.
#[derive(Debug, Clone)]
pub struct CategoryOptionView {
    pub value: String,
    pub selected: bool,
}

/// Summary card view.
#[derive(Debug, Clone)]
pub struct SummaryCardView {
    pub title: String,
    pub value: String,
    pub subtitle: String,
}

/// One bar of the top items chart.
#[derive(Debug, Clone)]
pub struct BarView {
    pub label: String,
    pub value: String,
    pub width_pct: u32,
    pub class: String,
    pub tooltip: String,
}

/// Table row view.
#[derive(Debug, Clone)]
pub struct RowView {
    pub category: String,
    pub item_name: String,
    pub item_no: String,
    pub barcode: String,
    pub book_stock: String,
    pub phys_stock: String,
    pub diff_stock: String,
    pub book_value: String,
    pub phys_value: String,
    pub diff_value: String,
}

/// Dashboard page template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPageTemplate {
    pub categories: Vec<CategoryOptionView>,
    pub cards: Vec<SummaryCardView>,
    pub top_count: usize,
    pub bars: Vec<BarView>,
    pub has_values: bool,
    pub top_rows: Vec<RowView>,
    pub remainder_rows: Vec<RowView>,
    pub source_path: String,
    pub loaded_at: String,
}

fn plain(value: Decimal) -> String {
    value.normalize().to_string()
}

fn money(value: Option<Decimal>) -> String {
    value.map(|v| format_amount(v, 2)).unwrap_or_default()
}

impl From<&InventoryRecord> for RowView {
    fn from(r: &InventoryRecord) -> Self {
        Self {
            category: r.category.clone(),
            item_name: r.item_name.clone(),
            item_no: r.item_no.clone(),
            barcode: r.barcode.clone(),
            book_stock: plain(r.book_stock),
            phys_stock: plain(r.phys_stock),
            diff_stock: plain(r.diff_stock),
            book_value: money(r.book_value),
            phys_value: money(r.phys_value),
            diff_value: money(r.diff_value),
        }
    }
}

/// Summary cards: stock totals with their values, then the variance
pub fn summary_cards(summary: &VarianceSummary, currency: &str) -> Vec<SummaryCardView> {
    let subtitle = |value: Option<Decimal>| {
        value
            .map(|v| format!("{} {}", currency, format_amount(v, 0)))
            .unwrap_or_default()
    };

    vec![
        SummaryCardView {
            title: "System Stock".to_string(),
            value: format_amount(summary.total_book_stock, 0),
            subtitle: subtitle(summary.total_book_value),
        },
        SummaryCardView {
            title: "Physical Stock".to_string(),
            value: format_amount(summary.total_phys_stock, 0),
            subtitle: subtitle(summary.total_phys_value),
        },
        SummaryCardView {
            title: "Stock Difference".to_string(),
            value: format_amount(summary.total_diff_stock, 0),
            subtitle: subtitle(summary.total_diff_value),
        },
        SummaryCardView {
            title: "Stock Variance %".to_string(),
            value: format_pct(summary.stock_variance_pct),
            subtitle: String::new(),
        },
    ]
}

/// Bars scaled against the largest absolute difference. The tooltip carries
/// the value columns when the source has a cost price.
pub fn chart_bars(top_n: &[&InventoryRecord], has_values: bool) -> Vec<BarView> {
    let max = top_n
        .iter()
        .map(|r| r.abs_diff())
        .max()
        .unwrap_or_default();

    top_n
        .iter()
        .map(|r| {
            // abs_diff <= max, so the ratio is at most one
            let width_pct = r
                .abs_diff()
                .checked_div(max)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .and_then(|pct| pct.round().to_u32())
                .unwrap_or(0);
            let class = if r.diff_stock.is_sign_negative() && !r.diff_stock.is_zero() {
                "short"
            } else {
                "over"
            };

            let mut tooltip = format!(
                "{} | Item No {} | Barcode {} | Book {} | Phys {}",
                r.category,
                r.item_no,
                r.barcode,
                plain(r.book_stock),
                plain(r.phys_stock)
            );
            if has_values {
                tooltip.push_str(&format!(
                    " | Book Value {} | Phys Value {} | Diff Value {}",
                    money(r.book_value),
                    money(r.phys_value),
                    money(r.diff_value)
                ));
            }

            BarView {
                label: r.item_name.clone(),
                value: plain(r.diff_stock),
                width_pct,
                class: class.to_string(),
                tooltip,
            }
        })
        .collect()
}

fn build_page(
    categories: Vec<String>,
    filter: &CategoryFilter,
    summary: &VarianceSummary,
    top_n: &[&InventoryRecord],
    remainder: &[&InventoryRecord],
    has_values: bool,
    currency: &str,
    source: &SourceInfo,
) -> DashboardPageTemplate {
    DashboardPageTemplate {
        categories: categories
            .into_iter()
            .map(|value| CategoryOptionView {
                selected: value == filter.label(),
                value,
            })
            .collect(),
        cards: summary_cards(summary, currency),
        top_count: TOP_N,
        bars: chart_bars(top_n, has_values),
        has_values,
        top_rows: top_n.iter().map(|r| RowView::from(*r)).collect(),
        remainder_rows: remainder.iter().map(|r| RowView::from(*r)).collect(),
        source_path: source.path.clone(),
        loaded_at: source.loaded_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    }
}

/// Dashboard page handler
pub async fn dashboard_page(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Html<String>> {
    let (session, source) = state.dashboard.session().await?;
    let filter = query.filter();
    let view = session.view(&filter);

    let template = build_page(
        session.categories(),
        &filter,
        &view.summary,
        &view.top_n,
        &view.remainder,
        session.dataset().has_cost_price,
        &state.config.dashboard.currency,
        &source,
    );

    Ok(Html(template.render()?))
}
