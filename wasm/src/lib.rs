//! WebAssembly module for the Stock Variance Dashboard
//!
//! Recomputes the dashboard view in the browser from the dataset served by
//! `/api/v1/records`, so category changes need no round trip:
//! - Category selector options
//! - Summary, top items and remainder for a category
//! - Variance percentage

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::variance::*;

fn parse_dataset(dataset_json: &str) -> Result<InventoryDataset, String> {
    serde_json::from_str(dataset_json).map_err(|e| format!("Invalid dataset JSON: {}", e))
}

/// Variance view JSON for a category selection; `None` or `"All"` selects
/// every record
pub fn view_json(dataset_json: &str, category: Option<&str>) -> Result<String, String> {
    let dataset = parse_dataset(dataset_json)?;
    let filter = CategoryFilter::from_selection(category);
    let view = VarianceEngine::compute(&dataset, &filter, TOP_N);
    serde_json::to_string(&view).map_err(|e| format!("Failed to serialize view: {}", e))
}

/// Selector options: `All` followed by each category in first appearance order
pub fn category_list(dataset_json: &str) -> Result<Vec<String>, String> {
    parse_dataset(dataset_json).map(|dataset| category_options(&dataset))
}

/// Compute the dashboard view for a category
#[wasm_bindgen]
pub fn compute_view(dataset_json: &str, category: Option<String>) -> Result<String, JsValue> {
    view_json(dataset_json, category.as_deref()).map_err(|e| {
        web_sys::console::warn_1(&JsValue::from_str(&e));
        JsValue::from_str(&e)
    })
}

/// Category selector options
#[wasm_bindgen]
pub fn category_selector_options(dataset_json: &str) -> Result<js_sys::Array, JsValue> {
    let categories = category_list(dataset_json).map_err(|e| JsValue::from_str(&e))?;
    Ok(categories.into_iter().map(JsValue::from).collect())
}

/// Stock variance percentage; zero when book stock is zero
#[wasm_bindgen]
pub fn stock_variance_percentage(total_diff: f64, total_book: f64) -> f64 {
    let diff = Decimal::try_from(total_diff).unwrap_or(Decimal::ZERO);
    let book = Decimal::try_from(total_book).unwrap_or(Decimal::ZERO);
    variance_pct(diff, book).to_string().parse().unwrap_or(0.0)
}
