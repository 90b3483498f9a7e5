//! Variance engine: category filter, summary aggregation, ranking by
//! absolute difference and the top-N / remainder partition

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{InventoryDataset, InventoryRecord};

/// Number of records in the ranked top list
pub const TOP_N: usize = 30;

/// Label of the "no filter" option in the category selector
pub const ALL_CATEGORIES: &str = "All";

// ============================================================================
// Category Filter
// ============================================================================

/// Category selection driving every recompute
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// Interpret a selector value. `"All"` (and an absent value) selects
    /// every record; anything else is an exact category match.
    pub fn from_selection(selection: Option<&str>) -> Self {
        match selection {
            None | Some(ALL_CATEGORIES) => CategoryFilter::All,
            Some(category) => CategoryFilter::Only(category.to_string()),
        }
    }

    pub fn matches(&self, record: &InventoryRecord) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => record.category == *category,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Only(category) => category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for CategoryFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for CategoryFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let selection = String::deserialize(deserializer)?;
        Ok(CategoryFilter::from_selection(Some(&selection)))
    }
}

/// Options for the category selector: `"All"` followed by the distinct
/// categories in order of first appearance
pub fn category_options(dataset: &InventoryDataset) -> Vec<String> {
    std::iter::once(ALL_CATEGORIES)
        .chain(dataset.distinct_categories())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Summary
// ============================================================================

/// Aggregate metrics over the filtered records
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VarianceSummary {
    pub item_count: usize,
    pub total_book_stock: Decimal,
    pub total_phys_stock: Decimal,
    pub total_diff_stock: Decimal,
    /// Value totals are present only when the source has a cost column
    pub total_book_value: Option<Decimal>,
    pub total_phys_value: Option<Decimal>,
    pub total_diff_value: Option<Decimal>,
    /// Diff as a percentage of book stock; zero when book stock sums to zero
    pub stock_variance_pct: Decimal,
}

impl VarianceSummary {
    pub fn from_records<'a, I>(records: I, with_values: bool) -> Self
    where
        I: IntoIterator<Item = &'a InventoryRecord>,
    {
        let mut summary = VarianceSummary::default();
        let mut book_value = Decimal::ZERO;
        let mut phys_value = Decimal::ZERO;
        let mut diff_value = Decimal::ZERO;

        // Normalized datasets have totals that fit; others saturate
        let add = |total: &mut Decimal, value: Decimal| {
            let current = *total;
            *total = current
                .checked_add(value)
                .unwrap_or_else(|| current.saturating_add(value));
        };

        for record in records {
            summary.item_count += 1;
            add(&mut summary.total_book_stock, record.book_stock);
            add(&mut summary.total_phys_stock, record.phys_stock);
            add(&mut summary.total_diff_stock, record.diff_stock);
            // Records without a cost are skipped, like blanks in a column sum
            add(&mut book_value, record.book_value.unwrap_or_default());
            add(&mut phys_value, record.phys_value.unwrap_or_default());
            add(&mut diff_value, record.diff_value.unwrap_or_default());
        }

        if with_values {
            summary.total_book_value = Some(book_value);
            summary.total_phys_value = Some(phys_value);
            summary.total_diff_value = Some(diff_value);
        }
        summary.stock_variance_pct =
            variance_pct(summary.total_diff_stock, summary.total_book_stock);
        summary
    }
}

/// `diff / book * 100`, with zero as the defined result for zero book stock
pub fn variance_pct(total_diff: Decimal, total_book: Decimal) -> Decimal {
    if total_book.is_zero() {
        return Decimal::ZERO;
    }
    total_diff
        .checked_div(total_book)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

// ============================================================================
// Ranking & Partition
// ============================================================================

/// Sort by absolute diff, largest first. The sort is stable, so equal
/// magnitudes keep their source order.
pub fn rank_by_abs_diff(records: &mut [&InventoryRecord]) {
    records.sort_by(|a, b| b.abs_diff().cmp(&a.abs_diff()));
}

/// Order for the remainder table: category ascending, then diff descending
pub fn sort_by_category_then_diff(records: &mut [&InventoryRecord]) {
    records.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| b.diff_stock.cmp(&a.diff_stock))
    });
}

/// Everything the dashboard shows for one category selection
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VarianceView<'a> {
    pub category: CategoryFilter,
    pub summary: VarianceSummary,
    /// Largest absolute differences first
    pub top_n: Vec<&'a InventoryRecord>,
    /// Every filtered record not in `top_n`
    pub remainder: Vec<&'a InventoryRecord>,
}

impl VarianceView<'_> {
    pub fn filtered_len(&self) -> usize {
        self.top_n.len() + self.remainder.len()
    }
}

/// Deserializable form of a view, as received by API and WASM clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnedVarianceView {
    pub category: CategoryFilter,
    pub summary: VarianceSummary,
    pub top_n: Vec<InventoryRecord>,
    pub remainder: Vec<InventoryRecord>,
}

/// Stateless recompute of the dashboard view
pub struct VarianceEngine;

impl VarianceEngine {
    /// Filter, summarize, rank and partition.
    ///
    /// Every output is a function of `(dataset, filter, n)` only. An unknown
    /// category produces an empty view, not an error.
    pub fn compute<'a>(
        dataset: &'a InventoryDataset,
        filter: &CategoryFilter,
        n: usize,
    ) -> VarianceView<'a> {
        let filtered: Vec<&InventoryRecord> = Self::filter(dataset, filter);
        let summary = VarianceSummary::from_records(
            filtered.iter().copied(),
            dataset.has_cost_price,
        );

        let mut ranked = filtered;
        rank_by_abs_diff(&mut ranked);
        let split = n.min(ranked.len());
        let mut remainder = ranked.split_off(split);
        sort_by_category_then_diff(&mut remainder);

        VarianceView {
            category: filter.clone(),
            summary,
            top_n: ranked,
            remainder,
        }
    }

    /// Records matching the filter, in source order
    pub fn filter<'a>(
        dataset: &'a InventoryDataset,
        filter: &CategoryFilter,
    ) -> Vec<&'a InventoryRecord> {
        dataset.records.iter().filter(|r| filter.matches(r)).collect()
    }
}

// ============================================================================
// Session
// ============================================================================

/// A dashboard session over one loaded dataset.
///
/// The dataset is shared and immutable; views are recomputed from it on
/// every filter change.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    dataset: Arc<InventoryDataset>,
}

impl DashboardSession {
    pub fn new(dataset: Arc<InventoryDataset>) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &InventoryDataset {
        &self.dataset
    }

    pub fn categories(&self) -> Vec<String> {
        category_options(&self.dataset)
    }

    pub fn view(&self, filter: &CategoryFilter) -> VarianceView<'_> {
        VarianceEngine::compute(&self.dataset, filter, TOP_N)
    }
}
