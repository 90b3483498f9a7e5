//! Stock count models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One stock-keeping unit with its book and physical counts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryRecord {
    /// 1-based data row in the source; the identity of the record
    pub row: usize,
    pub category: String,
    pub item_name: String,
    pub item_no: String,
    pub barcode: String,
    /// System-recorded quantity
    pub book_stock: Decimal,
    /// Physically counted quantity
    pub phys_stock: Decimal,
    /// Physical minus book, unless the source supplied its own value
    pub diff_stock: Decimal,
    pub cost_price: Option<Decimal>,
    pub book_value: Option<Decimal>,
    pub phys_value: Option<Decimal>,
    pub diff_value: Option<Decimal>,
}

impl InventoryRecord {
    /// Build a record from its stock counts.
    ///
    /// `diff_stock` is derived unless `supplied_diff` is given, in which case
    /// the supplied value is kept as-is. Values are computed when a cost is
    /// present. Fails when a derived column does not fit in a `Decimal`.
    pub fn new(
        row: usize,
        identity: ItemIdentity,
        book_stock: Decimal,
        phys_stock: Decimal,
        supplied_diff: Option<Decimal>,
        cost_price: Option<Decimal>,
    ) -> Result<Self, DerivedOverflow> {
        let diff_stock = match supplied_diff {
            Some(diff) => diff,
            None => phys_stock
                .checked_sub(book_stock)
                .ok_or(DerivedOverflow::new("Diff Stock"))?,
        };
        let value = |qty: Decimal, column: &'static str| {
            cost_price
                .map(|c| qty.checked_mul(c).ok_or(DerivedOverflow::new(column)))
                .transpose()
        };

        Ok(Self {
            row,
            category: identity.category,
            item_name: identity.item_name,
            item_no: identity.item_no,
            barcode: identity.barcode,
            book_stock,
            phys_stock,
            diff_stock,
            cost_price,
            book_value: value(book_stock, "Book Value")?,
            phys_value: value(phys_stock, "Phys Value")?,
            diff_value: value(diff_stock, "Diff Value")?,
        })
    }

    /// Ranking key; not part of the output
    pub fn abs_diff(&self) -> Decimal {
        self.diff_stock.abs()
    }
}

/// A derived column whose value does not fit in a `Decimal`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedOverflow {
    pub column: &'static str,
}

impl DerivedOverflow {
    fn new(column: &'static str) -> Self {
        Self { column }
    }
}

/// Identifying columns of a record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemIdentity {
    pub category: String,
    pub item_name: String,
    pub item_no: String,
    pub barcode: String,
}

/// The normalized record set of one source
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InventoryDataset {
    pub records: Vec<InventoryRecord>,
    /// The source carried its own `Diff Stock` column
    pub diff_stock_supplied: bool,
    /// The source carried a `Cost Price` column
    pub has_cost_price: bool,
}

impl InventoryDataset {
    pub fn new(
        records: Vec<InventoryRecord>,
        diff_stock_supplied: bool,
        has_cost_price: bool,
    ) -> Self {
        Self {
            records,
            diff_stock_supplied,
            has_cost_price,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct categories in order of first appearance
    pub fn distinct_categories(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.records
            .iter()
            .map(|r| r.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }
}
