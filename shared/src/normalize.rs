//! Normalization of decoded tabular sources into typed inventory records
//!
//! Headers are trimmed, required columns are checked once, and derived
//! columns are filled in. Everything downstream works on `InventoryRecord`.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{LoadError, LoadResult};
use crate::models::{InventoryDataset, InventoryRecord, ItemIdentity};
use crate::types::{Cell, RawTable};

// ============================================================================
// Column Labels
// ============================================================================

pub const COL_CATEGORY: &str = "Category";
pub const COL_ITEM_NAME: &str = "Item Name";
pub const COL_ITEM_NO: &str = "Item No";
pub const COL_BARCODE: &str = "Barcode";
pub const COL_BOOK_STOCK: &str = "Book Stock";
pub const COL_PHYS_STOCK: &str = "Phys Stock";
pub const COL_COST_PRICE: &str = "Cost Price";
pub const COL_DIFF_STOCK: &str = "Diff Stock";

static EMPTY_CELL: Cell = Cell::Empty;

/// Columns every source must carry, in canonical order
pub const REQUIRED_COLUMNS: &[&str] = &[
    COL_CATEGORY,
    COL_ITEM_NAME,
    COL_ITEM_NO,
    COL_BARCODE,
    COL_BOOK_STOCK,
    COL_PHYS_STOCK,
];

// ============================================================================
// Column Resolution
// ============================================================================

/// Positions of the known columns within a source row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    category: usize,
    item_name: usize,
    item_no: usize,
    barcode: usize,
    book_stock: usize,
    phys_stock: usize,
    cost_price: Option<usize>,
    diff_stock: Option<usize>,
}

impl ColumnMap {
    /// Resolve column positions from raw header labels.
    ///
    /// Labels are matched after trimming surrounding whitespace; case and
    /// inner spacing must match exactly. The first occurrence of a repeated
    /// label wins.
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> LoadResult<Self> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            positions.entry(header.as_ref().trim()).or_insert(idx);
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !positions.contains_key(**c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns { columns: missing });
        }

        // Presence of every required column was checked above
        let at = |name: &str| positions.get(name).copied().unwrap_or_default();

        Ok(Self {
            category: at(COL_CATEGORY),
            item_name: at(COL_ITEM_NAME),
            item_no: at(COL_ITEM_NO),
            barcode: at(COL_BARCODE),
            book_stock: at(COL_BOOK_STOCK),
            phys_stock: at(COL_PHYS_STOCK),
            cost_price: positions.get(COL_COST_PRICE).copied(),
            diff_stock: positions.get(COL_DIFF_STOCK).copied(),
        })
    }

    pub fn has_cost_price(&self) -> bool {
        self.cost_price.is_some()
    }

    pub fn has_diff_stock(&self) -> bool {
        self.diff_stock.is_some()
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Turn a decoded table into the normalized dataset.
///
/// Fails with `MissingColumns` when a required column is absent after
/// trimming, and with `InvalidNumber` when a numeric cell holds text that is
/// not a number. Rows where every cell is blank are skipped; row numbers
/// still count them so they match the source.
pub fn normalize(table: &RawTable) -> LoadResult<InventoryDataset> {
    let columns = ColumnMap::resolve(&table.headers)?;
    let mut records = Vec::with_capacity(table.rows.len());

    for (idx, cells) in table.rows.iter().enumerate() {
        if cells.iter().all(Cell::is_blank) {
            continue;
        }
        let row = idx + 1;
        let cell = |pos: usize| cells.get(pos).unwrap_or(&EMPTY_CELL);
        let number = |pos: usize, column: &str| {
            parse_number(cell(pos), row, column).map(|n| n.unwrap_or(Decimal::ZERO))
        };

        let identity = ItemIdentity {
            category: cell(columns.category).to_text(),
            item_name: cell(columns.item_name).to_text(),
            item_no: cell(columns.item_no).to_text(),
            barcode: cell(columns.barcode).to_text(),
        };
        let book_stock = number(columns.book_stock, COL_BOOK_STOCK)?;
        let phys_stock = number(columns.phys_stock, COL_PHYS_STOCK)?;
        let supplied_diff = match columns.diff_stock {
            Some(pos) => Some(number(pos, COL_DIFF_STOCK)?),
            None => None,
        };
        let cost_price = match columns.cost_price {
            Some(pos) => parse_number(cell(pos), row, COL_COST_PRICE)?,
            None => None,
        };

        let record = InventoryRecord::new(
            row,
            identity,
            book_stock,
            phys_stock,
            supplied_diff,
            cost_price,
        )
        .map_err(|e| LoadError::ValueOverflow {
            row,
            column: e.column.to_string(),
        })?;
        records.push(record);
    }

    check_totals(&records)?;

    Ok(InventoryDataset::new(
        records,
        columns.has_diff_stock(),
        columns.has_cost_price(),
    ))
}

/// Every summed column must have an absolute total that fits in a `Decimal`,
/// so the summary of any category subset fits as well
fn check_totals(records: &[InventoryRecord]) -> LoadResult<()> {
    const SUMMED: [&str; 6] = [
        COL_BOOK_STOCK,
        COL_PHYS_STOCK,
        COL_DIFF_STOCK,
        "Book Value",
        "Phys Value",
        "Diff Value",
    ];
    let mut totals = [Decimal::ZERO; 6];

    for r in records {
        let values = [
            Some(r.book_stock),
            Some(r.phys_stock),
            Some(r.diff_stock),
            r.book_value,
            r.phys_value,
            r.diff_value,
        ];
        for ((total, value), column) in totals.iter_mut().zip(values).zip(SUMMED) {
            let Some(value) = value else { continue };
            *total = total
                .checked_add(value.abs())
                .ok_or_else(|| LoadError::ValueOverflow {
                    row: r.row,
                    column: column.to_string(),
                })?;
        }
    }
    Ok(())
}

/// Read a numeric cell. Blank cells yield `None`.
fn parse_number(cell: &Cell, row: usize, column: &str) -> LoadResult<Option<Decimal>> {
    match cell {
        Cell::Number(n) => Ok(Some(*n)),
        Cell::Empty => Ok(None),
        Cell::Text(s) if s.trim().is_empty() => Ok(None),
        Cell::Text(s) => parse_decimal(s).map(Some).ok_or_else(|| LoadError::InvalidNumber {
            row,
            column: column.to_string(),
            value: s.clone(),
        }),
    }
}

/// Parse a decimal written as plain or scientific notation, allowing `,`
/// thousands separators
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}
