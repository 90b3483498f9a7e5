//! Dashboard service: session access over the cached source and table
//! export

use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{DashboardSession, InventoryRecord, LoadResult, SourceInfo};

use super::cache::{LoadedSource, SourceCache};
use crate::error::{AppError, AppResult};

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    cache: Arc<Mutex<SourceCache>>,
}

/// The two record tables shown under the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardTable {
    Top,
    Remainder,
}

impl DashboardTable {
    pub fn file_name(&self) -> &'static str {
        match self {
            DashboardTable::Top => "top_items.csv",
            DashboardTable::Remainder => "items_by_category.csv",
        }
    }
}

/// Key columns of a table row
#[derive(Debug, Serialize)]
pub struct StockRow<'a> {
    #[serde(rename = "Category")]
    pub category: &'a str,
    #[serde(rename = "Item Name")]
    pub item_name: &'a str,
    #[serde(rename = "Item No")]
    pub item_no: &'a str,
    #[serde(rename = "Barcode")]
    pub barcode: &'a str,
    #[serde(rename = "Book Stock")]
    pub book_stock: Decimal,
    #[serde(rename = "Phys Stock")]
    pub phys_stock: Decimal,
    #[serde(rename = "Diff Stock")]
    pub diff_stock: Decimal,
}

/// Key columns plus value columns, for sources with a cost price
#[derive(Debug, Serialize)]
pub struct ValuedStockRow<'a> {
    #[serde(rename = "Category")]
    pub category: &'a str,
    #[serde(rename = "Item Name")]
    pub item_name: &'a str,
    #[serde(rename = "Item No")]
    pub item_no: &'a str,
    #[serde(rename = "Barcode")]
    pub barcode: &'a str,
    #[serde(rename = "Book Stock")]
    pub book_stock: Decimal,
    #[serde(rename = "Phys Stock")]
    pub phys_stock: Decimal,
    #[serde(rename = "Diff Stock")]
    pub diff_stock: Decimal,
    #[serde(rename = "Book Value")]
    pub book_value: Option<Decimal>,
    #[serde(rename = "Phys Value")]
    pub phys_value: Option<Decimal>,
    #[serde(rename = "Diff Value")]
    pub diff_value: Option<Decimal>,
}

impl<'a> From<&'a InventoryRecord> for StockRow<'a> {
    fn from(r: &'a InventoryRecord) -> Self {
        Self {
            category: &r.category,
            item_name: &r.item_name,
            item_no: &r.item_no,
            barcode: &r.barcode,
            book_stock: r.book_stock,
            phys_stock: r.phys_stock,
            diff_stock: r.diff_stock,
        }
    }
}

impl<'a> From<&'a InventoryRecord> for ValuedStockRow<'a> {
    fn from(r: &'a InventoryRecord) -> Self {
        Self {
            category: &r.category,
            item_name: &r.item_name,
            item_no: &r.item_no,
            barcode: &r.barcode,
            book_stock: r.book_stock,
            phys_stock: r.phys_stock,
            diff_stock: r.diff_stock,
            book_value: r.book_value,
            phys_value: r.phys_value,
            diff_value: r.diff_value,
        }
    }
}

impl DashboardService {
    pub fn new(cache: Arc<Mutex<SourceCache>>) -> Self {
        Self { cache }
    }

    /// Open a session over the current source, loading it if needed
    pub async fn session(&self) -> AppResult<(DashboardSession, SourceInfo)> {
        let loaded = self.with_cache(|cache| cache.get_or_load()).await?;
        Ok((DashboardSession::new(loaded.dataset), loaded.info))
    }

    /// Read the source again, replacing the cached dataset on success
    pub async fn reload(&self) -> AppResult<LoadedSource> {
        self.with_cache(|cache| cache.reload()).await
    }

    /// Info of the cached source without reading the file
    pub fn cached_info(&self) -> Option<SourceInfo> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.cached_info().cloned()
    }

    async fn with_cache<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut SourceCache) -> LoadResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || {
            // The cache only swaps whole entries, so a poisoned guard is still consistent
            let mut guard = cache.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut *guard).map_err(AppError::from)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Source loader task failed: {}", e)))?
    }

    /// Export a record table as CSV with the dashboard's key columns
    pub fn export_table(records: &[&InventoryRecord], with_values: bool) -> AppResult<String> {
        if with_values {
            let rows: Vec<ValuedStockRow> = records.iter().map(|r| ValuedStockRow::from(*r)).collect();
            Self::export_to_csv(&rows)
        } else {
            let rows: Vec<StockRow> = records.iter().map(|r| StockRow::from(*r)).collect();
            Self::export_to_csv(&rows)
        }
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record).map_err(|e| {
                AppError::Internal(format!("CSV serialization error: {}", e))
            })?;
        }
        let csv_data = String::from_utf8(wtr.into_inner().map_err(|e| {
            AppError::Internal(format!("CSV writer error: {}", e))
        })?)
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
