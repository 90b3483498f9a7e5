//! Scoped cache of the loaded inventory source
//!
//! The dataset is keyed by the source path and its modification time. A
//! changed file is reloaded on the next access; `reload` forces one.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use shared::{InventoryDataset, LoadError, LoadResult, SourceInfo};

use super::loader::load_source;

/// A loaded source and where it came from
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub dataset: Arc<InventoryDataset>,
    pub info: SourceInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceKey {
    path: PathBuf,
    modified: Option<SystemTime>,
}

/// Load-once cache for a single source path
#[derive(Debug)]
pub struct SourceCache {
    path: PathBuf,
    entry: Option<(SourceKey, LoadedSource)>,
    loads: u64,
}

impl SourceCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entry: None,
            loads: 0,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.entry.is_some()
    }

    /// Number of times the source file has actually been read
    pub fn loads(&self) -> u64 {
        self.loads
    }

    /// Info of the cached source, if any, without touching the file
    pub fn cached_info(&self) -> Option<&SourceInfo> {
        self.entry.as_ref().map(|(_, loaded)| &loaded.info)
    }

    /// Return the cached dataset, reading the source if it is not cached or
    /// its modification time changed
    pub fn get_or_load(&mut self) -> LoadResult<LoadedSource> {
        let key = self.current_key()?;

        if let Some((cached_key, loaded)) = &self.entry {
            if *cached_key == key {
                return Ok(loaded.clone());
            }
            tracing::warn!(
                path = %self.path.display(),
                "Inventory source changed on disk, reloading"
            );
        }

        let loaded = self.read(&key)?;
        self.entry = Some((key, loaded.clone()));
        Ok(loaded)
    }

    /// Read the source again whether or not it changed. The cached entry is
    /// replaced only when the read succeeds.
    pub fn reload(&mut self) -> LoadResult<LoadedSource> {
        let key = self.current_key()?;
        let loaded = self.read(&key)?;
        if self.entry.is_some() {
            tracing::info!(path = %self.path.display(), "Inventory source cache replaced");
        }
        self.entry = Some((key, loaded.clone()));
        Ok(loaded)
    }

    fn current_key(&self) -> LoadResult<SourceKey> {
        let metadata = std::fs::metadata(&self.path)
            .map_err(|e| LoadError::source_read(self.path.display().to_string(), e))?;
        Ok(SourceKey {
            path: self.path.clone(),
            modified: metadata.modified().ok(),
        })
    }

    fn read(&mut self, key: &SourceKey) -> LoadResult<LoadedSource> {
        let dataset = load_source(&key.path)?;
        self.loads += 1;

        Ok(LoadedSource {
            dataset: Arc::new(dataset),
            info: SourceInfo {
                path: key.path.display().to_string(),
                modified_at: key.modified.map(DateTime::<Utc>::from),
                loaded_at: Utc::now(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    const HEADER: &str = "Category,Item Name,Item No,Barcode,Book Stock,Phys Stock\n";

    fn write_source(rows: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        file.write_all(rows.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_second_access_is_served_from_cache() {
        let file = write_source("A,Bolt,1,111,10,8\n");
        let mut cache = SourceCache::new(file.path());

        let first = cache.get_or_load().unwrap();
        let second = cache.get_or_load().unwrap();

        assert_eq!(cache.loads(), 1);
        assert!(Arc::ptr_eq(&first.dataset, &second.dataset));
        assert!(cache.is_loaded());
    }

    #[test]
    fn test_reload_reads_unchanged_file() {
        let file = write_source("A,Bolt,1,111,10,8\n");
        let mut cache = SourceCache::new(file.path());

        let first = cache.get_or_load().unwrap();
        let reloaded = cache.reload().unwrap();
        assert_eq!(cache.loads(), 2);
        assert!(!Arc::ptr_eq(&first.dataset, &reloaded.dataset));

        // The reloaded entry is what later accesses see
        let next = cache.get_or_load().unwrap();
        assert!(Arc::ptr_eq(&reloaded.dataset, &next.dataset));
    }

    #[test]
    fn test_failed_reload_keeps_previous_entry() {
        let file = write_source("A,Bolt,1,111,10,8\n");
        let mut cache = SourceCache::new(file.path());
        cache.get_or_load().unwrap();

        std::fs::write(file.path(), "Category\nA\n").unwrap();
        assert!(matches!(cache.reload(), Err(LoadError::MissingColumns { .. })));
        assert!(cache.is_loaded());
        assert_eq!(cache.cached_info().map(|i| i.path.clone()), Some(file.path().display().to_string()));
    }

    #[test]
    fn test_modified_file_is_reloaded() {
        let file = write_source("A,Bolt,1,111,10,8\n");
        let mut cache = SourceCache::new(file.path());
        assert_eq!(cache.get_or_load().unwrap().dataset.len(), 1);

        let mut handle = std::fs::OpenOptions::new()
            .append(true)
            .open(file.path())
            .unwrap();
        handle.write_all(b"B,Nut,2,222,5,5\n").unwrap();
        let later = SystemTime::now() + Duration::from_secs(5);
        handle.set_modified(later).unwrap();

        let reloaded = cache.get_or_load().unwrap();
        assert_eq!(reloaded.dataset.len(), 2);
        assert_eq!(cache.loads(), 2);
    }

    #[test]
    fn test_missing_source_is_not_cached() {
        let mut cache = SourceCache::new("/nonexistent/stock_data.csv");
        assert!(matches!(
            cache.get_or_load(),
            Err(LoadError::SourceRead { .. })
        ));
        assert!(!cache.is_loaded());
        assert_eq!(cache.loads(), 0);
    }

    #[test]
    fn test_load_errors_leave_previous_entry_untouched() {
        let file = write_source("A,Bolt,1,111,10,8\n");
        let mut cache = SourceCache::new(file.path());
        cache.get_or_load().unwrap();

        std::fs::write(file.path(), "Category\nA\n").unwrap();
        let handle = std::fs::OpenOptions::new()
            .write(true)
            .open(file.path())
            .unwrap();
        handle
            .set_modified(SystemTime::now() + Duration::from_secs(5))
            .unwrap();

        assert!(matches!(
            cache.get_or_load(),
            Err(LoadError::MissingColumns { .. })
        ));
        assert!(cache.is_loaded());
    }
}
