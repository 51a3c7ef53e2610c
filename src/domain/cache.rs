//! Memoizing series cache with file-system persistence.
//!
//! Upstream data is rate-limited and economically expensive to refetch,
//! so every computed table is written through to disk synchronously and
//! served from there across process restarts. There is no TTL and no
//! invalidation; deleting a key's file is the manual escape hatch.

use crate::domain::error::LiquidityError;
use crate::domain::series::TimeSeriesTable;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub data_dir: PathBuf,
}

impl CacheConfig {
    pub fn persistent<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            enabled: true,
            data_dir: data_dir.into(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            data_dir: PathBuf::new(),
        }
    }
}

/// Key -> table store backed by memory with lazy fallback to one CSV
/// file per key. With persistence disabled it degrades to a plain
/// in-process memo map.
pub struct PersistentMemoCache {
    entries: HashMap<String, TimeSeriesTable>,
    store_root: Option<PathBuf>,
}

impl PersistentMemoCache {
    pub fn new(config: &CacheConfig) -> Result<Self, LiquidityError> {
        let store_root = if config.enabled {
            fs::create_dir_all(&config.data_dir)?;
            Some(config.data_dir.clone())
        } else {
            None
        };
        Ok(Self {
            entries: HashMap::new(),
            store_root,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            entries: HashMap::new(),
            store_root: None,
        }
    }

    fn entry_path(root: &Path, key: &str) -> PathBuf {
        root.join(format!("{key}.csv"))
    }

    /// Memory hit, else disk hit, else run the producer and persist its
    /// result. A failed producer caches nothing, so the next call
    /// retries the fetch. Callers receive an owned copy; resident
    /// entries are never handed out mutably.
    pub fn get_or_compute<F>(
        &mut self,
        key: &str,
        producer: F,
    ) -> Result<TimeSeriesTable, LiquidityError>
    where
        F: FnOnce() -> Result<TimeSeriesTable, LiquidityError>,
    {
        if let Some(table) = self.entries.get(key) {
            debug!(key, "cache hit (memory)");
            return Ok(table.clone());
        }
        if let Some(root) = &self.store_root {
            let path = Self::entry_path(root, key);
            if path.exists() {
                debug!(key, "cache hit (disk)");
                let table = TimeSeriesTable::read_csv_path(&path)?;
                self.entries.insert(key.to_string(), table.clone());
                return Ok(table);
            }
        }
        debug!(key, "cache miss, invoking producer");
        let table = producer()?;
        if let Some(root) = &self.store_root {
            Self::persist(root, key, &table)?;
        }
        self.entries.insert(key.to_string(), table.clone());
        Ok(table)
    }

    /// Atomic full overwrite: write to a temp file, then rename over
    /// the backing file.
    fn persist(root: &Path, key: &str, table: &TimeSeriesTable) -> Result<(), LiquidityError> {
        let path = Self::entry_path(root, key);
        let tmp = root.join(format!("{key}.csv.tmp"));
        table.write_csv_path(&tmp)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fields;
    use crate::domain::series::Column;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn fixture() -> TimeSeriesTable {
        TimeSeriesTable::from_parts(
            fields::DATE,
            vec![d("2024-01-01"), d("2024-01-02"), d("2024-01-03")],
            vec![Column::new(fields::CLOSE, vec![Some(100.5), None, Some(0.125)])],
        )
        .unwrap()
    }

    fn other_fixture() -> TimeSeriesTable {
        TimeSeriesTable::from_column(
            fields::DATE,
            vec![d("2030-01-01")],
            fields::CLOSE,
            vec![Some(1.0)],
        )
        .unwrap()
    }

    #[test]
    fn fresh_key_invokes_the_producer_once_and_persists() {
        let dir = TempDir::new().unwrap();
        let config = CacheConfig::persistent(dir.path());
        let mut cache = PersistentMemoCache::new(&config).unwrap();

        let mut calls = 0;
        let table = cache
            .get_or_compute("HYG-prices", || {
                calls += 1;
                Ok(fixture())
            })
            .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(table, fixture());
        assert!(dir.path().join("HYG-prices.csv").exists());

        // Second call on the same instance is a memory hit.
        let mut calls = 0;
        let table = cache
            .get_or_compute("HYG-prices", || {
                calls += 1;
                Ok(other_fixture())
            })
            .unwrap();
        assert_eq!(calls, 0);
        assert_eq!(table, fixture());
    }

    #[test]
    fn second_instance_serves_from_disk_without_a_producer_call() {
        let dir = TempDir::new().unwrap();
        let config = CacheConfig::persistent(dir.path());

        let mut first = PersistentMemoCache::new(&config).unwrap();
        first.get_or_compute("LQD-yields", || Ok(fixture())).unwrap();

        let mut second = PersistentMemoCache::new(&config).unwrap();
        let mut calls = 0;
        let table = second
            .get_or_compute("LQD-yields", || {
                calls += 1;
                Ok(other_fixture())
            })
            .unwrap();
        assert_eq!(calls, 0);
        assert_eq!(table, fixture());
    }

    #[test]
    fn disk_round_trip_preserves_values_exactly() {
        let dir = TempDir::new().unwrap();
        let config = CacheConfig::persistent(dir.path());

        let mut first = PersistentMemoCache::new(&config).unwrap();
        first.get_or_compute("k", || Ok(fixture())).unwrap();

        let restored =
            TimeSeriesTable::read_csv_path(&dir.path().join("k.csv")).unwrap();
        assert_eq!(restored, fixture());
    }

    #[test]
    fn disabled_persistence_memoizes_without_touching_disk() {
        let dir = TempDir::new().unwrap();
        let mut cache = PersistentMemoCache::new(&CacheConfig::disabled()).unwrap();

        let mut calls = 0;
        cache
            .get_or_compute("SPX-prices", || {
                calls += 1;
                Ok(fixture())
            })
            .unwrap();
        cache
            .get_or_compute("SPX-prices", || {
                calls += 1;
                Ok(fixture())
            })
            .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn failed_producer_caches_nothing() {
        let dir = TempDir::new().unwrap();
        let config = CacheConfig::persistent(dir.path());
        let mut cache = PersistentMemoCache::new(&config).unwrap();

        let result = cache.get_or_compute("NDX-prices", || {
            Err(LiquidityError::DataNotAvailable {
                symbol: "NDX".to_string(),
                kind: "prices".to_string(),
            })
        });
        assert!(result.is_err());
        assert!(!dir.path().join("NDX-prices.csv").exists());

        // The next call retries the fetch.
        let mut calls = 0;
        let table = cache
            .get_or_compute("NDX-prices", || {
                calls += 1;
                Ok(fixture())
            })
            .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(table, fixture());
    }

    #[test]
    fn store_root_is_created_on_construction() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("cache").join("data");
        let config = CacheConfig::persistent(&nested);
        PersistentMemoCache::new(&config).unwrap();
        assert!(nested.is_dir());
    }
}
