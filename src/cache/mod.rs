//! Timestamp cache for devsync
//!
//! Records, per package, when it was last installed and built so repeated
//! runs only redo work whose inputs changed.
//!
//! ## Cache Structure
//!
//! ```text
//! ~/.cache/devsync/
//! └── timestamps.json     { "<name>:local|remote": { modified_at, installed_at, built_at } }
//! ```
//!
//! A key that has never been written reads as the Unix epoch. Every write
//! re-reads the file and replaces it atomically, so processes sharing the
//! cache directory keep each other's keys.

pub mod paths;
pub mod record;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use tempfile::NamedTempFile;

use crate::error::{self, Result};

pub use paths::{TIMESTAMPS_FILE, cache_dir};
pub use record::{CacheKey, CacheRecord};

type Records = BTreeMap<String, CacheRecord>;

/// Persistent `(name, is_local)` → timestamps store
#[derive(Debug)]
pub struct Cache {
    /// Path of the timestamps file
    path: PathBuf,
    /// Last known file contents; also serializes merge-and-write
    records: Mutex<Records>,
    /// One lock per key, held across gate, action and store
    key_locks: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl Cache {
    /// Open the cache in the default cache directory
    pub fn open_default() -> Result<Self> {
        Self::open(&cache_dir()?)
    }

    /// Open the cache stored in `dir`, creating the directory if needed
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            error::cache::operation_failed(format!(
                "Failed to create cache directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        let path = dir.join(TIMESTAMPS_FILE);
        let records = read_records(&path)?;
        Ok(Self {
            path,
            records: Mutex::new(records),
            key_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record for a package; absent keys read as all-epoch
    pub fn record(&self, name: &str, is_local: bool) -> CacheRecord {
        let key = CacheKey::new(name, is_local).to_string();
        self.lock_records().get(&key).copied().unwrap_or_default()
    }

    pub fn modified_timestamp(&self, name: &str, is_local: bool) -> SystemTime {
        self.record(name, is_local).modified_at
    }

    pub fn installed_timestamp(&self, name: &str, is_local: bool) -> SystemTime {
        self.record(name, is_local).installed_at
    }

    pub fn built_timestamp(&self, name: &str, is_local: bool) -> SystemTime {
        self.record(name, is_local).built_at
    }

    #[allow(dead_code)] // used in tests
    pub fn store_modified(&self, name: &str, is_local: bool, time: SystemTime) -> Result<()> {
        self.update(name, is_local, |r| r.modified_at = time)
    }

    #[allow(dead_code)] // used in tests
    pub fn store_installed(&self, name: &str, is_local: bool, time: SystemTime) -> Result<()> {
        self.update(name, is_local, |r| r.installed_at = time)
    }

    pub fn store_built(&self, name: &str, is_local: bool, time: SystemTime) -> Result<()> {
        self.update(name, is_local, |r| r.built_at = time)
    }

    /// Apply `f` to one record and persist the result.
    pub fn update(
        &self,
        name: &str,
        is_local: bool,
        f: impl FnOnce(&mut CacheRecord),
    ) -> Result<()> {
        let key = CacheKey::new(name, is_local).to_string();
        self.write_merged(|records| f(records.entry(key).or_default()))
    }

    /// Run `f` while holding the lock for one key.
    ///
    /// Concurrent callers for the same key run one after another; callers
    /// for different keys do not wait on each other.
    pub fn with_key_lock<T>(&self, name: &str, is_local: bool, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = self
                .key_locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(CacheKey::new(name, is_local)).or_default())
        };
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// All stored records, sorted by key
    pub fn entries(&self) -> Vec<(CacheKey, CacheRecord)> {
        self.lock_records()
            .iter()
            .filter_map(|(key, record)| CacheKey::parse(key).map(|k| (k, *record)))
            .collect()
    }

    /// Forget a package. With `is_local` unset both identities are removed.
    ///
    /// Returns the number of removed records.
    pub fn remove(&self, name: &str, is_local: Option<bool>) -> Result<usize> {
        let keys: Vec<String> = match is_local {
            Some(is_local) => vec![CacheKey::new(name, is_local).to_string()],
            None => vec![
                CacheKey::new(name, true).to_string(),
                CacheKey::new(name, false).to_string(),
            ],
        };
        let mut removed = 0;
        self.write_merged(|records| {
            removed = keys.iter().filter(|k| records.remove(*k).is_some()).count();
        })?;
        Ok(removed)
    }

    /// Forget every package
    pub fn clear(&self) -> Result<()> {
        let mut records = self.lock_records();
        write_records(&self.path, &Records::new())?;
        records.clear();
        Ok(())
    }

    fn lock_records(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_merged(&self, f: impl FnOnce(&mut Records)) -> Result<()> {
        let mut records = self.lock_records();
        let mut merged = read_records(&self.path)?;
        f(&mut merged);
        write_records(&self.path, &merged)?;
        *records = merged;
        Ok(())
    }
}

fn read_records(path: &Path) -> Result<Records> {
    if !path.exists() {
        return Ok(Records::new());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        error::cache::operation_failed(format!(
            "Failed to read cache file {}: {}",
            path.display(),
            e
        ))
    })?;

    if content.trim().is_empty() {
        return Ok(Records::new());
    }

    serde_json::from_str(&content).map_err(|e| {
        error::cache::operation_failed(format!(
            "Failed to parse cache file {}: {}",
            path.display(),
            e
        ))
    })
}

fn write_records(path: &Path, records: &Records) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| error::cache::operation_failed("Cache file has no parent directory"))?;

    let content = serde_json::to_string_pretty(records)
        .map_err(|e| error::cache::operation_failed(format!("Failed to serialize cache: {e}")))?;

    let mut file = NamedTempFile::new_in(dir)
        .and_then(|mut f| f.write_all(content.as_bytes()).map(|()| f))
        .map_err(|e| {
            error::cache::operation_failed(format!("Failed to write cache file: {e}"))
        })?;
    file.flush()?;
    file.persist(path).map_err(|e| {
        error::cache::operation_failed(format!(
            "Failed to write cache file {}: {}",
            path.display(),
            e.error
        ))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_unknown_key_reads_as_epoch() {
        let temp = TempDir::new().unwrap();
        let cache = Cache::open(temp.path()).unwrap();
        assert_eq!(cache.modified_timestamp("nope", true), SystemTime::UNIX_EPOCH);
        assert_eq!(cache.installed_timestamp("nope", false), SystemTime::UNIX_EPOCH);
        assert_eq!(cache.built_timestamp("nope", true), SystemTime::UNIX_EPOCH);
    }

    #[test]
    fn test_store_and_read_back() {
        let temp = TempDir::new().unwrap();
        let cache = Cache::open(temp.path()).unwrap();
        cache.store_modified("foo", true, at(10)).unwrap();
        cache.store_installed("foo", true, at(11)).unwrap();
        cache.store_built("foo", true, at(12)).unwrap();

        assert_eq!(cache.modified_timestamp("foo", true), at(10));
        assert_eq!(cache.installed_timestamp("foo", true), at(11));
        assert_eq!(cache.built_timestamp("foo", true), at(12));
    }

    #[test]
    fn test_local_and_remote_are_independent() {
        let temp = TempDir::new().unwrap();
        let cache = Cache::open(temp.path()).unwrap();
        cache.store_modified("foo", true, at(10)).unwrap();

        assert_eq!(cache.modified_timestamp("foo", true), at(10));
        assert_eq!(cache.modified_timestamp("foo", false), SystemTime::UNIX_EPOCH);
    }

    #[test]
    fn test_last_write_wins() {
        let temp = TempDir::new().unwrap();
        let cache = Cache::open(temp.path()).unwrap();
        cache.store_built("foo", false, at(20)).unwrap();
        cache.store_built("foo", false, at(5)).unwrap();
        assert_eq!(cache.built_timestamp("foo", false), at(5));
    }

    #[test]
    fn test_survives_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let cache = Cache::open(temp.path()).unwrap();
            cache.store_modified("foo", true, at(10)).unwrap();
            cache.store_built("foo", false, at(30)).unwrap();
        }
        let cache = Cache::open(temp.path()).unwrap();
        assert_eq!(cache.modified_timestamp("foo", true), at(10));
        assert_eq!(cache.built_timestamp("foo", false), at(30));
        assert_eq!(cache.built_timestamp("foo", true), SystemTime::UNIX_EPOCH);
    }

    #[test]
    fn test_writes_merge_with_other_handles() {
        let temp = TempDir::new().unwrap();
        let first = Cache::open(temp.path()).unwrap();
        let second = Cache::open(temp.path()).unwrap();
        first.store_modified("a", true, at(1)).unwrap();
        second.store_modified("b", true, at(2)).unwrap();

        let reopened = Cache::open(temp.path()).unwrap();
        assert_eq!(reopened.modified_timestamp("a", true), at(1));
        assert_eq!(reopened.modified_timestamp("b", true), at(2));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(TIMESTAMPS_FILE), "not json").unwrap();
        let err = Cache::open(temp.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse cache file"));
    }

    #[test]
    fn test_entries_remove_and_clear() {
        let temp = TempDir::new().unwrap();
        let cache = Cache::open(temp.path()).unwrap();
        cache.store_modified("foo", true, at(1)).unwrap();
        cache.store_modified("foo", false, at(2)).unwrap();
        cache.store_modified("bar", true, at(3)).unwrap();

        let keys: Vec<String> = cache.entries().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["bar:local", "foo:local", "foo:remote"]);

        assert_eq!(cache.remove("foo", Some(false)).unwrap(), 1);
        assert_eq!(cache.remove("foo", None).unwrap(), 1);
        assert_eq!(cache.remove("foo", None).unwrap(), 0);
        assert_eq!(cache.entries().len(), 1);

        cache.clear().unwrap();
        assert!(cache.entries().is_empty());
        assert!(Cache::open(temp.path()).unwrap().entries().is_empty());
    }

    #[test]
    fn test_key_lock_serializes_same_key() {
        let temp = TempDir::new().unwrap();
        let cache = Cache::open(temp.path()).unwrap();
        let inside = AtomicUsize::new(0);
        let max_inside = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    cache.with_key_lock("foo", true, || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(10));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                });
            }
        });

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_updates_to_distinct_keys_are_kept() {
        let temp = TempDir::new().unwrap();
        let cache = Cache::open(temp.path()).unwrap();

        thread::scope(|s| {
            for i in 0..8u64 {
                let cache = &cache;
                s.spawn(move || {
                    cache.store_built(&format!("pkg{i}"), false, at(i + 1)).unwrap();
                });
            }
        });

        let reopened = Cache::open(temp.path()).unwrap();
        for i in 0..8u64 {
            assert_eq!(reopened.built_timestamp(&format!("pkg{i}"), false), at(i + 1));
        }
    }
}
