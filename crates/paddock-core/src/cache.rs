// On-disk inventory cache.
//
// Freshness is implicit: the file's modification time compared against
// the configured time-to-live. Writes go to a sibling temp file and
// are renamed into place, so a reader can never observe a partial
// cache. Concurrent invocations racing on the same file are an
// accepted limitation -- there is no cross-process lock.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tracing::debug;

use crate::error::CoreError;
use crate::inventory::Inventory;

/// Default cache time-to-live: 30 days.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// The persisted inventory document with mtime-based expiry.
#[derive(Debug, Clone)]
pub struct InventoryCache {
    path: PathBuf,
    ttl: Duration,
}

impl InventoryCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Whether the cache file exists and is younger than the TTL.
    ///
    /// Any failure to stat the file (missing, no mtime, clock skew
    /// putting the mtime in the future's past) counts as stale.
    pub fn is_fresh(&self) -> bool {
        let Ok(meta) = fs::metadata(&self.path) else {
            return false;
        };
        let Ok(mtime) = meta.modified() else {
            return false;
        };
        match SystemTime::now().duration_since(mtime) {
            Ok(age) => age < self.ttl,
            // mtime in the future: treat as fresh, it was just written.
            Err(_) => true,
        }
    }

    /// Read the cached inventory.
    ///
    /// Only called after [`is_fresh`](Self::is_fresh) returned true; a
    /// failure here means the filesystem lied to us and is fatal.
    pub fn read(&self) -> Result<Inventory, CoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| CoreError::CacheCorrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| CoreError::CacheCorrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Replace the cache content atomically (write-then-rename).
    pub fn write(&self, inventory: &Inventory) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| CoreError::CacheIo {
                path: self.path.clone(),
                source: e,
            })?;
        }

        let json = inventory.to_json_pretty()?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| CoreError::CacheIo {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| CoreError::CacheIo {
            path: self.path.clone(),
            source: e,
        })?;

        debug!("wrote inventory cache to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn cache_in(dir: &tempfile::TempDir, ttl: Duration) -> InventoryCache {
        InventoryCache::new(dir.path().join("inventory.json"), ttl)
    }

    fn sample() -> Inventory {
        let mut inv = Inventory::new();
        inv.add_cluster("Prod", vec!["node1".into(), "node2".into()]);
        inv
    }

    fn set_age(cache: &InventoryCache, age: Duration) {
        let file = fs::OpenOptions::new()
            .write(true)
            .open(cache.path())
            .unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[test]
    fn missing_file_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!cache_in(&dir, DEFAULT_TTL).is_fresh());
    }

    #[test]
    fn write_then_read_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, DEFAULT_TTL);

        cache.write(&sample()).unwrap();
        assert!(cache.is_fresh());
        assert_eq!(cache.read().unwrap(), sample());
    }

    #[test]
    fn freshness_boundary() {
        let ttl = Duration::from_secs(600);
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, ttl);
        cache.write(&sample()).unwrap();

        set_age(&cache, ttl - Duration::from_secs(1));
        assert!(cache.is_fresh());

        set_age(&cache, ttl + Duration::from_secs(1));
        assert!(!cache.is_fresh());
    }

    #[test]
    fn corrupt_fresh_cache_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, DEFAULT_TTL);
        fs::write(cache.path(), "{truncated").unwrap();

        assert!(cache.is_fresh());
        assert!(matches!(
            cache.read(),
            Err(CoreError::CacheCorrupt { .. })
        ));
    }

    #[test]
    fn write_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, DEFAULT_TTL);

        cache.write(&sample()).unwrap();

        let mut second = Inventory::new();
        second.add_cluster("Dev", vec![]);
        cache.write(&second).unwrap();

        assert_eq!(cache.read().unwrap(), second);
        // No temp file left behind after the rename.
        assert!(!dir.path().join("inventory.json.tmp").exists());
    }
}
