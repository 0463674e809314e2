//! TTL-based caching of raw catalog downloads.
//!
//! A full campus catalog for one semester is several megabytes, and every
//! section lookup for that semester filters the same download. Entries are
//! keyed by semester code and campus.

use super::types::SocCourse;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Identifies one catalog download.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct CatalogKey {
    semester_code: String,
    campus: String,
}

impl CatalogKey {
    pub fn new(semester_code: impl Into<String>, campus: &str) -> Self {
        Self {
            semester_code: semester_code.into(),
            campus: campus.trim().to_ascii_uppercase(),
        }
    }
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.semester_code, self.campus)
    }
}

#[derive(Clone)]
struct CachedCatalog {
    courses: Arc<Vec<SocCourse>>,
    cached_at: Instant,
    ttl: Duration,
}

impl CachedCatalog {
    fn is_fresh(&self) -> bool {
        self.cached_at.elapsed() < self.ttl
    }
}

/// Thread-safe cache of catalog downloads.
///
/// Uses DashMap for concurrent access without external locking.
pub struct CatalogCache {
    entries: DashMap<CatalogKey, CachedCatalog>,
    default_ttl: Duration,
}

impl CatalogCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    /// Creates a cache with a 10-minute default TTL.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(10 * 60))
    }

    /// Gets a cached catalog if it exists and hasn't expired.
    pub fn get(&self, key: &CatalogKey) -> Option<Arc<Vec<SocCourse>>> {
        let entry = self.entries.get(key)?;
        if entry.is_fresh() {
            return Some(Arc::clone(&entry.courses));
        }

        // Entry expired, remove it
        drop(entry);
        self.entries.remove(key);
        None
    }

    pub fn insert(&self, key: CatalogKey, courses: Arc<Vec<SocCourse>>) {
        self.insert_with_ttl(key, courses, self.default_ttl);
    }

    pub fn insert_with_ttl(&self, key: CatalogKey, courses: Arc<Vec<SocCourse>>, ttl: Duration) {
        self.entries.insert(
            key,
            CachedCatalog {
                courses,
                cached_at: Instant::now(),
                ttl,
            },
        );
    }

    pub fn invalidate(&self, key: &CatalogKey) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Returns the number of entries in the cache (including expired ones).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes expired entries from the cache.
    pub fn cleanup_expired(&self) {
        self.entries.retain(|_, entry| entry.is_fresh());
    }

    pub fn stats(&self) -> CacheStats {
        let mut total = 0;
        let mut expired = 0;
        let mut courses = 0;

        for entry in self.entries.iter() {
            total += 1;
            if entry.is_fresh() {
                courses += entry.courses.len();
            } else {
                expired += 1;
            }
        }

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
            cached_courses: courses,
        }
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::with_default_ttl()
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
    pub cached_courses: usize,
}
