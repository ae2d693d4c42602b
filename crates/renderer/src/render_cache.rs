//! LRU cache of rendered rasters with lazy time-to-live expiry.
//!
//! Panning and timeline scrubbing revisit the same (product, view) pairs;
//! caching the finished raster makes those revisits free. Expiry is checked
//! on read, so stale entries cost nothing until touched.

use crate::raster::{Raster, RenderKey};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default number of cached rasters.
pub const DEFAULT_CAPACITY: usize = 50;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

struct CacheEntry {
    raster: Arc<Raster>,
    inserted_at: Instant,
}

/// Cache hit/miss counters, for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub insertions: u64,
}

/// Bounded cache of finished renders.
pub struct RenderCache {
    entries: LruCache<RenderKey, CacheEntry>,
    ttl: Duration,
    stats: CacheStats,
}

impl RenderCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            entries: LruCache::new(capacity),
            ttl,
            stats: CacheStats::default(),
        }
    }

    /// Fetch a raster if present and still fresh. Expired entries are
    /// dropped on access.
    pub fn get(&mut self, key: &RenderKey) -> Option<Arc<Raster>> {
        let fresh = match self.entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.raster.clone()),
            Some(_) => None,
            None => {
                self.stats.misses += 1;
                return None;
            }
        };

        match fresh {
            Some(raster) => {
                self.stats.hits += 1;
                Some(raster)
            }
            None => {
                debug!(?key, "evicting expired render");
                self.entries.pop(key);
                self.stats.expired += 1;
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: RenderKey, raster: Arc<Raster>) {
        self.stats.insertions += 1;
        self.entries.put(
            key,
            CacheEntry {
                raster,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Fetch a raster, rendering and caching it on a miss.
    pub fn get_or_render<E>(
        &mut self,
        key: &RenderKey,
        render: impl FnOnce() -> Result<Arc<Raster>, E>,
    ) -> Result<Arc<Raster>, E> {
        if let Some(raster) = self.get(key) {
            return Ok(raster);
        }
        let raster = render()?;
        self.insert(key.clone(), raster.clone());
        Ok(raster)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use radar_common::Extent;

    fn key(selection: &str, minute: u32) -> RenderKey {
        RenderKey::new(
            selection,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, 0).unwrap(),
            &Extent::new(19.0, 60.0, 28.0, 66.0),
            256,
            256,
        )
    }

    fn raster() -> Arc<Raster> {
        Arc::new(Raster::filled(4, 4, [0, 0, 0, 0]))
    }

    #[test]
    fn test_hit_returns_same_raster() {
        let mut cache = RenderCache::default();
        let k = key("fin::REFLECTIVITY", 0);
        let r = raster();
        cache.insert(k.clone(), r.clone());

        let hit = cache.get(&k).unwrap();
        assert!(Arc::ptr_eq(&hit, &r));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_get_or_render_computes_once() {
        let mut cache = RenderCache::default();
        let k = key("fin::REFLECTIVITY", 0);
        let mut calls = 0;

        for _ in 0..3 {
            let result: Result<_, std::convert::Infallible> = cache.get_or_render(&k, || {
                calls += 1;
                Ok(raster())
            });
            result.unwrap();
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.stats().hits, 2);
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let mut cache = RenderCache::new(8, Duration::ZERO);
        let k = key("fin::REFLECTIVITY", 0);
        cache.insert(k.clone(), raster());

        assert!(cache.get(&k).is_none());
        assert_eq!(cache.stats().expired, 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lru_evicts_oldest() {
        let mut cache = RenderCache::new(2, DEFAULT_TTL);
        let (a, b, c) = (key("a", 0), key("b", 1), key("c", 2));

        cache.insert(a.clone(), raster());
        cache.insert(b.clone(), raster());
        // Touch `a` so `b` becomes least recently used.
        assert!(cache.get(&a).is_some());
        cache.insert(c.clone(), raster());

        assert!(cache.get(&a).is_some());
        assert!(cache.get(&b).is_none());
        assert!(cache.get(&c).is_some());
    }

    #[test]
    fn test_failed_render_is_not_cached() {
        let mut cache = RenderCache::default();
        let k = key("fin::REFLECTIVITY", 0);

        let result: Result<Arc<Raster>, &str> = cache.get_or_render(&k, || Err("no data"));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
