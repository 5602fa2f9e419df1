//! Active duty map pool sources.
//!
//! The network lookup lives outside the core. A source only has to return the
//! ordered list of currently active map identifiers.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

use crate::error::{CoreError, Result};

/// CS2 active duty pool at the time of writing.
pub const DEFAULT_ACTIVE_DUTY: [&str; 7] =
    ["Mirage", "Inferno", "Anubis", "Overpass", "Ancient", "Nuke", "Vertigo"];

pub fn default_active_duty() -> Vec<String> {
    DEFAULT_ACTIVE_DUTY.iter().map(|m| m.to_string()).collect()
}

pub trait MapPoolSource {
    fn fetch(&self) -> Result<Vec<String>>;
}

/// Fixed pool, usually taken from the bot configuration.
#[derive(Debug, Clone)]
pub struct StaticMapPool {
    maps: Vec<String>,
}

impl StaticMapPool {
    pub fn new(maps: Vec<String>) -> Self {
        Self { maps }
    }
}

impl Default for StaticMapPool {
    fn default() -> Self {
        Self::new(default_active_duty())
    }
}

impl MapPoolSource for StaticMapPool {
    fn fetch(&self) -> Result<Vec<String>> {
        if self.maps.is_empty() {
            return Err(CoreError::MapPool("static pool is empty".to_string()));
        }
        Ok(self.maps.clone())
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    fetched_at: DateTime<Utc>,
    maps: Vec<String>,
}

/// Caches another source for `ttl`. A failed refresh serves the stale list.
pub struct CachedMapPool<S> {
    source: S,
    ttl: Duration,
    cache: Mutex<Option<CacheEntry>>,
}

impl<S: MapPoolSource> CachedMapPool<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self { source, ttl, cache: Mutex::new(None) }
    }

    pub fn with_default_ttl(source: S) -> Self {
        Self::new(source, Duration::hours(24))
    }

    /// Drop the cached list so the next call refetches.
    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            *cache = None;
        }
    }

    fn fetch_at(&self, now: DateTime<Utc>) -> Result<Vec<String>> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| CoreError::MapPool("map pool cache lock poisoned".to_string()))?;

        if let Some(entry) = cache.as_ref() {
            if now - entry.fetched_at < self.ttl {
                return Ok(entry.maps.clone());
            }
        }

        match self.source.fetch() {
            Ok(maps) => {
                log::debug!("Refreshed active map pool: {:?}", maps);
                *cache = Some(CacheEntry { fetched_at: now, maps: maps.clone() });
                Ok(maps)
            }
            Err(err) => match cache.as_ref() {
                Some(entry) => {
                    log::warn!("Map pool refresh failed, serving stale pool: {}", err);
                    Ok(entry.maps.clone())
                }
                None => Err(err),
            },
        }
    }
}

impl<S: MapPoolSource> MapPoolSource for CachedMapPool<S> {
    fn fetch(&self) -> Result<Vec<String>> {
        self.fetch_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct FlakySource {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl MapPoolSource for &FlakySource {
        fn fetch(&self) -> Result<Vec<String>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(CoreError::MapPool("offline".to_string()));
            }
            Ok(vec![format!("map{}", n)])
        }
    }

    fn flaky() -> FlakySource {
        FlakySource { calls: AtomicUsize::new(0), fail: AtomicBool::new(false) }
    }

    #[test]
    fn test_static_pool() {
        assert_eq!(StaticMapPool::default().fetch().unwrap().len(), 7);
        assert!(StaticMapPool::new(Vec::new()).fetch().is_err());
    }

    #[test]
    fn test_cache_within_ttl() {
        let source = flaky();
        let pool = CachedMapPool::with_default_ttl(&source);
        let now = Utc::now();

        assert_eq!(pool.fetch_at(now).unwrap(), vec!["map0"]);
        assert_eq!(pool.fetch_at(now + Duration::hours(23)).unwrap(), vec!["map0"]);
        assert_eq!(pool.fetch_at(now + Duration::hours(25)).unwrap(), vec!["map1"]);
    }

    #[test]
    fn test_stale_on_failure() {
        let source = flaky();
        let pool = CachedMapPool::new(&source, Duration::hours(1));
        let now = Utc::now();

        pool.fetch_at(now).unwrap();
        source.fail.store(true, Ordering::SeqCst);
        assert_eq!(pool.fetch_at(now + Duration::hours(2)).unwrap(), vec!["map0"]);

        pool.invalidate();
        assert!(pool.fetch_at(now + Duration::hours(3)).is_err());
    }
}
