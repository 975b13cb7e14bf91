//! Caching layer for council results.
//!
//! Identical decision briefs produce identical sensor analyses often
//! enough that caching saves real quota, since everything downstream of
//! the council is deterministic anyway.

use moka::future::Cache;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use authority_core::CouncilReport;

use crate::stages::DecisionBrief;

/// Cache key for council results.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    brief_hash: u64,
    model: String,
}

impl CacheKey {
    /// Create a cache key from the brief and the model that will score it.
    pub fn new(brief: &DecisionBrief, model: &str) -> Self {
        Self {
            brief_hash: hash_brief(brief),
            model: model.to_string(),
        }
    }
}

/// Council result cache using moka.
pub struct CouncilCache {
    cache: Cache<CacheKey, CouncilReport>,
}

impl CouncilCache {
    /// Create a new cache with the given capacity and TTL.
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    /// Get a cached council report.
    pub async fn get(&self, key: &CacheKey) -> Option<CouncilReport> {
        self.cache.get(key).await
    }

    /// Store a council report.
    pub async fn insert(&self, key: CacheKey, report: CouncilReport) {
        self.cache.insert(key, report).await;
    }

    /// Clear the cache.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Get cache statistics.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for CouncilCache {
    fn default() -> Self {
        Self::new(1_024, Duration::from_secs(3600))
    }
}

fn hash_brief(brief: &DecisionBrief) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    let mut hasher = DefaultHasher::new();
    brief.hash(&mut hasher);
    hasher.finish()
}
