//! Memoized document store
//!
//! Documents are cached by canonical key for the whole session; there is no
//! eviction. Failed loads leave no entry behind, so the next request
//! re-fetches. Concurrent requests for one key share a single fetch.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::error::LoadError;
use crate::fetch::Fetcher;

type Slot = Arc<OnceCell<Arc<Value>>>;

/// Canonical cache key for a document path.
///
/// Leading `/` and `./` segments are dropped and repeated separators
/// collapsed, so `/data/x.json`, `./data/x.json` and `data//x.json` all map to
/// `data/x.json`. Paths with a `..` segment are rejected.
pub fn canonical_key(path: &str) -> Result<String, LoadError> {
    let mut segments = Vec::new();

    for segment in path.trim().split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(LoadError::InvalidPath {
                    path: path.to_string(),
                })
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Err(LoadError::InvalidPath {
            path: path.to_string(),
        });
    }

    Ok(segments.join("/"))
}

/// JSON documents fetched once per canonical path
pub struct DataStore<F> {
    fetcher: F,
    cache: DashMap<String, Slot>,
    fetches: AtomicUsize,
    hits: AtomicUsize,
}

impl<F: Fetcher> DataStore<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            cache: DashMap::new(),
            fetches: AtomicUsize::new(0),
            hits: AtomicUsize::new(0),
        }
    }

    /// Load and parse the document at `path`, fetching it only on first use
    pub async fn load(&self, path: &str) -> Result<Arc<Value>, LoadError> {
        let key = canonical_key(path)?;
        let slot: Slot = self.cache.entry(key.clone()).or_default().clone();

        if let Some(value) = slot.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(value));
        }

        let value = match slot.get_or_try_init(|| self.fetch_and_parse(&key)).await {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Load failed: {}", e);
                self.cache
                    .remove_if(&key, |_, s| Arc::ptr_eq(s, &slot) && !s.initialized());
                return Err(e);
            }
        };

        Ok(Arc::clone(value))
    }

    async fn fetch_and_parse(&self, key: &str) -> Result<Arc<Value>, LoadError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let bytes = self.fetcher.fetch(key).await?;

        let value: Value = serde_json::from_slice(&bytes).map_err(|e| LoadError::Parse {
            path: key.to_string(),
            reason: e.to_string(),
        })?;

        log::debug!("Cached {} ({} bytes)", key, bytes.len());
        Ok(Arc::new(value))
    }

    /// Whether a successfully loaded document is cached for `path`
    pub fn is_cached(&self, path: &str) -> bool {
        canonical_key(path)
            .ok()
            .and_then(|key| self.cache.get(&key).map(|slot| slot.initialized()))
            .unwrap_or(false)
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Get store statistics
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            entries: self
                .cache
                .iter()
                .filter(|entry| entry.value().initialized())
                .count(),
            fetches: self.fetches.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
        }
    }
}

/// Data store statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Successfully loaded documents
    pub entries: usize,
    /// Fetches issued, including failed ones
    pub fetches: usize,
    /// Requests answered from the cache
    pub hits: usize,
}
