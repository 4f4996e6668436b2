//! Payload cache seam.
//!
//! The fetch orchestrator only talks to [`PayloadCache`]; production callers
//! can plug in any shared store. [`MemoryCache`] is the in-process default.
//!
//! # Thread Safety
//!
//! `MemoryCache` uses `tokio::sync::RwLock`, so lookups never block each
//! other. Writes are last-write-wins per id.

use crate::output::FormattedPayload;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// What the cache holds for one document id.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Modification time of the revision the payload was built from.
    pub modified_time: String,
    /// The cached payload. `None` means the entry exists but holds nothing
    /// servable, which the orchestrator treats as a miss.
    pub content: Option<Arc<FormattedPayload>>,
}

impl CacheEntry {
    /// True when the entry was built from the revision modified at `modified_time`.
    pub fn is_fresh(&self, modified_time: &str) -> bool {
        self.content.is_some() && self.modified_time == modified_time
    }
}

/// Async key-value store for formatted payloads, keyed by document id.
#[async_trait]
pub trait PayloadCache: Send + Sync {
    /// Look up the entry for `id`.
    async fn get(&self, id: &str) -> Option<CacheEntry>;

    /// Store `payload` for `id`, replacing any previous entry.
    async fn add(&self, id: &str, modified_time: &str, payload: Arc<FormattedPayload>);

    /// Forget `id`. Missing ids are ignored.
    async fn remove(&self, id: &str);
}

/// In-process [`PayloadCache`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached documents.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl PayloadCache for MemoryCache {
    async fn get(&self, id: &str) -> Option<CacheEntry> {
        self.entries.read().await.get(id).cloned()
    }

    async fn add(&self, id: &str, modified_time: &str, payload: Arc<FormattedPayload>) {
        let entry = CacheEntry {
            modified_time: modified_time.to_string(),
            content: Some(payload),
        };
        self.entries.write().await.insert(id.to_string(), entry);
    }

    async fn remove(&self, id: &str) {
        self.entries.write().await.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(html: &str) -> Arc<FormattedPayload> {
        Arc::new(FormattedPayload {
            html: html.into(),
            byline: "Jane".into(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn add_then_get() {
        let cache = MemoryCache::new();
        assert!(cache.get("doc").await.is_none());

        cache.add("doc", "2017-01-01T00:00:00Z", payload("<p>a</p>")).await;
        let entry = cache.get("doc").await.expect("cached");
        assert_eq!(entry.modified_time, "2017-01-01T00:00:00Z");
        assert_eq!(entry.content.unwrap().html, "<p>a</p>");
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let cache = MemoryCache::new();
        cache.add("doc", "t1", payload("old")).await;
        cache.add("doc", "t2", payload("new")).await;
        let entry = cache.get("doc").await.unwrap();
        assert_eq!(entry.modified_time, "t2");
        assert_eq!(entry.content.unwrap().html, "new");
        assert_eq!(cache.len().await, 1);
    }

    #[test]
    fn remove_forgets_entry() {
        tokio_test::block_on(async {
            let cache = MemoryCache::new();
            cache.add("doc", "t1", payload("x")).await;
            cache.remove("doc").await;
            cache.remove("missing").await;
            assert!(cache.is_empty().await);
        });
    }

    #[test]
    fn freshness_compares_modified_time() {
        let entry = CacheEntry {
            modified_time: "t1".into(),
            content: Some(payload("x")),
        };
        assert!(entry.is_fresh("t1"));
        assert!(!entry.is_fresh("t2"));

        let hollow = CacheEntry {
            modified_time: "t1".into(),
            content: None,
        };
        assert!(!hollow.is_fresh("t1"));
    }
}
