use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::types::FetchKey;

/// In-memory memo of fetched payloads for the lifetime of one run.
///
/// Entries are never evicted. A failed fetch leaves no entry, so asking for the
/// same key again retries the fetch.
#[derive(Debug)]
pub struct ResponseCache<V> {
    entries: HashMap<FetchKey, Arc<V>>,
}

impl<V> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ResponseCache<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub async fn get_or_fetch<F, Fut, E>(&mut self, key: FetchKey, fetch: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.entries.get(&key) {
            debug!(?key, "response cache hit");
            return Ok(Arc::clone(hit));
        }

        let value = Arc::new(fetch().await?);
        self.entries.insert(key, Arc::clone(&value));
        Ok(value)
    }

    pub fn contains(&self, key: &FetchKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
