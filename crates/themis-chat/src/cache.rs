// Injected key-value cache plus the per-thread message cache built on it

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use themis_persist::{DBMessage, PersistenceClient, Sender};

use crate::error::Result;

pub const CACHE_CAPACITY: usize = 20;
pub const RELOAD_WINDOW: usize = 60;

/// Shared keyed store; swap the in-process map for an external cache when running several instances
#[async_trait]
pub trait KeyValueCache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V>;

    async fn insert(&self, key: &str, value: V);

    /// Store `value` only when the key is vacant; returns whatever is stored afterwards
    async fn insert_if_absent(&self, key: &str, value: V) -> V;

    async fn remove(&self, key: &str) -> Option<V>;
}

/// Process-local cache
pub struct InProcessCache<V> {
    entries: Arc<RwLock<HashMap<String, V>>>,
}

impl<V> InProcessCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl<V> Default for InProcessCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> KeyValueCache<V> for InProcessCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    async fn insert(&self, key: &str, value: V) {
        self.entries.write().await.insert(key.to_string(), value);
    }

    async fn insert_if_absent(&self, key: &str, value: V) -> V {
        let mut entries = self.entries.write().await;
        entries.entry(key.to_string()).or_insert(value).clone()
    }

    async fn remove(&self, key: &str) -> Option<V> {
        self.entries.write().await.remove(key)
    }
}

/// Light projection of a persisted message kept in the cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedMessage {
    pub sender: Sender,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl CachedMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

impl From<&DBMessage> for CachedMessage {
    fn from(message: &DBMessage) -> Self {
        Self {
            sender: message.sender,
            text: message.text.clone(),
            created_at: message.created_at,
        }
    }
}

/// Most recent messages per thread; storage stays the source of truth
#[derive(Clone)]
pub struct MessageCache {
    store: Arc<dyn KeyValueCache<Vec<CachedMessage>>>,
    persist: Arc<dyn PersistenceClient>,
    capacity: usize,
    reload_window: usize,
}

impl MessageCache {
    pub fn new(
        store: Arc<dyn KeyValueCache<Vec<CachedMessage>>>,
        persist: Arc<dyn PersistenceClient>,
    ) -> Self {
        Self {
            store,
            persist,
            capacity: CACHE_CAPACITY,
            reload_window: RELOAD_WINDOW,
        }
    }

    pub fn with_limits(mut self, capacity: usize, reload_window: usize) -> Self {
        self.capacity = capacity.max(1);
        self.reload_window = reload_window.max(self.capacity);
        self
    }

    /// Cached messages oldest first, reloading from storage on a miss
    pub async fn get(&self, thread_id: &str) -> Result<Vec<CachedMessage>> {
        if let Some(hit) = self.store.get(thread_id).await {
            return Ok(hit);
        }

        let persisted = self.persist.recent_messages(thread_id, self.reload_window).await?;
        let start = persisted.len().saturating_sub(self.capacity);
        let messages: Vec<CachedMessage> = persisted[start..].iter().map(CachedMessage::from).collect();

        tracing::debug!(
            thread_id = %thread_id,
            loaded = persisted.len(),
            kept = messages.len(),
            "Rebuilt message cache from storage"
        );
        self.store.insert(thread_id, messages.clone()).await;
        Ok(messages)
    }

    /// Append to the cached entry and keep only the newest `capacity` messages
    ///
    /// A missing entry starts empty; read with [`MessageCache::get`] first to seed it from storage.
    pub async fn append(&self, thread_id: &str, messages: Vec<CachedMessage>) {
        let mut entry = self.store.get(thread_id).await.unwrap_or_default();
        entry.extend(messages);
        if entry.len() > self.capacity {
            let excess = entry.len() - self.capacity;
            entry.drain(..excess);
        }
        self.store.insert(thread_id, entry).await;
    }

    pub async fn invalidate(&self, thread_id: &str) {
        self.store.remove(thread_id).await;
    }
}
