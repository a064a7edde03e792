use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{DBMessage, ThreadMeta, UserMemory};
use crate::trait_client::PersistenceClient;

#[derive(Default)]
struct Store {
    messages: HashMap<String, Vec<DBMessage>>,
    thread_meta: HashMap<(String, String), ThreadMeta>,
    user_memory: HashMap<String, UserMemory>,
}

/// Process-local backend for single-instance deployments and tests
#[derive(Default)]
pub struct InMemoryPersistenceClient {
    store: RwLock<Store>,
}

impl InMemoryPersistenceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total persisted messages across all threads
    pub async fn message_count(&self) -> usize {
        self.store.read().await.messages.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl PersistenceClient for InMemoryPersistenceClient {
    async fn save_message(&self, message: DBMessage) -> Result<()> {
        let mut store = self.store.write().await;
        store
            .messages
            .entry(message.thread_id.clone())
            .or_default()
            .push(message);
        Ok(())
    }

    async fn recent_messages(&self, thread_id: &str, limit: usize) -> Result<Vec<DBMessage>> {
        let store = self.store.read().await;
        let messages = store.messages.get(thread_id).map(Vec::as_slice).unwrap_or(&[]);
        let start = messages.len().saturating_sub(limit);
        Ok(messages[start..].to_vec())
    }

    async fn latest_message(&self, thread_id: &str) -> Result<Option<DBMessage>> {
        let store = self.store.read().await;
        Ok(store.messages.get(thread_id).and_then(|m| m.last().cloned()))
    }

    async fn delete_messages(&self, thread_id: &str) -> Result<u64> {
        let mut store = self.store.write().await;
        Ok(store.messages.remove(thread_id).map(|m| m.len() as u64).unwrap_or(0))
    }

    async fn get_thread_meta(&self, thread_id: &str, scenario: &str) -> Result<Option<ThreadMeta>> {
        let store = self.store.read().await;
        Ok(store
            .thread_meta
            .get(&(thread_id.to_string(), scenario.to_string()))
            .cloned())
    }

    async fn latest_thread_meta(&self, thread_id: &str) -> Result<Option<ThreadMeta>> {
        let store = self.store.read().await;
        Ok(store
            .thread_meta
            .values()
            .filter(|m| m.thread_id == thread_id)
            .max_by_key(|m| m.last_message_at)
            .cloned())
    }

    async fn save_thread_meta(&self, meta: ThreadMeta) -> Result<()> {
        let mut store = self.store.write().await;
        store
            .thread_meta
            .insert((meta.thread_id.clone(), meta.scenario.clone()), meta);
        Ok(())
    }

    async fn delete_thread_meta(&self, thread_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.thread_meta.retain(|(id, _), _| id != thread_id);
        Ok(())
    }

    async fn list_thread_meta(&self, user_id: &str, limit: usize) -> Result<Vec<ThreadMeta>> {
        let store = self.store.read().await;
        let mut rows: Vec<ThreadMeta> = store
            .thread_meta
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn get_user_memory(&self, user_email: &str) -> Result<Option<UserMemory>> {
        let store = self.store.read().await;
        Ok(store.user_memory.get(&user_email.trim().to_lowercase()).cloned())
    }

    async fn save_user_memory(&self, memory: UserMemory) -> Result<()> {
        let mut store = self.store.write().await;
        store
            .user_memory
            .insert(memory.user_email.trim().to_lowercase(), memory);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Sender, UserIdentity};

    #[tokio::test]
    async fn test_recent_messages_keeps_order() {
        let client = InMemoryPersistenceClient::new();
        let who = UserIdentity::new("u1", "a@b.co");
        for i in 0..5 {
            client
                .save_message(DBMessage::new("t1", "general", Sender::User, format!("m{}", i), &who))
                .await
                .unwrap();
        }

        let recent = client.recent_messages("t1", 3).await.unwrap();
        let texts: Vec<_> = recent.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["m2", "m3", "m4"]);
        assert_eq!(client.latest_message("t1").await.unwrap().unwrap().text, "m4");
    }

    #[tokio::test]
    async fn test_thread_meta_keyed_by_scenario() {
        let client = InMemoryPersistenceClient::new();
        let who = UserIdentity::new("u1", "a@b.co");
        client.save_thread_meta(ThreadMeta::new("t1", "jurisprudence", &who, None)).await.unwrap();
        client.save_thread_meta(ThreadMeta::new("t1", "general", &who, None)).await.unwrap();

        assert!(client.get_thread_meta("t1", "general").await.unwrap().is_some());
        assert_eq!(client.list_thread_meta("u1", 10).await.unwrap().len(), 2);

        client.delete_thread_meta("t1").await.unwrap();
        assert!(client.latest_thread_meta("t1").await.unwrap().is_none());
    }
}
