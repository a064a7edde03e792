use async_trait::async_trait;

use crate::error::Result;
use crate::models::{DBMessage, LegalDocument, ThreadMeta, UserMemory};

/// Trait for database persistence operations
///
/// Implementations provide database-specific storage for messages,
/// per-thread memory rows and per-user memory.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Save a single message
    async fn save_message(&self, message: DBMessage) -> Result<()>;

    /// The newest `limit` messages of a thread, oldest first
    async fn recent_messages(&self, thread_id: &str, limit: usize) -> Result<Vec<DBMessage>>;

    /// The most recent message carrying this thread id
    async fn latest_message(&self, thread_id: &str) -> Result<Option<DBMessage>>;

    /// Delete every message of a thread, returning how many were removed
    async fn delete_messages(&self, thread_id: &str) -> Result<u64>;

    /// Memory row for one (thread, scenario)
    async fn get_thread_meta(&self, thread_id: &str, scenario: &str) -> Result<Option<ThreadMeta>>;

    /// Most recently touched memory row of a thread, whatever its scenario
    async fn latest_thread_meta(&self, thread_id: &str) -> Result<Option<ThreadMeta>>;

    /// Insert or replace the row keyed by (thread_id, scenario)
    async fn save_thread_meta(&self, meta: ThreadMeta) -> Result<()>;

    /// Delete all memory rows of a thread
    async fn delete_thread_meta(&self, thread_id: &str) -> Result<()>;

    /// Threads of a user, most recently active first
    async fn list_thread_meta(&self, user_id: &str, limit: usize) -> Result<Vec<ThreadMeta>>;

    async fn get_user_memory(&self, user_email: &str) -> Result<Option<UserMemory>>;

    async fn save_user_memory(&self, memory: UserMemory) -> Result<()>;

    /// Lightweight connectivity check
    async fn ping(&self) -> Result<()>;
}

/// Read-only source of structured legal documents
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn documents_for_user(&self, user_id: &str) -> Result<Vec<LegalDocument>>;
}
