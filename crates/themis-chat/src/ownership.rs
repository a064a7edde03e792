use std::sync::Arc;

use themis_persist::{OwnerFingerprint, PersistenceClient};

use crate::cache::KeyValueCache;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerCheck {
    Allow,
    Deny,
}

/// Thread id -> owner fingerprint, bound once and never overwritten
#[derive(Clone)]
pub struct OwnershipRegistry {
    owners: Arc<dyn KeyValueCache<OwnerFingerprint>>,
    persist: Arc<dyn PersistenceClient>,
}

impl OwnershipRegistry {
    pub fn new(
        owners: Arc<dyn KeyValueCache<OwnerFingerprint>>,
        persist: Arc<dyn PersistenceClient>,
    ) -> Self {
        Self { owners, persist }
    }

    /// Cached owner, else the thread-meta row, else the latest persisted message
    pub async fn resolve_owner(&self, thread_id: &str) -> Result<Option<OwnerFingerprint>> {
        if let Some(owner) = self.owners.get(thread_id).await {
            return Ok(Some(owner));
        }

        let from_storage = match self.persist.latest_thread_meta(thread_id).await? {
            Some(meta) => Some(meta.owner()),
            None => self
                .persist
                .latest_message(thread_id)
                .await?
                .map(|m| m.identity().fingerprint()),
        };

        match from_storage {
            Some(owner) => Ok(Some(self.owners.insert_if_absent(thread_id, owner).await)),
            None => Ok(None),
        }
    }

    /// Bind `owner` unless the thread already has one; returns the effective owner
    pub async fn bind_owner(&self, thread_id: &str, owner: OwnerFingerprint) -> OwnerFingerprint {
        self.owners.insert_if_absent(thread_id, owner).await
    }

    /// Compare the caller with the owner, binding the caller to an unowned thread
    pub async fn check_owner(&self, thread_id: &str, caller: &OwnerFingerprint) -> Result<OwnerCheck> {
        let owner = match self.resolve_owner(thread_id).await? {
            Some(owner) => owner,
            None => self.bind_owner(thread_id, caller.clone()).await,
        };
        Ok(Self::compare(thread_id, &owner, caller))
    }

    /// Same comparison without binding; unowned threads are allowed
    pub async fn verify_owner(&self, thread_id: &str, caller: &OwnerFingerprint) -> Result<OwnerCheck> {
        match self.resolve_owner(thread_id).await? {
            Some(owner) => Ok(Self::compare(thread_id, &owner, caller)),
            None => Ok(OwnerCheck::Allow),
        }
    }

    pub async fn unbind(&self, thread_id: &str) {
        self.owners.remove(thread_id).await;
    }

    fn compare(thread_id: &str, owner: &OwnerFingerprint, caller: &OwnerFingerprint) -> OwnerCheck {
        if owner == caller {
            OwnerCheck::Allow
        } else {
            tracing::warn!(thread_id = %thread_id, "Rejected access to thread owned by another user");
            OwnerCheck::Deny
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InProcessCache;
    use themis_persist::{DBMessage, InMemoryPersistenceClient, Sender, ThreadMeta, UserIdentity};

    fn registry(persist: Arc<InMemoryPersistenceClient>) -> OwnershipRegistry {
        OwnershipRegistry::new(Arc::new(InProcessCache::<OwnerFingerprint>::new()), persist)
    }

    #[tokio::test]
    async fn test_first_caller_becomes_owner() {
        let reg = registry(Arc::new(InMemoryPersistenceClient::new()));
        let ana = UserIdentity::new("u1", "ana@firm.co").fingerprint();
        let luis = UserIdentity::new("u2", "luis@firm.co").fingerprint();

        assert_eq!(reg.check_owner("t1", &ana).await.unwrap(), OwnerCheck::Allow);
        assert_eq!(reg.check_owner("t1", &luis).await.unwrap(), OwnerCheck::Deny);
        assert_eq!(reg.check_owner("t1", &ana).await.unwrap(), OwnerCheck::Allow);
    }

    #[tokio::test]
    async fn test_owner_resolved_from_stored_message() {
        let persist = Arc::new(InMemoryPersistenceClient::new());
        let ana = UserIdentity::new("u1", "Ana@Firm.co");
        persist
            .save_message(DBMessage::new("t1", "general", Sender::User, "hola", &ana))
            .await
            .unwrap();

        let reg = registry(persist);
        let luis = UserIdentity::new("u2", "luis@firm.co").fingerprint();
        assert_eq!(reg.check_owner("t1", &luis).await.unwrap(), OwnerCheck::Deny);
        assert_eq!(reg.check_owner("t1", &ana.fingerprint()).await.unwrap(), OwnerCheck::Allow);
    }

    #[tokio::test]
    async fn test_thread_meta_takes_precedence_over_messages() {
        let persist = Arc::new(InMemoryPersistenceClient::new());
        let ana = UserIdentity::new("u1", "ana@firm.co");
        persist
            .save_thread_meta(ThreadMeta::new("t1", "general", &ana, None))
            .await
            .unwrap();

        let reg = registry(persist);
        assert_eq!(reg.resolve_owner("t1").await.unwrap(), Some(ana.fingerprint()));
    }

    #[tokio::test]
    async fn test_bind_never_overwrites() {
        let reg = registry(Arc::new(InMemoryPersistenceClient::new()));
        let ana = UserIdentity::new("u1", "ana@firm.co").fingerprint();
        let luis = UserIdentity::new("u2", "luis@firm.co").fingerprint();

        reg.bind_owner("t1", ana.clone()).await;
        assert_eq!(reg.bind_owner("t1", luis).await, ana);
    }

    #[tokio::test]
    async fn test_verify_does_not_bind() {
        let reg = registry(Arc::new(InMemoryPersistenceClient::new()));
        let ana = UserIdentity::new("u1", "ana@firm.co").fingerprint();

        assert_eq!(reg.verify_owner("t1", &ana).await.unwrap(), OwnerCheck::Allow);
        assert_eq!(reg.resolve_owner("t1").await.unwrap(), None);
    }
}
