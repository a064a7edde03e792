use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use themis_persist::{
    Attachment, DBMessage, DocumentSource, MemoryLimits, MemoryStore, OwnerFingerprint,
    PersistenceClient, Sender, ThreadMeta, UserIdentity, UserMemory,
};

use crate::cache::{CachedMessage, InProcessCache, KeyValueCache, MessageCache, CACHE_CAPACITY, RELOAD_WINDOW};
use crate::error::{ChatError, Result};
use crate::language::{detect, Language};
use crate::ownership::{OwnerCheck, OwnershipRegistry};
use crate::prompt::{PromptAssembler, PromptContext};
use crate::quick_answers::try_quick_answer;
use crate::reflow::reflow;
use crate::relay::CompletionRelay;
use crate::scenario::Scenario;

const EVENT_BUFFER: usize = 256;
const SCENARIO_KINDS: usize = 5;

/// Tunables for one orchestrator instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub cache_capacity: usize,
    pub cache_reload_window: usize,
    pub history_limit: usize,
    pub memory: MemoryLimits,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 2048,
            cache_capacity: CACHE_CAPACITY,
            cache_reload_window: RELOAD_WINDOW,
            history_limit: 200,
            memory: MemoryLimits::default(),
        }
    }
}

/// One user message as handed over by the HTTP layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageTurn {
    pub text: String,
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Frames sent to the client, serialized as `{content}`, `{error}` or `{completed}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatEvent {
    Content {
        content: String,
    },
    Error {
        error: String,
    },
    Completed {
        completed: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        formatted: Option<String>,
    },
}

impl ChatEvent {
    pub fn completed(formatted: Option<String>) -> Self {
        ChatEvent::Completed {
            completed: true,
            formatted,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::Completed { .. })
    }
}

/// Ties ownership, caching, quick answers, the relay and memory together
#[derive(Clone)]
pub struct ChatOrchestrator {
    persist: Arc<dyn PersistenceClient>,
    documents: Arc<dyn DocumentSource>,
    relay: CompletionRelay,
    registry: OwnershipRegistry,
    cache: MessageCache,
    memory: MemoryStore,
    assembler: PromptAssembler,
    config: ChatConfig,
}

impl ChatOrchestrator {
    /// Orchestrator with in-process ownership and message caches
    pub fn new(
        persist: Arc<dyn PersistenceClient>,
        documents: Arc<dyn DocumentSource>,
        relay: CompletionRelay,
        config: ChatConfig,
    ) -> Self {
        Self::with_caches(
            persist,
            documents,
            relay,
            config,
            Arc::new(InProcessCache::<OwnerFingerprint>::new()),
            Arc::new(InProcessCache::<Vec<CachedMessage>>::new()),
        )
    }

    /// Orchestrator over injected caches, e.g. an external store shared by several instances
    pub fn with_caches(
        persist: Arc<dyn PersistenceClient>,
        documents: Arc<dyn DocumentSource>,
        relay: CompletionRelay,
        config: ChatConfig,
        owners: Arc<dyn KeyValueCache<OwnerFingerprint>>,
        messages: Arc<dyn KeyValueCache<Vec<CachedMessage>>>,
    ) -> Self {
        let registry = OwnershipRegistry::new(owners, Arc::clone(&persist));
        let cache = MessageCache::new(messages, Arc::clone(&persist))
            .with_limits(config.cache_capacity, config.cache_reload_window);
        let memory = MemoryStore::new(Arc::clone(&persist), config.memory.clone());

        Self {
            persist,
            documents,
            relay,
            registry,
            cache,
            memory,
            assembler: PromptAssembler::default(),
            config,
        }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn persistence(&self) -> &Arc<dyn PersistenceClient> {
        &self.persist
    }

    /// Create a thread owned by the caller and write its memory row
    pub async fn open_thread(
        &self,
        caller: &UserIdentity,
        scenario: &str,
        title: Option<String>,
    ) -> Result<ThreadMeta> {
        let thread_id = uuid::Uuid::new_v4().to_string();
        let scenario = Scenario::from_key(scenario).key();

        self.registry.bind_owner(&thread_id, caller.fingerprint()).await;
        let meta = self
            .memory
            .ensure_thread(caller, &thread_id, scenario, title.filter(|t| !t.trim().is_empty()))
            .await?;

        tracing::info!(thread_id = %thread_id, scenario = %scenario, "Opened thread");
        Ok(meta)
    }

    /// Check ownership, then run the turn on a background task feeding the returned channel
    ///
    /// The task finishes and persists the exchange even if the receiver is dropped.
    pub async fn send_message(
        &self,
        caller: &UserIdentity,
        thread_id: &str,
        turn: MessageTurn,
    ) -> Result<mpsc::Receiver<ChatEvent>> {
        let asked_at = Utc::now();
        if turn.text.trim().is_empty() {
            return Err(ChatError::InvalidInput("message text is empty".to_string()));
        }

        self.ensure_owner(thread_id, caller, true).await?;

        let scenario = match turn.scenario.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(key) => Scenario::from_key(key).key().to_string(),
            None => self
                .persist
                .latest_thread_meta(thread_id)
                .await?
                .map(|m| m.scenario)
                .unwrap_or_else(|| Scenario::General.key().to_string()),
        };
        self.memory.ensure_thread(caller, thread_id, &scenario, None).await?;

        let question = DBMessage::new(thread_id, &scenario, Sender::User, turn.text.clone(), caller)
            .with_attachments(turn.attachments.clone())
            .with_created_at(asked_at);

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let this = self.clone();
        let caller = caller.clone();
        let thread_id = thread_id.to_string();

        tokio::spawn(async move {
            this.run_turn(caller, thread_id, scenario, turn, question, tx).await;
        });

        Ok(rx)
    }

    async fn run_turn(
        &self,
        caller: UserIdentity,
        thread_id: String,
        scenario: String,
        turn: MessageTurn,
        question: DBMessage,
        tx: mpsc::Sender<ChatEvent>,
    ) {
        let language = detect(&turn.text);

        let documents = match self.documents.documents_for_user(&caller.user_id).await {
            Ok(documents) => documents,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load documents for quick answers");
                Vec::new()
            }
        };

        if let Some(answer) = try_quick_answer(&turn.text, &documents, language) {
            tracing::info!(thread_id = %thread_id, matcher = answer.matcher, "Answered without completion");
            let _ = tx.send(ChatEvent::Content { content: answer.text.clone() }).await;
            self.finish_exchange(&caller, &thread_id, &scenario, question, answer.text).await;
            let _ = tx.send(ChatEvent::completed(None)).await;
            return;
        }

        match self.relay_completion(&caller, &thread_id, &scenario, &turn, language, &tx).await {
            Ok(full) => {
                let formatted = reflow(&full);
                let changed = formatted != full;
                self.finish_exchange(&caller, &thread_id, &scenario, question, formatted.clone()).await;
                let _ = tx.send(ChatEvent::completed(changed.then_some(formatted))).await;
            }
            Err(e) => {
                tracing::error!(thread_id = %thread_id, error = %e, code = e.code(), "Completion failed");
                let _ = tx
                    .send(ChatEvent::Error { error: language.upstream_fallback().to_string() })
                    .await;
                let _ = tx.send(ChatEvent::completed(None)).await;
            }
        }
    }

    /// Stream deltas to the client and return the accumulated text
    async fn relay_completion(
        &self,
        caller: &UserIdentity,
        thread_id: &str,
        scenario: &str,
        turn: &MessageTurn,
        language: Language,
        tx: &mpsc::Sender<ChatEvent>,
    ) -> Result<String> {
        let cached = self.cache.get(thread_id).await?;
        let thread = self.persist.get_thread_meta(thread_id, scenario).await?;
        let user = self.memory.user_memory(&caller.user_email).await?;

        let prompt = self.assembler.assemble(&PromptContext {
            scenario,
            language,
            thread_id,
            thread: thread.as_ref(),
            user: Some(&user),
            cached: &cached,
            attachments: &turn.attachments,
            question: &turn.text,
        });

        let mut deltas = self
            .relay
            .stream(
                &prompt.system,
                &prompt.user,
                self.config.temperature,
                self.config.max_tokens,
                language,
            )
            .await?;

        let mut full = String::new();
        while let Some(delta) = deltas.next().await {
            let delta = delta?;
            full.push_str(&delta);
            // A closed receiver only means the client left; keep reading so the exchange is stored
            let _ = tx.send(ChatEvent::Content { content: delta }).await;
        }

        if full.trim().is_empty() {
            return Err(ChatError::Upstream {
                status: 200,
                body: String::new(),
            });
        }
        Ok(full)
    }

    /// Update cache, storage and memory; failures are logged and not retried
    async fn finish_exchange(
        &self,
        caller: &UserIdentity,
        thread_id: &str,
        scenario: &str,
        question: DBMessage,
        answer: String,
    ) {
        let reply = DBMessage::new(thread_id, scenario, Sender::Assistant, answer.clone(), caller)
            .ordered_after(&question);

        if let Err(e) = self.cache.get(thread_id).await {
            tracing::warn!(thread_id = %thread_id, error = %e, "Failed to seed message cache");
        }
        self.cache
            .append(thread_id, vec![CachedMessage::from(&question), CachedMessage::from(&reply)])
            .await;

        let asked = question.text.clone();
        for message in [question, reply] {
            if let Err(e) = self.persist.save_message(message).await {
                tracing::error!(thread_id = %thread_id, error = %e, "Failed to persist message");
            }
        }

        if let Err(e) = self
            .memory
            .record_exchange(caller, thread_id, scenario, &asked, &answer)
            .await
        {
            tracing::error!(thread_id = %thread_id, error = %e, "Failed to update thread memory");
        }
    }

    /// Stored messages of a thread, oldest first
    pub async fn history(
        &self,
        caller: &UserIdentity,
        thread_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<DBMessage>> {
        self.ensure_owner(thread_id, caller, false).await?;
        let limit = limit.unwrap_or(self.config.history_limit).min(self.config.history_limit);
        Ok(self.persist.recent_messages(thread_id, limit).await?)
    }

    pub async fn thread(&self, caller: &UserIdentity, thread_id: &str) -> Result<ThreadMeta> {
        self.ensure_owner(thread_id, caller, false).await?;
        self.persist
            .latest_thread_meta(thread_id)
            .await?
            .ok_or_else(|| ChatError::ThreadNotFound(thread_id.to_string()))
    }

    /// Threads of the caller, one entry each, most recently active first
    pub async fn list_threads(&self, caller: &UserIdentity, limit: usize) -> Result<Vec<ThreadMeta>> {
        let owner = caller.fingerprint();
        // one meta row per scenario a thread was used in
        let rows = self
            .persist
            .list_thread_meta(&caller.user_id, limit.saturating_mul(SCENARIO_KINDS))
            .await?;

        let mut seen = HashSet::new();
        let mut threads: Vec<ThreadMeta> = rows.into_iter().filter(|t| t.owner() == owner).collect();
        threads.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        threads.retain(|t| seen.insert(t.thread_id.clone()));
        threads.truncate(limit);
        Ok(threads)
    }

    /// Delete messages and reset memory; the owner stays bound
    pub async fn clear_history(&self, caller: &UserIdentity, thread_id: &str) -> Result<u64> {
        self.ensure_owner(thread_id, caller, false).await?;

        let deleted = self.persist.delete_messages(thread_id).await?;
        self.memory.reset_thread(thread_id).await?;
        self.cache.invalidate(thread_id).await;

        tracing::info!(thread_id = %thread_id, deleted, "Cleared thread history");
        Ok(deleted)
    }

    /// Clear the thread, unbind its owner and drop it from the caller's memory
    pub async fn delete_thread(&self, caller: &UserIdentity, thread_id: &str) -> Result<()> {
        self.ensure_owner(thread_id, caller, false).await?;

        let deleted = self.persist.delete_messages(thread_id).await?;
        self.memory.forget_thread(caller, thread_id).await?;
        self.cache.invalidate(thread_id).await;
        self.registry.unbind(thread_id).await;

        tracing::info!(thread_id = %thread_id, deleted, "Deleted thread");
        Ok(())
    }

    pub async fn user_memory(&self, caller: &UserIdentity) -> Result<UserMemory> {
        Ok(self.memory.user_memory(&caller.user_email).await?)
    }

    pub async fn remember_fact(&self, caller: &UserIdentity, fact: &str) -> Result<UserMemory> {
        if fact.trim().is_empty() {
            return Err(ChatError::InvalidInput("fact is empty".to_string()));
        }
        Ok(self.memory.remember_fact(caller, fact).await?)
    }

    async fn ensure_owner(&self, thread_id: &str, caller: &UserIdentity, bind: bool) -> Result<()> {
        let fingerprint = caller.fingerprint();
        let check = if bind {
            self.registry.check_owner(thread_id, &fingerprint).await?
        } else {
            self.registry.verify_owner(thread_id, &fingerprint).await?
        };

        match check {
            OwnerCheck::Allow => Ok(()),
            OwnerCheck::Deny => Err(ChatError::ThreadOwnership {
                thread_id: thread_id.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shapes() {
        let content = serde_json::to_value(ChatEvent::Content { content: "Hi".into() }).unwrap();
        assert_eq!(content, serde_json::json!({"content": "Hi"}));

        let error = serde_json::to_value(ChatEvent::Error { error: "x".into() }).unwrap();
        assert_eq!(error, serde_json::json!({"error": "x"}));

        let done = serde_json::to_value(ChatEvent::completed(None)).unwrap();
        assert_eq!(done, serde_json::json!({"completed": true}));

        let formatted = serde_json::to_value(ChatEvent::completed(Some("| a |".into()))).unwrap();
        assert_eq!(formatted, serde_json::json!({"completed": true, "formatted": "| a |"}));
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: ChatConfig = serde_json::from_str(r#"{"model": "gpt-4o"}"#).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.cache_capacity, 20);
        assert_eq!(config.cache_reload_window, 60);
        assert_eq!(config.memory.summary_cap, 100_000);
    }
}
