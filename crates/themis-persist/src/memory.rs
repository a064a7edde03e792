// Persistent thread and user memory built on top of a PersistenceClient

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{HistoryTurn, RecentThread, Sender, ThreadMeta, UserIdentity, UserMemory};
use crate::trait_client::PersistenceClient;

pub const SUMMARY_CAP: usize = 100_000;
pub const SHORT_HISTORY_LEN: usize = 12;
pub const RECENT_THREADS_CAP: usize = 10;
pub const FACTS_CAP: usize = 50;
/// Longest slice of a single turn copied into the running summary
pub const SUMMARY_TURN_CHARS: usize = 1_200;
/// Summary tail copied into the user's recent-thread entry
pub const RECENT_SUMMARY_CHARS: usize = 600;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryLimits {
    pub summary_cap: usize,
    pub short_history: usize,
    pub recent_threads: usize,
    pub facts: usize,
}

impl Default for MemoryLimits {
    fn default() -> Self {
        Self {
            summary_cap: SUMMARY_CAP,
            short_history: SHORT_HISTORY_LEN,
            recent_threads: RECENT_THREADS_CAP,
            facts: FACTS_CAP,
        }
    }
}

/// The last `max` characters of `text`
pub fn tail_chars(text: &str, max: usize) -> &str {
    let count = text.chars().count();
    if count <= max {
        return text;
    }
    match text.char_indices().nth(count - max) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

/// The first `max` characters of `text`, with an ellipsis when cut
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

/// Append then trim from the oldest end so the result never exceeds `cap` chars
pub fn append_summary(summary: &mut String, addition: &str, cap: usize) {
    if !summary.is_empty() && !summary.ends_with('\n') {
        summary.push('\n');
    }
    summary.push_str(addition);

    let count = summary.chars().count();
    if count > cap {
        let keep_from = summary
            .char_indices()
            .nth(count - cap)
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        summary.drain(..keep_from);
    }
}

/// Reads and updates ThreadMeta / UserMemory rows after each exchange
#[derive(Clone)]
pub struct MemoryStore {
    persist: Arc<dyn PersistenceClient>,
    limits: MemoryLimits,
}

impl MemoryStore {
    pub fn new(persist: Arc<dyn PersistenceClient>, limits: MemoryLimits) -> Self {
        Self { persist, limits }
    }

    pub fn limits(&self) -> &MemoryLimits {
        &self.limits
    }

    pub fn persistence(&self) -> &Arc<dyn PersistenceClient> {
        &self.persist
    }

    pub async fn thread_memory(&self, thread_id: &str, scenario: &str) -> Result<Option<ThreadMeta>> {
        self.persist.get_thread_meta(thread_id, scenario).await
    }

    /// User memory row, or an empty one when the user has none yet
    pub async fn user_memory(&self, user_email: &str) -> Result<UserMemory> {
        Ok(self
            .persist
            .get_user_memory(&user_email.trim().to_lowercase())
            .await?
            .unwrap_or_else(|| UserMemory::new(user_email)))
    }

    /// Create the (thread, scenario) row if missing and return it
    pub async fn ensure_thread(
        &self,
        owner: &UserIdentity,
        thread_id: &str,
        scenario: &str,
        title: Option<String>,
    ) -> Result<ThreadMeta> {
        if let Some(existing) = self.persist.get_thread_meta(thread_id, scenario).await? {
            return Ok(existing);
        }

        let meta = ThreadMeta::new(thread_id, scenario, owner, title);
        self.persist.save_thread_meta(meta.clone()).await?;
        tracing::debug!(thread_id = %thread_id, scenario = %scenario, "Created thread memory row");
        Ok(meta)
    }

    /// Fold one completed user/assistant exchange into thread and user memory
    pub async fn record_exchange(
        &self,
        owner: &UserIdentity,
        thread_id: &str,
        scenario: &str,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<ThreadMeta> {
        let mut meta = match self.persist.get_thread_meta(thread_id, scenario).await? {
            Some(meta) => meta,
            None => ThreadMeta::new(thread_id, scenario, owner, None),
        };

        let now = Utc::now();
        let entry = format!(
            "Usuario: {}\nAsistente: {}",
            truncate_chars(user_text.trim(), SUMMARY_TURN_CHARS),
            truncate_chars(assistant_text.trim(), SUMMARY_TURN_CHARS),
        );
        append_summary(&mut meta.summary, &entry, self.limits.summary_cap);

        meta.short_history.push(HistoryTurn {
            sender: Sender::User,
            text: user_text.to_string(),
            at: now,
        });
        meta.short_history.push(HistoryTurn {
            sender: Sender::Assistant,
            text: assistant_text.to_string(),
            at: now,
        });
        if meta.short_history.len() > self.limits.short_history {
            let excess = meta.short_history.len() - self.limits.short_history;
            meta.short_history.drain(..excess);
        }

        if meta.title.is_none() {
            meta.title = Some(truncate_chars(user_text.trim(), 80));
        }
        meta.message_count += 2;
        meta.last_message_at = now;

        self.persist.save_thread_meta(meta.clone()).await?;

        let mut user = self.user_memory(&owner.user_email).await?;
        user.touch_thread(
            RecentThread {
                thread_id: thread_id.to_string(),
                scenario: scenario.to_string(),
                title: meta.title.clone(),
                summary: tail_chars(&meta.summary, RECENT_SUMMARY_CHARS).to_string(),
                updated_at: now,
            },
            self.limits.recent_threads,
        );
        self.persist.save_user_memory(user).await?;

        Ok(meta)
    }

    /// Wipe summary and history of a thread but keep a row carrying its owner
    pub async fn reset_thread(&self, thread_id: &str) -> Result<()> {
        let latest = self.persist.latest_thread_meta(thread_id).await?;
        self.persist.delete_thread_meta(thread_id).await?;

        if let Some(previous) = latest {
            let mut fresh = ThreadMeta::new(
                thread_id,
                previous.scenario.clone(),
                &UserIdentity::new(previous.user_id.clone(), previous.user_email.clone()),
                previous.title.clone(),
            );
            fresh.created_at = previous.created_at;
            self.persist.save_thread_meta(fresh).await?;
        }
        Ok(())
    }

    /// Remove every memory trace of a thread, including the user's recall entry
    pub async fn forget_thread(&self, owner: &UserIdentity, thread_id: &str) -> Result<()> {
        self.persist.delete_thread_meta(thread_id).await?;

        if let Some(mut user) = self.persist.get_user_memory(&owner.normalized_email()).await? {
            if user.forget_thread(thread_id) {
                self.persist.save_user_memory(user).await?;
            }
        }
        Ok(())
    }

    pub async fn remember_fact(&self, owner: &UserIdentity, fact: &str) -> Result<UserMemory> {
        let mut user = self.user_memory(&owner.user_email).await?;
        if user.remember_fact(fact, self.limits.facts) {
            self.persist.save_user_memory(user.clone()).await?;
        }
        Ok(user)
    }
}
