use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::db_message::Sender;
use super::identity::{OwnerFingerprint, UserIdentity};

/// Persisted per-(thread, scenario) memory row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMeta {
    pub thread_id: String,
    pub scenario: String,
    pub user_id: String,
    pub user_email: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Running summary, capped and trimmed from the oldest end
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub short_history: Vec<HistoryTurn>,
    #[serde(default)]
    pub message_count: u64,
    pub created_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
}

impl ThreadMeta {
    pub fn new(
        thread_id: impl Into<String>,
        scenario: impl Into<String>,
        owner: &UserIdentity,
        title: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            thread_id: thread_id.into(),
            scenario: scenario.into(),
            user_id: owner.user_id.clone(),
            user_email: owner.normalized_email(),
            title,
            summary: String::new(),
            short_history: Vec::new(),
            message_count: 0,
            created_at: now,
            last_message_at: now,
        }
    }

    pub fn owner(&self) -> OwnerFingerprint {
        OwnerFingerprint::new(&self.user_id, &self.user_email)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub sender: Sender,
    pub text: String,
    pub at: DateTime<Utc>,
}
