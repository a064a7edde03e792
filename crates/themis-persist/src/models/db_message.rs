use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};

use super::identity::UserIdentity;

/// Database-agnostic message model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DBMessage {
    pub id: String,
    pub thread_id: String,
    pub scenario: String,
    pub sender: Sender,
    pub text: String,
    pub user_id: String,
    pub user_email: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
}

impl DBMessage {
    pub fn new(
        thread_id: impl Into<String>,
        scenario: impl Into<String>,
        sender: Sender,
        text: impl Into<String>,
        identity: &UserIdentity,
    ) -> Self {
        Self {
            // v7 ids sort by creation time, breaking ties between equal timestamps
            id: uuid::Uuid::now_v7().to_string(),
            thread_id: thread_id.into(),
            scenario: scenario.into(),
            sender,
            text: text.into(),
            user_id: identity.user_id.clone(),
            user_email: identity.normalized_email(),
            attachments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Stamp this message at least one stored millisecond after `earlier`
    pub fn ordered_after(mut self, earlier: &DBMessage) -> Self {
        let floor = earlier
            .created_at
            .duration_trunc(Duration::milliseconds(1))
            .unwrap_or(earlier.created_at)
            + Duration::milliseconds(1);
        if self.created_at < floor {
            self.created_at = floor;
        }
        self
    }

    pub fn identity(&self) -> UserIdentity {
        UserIdentity::new(self.user_id.clone(), self.user_email.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

/// File attached to a user message; `text` holds already-extracted content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}
