use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime, Bson};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{
    Attachment, DBMessage, EvidenceChecklist, HistoryTurn, LegalDocument, Ruling, Sender, ThreadMeta,
};

/// MongoDB-specific message model (ObjectId key, BSON timestamps)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMessage {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub message_id: String,
    pub thread_id: String,
    pub scenario: String,
    pub sender: Sender,
    pub text: String,
    pub user_id: String,
    pub user_email: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// MongoDB-specific thread memory row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoThreadMeta {
    pub thread_id: String,
    pub scenario: String,
    pub user_id: String,
    pub user_email: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub short_history: Vec<HistoryTurn>,
    #[serde(default)]
    pub message_count: i64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub last_message_at: DateTime<Utc>,
}

/// Stored legal document; `_id` may be an ObjectId or a string
#[derive(Debug, Clone, Deserialize)]
pub struct MongoDocument {
    #[serde(rename = "_id", default)]
    pub id: Option<Bson>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub rulings: Vec<Ruling>,
    #[serde(default)]
    pub evidence: Option<EvidenceChecklist>,
    #[serde(default)]
    pub constitution: Option<String>,
}

// Conversions between database-agnostic and MongoDB-specific models

impl From<DBMessage> for MongoMessage {
    fn from(msg: DBMessage) -> Self {
        Self {
            id: ObjectId::new(),
            message_id: msg.id,
            thread_id: msg.thread_id,
            scenario: msg.scenario,
            sender: msg.sender,
            text: msg.text,
            user_id: msg.user_id,
            user_email: msg.user_email,
            attachments: msg.attachments,
            created_at: msg.created_at,
        }
    }
}

impl From<MongoMessage> for DBMessage {
    fn from(msg: MongoMessage) -> Self {
        Self {
            id: msg.message_id,
            thread_id: msg.thread_id,
            scenario: msg.scenario,
            sender: msg.sender,
            text: msg.text,
            user_id: msg.user_id,
            user_email: msg.user_email,
            attachments: msg.attachments,
            created_at: msg.created_at,
        }
    }
}

impl From<ThreadMeta> for MongoThreadMeta {
    fn from(meta: ThreadMeta) -> Self {
        Self {
            thread_id: meta.thread_id,
            scenario: meta.scenario,
            user_id: meta.user_id,
            user_email: meta.user_email,
            title: meta.title,
            summary: meta.summary,
            short_history: meta.short_history,
            message_count: i64::try_from(meta.message_count).unwrap_or(i64::MAX),
            created_at: meta.created_at,
            last_message_at: meta.last_message_at,
        }
    }
}

impl From<MongoThreadMeta> for ThreadMeta {
    fn from(meta: MongoThreadMeta) -> Self {
        Self {
            thread_id: meta.thread_id,
            scenario: meta.scenario,
            user_id: meta.user_id,
            user_email: meta.user_email,
            title: meta.title,
            summary: meta.summary,
            short_history: meta.short_history,
            message_count: u64::try_from(meta.message_count).unwrap_or(0),
            created_at: meta.created_at,
            last_message_at: meta.last_message_at,
        }
    }
}

impl From<MongoDocument> for LegalDocument {
    fn from(doc: MongoDocument) -> Self {
        let id = match doc.id {
            Some(Bson::ObjectId(oid)) => oid.to_hex(),
            Some(Bson::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        Self {
            id,
            user_id: doc.user_id,
            title: doc.title,
            content: doc.content,
            fields: doc.fields,
            rulings: doc.rulings,
            evidence: doc.evidence,
            constitution: doc.constitution,
        }
    }
}
