mod identity;
mod db_message;
mod thread_meta;
mod user_memory;
mod document;

// Export database-agnostic models
pub use identity::{OwnerFingerprint, UserIdentity};
pub use db_message::{Attachment, DBMessage, Sender};
pub use thread_meta::{HistoryTurn, ThreadMeta};
pub use user_memory::{RecentThread, UserMemory};
pub use document::{EvidenceChecklist, EvidenceItem, LegalDocument, Ruling};
