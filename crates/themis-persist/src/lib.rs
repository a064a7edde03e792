pub mod models;
pub mod trait_client;
pub mod dbs;
pub mod memory;
pub mod error;

pub use models::{
    Attachment, DBMessage, EvidenceChecklist, EvidenceItem, HistoryTurn, LegalDocument,
    OwnerFingerprint, RecentThread, Ruling, Sender, ThreadMeta, UserIdentity, UserMemory,
};
pub use trait_client::{DocumentSource, PersistenceClient};
pub use dbs::memory::{InMemoryDocumentSource, InMemoryPersistenceClient};
#[cfg(feature = "mongodb")]
pub use dbs::mongo::{MongoDocumentSource, MongoPersistenceClient};
pub use memory::{MemoryLimits, MemoryStore};
pub use error::{PersistError, Result};
