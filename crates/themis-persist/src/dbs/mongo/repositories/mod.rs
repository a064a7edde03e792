pub mod message;
pub mod thread_meta;
pub mod user_memory;
pub mod document;

pub use message::MongoMessageRepository;
pub use thread_meta::MongoThreadMetaRepository;
pub use user_memory::MongoUserMemoryRepository;
pub use document::MongoDocumentRepository;
