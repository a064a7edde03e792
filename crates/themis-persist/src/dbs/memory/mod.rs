mod client;
mod documents;

pub use client::InMemoryPersistenceClient;
pub use documents::InMemoryDocumentSource;
