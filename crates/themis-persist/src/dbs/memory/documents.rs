use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::models::LegalDocument;
use crate::trait_client::DocumentSource;

/// Document source backed by a vector, optionally seeded from a JSON file
#[derive(Default)]
pub struct InMemoryDocumentSource {
    documents: RwLock<Vec<LegalDocument>>,
}

impl InMemoryDocumentSource {
    pub fn new(documents: Vec<LegalDocument>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Load a JSON array of documents
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PersistError::Fixture(format!("{}: {}", path.display(), e)))?;
        let documents: Vec<LegalDocument> = serde_json::from_str(&raw)
            .map_err(|e| PersistError::Fixture(format!("{}: {}", path.display(), e)))?;

        tracing::info!(count = documents.len(), path = %path.display(), "Loaded document fixtures");
        Ok(Self::new(documents))
    }

    pub async fn insert(&self, document: LegalDocument) {
        self.documents.write().await.push(document);
    }
}

#[async_trait]
impl DocumentSource for InMemoryDocumentSource {
    async fn documents_for_user(&self, user_id: &str) -> Result<Vec<LegalDocument>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|d| d.user_id.is_empty() || d.user_id == user_id)
            .cloned()
            .collect())
    }
}
