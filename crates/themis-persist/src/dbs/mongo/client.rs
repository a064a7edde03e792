use async_trait::async_trait;
use mongodb::{bson::doc, Client};

use crate::dbs::mongo::models::{MongoMessage, MongoThreadMeta};
use crate::dbs::mongo::repositories::{
    MongoDocumentRepository, MongoMessageRepository, MongoThreadMetaRepository,
    MongoUserMemoryRepository,
};
use crate::error::{PersistError, Result};
use crate::models::{DBMessage, LegalDocument, ThreadMeta, UserMemory};
use crate::trait_client::{DocumentSource, PersistenceClient};

fn as_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

pub struct MongoPersistenceClient {
    client: Client,
    database: String,
    message_repo: MongoMessageRepository,
    thread_meta_repo: MongoThreadMetaRepository,
    user_memory_repo: MongoUserMemoryRepository,
}

impl MongoPersistenceClient {
    /// Connect to MongoDB and create client
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        Ok(Self {
            message_repo: MongoMessageRepository::new(&client, database),
            thread_meta_repo: MongoThreadMetaRepository::new(&client, database),
            user_memory_repo: MongoUserMemoryRepository::new(&client, database),
            database: database.to_string(),
            client,
        })
    }

    /// Document source sharing this connection
    pub fn document_source(&self) -> MongoDocumentSource {
        MongoDocumentSource {
            repo: MongoDocumentRepository::new(&self.client, &self.database),
        }
    }
}

#[async_trait]
impl PersistenceClient for MongoPersistenceClient {
    async fn save_message(&self, message: DBMessage) -> Result<()> {
        let mongo_message: MongoMessage = message.into();
        self.message_repo.save_message(mongo_message).await
    }

    async fn recent_messages(&self, thread_id: &str, limit: usize) -> Result<Vec<DBMessage>> {
        let messages = self.message_repo.recent_messages(thread_id, as_limit(limit)).await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }

    async fn latest_message(&self, thread_id: &str) -> Result<Option<DBMessage>> {
        Ok(self.message_repo.latest_message(thread_id).await?.map(Into::into))
    }

    async fn delete_messages(&self, thread_id: &str) -> Result<u64> {
        self.message_repo.delete_messages(thread_id).await
    }

    async fn get_thread_meta(&self, thread_id: &str, scenario: &str) -> Result<Option<ThreadMeta>> {
        Ok(self.thread_meta_repo.get(thread_id, scenario).await?.map(Into::into))
    }

    async fn latest_thread_meta(&self, thread_id: &str) -> Result<Option<ThreadMeta>> {
        Ok(self.thread_meta_repo.latest(thread_id).await?.map(Into::into))
    }

    async fn save_thread_meta(&self, meta: ThreadMeta) -> Result<()> {
        let mongo_meta: MongoThreadMeta = meta.into();
        self.thread_meta_repo.save(mongo_meta).await
    }

    async fn delete_thread_meta(&self, thread_id: &str) -> Result<()> {
        self.thread_meta_repo.delete(thread_id).await
    }

    async fn list_thread_meta(&self, user_id: &str, limit: usize) -> Result<Vec<ThreadMeta>> {
        let rows = self.thread_meta_repo.list(user_id, as_limit(limit)).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_user_memory(&self, user_email: &str) -> Result<Option<UserMemory>> {
        self.user_memory_repo.get(user_email).await
    }

    async fn save_user_memory(&self, memory: UserMemory) -> Result<()> {
        self.user_memory_repo.save(memory).await
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}

/// Reads the `documents` collection
pub struct MongoDocumentSource {
    repo: MongoDocumentRepository,
}

#[async_trait]
impl DocumentSource for MongoDocumentSource {
    async fn documents_for_user(&self, user_id: &str) -> Result<Vec<LegalDocument>> {
        let documents = self.repo.for_user(user_id).await?;
        Ok(documents.into_iter().map(Into::into).collect())
    }
}
