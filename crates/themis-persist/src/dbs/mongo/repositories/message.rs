use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    Client, Collection,
};

use crate::dbs::mongo::models::MongoMessage;
use crate::error::Result;

/// Newest first; equal millisecond timestamps fall back to the time-ordered message id
fn newest_first() -> Document {
    doc! { "created_at": -1, "message_id": -1 }
}

#[derive(Clone)]
pub struct MongoMessageRepository {
    collection: Collection<MongoMessage>,
}

impl MongoMessageRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("messages");
        Self { collection }
    }

    /// Save a single message
    pub async fn save_message(&self, message: MongoMessage) -> Result<()> {
        self.collection.insert_one(&message).await?;
        Ok(())
    }

    /// Newest `limit` messages, returned oldest first
    pub async fn recent_messages(&self, thread_id: &str, limit: i64) -> Result<Vec<MongoMessage>> {
        let filter = doc! { "thread_id": thread_id };
        let mut messages: Vec<MongoMessage> = self
            .collection
            .find(filter)
            .sort(newest_first())
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        messages.reverse();
        Ok(messages)
    }

    pub async fn latest_message(&self, thread_id: &str) -> Result<Option<MongoMessage>> {
        let filter = doc! { "thread_id": thread_id };
        Ok(self
            .collection
            .find_one(filter)
            .sort(newest_first())
            .await?)
    }

    pub async fn delete_messages(&self, thread_id: &str) -> Result<u64> {
        let result = self.collection.delete_many(doc! { "thread_id": thread_id }).await?;
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ties_break_on_message_id() {
        let sort = newest_first();
        let keys: Vec<&str> = sort.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["created_at", "message_id"]);
    }
}
