use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};

use crate::dbs::mongo::models::MongoThreadMeta;
use crate::error::Result;

#[derive(Clone)]
pub struct MongoThreadMetaRepository {
    collection: Collection<MongoThreadMeta>,
}

impl MongoThreadMetaRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("thread_meta");
        Self { collection }
    }

    pub async fn get(&self, thread_id: &str, scenario: &str) -> Result<Option<MongoThreadMeta>> {
        let filter = doc! { "thread_id": thread_id, "scenario": scenario };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn latest(&self, thread_id: &str) -> Result<Option<MongoThreadMeta>> {
        let filter = doc! { "thread_id": thread_id };
        Ok(self
            .collection
            .find_one(filter)
            .sort(doc! { "last_message_at": -1 })
            .await?)
    }

    /// Upsert by (thread_id, scenario)
    pub async fn save(&self, meta: MongoThreadMeta) -> Result<()> {
        let filter = doc! { "thread_id": &meta.thread_id, "scenario": &meta.scenario };
        self.collection.replace_one(filter, &meta).upsert(true).await?;
        Ok(())
    }

    pub async fn delete(&self, thread_id: &str) -> Result<()> {
        self.collection.delete_many(doc! { "thread_id": thread_id }).await?;
        Ok(())
    }

    /// Threads of a user, most recently active first
    pub async fn list(&self, user_id: &str, limit: i64) -> Result<Vec<MongoThreadMeta>> {
        let filter = doc! { "user_id": user_id };
        let rows = self
            .collection
            .find(filter)
            .sort(doc! { "last_message_at": -1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(rows)
    }
}
