use mongodb::{bson::doc, Client, Collection};

use crate::error::Result;
use crate::models::UserMemory;

#[derive(Clone)]
pub struct MongoUserMemoryRepository {
    collection: Collection<UserMemory>,
}

impl MongoUserMemoryRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("user_memory");
        Self { collection }
    }

    pub async fn get(&self, user_email: &str) -> Result<Option<UserMemory>> {
        let filter = doc! { "user_email": user_email.trim().to_lowercase() };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn save(&self, memory: UserMemory) -> Result<()> {
        let filter = doc! { "user_email": &memory.user_email };
        self.collection.replace_one(filter, &memory).upsert(true).await?;
        Ok(())
    }
}
