use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};

use crate::dbs::mongo::models::MongoDocument;
use crate::error::Result;

#[derive(Clone)]
pub struct MongoDocumentRepository {
    collection: Collection<MongoDocument>,
}

impl MongoDocumentRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("documents");
        Self { collection }
    }

    /// Documents owned by the user plus shared ones without an owner
    pub async fn for_user(&self, user_id: &str) -> Result<Vec<MongoDocument>> {
        let filter = doc! {
            "$or": [
                { "user_id": user_id },
                { "user_id": "" },
                { "user_id": { "$exists": false } },
            ]
        };
        let documents = self.collection.find(filter).await?.try_collect().await?;
        Ok(documents)
    }
}
