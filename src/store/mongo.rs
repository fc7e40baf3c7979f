use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{bson::doc, Client, Collection, Database};

use super::{Store, StoreError};
use crate::models::{ContactMessage, CropReference, QueryLog};

pub const QUERIES_COLLECTION: &str = "queries";
pub const CONTACTS_COLLECTION: &str = "contacts";
pub const CROPS_COLLECTION: &str = "crops";

/// MongoDB-backed store. The driver pools connections internally, so one
/// instance serves every request for the life of the process.
pub struct MongoStore {
    database: Database,
    queries: Collection<QueryLog>,
    contacts: Collection<ContactMessage>,
    crops: Collection<CropReference>,
}

impl MongoStore {
    /// Parse the connection string and bind the collections.
    ///
    /// Does not wait for the server; call `ping` for that.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self::from_database(client.database(database)))
    }

    pub fn from_database(database: Database) -> Self {
        Self {
            queries: database.collection(QUERIES_COLLECTION),
            contacts: database.collection(CONTACTS_COLLECTION),
            crops: database.collection(CROPS_COLLECTION),
            database,
        }
    }
}

#[async_trait]
impl Store for MongoStore {
    fn backend_tag(&self) -> &'static str {
        "mongodb"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn insert_query_log(&self, log: &QueryLog) -> Result<(), StoreError> {
        let result = self.queries.insert_one(log).await?;
        tracing::debug!("Saved query log {}", result.inserted_id);
        Ok(())
    }

    async fn insert_contact(&self, message: &ContactMessage) -> Result<(), StoreError> {
        let result = self.contacts.insert_one(message).await?;
        tracing::debug!("Saved contact message {}", result.inserted_id);
        Ok(())
    }

    async fn list_crops(&self) -> Result<Vec<CropReference>, StoreError> {
        let cursor = self.crops.find(doc! {}).await?;
        let crops: Vec<CropReference> = cursor.try_collect().await?;
        Ok(crops)
    }
}
