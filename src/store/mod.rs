//! Persistence Gateway
//!
//! Typed create/read access to the three record kinds, behind one trait so the
//! handlers never see which backend is in use:
//! - `MongoStore`: document store reached through a connection string
//! - `MemoryStore`: in-process collections for tests and local development
//!
//! The handle is built once at startup and shared through `AppState`.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CastError, ContactMessage, CropReference, QueryLog};

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store error")]
    Mongo(#[from] mongodb::error::Error),

    /// Payload field could not be cast to the record type; nothing was written
    #[error("document rejected")]
    Rejected(#[from] CastError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for logs and the readiness endpoint
    fn backend_tag(&self) -> &'static str;

    /// Explicit readiness check: succeeds only if the backend answers now
    async fn ping(&self) -> Result<(), StoreError>;

    async fn insert_query_log(&self, log: &QueryLog) -> Result<(), StoreError>;

    async fn insert_contact(&self, message: &ContactMessage) -> Result<(), StoreError>;

    /// Every stored crop, in store order
    async fn list_crops(&self) -> Result<Vec<CropReference>, StoreError>;
}
