use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Store, StoreError};
use crate::models::{ContactMessage, CropReference, QueryLog};

/// In-process store. Contents live as long as the value does.
///
/// `fail_reads` / `fail_writes` make every read or write return
/// `StoreError::Unavailable`, for exercising the handlers' error paths.
#[derive(Default)]
pub struct MemoryStore {
    queries: RwLock<Vec<QueryLog>>,
    contacts: RwLock<Vec<ContactMessage>>,
    crops: RwLock<Vec<CropReference>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_crops(crops: Vec<CropReference>) -> Self {
        Self {
            crops: RwLock::new(crops),
            ..Self::default()
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn seed_crop(&self, crop: CropReference) {
        self.crops.write().await.push(crop);
    }

    pub async fn query_logs(&self) -> Vec<QueryLog> {
        self.queries.read().await.clone()
    }

    pub async fn contacts(&self) -> Vec<ContactMessage> {
        self.contacts.read().await.clone()
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store rejecting writes".to_string()));
        }
        Ok(())
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store rejecting reads".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_reads()
    }

    async fn insert_query_log(&self, log: &QueryLog) -> Result<(), StoreError> {
        self.check_writes()?;
        self.queries.write().await.push(log.clone());
        Ok(())
    }

    async fn insert_contact(&self, message: &ContactMessage) -> Result<(), StoreError> {
        self.check_writes()?;
        self.contacts.write().await.push(message.clone());
        Ok(())
    }

    async fn list_crops(&self) -> Result<Vec<CropReference>, StoreError> {
        self.check_reads()?;
        Ok(self.crops.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_writes() {
        let store = MemoryStore::new();
        let log = QueryLog {
            nitrogen: Some(90.0),
            recommended: vec!["Rice".to_string()],
            ..Default::default()
        };

        store.insert_query_log(&log).await.unwrap();
        store.insert_contact(&ContactMessage::default()).await.unwrap();

        assert_eq!(store.query_logs().await, vec![log]);
        assert_eq!(store.contacts().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let store = MemoryStore::with_crops(vec![CropReference::new("Jute", "Alluvial", "Humid", "2.5 tons/hectare")]);
        assert_eq!(store.list_crops().await.unwrap().len(), 1);

        store.set_fail_writes(true);
        assert!(store.insert_query_log(&QueryLog::default()).await.is_err());
        assert!(store.query_logs().await.is_empty());
        assert!(store.ping().await.is_ok());

        store.set_fail_reads(true);
        assert!(store.list_crops().await.is_err());
        assert!(store.ping().await.is_err());
    }
}
