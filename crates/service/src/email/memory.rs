use std::collections::HashMap;

use async_trait::async_trait;
use models::email::EmailRecord;
use tokio::sync::RwLock;

use crate::email::store::EmailStore;
use crate::errors::ServiceError;

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryEmailStore {
    inner: RwLock<HashMap<String, EmailRecord>>,
}

impl MemoryEmailStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl EmailStore for MemoryEmailStore {
    async fn list_all(&self) -> Result<Vec<EmailRecord>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.values().cloned().collect())
    }

    async fn create(&self, address: &str) -> Result<EmailRecord, ServiceError> {
        let record = EmailRecord::new(address);
        self.inner.write().await.insert(record.id.clone(), record.clone());
        Ok(record)
    }
}
