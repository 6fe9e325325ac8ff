use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use models::email::EmailRecord;

use crate::email::store::EmailStore;
use crate::errors::ServiceError;
use crate::storage::json_map_store::JsonMapStore;

/// File-backed email table for local development.
/// Keeps a map of `id -> record` persisted as JSON.
pub struct FileEmailStore {
    store: Arc<JsonMapStore<String, EmailRecord>>,
}

impl FileEmailStore {
    /// Initialize the store from the given file path. Creates the file if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::<String, EmailRecord>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }
}

#[async_trait]
impl EmailStore for FileEmailStore {
    async fn list_all(&self) -> Result<Vec<EmailRecord>, ServiceError> {
        Ok(self.store.values().await)
    }

    async fn create(&self, address: &str) -> Result<EmailRecord, ServiceError> {
        let record = EmailRecord::new(address);
        self.store.insert(record.id.clone(), record.clone()).await?;
        Ok(record)
    }
}
