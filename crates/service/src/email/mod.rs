//! Email record storage: the `EmailStore` seam and its backends.

pub mod store;
pub mod dynamo;
pub mod file;
pub mod memory;

use std::sync::Arc;

use configs::{StoreBackend, StoreConfig};
use tracing::info;

use crate::errors::ServiceError;

pub use store::EmailStore;

/// Build the process-wide store once at startup.
pub async fn build_store(cfg: &StoreConfig) -> Result<Arc<dyn EmailStore>, ServiceError> {
    let store: Arc<dyn EmailStore> = match cfg.backend {
        StoreBackend::Dynamo => {
            Arc::new(dynamo::DynamoEmailStore::new(&cfg.table_name, cfg.endpoint_url.as_deref()).await)
        }
        StoreBackend::File => {
            let path = std::path::Path::new(&cfg.data_dir).join(format!("{}.json", cfg.table_name));
            file::FileEmailStore::new(path).await?
        }
        StoreBackend::Memory => Arc::new(memory::MemoryEmailStore::new()),
    };
    info!(backend = ?cfg.backend, table = %cfg.table_name, "email store ready");
    Ok(store)
}
