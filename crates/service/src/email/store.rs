use async_trait::async_trait;
use models::email::EmailRecord;

use crate::errors::ServiceError;

/// Trait abstraction over the backing key-value table.
///
/// Implementations perform exactly one backing-store call per operation and
/// never retry. Failures come back as `ServiceError::Store` with the cause attached.
#[async_trait]
pub trait EmailStore: Send + Sync {
    /// Unfiltered read of every stored record, in no particular order.
    async fn list_all(&self) -> Result<Vec<EmailRecord>, ServiceError>;

    /// Write a new record with a fresh id and return it. No existence check.
    async fn create(&self, address: &str) -> Result<EmailRecord, ServiceError>;
}
