//! DynamoDB EmailStore implementation.
//!
//! Table schema:
//! - `id` (String, partition key)
//! - `address` (String)

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use models::email::EmailRecord;
use tracing::{debug, info, warn};

use crate::email::store::EmailStore;
use crate::errors::ServiceError;

const ID_ATTR: &str = "id";
const ADDRESS_ATTR: &str = "address";

/// DynamoDB implementation of EmailStore.
///
/// Holds one SDK client for the life of the process.
pub struct DynamoEmailStore {
    client: Client,
    table_name: String,
}

impl DynamoEmailStore {
    /// Create a store from the default AWS credential/region chain.
    pub async fn new(table_name: impl Into<String>, endpoint_url: Option<&str>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let client = if let Some(endpoint) = endpoint_url {
            let dynamo_config = aws_sdk_dynamodb::config::Builder::from(&config)
                .endpoint_url(endpoint)
                .build();
            Client::from_conf(dynamo_config)
        } else {
            Client::new(&config)
        };

        let table_name = table_name.into();
        info!(table = %table_name, endpoint = ?endpoint_url, "Connected to DynamoDB for emails");

        Self::from_client(client, table_name)
    }

    pub fn from_client(client: Client, table_name: impl Into<String>) -> Self {
        Self { client, table_name: table_name.into() }
    }

    fn to_item(record: &EmailRecord) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();
        item.insert(ID_ATTR.to_string(), AttributeValue::S(record.id.clone()));
        item.insert(ADDRESS_ATTR.to_string(), AttributeValue::S(record.address.clone()));
        item
    }

    /// Items lacking a string `id` or `address` were not written by us; skip them.
    fn from_item(item: &HashMap<String, AttributeValue>) -> Option<EmailRecord> {
        match (item.get(ID_ATTR), item.get(ADDRESS_ATTR)) {
            (Some(AttributeValue::S(id)), Some(AttributeValue::S(address))) if !id.is_empty() => {
                Some(EmailRecord { id: id.clone(), address: address.clone() })
            }
            _ => None,
        }
    }
}

#[async_trait]
impl EmailStore for DynamoEmailStore {
    async fn list_all(&self) -> Result<Vec<EmailRecord>, ServiceError> {
        // Single Scan page, no LastEvaluatedKey follow-up; tables past 1 MB are truncated.
        let result = self
            .client
            .scan()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(|e| {
                ServiceError::store(format!("DynamoDB scan failed: {}", DisplayErrorContext(&e)), e)
            })?;

        if result.last_evaluated_key.is_some() {
            warn!(table = %self.table_name, "scan result truncated; remaining items not returned");
        }

        let items = result.items.unwrap_or_default();
        let mut records = Vec::with_capacity(items.len());
        for item in &items {
            match Self::from_item(item) {
                Some(record) => records.push(record),
                None => warn!(table = %self.table_name, "skipping malformed item in scan result"),
            }
        }

        debug!(table = %self.table_name, count = records.len(), "Scanned emails from DynamoDB");
        Ok(records)
    }

    async fn create(&self, address: &str) -> Result<EmailRecord, ServiceError> {
        let record = EmailRecord::new(address);

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(Self::to_item(&record)))
            .send()
            .await
            .map_err(|e| {
                ServiceError::store(format!("DynamoDB put_item failed: {}", DisplayErrorContext(&e)), e)
            })?;

        debug!(table = %self.table_name, id = %record.id, "Stored email in DynamoDB");
        Ok(record)
    }
}
