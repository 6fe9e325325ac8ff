//! Operation dispatch.
//!
//! Maps an operation name plus loosely-typed arguments onto one `EmailStore`
//! call. Accepts both the GraphQL resolver event shape
//! (`{"info": {"fieldName": ..}, "arguments": {..}}`) and the direct shape
//! (`{"field": .., "arguments": {..}}`).

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

use models::email::{AddEmailInput, EmailRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::email::EmailStore;
use crate::errors::ServiceError;
use crate::observability;

/// The two operations the registry understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListEmails,
    AddEmail,
}

impl Operation {
    pub fn parse(name: &str) -> Result<Self, ServiceError> {
        match name {
            "listEmails" => Ok(Operation::ListEmails),
            "addEmail" => Ok(Operation::AddEmail),
            other => Err(ServiceError::UnknownOperation(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ListEmails => "listEmails",
            Operation::AddEmail => "addEmail",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolverInfo {
    #[serde(rename = "fieldName", default, skip_serializing_if = "Value::is_null")]
    pub field_name: Value,
    #[serde(rename = "parentTypeName", default, skip_serializing_if = "Option::is_none")]
    pub parent_type_name: Option<Value>,
}

/// Inbound request envelope.
///
/// Name fields stay loosely typed so a malformed name still reaches dispatch
/// and fails as `UnknownOperation` instead of a decode error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<ResolverInfo>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub field: Value,
    #[serde(default)]
    pub arguments: Value,
}

impl DispatchRequest {
    pub fn new(field: impl Into<String>, arguments: Value) -> Self {
        Self { info: None, field: Value::String(field.into()), arguments }
    }

    /// `info.fieldName` wins over `field`. A missing name is the empty string;
    /// a non-string name is its JSON text.
    pub fn operation_name(&self) -> Cow<'_, str> {
        let name = match &self.info {
            Some(info) => &info.field_name,
            None => &self.field,
        };
        match name {
            Value::String(s) => Cow::Borrowed(s),
            Value::Null => Cow::Borrowed(""),
            other => Cow::Owned(other.to_string()),
        }
    }
}

/// Result of a successful dispatch; serializes as a bare array or object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DispatchResponse {
    Emails(Vec<EmailRecord>),
    Email(EmailRecord),
}

/// Stateless router from operations to the store. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn EmailStore>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn EmailStore>) -> Self { Self { store } }

    /// Route one request. Every failure is logged and returned unchanged.
    #[instrument(skip_all, fields(operation = %req.operation_name()))]
    pub async fn dispatch(&self, req: &DispatchRequest) -> Result<DispatchResponse, ServiceError> {
        debug!(arguments = %req.arguments, "dispatch request");
        match Operation::parse(&req.operation_name()) {
            Ok(Operation::ListEmails) => self.list_emails().await.map(DispatchResponse::Emails),
            Ok(Operation::AddEmail) => {
                self.add_email_from_arguments(&req.arguments).await.map(DispatchResponse::Email)
            }
            Err(e) => Err(Self::fail("unknown", e, Instant::now())),
        }
    }

    /// Unfiltered full read of the table.
    pub async fn list_emails(&self) -> Result<Vec<EmailRecord>, ServiceError> {
        let op = Operation::ListEmails.as_str();
        let started = Instant::now();
        let records = self.store.list_all().await.map_err(|e| Self::fail(op, e, started))?;
        observability::record(op, "ok", started.elapsed().as_secs_f64());
        info!(count = records.len(), "listed emails");
        Ok(records)
    }

    /// `addEmail` with raw arguments; a missing or non-string `address` is a validation error.
    pub async fn add_email_from_arguments(&self, args: &Value) -> Result<EmailRecord, ServiceError> {
        let input = AddEmailInput::from_arguments(args)
            .map_err(|e| Self::fail(Operation::AddEmail.as_str(), e.into(), Instant::now()))?;
        self.add_email(&input).await
    }

    /// Append one record; duplicates of `address` are allowed.
    pub async fn add_email(&self, input: &AddEmailInput) -> Result<EmailRecord, ServiceError> {
        let op = Operation::AddEmail.as_str();
        let started = Instant::now();
        input.validate().map_err(|e| Self::fail(op, e.into(), started))?;
        let record = self.store.create(&input.address).await.map_err(|e| Self::fail(op, e, started))?;
        observability::record(op, "ok", started.elapsed().as_secs_f64());
        info!(id = %record.id, "added email");
        Ok(record)
    }

    fn fail(operation: &str, e: ServiceError, started: Instant) -> ServiceError {
        observability::record(operation, e.kind(), started.elapsed().as_secs_f64());
        error!(operation, kind = e.kind(), error = %e, "operation failed");
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::memory::MemoryEmailStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashSet;

    struct FailingStore;

    #[async_trait]
    impl EmailStore for FailingStore {
        async fn list_all(&self) -> Result<Vec<EmailRecord>, ServiceError> {
            Err(ServiceError::store("scan throttled", std::io::Error::other("ProvisionedThroughputExceeded")))
        }

        async fn create(&self, _address: &str) -> Result<EmailRecord, ServiceError> {
            Err(ServiceError::store("put denied", std::io::Error::other("AccessDenied")))
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(MemoryEmailStore::new()))
    }

    #[test]
    fn operation_parse_is_exact() {
        assert_eq!(Operation::parse("listEmails").unwrap(), Operation::ListEmails);
        assert_eq!(Operation::parse("addEmail").unwrap(), Operation::AddEmail);
        assert!(Operation::parse("ListEmails").is_err());
        assert_eq!(Operation::AddEmail.as_str(), "addEmail");
    }

    #[test]
    fn resolver_event_field_name_wins() {
        let req: DispatchRequest = serde_json::from_value(json!({
            "info": {"fieldName": "addEmail", "parentTypeName": "Mutation"},
            "field": "listEmails",
            "arguments": {"address": "a@example.com"}
        }))
        .unwrap();
        assert_eq!(req.operation_name(), "addEmail");

        let direct: DispatchRequest = serde_json::from_value(json!({"field": "listEmails"})).unwrap();
        assert_eq!(direct.operation_name(), "listEmails");
        assert_eq!(direct.arguments, Value::Null);
    }

    #[test]
    fn malformed_names_still_decode() {
        let no_field_name: DispatchRequest =
            serde_json::from_value(json!({"info": {"parentTypeName": "Query"}, "arguments": {}})).unwrap();
        assert_eq!(no_field_name.operation_name(), "");

        let numeric: DispatchRequest = serde_json::from_value(json!({"field": 5})).unwrap();
        assert_eq!(numeric.operation_name(), "5");
    }

    #[tokio::test]
    async fn resolver_event_without_field_name_is_unknown_operation() {
        let d = dispatcher();
        let req: DispatchRequest =
            serde_json::from_value(json!({"info": {"parentTypeName": "Query"}, "arguments": {}})).unwrap();
        let err = d.dispatch(&req).await.unwrap_err();
        assert!(matches!(err, ServiceError::UnknownOperation(ref n) if n.is_empty()));
        assert_eq!(err.to_string(), "Unknown field: ");

        let req: DispatchRequest = serde_json::from_value(json!({"field": 5})).unwrap();
        let err = d.dispatch(&req).await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown field: 5");
    }

    #[tokio::test]
    async fn list_on_empty_store_is_empty() -> anyhow::Result<()> {
        let d = dispatcher();
        let res = d.dispatch(&DispatchRequest::new("listEmails", json!({}))).await?;
        assert_eq!(res, DispatchResponse::Emails(vec![]));
        assert_eq!(serde_json::to_value(&res)?, json!([]));
        Ok(())
    }

    #[tokio::test]
    async fn add_then_list_contains_record_once() -> anyhow::Result<()> {
        let d = dispatcher();
        let added = match d.dispatch(&DispatchRequest::new("addEmail", json!({"address": "a@example.com"}))).await? {
            DispatchResponse::Email(r) => r,
            other => panic!("unexpected response {other:?}"),
        };
        assert_eq!(added.address, "a@example.com");
        assert!(!added.id.is_empty());

        let listed = d.list_emails().await?;
        assert_eq!(listed, vec![added]);
        Ok(())
    }

    #[tokio::test]
    async fn add_is_not_idempotent() -> anyhow::Result<()> {
        let d = dispatcher();
        let input = AddEmailInput { address: "dup@example.com".into() };
        let a = d.add_email(&input).await?;
        let b = d.add_email(&input).await?;
        assert_ne!(a.id, b.id);
        assert_eq!(d.list_emails().await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_operation_names_the_field() {
        let d = dispatcher();
        let err = d.dispatch(&DispatchRequest::new("deleteEmail", json!({}))).await.unwrap_err();
        assert!(matches!(err, ServiceError::UnknownOperation(ref n) if n == "deleteEmail"));
        assert!(err.to_string().contains("Unknown field: deleteEmail"));
    }

    #[tokio::test]
    async fn missing_operation_name_is_unknown() {
        let d = dispatcher();
        let err = d.dispatch(&DispatchRequest::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown field: ");
    }

    #[tokio::test]
    async fn add_without_address_is_validation_error_and_stores_nothing() -> anyhow::Result<()> {
        let d = dispatcher();
        let err = d.dispatch(&DispatchRequest::new("addEmail", json!({}))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(d.list_emails().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn store_errors_propagate_unchanged() {
        let d = Dispatcher::new(Arc::new(FailingStore));

        let err = d.dispatch(&DispatchRequest::new("listEmails", json!({}))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store { .. }));
        assert!(err.to_string().contains("scan throttled"));

        let err = d
            .dispatch(&DispatchRequest::new("addEmail", json!({"address": "a@example.com"})))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("put denied"));
    }

    #[tokio::test]
    async fn concurrent_adds_each_appear_once() -> anyhow::Result<()> {
        let d = dispatcher();
        let mut handles = Vec::new();
        for i in 0..32 {
            let d = d.clone();
            handles.push(tokio::spawn(async move {
                d.add_email(&AddEmailInput { address: format!("user{i}@example.com") }).await
            }));
        }
        for h in handles {
            h.await??;
        }

        let listed = d.list_emails().await?;
        assert_eq!(listed.len(), 32);
        let addresses: HashSet<_> = listed.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(addresses.len(), 32);
        let ids: HashSet<_> = listed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 32);
        Ok(())
    }
}
