//! Function entry point for the managed GraphQL API's data source.
//!
//! Receives resolver events (`{"info": {"fieldName": ..}, "arguments": {..}}`),
//! dispatches them and hands the JSON result back to the runtime. Errors are
//! returned with their display text so the API surfaces `Unknown field: <name>`.

use common::utils::logging::init_logging_json;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use service::{build_store, DispatchRequest, Dispatcher};
use tracing::{error, info};

async fn handle(dispatcher: &Dispatcher, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let (payload, ctx) = event.into_parts();
    info!(service = "lambda", request_id = %ctx.request_id, "event received");

    let req: DispatchRequest = serde_json::from_value(payload).map_err(|e| {
        error!(service = "lambda", request_id = %ctx.request_id, error = %e, "undecodable event payload");
        e
    })?;
    let res = dispatcher.dispatch(&req).await?;
    Ok(serde_json::to_value(res)?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging_json();

    let cfg = configs::AppConfig::load_and_validate().map_err(|e| {
        error!(service = "lambda", event = "config_invalid", error = %e, "refusing to start");
        Error::from(e.to_string())
    })?;

    // 冷启动时构建一次客户端，之后所有调用复用
    let store = build_store(&cfg.store).await?;
    let dispatcher = Dispatcher::new(store);
    info!(service = "lambda", event = "start", table = %cfg.store.table_name, "function ready");

    lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| {
        let dispatcher = dispatcher.clone();
        async move { handle(&dispatcher, event).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_runtime::Context;
    use serde_json::json;
    use service::email::memory::MemoryEmailStore;
    use std::sync::Arc;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(MemoryEmailStore::new()))
    }

    #[tokio::test]
    async fn resolver_event_round_trip() -> Result<(), Error> {
        let d = dispatcher();
        let add = json!({"info": {"fieldName": "addEmail"}, "arguments": {"address": "a@example.com"}});
        let added = handle(&d, LambdaEvent::new(add, Context::default())).await?;
        assert_eq!(added["address"], "a@example.com");

        let list = json!({"info": {"fieldName": "listEmails"}, "arguments": {}});
        let listed = handle(&d, LambdaEvent::new(list, Context::default())).await?;
        assert_eq!(listed, json!([added]));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_field_error_text() {
        let event = json!({"field": "deleteEmail", "arguments": {}});
        let err = handle(&dispatcher(), LambdaEvent::new(event, Context::default())).await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown field: deleteEmail");
    }

    #[tokio::test]
    async fn event_without_field_name_reports_unknown_field() {
        let event = json!({"info": {"parentTypeName": "Query"}, "arguments": {}});
        let err = handle(&dispatcher(), LambdaEvent::new(event, Context::default())).await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown field: ");
    }

    #[tokio::test]
    async fn non_object_payload_is_an_error() {
        let err = handle(&dispatcher(), LambdaEvent::new(json!("listEmails"), Context::default())).await;
        assert!(err.is_err());
    }
}
