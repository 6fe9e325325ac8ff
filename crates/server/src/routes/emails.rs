use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use models::email::EmailRecord;
use serde_json::Value;
use service::{errors::ServiceError, DispatchRequest, DispatchResponse};
use tracing::warn;

use crate::errors::ApiError;
use crate::routes::AppState;

/// Turn an extractor rejection into the same JSON error body as every other failure.
fn body_or_error<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            warn!(status = %rejection.status(), error = %rejection.body_text(), "rejected request body");
            Err(ApiError(ServiceError::Validation(format!(
                "invalid request body: {}",
                rejection.body_text()
            ))))
        }
    }
}

/// Generic operation endpoint; accepts resolver events or `{field, arguments}`.
pub async fn dispatch(
    State(state): State<AppState>,
    payload: Result<Json<DispatchRequest>, JsonRejection>,
) -> Result<Json<DispatchResponse>, ApiError> {
    let req = body_or_error(payload)?;
    let res = state.dispatcher.dispatch(&req).await?;
    Ok(Json(res))
}

/// List every stored email record
pub async fn list_emails(State(state): State<AppState>) -> Result<Json<Vec<EmailRecord>>, ApiError> {
    let records = state.dispatcher.list_emails().await?;
    Ok(Json(records))
}

/// Add one email record
pub async fn add_email(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<EmailRecord>, ApiError> {
    let body = body_or_error(payload)?;
    let record = state.dispatcher.add_email_from_arguments(&body).await?;
    Ok(Json(record))
}
