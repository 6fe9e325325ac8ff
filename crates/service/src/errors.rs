use thiserror::Error;

use models::errors::ModelError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Unknown field: {0}")]
    UnknownOperation(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("store error: {message}")]
    Store {
        message: String,
        #[source]
        source: BoxError,
    },
}

impl ServiceError {
    /// Wrap a backing-store failure, keeping the original error as the source.
    pub fn store<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Store { message: message.into(), source: source.into() }
    }

    /// Stable name of the error class, used in HTTP bodies and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::UnknownOperation(_) => "UnknownOperation",
            ServiceError::Validation(_) => "ValidationError",
            ServiceError::Store { .. } => "StoreError",
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => ServiceError::Validation(msg),
        }
    }
}
