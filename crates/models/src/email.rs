use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::ModelError;

/// A stored `{id, address}` pair. Append-only: never mutated once written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    pub id: String,
    pub address: String,
}

impl EmailRecord {
    /// Build a record with a freshly generated v4 UUID as its id.
    ///
    /// The address is stored as given; no format validation happens here.
    pub fn new(address: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4().to_string(), address: address.into() }
    }
}

/// Arguments of the `addEmail` operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddEmailInput {
    pub address: String,
}

impl AddEmailInput {
    /// Extract and check `address` from a loosely-typed arguments mapping.
    pub fn from_arguments(args: &Value) -> Result<Self, ModelError> {
        match args.get("address") {
            None | Some(Value::Null) => Err(ModelError::Validation("address is required".into())),
            Some(Value::String(s)) => {
                let input = Self { address: s.clone() };
                input.validate()?;
                Ok(input)
            }
            Some(_) => Err(ModelError::Validation("address must be a string".into())),
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.address.trim().is_empty() {
            return Err(ModelError::Validation("address must not be blank".into()));
        }
        Ok(())
    }
}
