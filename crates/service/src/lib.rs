//! Service layer for the email registry.
//! - `email` holds the store abstraction and its backends.
//! - `dispatcher` maps named operations onto store calls.
//! - `observability` exposes Prometheus counters for each operation.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod email;
pub mod dispatcher;
pub mod observability;

pub use dispatcher::{DispatchRequest, DispatchResponse, Dispatcher, Operation};
pub use email::{build_store, EmailStore};
