//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so binaries can prepare the environment
//! from an `AppConfig` without knowing which backend needs a data directory.

use configs::{AppConfig, StoreBackend};

/// Ensure expected directories exist for the configured backend.
pub async fn ensure_env(cfg: &AppConfig) -> anyhow::Result<()> {
    let data_dir = match cfg.store.backend {
        StoreBackend::File => Some(cfg.store.data_dir.as_str()),
        StoreBackend::Dynamo | StoreBackend::Memory => None,
    };
    common::env::ensure_env(&cfg.server.frontend_dir, data_dir).await
}
