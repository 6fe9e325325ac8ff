use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, AppState};
use service::{build_store, runtime, Dispatcher};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad bind address: {e}")))
}

/// Build the router for a config: constructs the single long-lived store client.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let store = build_store(&cfg.store).await?;
    let state = AppState { dispatcher: Dispatcher::new(store) };
    Ok(routes::build_router(state, build_cors(), &cfg.server.frontend_dir))
}

/// Run the HTTP server until `shutdown` resolves, then drain in-flight requests.
pub async fn serve<F>(cfg: AppConfig, shutdown: F) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    runtime::ensure_env(&cfg).await?;
    let app = build_app(&cfg).await?;

    // Bind and serve
    let addr = bind_addr(&cfg)?;
    info!(%addr, backend = ?cfg.store.backend, table = %cfg.store.table_name, "starting server");
    let listener = TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(anyhow::Error::from)?;
    info!("server stopped");
    Ok(())
}
