pub mod api;
pub mod routes;

use crate::config::RunConfig;

pub use routes::{router, AppState};

/// Binds `bind_addr` and serves until the process is stopped.
///
/// Owns its own tokio runtime so synchronous callers (the CLI) need no async context.
pub fn run_server(bind_addr: &str, config: RunConfig) -> std::io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(bind_addr, config))
}

pub async fn serve(bind_addr: &str, config: RunConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "tribunal server listening");
    axum::serve(listener, router(AppState::new(config))).await
}
