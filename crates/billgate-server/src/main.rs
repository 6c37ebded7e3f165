use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use billgate_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(billgate_server::telemetry::log_filter()?)
        .json()
        .init();

    let cfg = billgate_server::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    if cfg.jwt_secret.is_none() {
        tracing::warn!(
            "BILLGATE_JWT_SECRET not set; bearer tokens are verified by the backend only"
        );
    }
    info!(roles = ?cfg.authorized_roles, "Billing status route authorized roles");

    let addr = format!("0.0.0.0:{}", cfg.port);
    let state = Arc::new(AppState::from_config(cfg)?);
    let app = billgate_server::app::build_app(state);

    info!("billgate listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
