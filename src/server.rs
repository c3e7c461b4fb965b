use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::{app, AppState};
use crate::config::AppConfig;
use crate::database::open_store;
use crate::is_production;
use crate::services::WorkspaceService;

/// Install the global tracing subscriber. `RUST_LOG` wins over the defaults.
pub fn init_tracing(config: &AppConfig) {
    let default_filter = if config.api.enable_request_logging {
        "workspace_api=info,tower_http=debug"
    } else {
        "workspace_api=info,tower_http=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Open the configured store and serve the API until the process is stopped
pub async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    if config.uses_default_app_secret() {
        if is_production!() {
            anyhow::bail!("APP_ENCRYPTION_SECRET must be set in production");
        }
        warn!("Using the default encryption secret; set APP_ENCRYPTION_SECRET before storing real data");
    }
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set");
    }

    let store = open_store(&config.database).await.context("failed to open store")?;
    let service = WorkspaceService::from_config(store, config);
    let state = AppState::new(service, config.security.jwt_secret.as_str());

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Workspace API listening on http://{} ({:?})", bind_addr, config.environment);
    axum::serve(listener, app(state, config)).await?;
    Ok(())
}
