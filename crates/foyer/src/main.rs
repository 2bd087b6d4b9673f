use std::sync::Arc;

use foyer::{FoyerError, Settings};
use foyer_store::MemoryStore;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), FoyerError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("foyer=info"));
    fmt::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    let settings = Settings::from_env()?;
    tracing::info!(ws = %settings.ws_addr, http = %settings.http_addr, "starting Foyer");

    let server = settings
        .builder()
        .build(Arc::new(MemoryStore::new()))
        .await?;
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
}
