use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use chat_gateway::{AppState, GatewayConfig, Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GatewayConfig::from_env().context("invalid gateway configuration")?;
    let bind_addr = config.bind_addr.clone();

    let state = Arc::new(AppState::new(config).context("failed to build provider clients")?);

    let server = Server::bind(&bind_addr).await?;
    server.run(state).await?;

    Ok(())
}
