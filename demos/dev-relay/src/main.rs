//! Local relay for playing two clients against each other.
//!
//! Run with: cargo run -p dev-relay
//!
//! Clients connect to `ws://127.0.0.1:8080/ws/game/<game_id>?token=<player_id>`.
//! Set `GWENT_RELAY_ADDR` to listen elsewhere.

use std::net::SocketAddr;

use anyhow::Context;
use gwent_sync_transport::relay::{PlayerIdTokens, RelayState, relay_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ADDR_ENV: &str = "GWENT_RELAY_ADDR";
const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let addr: SocketAddr = std::env::var(ADDR_ENV)
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()
        .with_context(|| format!("{ADDR_ENV} is not a socket address"))?;

    let app = relay_router(RelayState::new(PlayerIdTokens));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Relay listening on ws://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
