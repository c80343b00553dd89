//! RxVerify Web Server
//!
//! Run with: cargo run -p rxverify-web

use tracing::info;
use tracing_subscriber::EnvFilter;

use rxverify_config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (RUST_LOG, default info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting RxVerify Web Server...");

    let config = Config::load()?;

    // Create app state
    let state = rxverify_web::state::AppState::from_config(&config)?;

    // Build router
    let app = rxverify_web::router::build_router(state);

    // Bind to port
    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
