//! routeforge server - route editing session backend

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use routeforge_server::api;
use routeforge_server::config::Config;
use routeforge_server::state::LiveState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("routeforge_server=debug".parse()?))
        .init();

    tracing::info!("Starting routeforge server...");

    let config = Config::from_env();
    let port = config.server_port;
    tracing::info!(
        routing = %config.routing_url,
        profile = %config.routing_profile,
        elevation = %config.elevation_url,
        "Oracles configured"
    );
    let state = Arc::new(LiveState::from_config(config));

    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
