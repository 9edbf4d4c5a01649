mod animation;
mod config;
mod errors;
mod genai_client;
mod page;
mod poem;
mod routes;
mod slot;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::genai_client::GenAiClient;
use crate::page::{PageFactory, SessionStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values, not on a missing key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting greeting v{}", env!("CARGO_PKG_VERSION"));

    // Initialize generative client
    let client = GenAiClient::new(config.gemini_api_key.clone(), &config.gemini_api_base)?;
    if client.is_configured() {
        info!(
            "Generative client initialized (text: {}, image: {})",
            genai_client::TEXT_MODEL,
            genai_client::IMAGE_MODEL
        );
    } else {
        warn!("GEMINI_API_KEY is not set; generated content will show fallbacks");
    }
    info!("Card sources: {:?}", config.sources);

    // Build app state
    let state = AppState {
        pages: PageFactory::new(client, config.sources),
        sessions: SessionStore::default(),
        config: config.clone(),
    };

    // Evict sessions whose tab went away without unmounting
    let _sweeper = state.sessions.spawn_sweeper(config.session_idle_timeout);
    info!(
        "Idle sessions are evicted after {}s",
        config.session_idle_timeout.as_secs()
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
