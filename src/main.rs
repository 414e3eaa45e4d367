use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod db;
mod error;
mod game;
mod models;
mod services;
mod utils;
mod websocket;

use config::Config;
use constants::{API_VERSION, MONAD_TESTNET_CHAIN_NAME};
use db::Database;
use services::SessionRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting ScoreQuest Backend Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);
    tracing::info!(
        "Chain: {} (id {})",
        MONAD_TESTNET_CHAIN_NAME,
        config.monad_chain_id
    );
    if !config.is_testnet() {
        tracing::warn!("Configured chain id is not the Monad Testnet");
    }

    let db = Database::new(&config).await?;
    tracing::info!("Running database migrations...");
    db.run_migrations().await?;

    let redis_client = redis::Client::open(config.redis_url.clone())?;
    let redis = redis::aio::ConnectionManager::new(redis_client).await?;

    // One registry shared by the HTTP surface, the websocket stream and the
    // background engine.
    let sessions = SessionRegistry::default();
    tokio::spawn(services::start_background_services(sessions.clone()));

    let router = build_router(api::AppState {
        db,
        redis,
        config: config.clone(),
        sessions,
    });

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scorequest_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn build_router(state: api::AppState) -> Router {
    let cors = cors_from_config(&state.config);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Leaderboard
        .route(
            "/api/v1/leaderboard",
            get(api::leaderboard::get_leaderboard).post(api::leaderboard::submit_score),
        )
        // Game sessions
        .route("/api/v1/session/start", post(api::session::start_session))
        .route(
            "/api/v1/session/{session_id}",
            get(api::session::get_session),
        )
        .route(
            "/api/v1/session/{session_id}/hit",
            post(api::session::hit_target),
        )
        // NFT
        .route("/api/v1/nft/mint", post(api::nft::mint_nft))
        // WebSocket endpoints
        .route("/ws/session/{session_id}", get(websocket::session::handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let configured = config.cors_allowed_origins.trim();
    if configured.is_empty() || configured == "*" {
        return CorsLayer::very_permissive();
    }

    let origins: Vec<HeaderValue> = configured
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();
    if origins.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
