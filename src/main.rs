use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

mod config;
mod error;
mod models;
mod predictor;
mod schedule;
mod web;

use config::Config;
use predictor::{ModelHandle, WinnerPredictor};
use schedule::{EspnScoreboard, GameFetcher};
use web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Loaded once; an unavailable model still lets the board serve listings.
    let model = ModelHandle::load_or_unavailable(&config.model_path);
    if !model.is_loaded() {
        warn!("Starting without a model; every prediction will report an error");
    }

    let scoreboard = EspnScoreboard::new(
        &config.scoreboard_url,
        &config.user_agent,
        config.request_timeout(),
    )?;
    info!(
        "Scoreboard: {} (timeout {:?}, max {} games)",
        config.scoreboard_url,
        config.request_timeout(),
        config.max_games
    );

    let state = AppState {
        fetcher: GameFetcher::new(Arc::new(scoreboard)),
        predictor: WinnerPredictor::new(model),
        max_games: config.max_games,
    };
    let app = web::router(state, &config.assets_dir);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Courtside listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
