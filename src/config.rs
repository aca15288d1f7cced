use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::schedule::espn::{DEFAULT_SCOREBOARD_URL, DEFAULT_USER_AGENT};
use crate::schedule::DEFAULT_MAX_GAMES;

/// NBA upcoming-games board with model-backed winner predictions
#[derive(Parser, Debug, Clone)]
#[command(name = "courtside", version, about)]
pub struct Config {
    /// HTTP listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:5002")]
    pub listen_addr: String,

    /// Scoreboard endpoint returning upcoming events
    #[arg(long, env = "SCOREBOARD_URL", default_value = DEFAULT_SCOREBOARD_URL)]
    pub scoreboard_url: String,

    /// User-Agent header sent to the scoreboard
    #[arg(long, env = "SCOREBOARD_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Scoreboard request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,

    /// Serialized model artifact
    #[arg(
        long,
        env = "MODEL_PATH",
        default_value = "bball_game_winner_predictor_compatible.json"
    )]
    pub model_path: PathBuf,

    /// Directory served under /assets
    #[arg(long, env = "ASSETS_DIR", default_value = "assets")]
    pub assets_dir: PathBuf,

    /// Maximum scoreboard events examined per fetch
    #[arg(long, env = "MAX_GAMES", default_value_t = DEFAULT_MAX_GAMES)]
    pub max_games: usize,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.listen_addr
            .parse::<SocketAddr>()
            .map_err(|e| anyhow::anyhow!("invalid listen_addr {:?}: {}", self.listen_addr, e))?;

        let url = url::Url::parse(&self.scoreboard_url)
            .map_err(|e| anyhow::anyhow!("invalid scoreboard_url {:?}: {}", self.scoreboard_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("scoreboard_url must be http or https, got {}", url.scheme());
        }

        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        if self.max_games == 0 {
            anyhow::bail!("max_games must be at least 1");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
