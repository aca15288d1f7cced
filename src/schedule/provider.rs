use anyhow::Result;
use async_trait::async_trait;

use crate::models::Game;

/// Trait that every upcoming-games source must implement.
#[async_trait]
pub trait ScheduleProvider: Send + Sync {
    /// Fetch upcoming games, examining at most `max_games` events.
    async fn fetch_upcoming_games(&self, max_games: usize) -> Result<Vec<Game>>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
