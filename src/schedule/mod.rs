pub mod espn;
pub mod provider;

pub use espn::EspnScoreboard;
pub use provider::ScheduleProvider;

use chrono::{Days, Local, NaiveDate};
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::Game;

/// Default number of scoreboard events examined per fetch.
pub const DEFAULT_MAX_GAMES: usize = 4;

/// Fixed sample board used whenever the live fetch fails or yields nothing.
/// Dates are anchored to `today` and `today + 1`.
pub fn fallback_games(today: NaiveDate) -> Vec<Game> {
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    vec![
        Game {
            game_id: "sample1".into(),
            date: today.format("%Y-%m-%d").to_string(),
            time: "8:00 PM ET".into(),
            home_team: "Los Angeles Lakers".into(),
            away_team: "Golden State Warriors".into(),
            home_team_abbr: "LAL".into(),
            away_team_abbr: "GSW".into(),
        },
        Game {
            game_id: "sample2".into(),
            date: tomorrow.format("%Y-%m-%d").to_string(),
            time: "7:30 PM ET".into(),
            home_team: "Boston Celtics".into(),
            away_team: "Miami Heat".into(),
            home_team_abbr: "BOS".into(),
            away_team_abbr: "MIA".into(),
        },
    ]
}

/// Live provider first, sample board second. Never returns an empty list.
#[derive(Clone)]
pub struct GameFetcher {
    provider: Arc<dyn ScheduleProvider>,
}

impl GameFetcher {
    pub fn new(provider: Arc<dyn ScheduleProvider>) -> Self {
        GameFetcher { provider }
    }

    /// Between 1 and `max_games` games. A cap of 0 is treated as 1.
    pub async fn get_upcoming_games(&self, max_games: usize) -> Vec<Game> {
        self.get_upcoming_games_on(max_games, Local::now().date_naive())
            .await
    }

    async fn get_upcoming_games_on(&self, max_games: usize, today: NaiveDate) -> Vec<Game> {
        let max_games = max_games.max(1);

        match self.provider.fetch_upcoming_games(max_games).await {
            Ok(mut games) if !games.is_empty() => {
                games.truncate(max_games);
                return games;
            }
            Ok(_) => info!(
                "{} returned no usable games, serving sample games",
                self.provider.name()
            ),
            Err(e) => warn!(
                "Error fetching games from {}: {:#}. Serving sample games.",
                self.provider.name(),
                e
            ),
        }

        let mut games = fallback_games(today);
        games.truncate(max_games);
        games
    }
}
