use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::provider::ScheduleProvider;
use crate::models::Game;

pub const DEFAULT_SCOREBOARD_URL: &str =
    "https://site.api.espn.com/apis/site/v2/sports/basketball/nba/scoreboard";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Upcoming NBA games from ESPN's public scoreboard. No API key required.
pub struct EspnScoreboard {
    http: Client,
    url: String,
}

impl EspnScoreboard {
    pub fn new(url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(EspnScoreboard {
            http,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl ScheduleProvider for EspnScoreboard {
    fn name(&self) -> &str {
        "ESPN"
    }

    async fn fetch_upcoming_games(&self, max_games: usize) -> Result<Vec<Game>> {
        debug!("Fetching scoreboard from {}", self.url);

        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("ESPN scoreboard request failed")?;

        if resp.status() != StatusCode::OK {
            anyhow::bail!("ESPN scoreboard error: {}", resp.status());
        }

        let raw: Value = resp
            .json()
            .await
            .context("Failed to parse ESPN scoreboard response")?;

        Ok(parse_scoreboard(&raw, max_games))
    }
}

/// Normalize the first `max_games` events. Events without a usable home and
/// away team are skipped but still count toward the cap.
pub fn parse_scoreboard(raw: &Value, max_games: usize) -> Vec<Game> {
    let events = match raw["events"].as_array() {
        Some(a) => a,
        None => return vec![],
    };

    events
        .iter()
        .take(max_games)
        .filter_map(|ev| {
            let game = parse_event(ev);
            if game.is_none() {
                debug!("Skipping malformed scoreboard event {}", ev["id"]);
            }
            game
        })
        .collect()
}

fn parse_event(ev: &Value) -> Option<Game> {
    let competitors = ev["competitions"][0]["competitors"].as_array()?;
    if competitors.len() < 2 {
        return None;
    }

    let home = side_team(competitors, "home")?;
    let away = side_team(competitors, "away")?;

    let game_id = match &ev["id"] {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    };

    let time = ev["status"]["type"]["shortDetail"]
        .as_str()
        .filter(|s| !s.is_empty())
        .unwrap_or("TBD")
        .to_string();

    Some(Game {
        game_id,
        date: calendar_date(ev["date"].as_str()?)?,
        time,
        home_team: home.display_name,
        away_team: away.display_name,
        home_team_abbr: home.abbreviation,
        away_team_abbr: away.abbreviation,
    })
}

struct SideTeam {
    display_name: String,
    abbreviation: String,
}

fn side_team(competitors: &[Value], side: &str) -> Option<SideTeam> {
    let team = competitors
        .iter()
        .find(|c| c["homeAway"] == side)?
        .get("team")?
        .as_object()
        .filter(|t| !t.is_empty())?;

    let display_name = team
        .get("displayName")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())?
        .to_string();
    let abbreviation = team
        .get("abbreviation")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    Some(SideTeam {
        display_name,
        abbreviation,
    })
}

/// `"2025-01-15T00:30Z"` → `"2025-01-15"`. The 10-character prefix must be a
/// real calendar date.
fn calendar_date(raw: &str) -> Option<String> {
    let prefix = raw.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()?;
    Some(prefix.to_string())
}
