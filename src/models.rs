use serde::{Deserialize, Serialize};

/// An upcoming game as shown on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Scoreboard event ID (or `sampleN` for fallback games)
    pub game_id: String,
    /// Calendar date, YYYY-MM-DD
    pub date: String,
    /// Short status label such as "7:30 PM ET", or "TBD"
    pub time: String,
    pub home_team: String,
    pub away_team: String,
    pub home_team_abbr: String,
    pub away_team_abbr: String,
}

/// Outcome of a winner prediction. Serialized untagged so the JSON carries
/// either `{winner, confidence, note}` or `{error}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prediction {
    Winner {
        winner: String,
        /// Percentage in [55, 95], one decimal place
        confidence: f64,
        note: String,
    },
    Error {
        error: String,
    },
}

impl Prediction {
    pub fn error(message: impl Into<String>) -> Self {
        Prediction::Error {
            error: message.into(),
        }
    }
}

/// Response body of `GET /predict/:game_id`
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GamePredictionResponse {
    Found { game: Game, prediction: Prediction },
    NotFound { error: String },
}
