pub mod features;
pub mod model;

pub use model::{Classifier, ModelHandle};

use tracing::{debug, warn};

use crate::error::PredictionError;
use crate::models::Prediction;
use features::{team_features, FeatureRow};

/// Label the model emits when the home team is predicted to win.
const HOME_WIN_LABEL: i64 = 1;
/// Confidence used when the model offers no usable decision score.
pub const FALLBACK_CONFIDENCE: f64 = 75.0;
const MIN_CONFIDENCE: f64 = 55.0;
const MAX_CONFIDENCE: f64 = 95.0;
const PREDICTION_NOTE: &str = "Using trained model";

/// Map a decision score to a display percentage:
/// `clamp(|score| * 10 + 50, 55, 95)`, rounded to one decimal.
pub fn confidence_from_score(score: f64) -> f64 {
    let raw = (score.abs() * 10.0 + 50.0).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);
    (raw * 10.0).round() / 10.0
}

/// Primary strategy: the model's decision score. Fallback: a fixed 75%.
fn confidence_for(classifier: &dyn Classifier, row: &FeatureRow) -> f64 {
    match classifier.decision_score(row) {
        Ok(score) if score.is_finite() => confidence_from_score(score),
        Ok(score) => {
            debug!("Non-finite decision score {}, using fallback confidence", score);
            FALLBACK_CONFIDENCE
        }
        Err(e) => {
            debug!("No decision score ({}), using fallback confidence", e);
            FALLBACK_CONFIDENCE
        }
    }
}

/// Predicts a winner from two team names with the process-wide model.
#[derive(Clone)]
pub struct WinnerPredictor {
    model: ModelHandle,
}

impl WinnerPredictor {
    pub fn new(model: ModelHandle) -> Self {
        WinnerPredictor { model }
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_loaded()
    }

    /// Never fails: errors collapse into [`Prediction::Error`] with a generic
    /// message, and the detail is logged.
    pub fn predict_game_winner(&self, home_team: &str, away_team: &str) -> Prediction {
        match self.try_predict(home_team, away_team) {
            Ok(p) => p,
            Err(e) => {
                warn!(
                    "Prediction failed for {} vs {}: {}",
                    home_team, away_team, e
                );
                Prediction::error(e.public_message())
            }
        }
    }

    fn try_predict(&self, home_team: &str, away_team: &str) -> Result<Prediction, PredictionError> {
        let classifier = match &self.model {
            ModelHandle::Loaded(c) => c.as_ref(),
            ModelHandle::Unavailable => return Err(PredictionError::ModelNotLoaded),
        };

        let row = team_features(home_team, away_team)?;
        let label = classifier.predict(&row)?;
        let confidence = confidence_for(classifier, &row);

        let winner = if label == HOME_WIN_LABEL {
            home_team
        } else {
            away_team
        };

        Ok(Prediction::Winner {
            winner: winner.to_string(),
            confidence,
            note: PREDICTION_NOTE.to_string(),
        })
    }
}
