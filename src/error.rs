use thiserror::Error;

/// Failures inside a single prediction. Callers only ever see the generic
/// text from [`PredictionError::public_message`]; the detail goes to the log.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("model not loaded")]
    ModelNotLoaded,

    #[error("feature {index} is not finite ({value})")]
    InvalidFeatures { index: usize, value: f64 },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model exposes no decision score")]
    NoDecisionScore,
}

impl PredictionError {
    /// Text surfaced to HTTP clients.
    pub fn public_message(&self) -> &'static str {
        match self {
            PredictionError::ModelNotLoaded => "Model Prediction Failure - Model not loaded",
            _ => "Model Prediction Failure",
        }
    }
}

/// Reasons a model artifact could not be turned into a usable classifier.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_loaded_has_specific_public_message() {
        assert_eq!(
            PredictionError::ModelNotLoaded.public_message(),
            "Model Prediction Failure - Model not loaded"
        );
    }

    #[test]
    fn other_failures_are_generic() {
        let errs = [
            PredictionError::InvalidFeatures { index: 2, value: f64::NAN },
            PredictionError::Inference("node 7 out of range".into()),
            PredictionError::NoDecisionScore,
        ];
        for e in errs {
            assert_eq!(e.public_message(), "Model Prediction Failure");
        }
    }

    #[test]
    fn detail_stays_in_display() {
        let e = PredictionError::Inference("bad node".into());
        assert!(e.to_string().contains("bad node"));
        assert!(!e.public_message().contains("bad node"));
    }
}
