//! Serialized classifier artifacts.
//!
//! The artifact is a JSON document tagged on `kind`:
//!
//! ```json
//! { "kind": "linear", "coefficients": [0.4, -0.4, ...], "intercept": 0.1 }
//! { "kind": "decision_tree", "nodes": [{ "feature": 0, "threshold": 0.5, "left": 1, "right": 2 },
//!                                      { "label": 0 }, { "label": 1 }] }
//! ```
//!
//! Linear models expose a decision score; trees only expose labels.

use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use super::features::{FeatureRow, FEATURE_COUNT};
use crate::error::{ModelLoadError, PredictionError};

/// Inference seam for the winner predictor.
pub trait Classifier: Send + Sync {
    /// Binary class label for one row.
    fn predict(&self, row: &FeatureRow) -> Result<i64, PredictionError>;

    /// Signed margin for one row. Models without one keep the default.
    fn decision_score(&self, _row: &FeatureRow) -> Result<f64, PredictionError> {
        Err(PredictionError::NoDecisionScore)
    }
}

// ── Artifact formats ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearModel),
    DecisionTree(DecisionTree),
}

/// Logistic-regression style model: `score = w·x + b`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// `[negative, positive]` labels
    #[serde(default = "default_classes")]
    pub classes: [i64; 2],
}

fn default_classes() -> [i64; 2] {
    [0, 1]
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    /// Root is node 0.
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go `left` when `row[feature] <= threshold`, else `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        label: i64,
    },
}

impl ModelArtifact {
    pub fn from_json(path: &str, raw: &str) -> Result<Self, ModelLoadError> {
        let artifact: ModelArtifact =
            serde_json::from_str(raw).map_err(|source| ModelLoadError::Parse {
                path: path.to_string(),
                source,
            })?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Reject artifacts that could not score a 10-feature row.
    pub fn validate(&self) -> Result<(), ModelLoadError> {
        match self {
            ModelArtifact::Linear(m) => {
                if m.coefficients.len() != FEATURE_COUNT {
                    return Err(ModelLoadError::Invalid(format!(
                        "linear model has {} coefficients, expected {}",
                        m.coefficients.len(),
                        FEATURE_COUNT
                    )));
                }
                if !m.intercept.is_finite() || m.coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(ModelLoadError::Invalid(
                        "linear model has non-finite weights".into(),
                    ));
                }
            }
            ModelArtifact::DecisionTree(t) => {
                if t.nodes.is_empty() {
                    return Err(ModelLoadError::Invalid("decision tree has no nodes".into()));
                }
                for (i, node) in t.nodes.iter().enumerate() {
                    if let TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } = node
                    {
                        if *feature >= FEATURE_COUNT {
                            return Err(ModelLoadError::Invalid(format!(
                                "node {i} splits on feature {feature}"
                            )));
                        }
                        if !threshold.is_finite() {
                            return Err(ModelLoadError::Invalid(format!(
                                "node {i} has a non-finite threshold"
                            )));
                        }
                        // Children must point forward so traversal terminates.
                        for child in [*left, *right] {
                            if child <= i || child >= t.nodes.len() {
                                return Err(ModelLoadError::Invalid(format!(
                                    "node {i} has invalid child {child}"
                                )));
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn into_classifier(self) -> Arc<dyn Classifier> {
        match self {
            ModelArtifact::Linear(m) => Arc::new(m),
            ModelArtifact::DecisionTree(t) => Arc::new(t),
        }
    }
}

impl LinearModel {
    fn score(&self, row: &FeatureRow) -> f64 {
        self.coefficients
            .iter()
            .zip(row.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }
}

impl Classifier for LinearModel {
    fn predict(&self, row: &FeatureRow) -> Result<i64, PredictionError> {
        let score = self.score(row);
        if score.is_nan() {
            return Err(PredictionError::Inference("linear score is NaN".into()));
        }
        Ok(if score > 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        })
    }

    fn decision_score(&self, row: &FeatureRow) -> Result<f64, PredictionError> {
        Ok(self.score(row))
    }
}

impl Classifier for DecisionTree {
    fn predict(&self, row: &FeatureRow) -> Result<i64, PredictionError> {
        let mut idx = 0usize;
        // Validated trees only move forward, so at most `nodes.len()` steps.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { label }) => return Ok(*label),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = row.get(*feature).ok_or_else(|| {
                        PredictionError::Inference(format!("feature {feature} out of range"))
                    })?;
                    idx = if *x <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(PredictionError::Inference(format!(
                        "node {idx} out of range"
                    )))
                }
            }
        }
        Err(PredictionError::Inference(
            "decision tree traversal did not reach a leaf".into(),
        ))
    }
}

// ── Process-wide handle ──────────────────────────────────────────────────────

/// Read-only model handle established once at startup.
#[derive(Clone)]
pub enum ModelHandle {
    Loaded(Arc<dyn Classifier>),
    /// Load failed; every prediction reports "model not loaded".
    Unavailable,
}

impl ModelHandle {
    pub fn from_classifier(classifier: Arc<dyn Classifier>) -> Self {
        ModelHandle::Loaded(classifier)
    }

    pub fn from_file(path: &Path) -> Result<Self, ModelLoadError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: display.clone(),
            source,
        })?;
        let artifact = ModelArtifact::from_json(&display, &raw)?;
        Ok(ModelHandle::from_classifier(artifact.into_classifier()))
    }

    /// Load the artifact, degrading to [`ModelHandle::Unavailable`] on any error.
    pub fn load_or_unavailable(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(handle) => {
                info!("Model loaded from {}", path.display());
                handle
            }
            Err(e) => {
                error!("Error loading model: {}. Predictions will be unavailable.", e);
                ModelHandle::Unavailable
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelHandle::Loaded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_json(coefs: &str, intercept: f64) -> String {
        format!(r#"{{"kind":"linear","coefficients":{coefs},"intercept":{intercept}}}"#)
    }

    #[test]
    fn parses_linear_model() {
        let raw = linear_json("[1,0,0,0,0,0,0,0,0,0]", -0.5);
        let artifact = ModelArtifact::from_json("m.json", &raw).unwrap();
        let clf = artifact.into_classifier();
        let mut row = [0.0; FEATURE_COUNT];
        row[0] = 0.9;
        assert_eq!(clf.predict(&row).unwrap(), 1);
        assert_relative_eq!(clf.decision_score(&row).unwrap(), 0.4, epsilon = 1e-9);
        row[0] = 0.1;
        assert_eq!(clf.predict(&row).unwrap(), 0);
    }

    #[test]
    fn linear_custom_classes() {
        let raw = r#"{"kind":"linear","coefficients":[0,0,0,0,0,0,0,0,0,0],"intercept":1.0,"classes":[-1,1]}"#;
        let clf = ModelArtifact::from_json("m.json", raw).unwrap().into_classifier();
        assert_eq!(clf.predict(&[0.0; FEATURE_COUNT]).unwrap(), 1);
    }

    #[test]
    fn rejects_wrong_coefficient_count() {
        let raw = linear_json("[1,2,3]", 0.0);
        let err = ModelArtifact::from_json("m.json", &raw).unwrap_err();
        assert!(matches!(err, ModelLoadError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = ModelArtifact::from_json("m.json", r#"{"kind":"svm"}"#).unwrap_err();
        assert!(matches!(err, ModelLoadError::Parse { .. }));
    }

    #[test]
    fn tree_predicts_without_decision_score() {
        let raw = r#"{"kind":"decision_tree","nodes":[
            {"feature":0,"threshold":0.5,"left":1,"right":2},
            {"label":0},
            {"label":1}
        ]}"#;
        let clf = ModelArtifact::from_json("t.json", raw).unwrap().into_classifier();
        let mut row = [0.0; FEATURE_COUNT];
        row[0] = 0.7;
        assert_eq!(clf.predict(&row).unwrap(), 1);
        row[0] = 0.5;
        assert_eq!(clf.predict(&row).unwrap(), 0);
        assert!(matches!(
            clf.decision_score(&row),
            Err(PredictionError::NoDecisionScore)
        ));
    }

    #[test]
    fn tree_rejects_backward_edges() {
        let raw = r#"{"kind":"decision_tree","nodes":[
            {"feature":0,"threshold":0.5,"left":0,"right":1},
            {"label":1}
        ]}"#;
        assert!(ModelArtifact::from_json("t.json", raw).is_err());
    }

    #[test]
    fn tree_rejects_bad_feature_index() {
        let raw = r#"{"kind":"decision_tree","nodes":[
            {"feature":10,"threshold":0.5,"left":1,"right":2},
            {"label":0},
            {"label":1}
        ]}"#;
        assert!(ModelArtifact::from_json("t.json", raw).is_err());
    }

    #[test]
    fn missing_file_degrades_to_unavailable() {
        let handle = ModelHandle::load_or_unavailable(Path::new("/nonexistent/model.json"));
        assert!(!handle.is_loaded());
        assert!(matches!(
            ModelHandle::from_file(Path::new("/nonexistent/model.json")),
            Err(ModelLoadError::Io { .. })
        ));
    }

    #[test]
    fn loads_from_disk() {
        let path = std::env::temp_dir().join(format!("courtside-model-{}.json", std::process::id()));
        std::fs::write(&path, linear_json("[0,0,0,0,0,0,0,0,0,0]", 2.0)).unwrap();
        let handle = ModelHandle::load_or_unavailable(&path);
        std::fs::remove_file(&path).ok();
        assert!(handle.is_loaded());
    }
}
