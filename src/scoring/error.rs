use serde::Serialize;
use thiserror::Error;

/// Failures the scoring library surfaces to its callers.
///
/// Model and runtime failures inside a sub-step never reach the caller of
/// `evaluate_answer`; they are converted into a neutral 0.0 sub-score and a
/// [`Degradation`] note instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("evaluation failed: {0}")]
    EvaluationFailed(String),
}

/// Which side of an evaluation a note refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSide {
    Student,
    Expert,
}

/// Why a sub-score fell back to its neutral value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// The passage was empty or whitespace only.
    DegenerateInput { side: AnswerSide },
    /// The extractive-QA model failed to load or to run.
    ModelUnavailable { reason: String },
    /// Inference did not finish within the configured timeout.
    InferenceTimeout { timeout_ms: u64 },
}
