pub mod config;
pub mod extractive;
pub mod span;

pub use config::QaModelConfig;
pub use extractive::BertQuestionAnswering;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::scoring::ScoringError;

/// Versioned reference to a model repository, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelHandle {
    pub name: String,
    pub revision: String,
}

impl ModelHandle {
    pub fn new(name: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            revision: revision.into(),
        }
    }

    /// Download URL of `file` at the pinned revision.
    pub fn file_url(&self, file: &str) -> String {
        format!(
            "https://huggingface.co/{}/resolve/{}/{}",
            self.name, self.revision, file
        )
    }

    /// Local cache directory for this handle under `root`.
    pub fn cache_dir(&self, root: &Path) -> PathBuf {
        root.join(self.name.replace('/', "--")).join(&self.revision)
    }
}

impl fmt::Display for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.revision)
    }
}

/// Best answer span found by an extractive-QA model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QaAnswer {
    pub answer: String,
    pub score: f64,
    pub start: usize,
    pub end: usize,
}

/// Extractive question answering: locate the answer to `question` inside `context`.
pub trait AnswerExtractor: Send + Sync {
    fn infer(&self, question: &str, context: &str) -> Result<QaAnswer, ScoringError>;
}

/// Stand-in installed when the model could not be loaded; every call fails.
#[derive(Debug, Clone)]
pub struct UnavailableExtractor {
    reason: String,
}

impl UnavailableExtractor {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl AnswerExtractor for UnavailableExtractor {
    fn infer(&self, _question: &str, _context: &str) -> Result<QaAnswer, ScoringError> {
        Err(ScoringError::ModelUnavailable(self.reason.clone()))
    }
}
