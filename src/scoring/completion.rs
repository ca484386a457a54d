use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::error::{AnswerSide, Degradation, ScoringError};
use super::types::Passage;
use crate::model::{AnswerExtractor, QaAnswer};
use crate::TARGET_SCORING;

/// Completion score plus the reason it was neutralised, if it was.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    pub score: f64,
    pub degradation: Option<Degradation>,
}

impl CompletionOutcome {
    fn scored(score: f64) -> Self {
        Self {
            score: score.clamp(0.0, 1.0),
            degradation: None,
        }
    }

    fn neutral(degradation: Degradation) -> Self {
        Self {
            score: 0.0,
            degradation: Some(degradation),
        }
    }
}

/// Asks the expert answer as a question over the student answer and takes
/// the extractive model's confidence as coverage.
///
/// Async inferences run on the blocking pool and each holds one of a fixed
/// number of slots. A timed-out inference keeps running and keeps its slot
/// until the model returns, so a slow model cannot pile up blocking threads.
#[derive(Clone)]
pub struct CompletionScorer {
    extractor: Arc<dyn AnswerExtractor>,
    inference_timeout: Duration,
    inference_slots: Arc<Semaphore>,
}

/// One inference slot per available core.
pub fn default_inference_slots() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl CompletionScorer {
    pub fn new(extractor: Arc<dyn AnswerExtractor>, inference_timeout: Duration) -> Self {
        Self {
            extractor,
            inference_timeout,
            inference_slots: Arc::new(Semaphore::new(default_inference_slots())),
        }
    }

    /// Bound the number of async inferences running at once (at least 1).
    pub fn with_max_concurrent_inferences(mut self, limit: usize) -> Self {
        self.inference_slots = Arc::new(Semaphore::new(limit.max(1)));
        self
    }

    /// Slots not held by a running async inference.
    pub fn available_inference_slots(&self) -> usize {
        self.inference_slots.available_permits()
    }

    fn degenerate_side(student: &Passage, expert: &Passage) -> Option<AnswerSide> {
        if student.is_blank() {
            Some(AnswerSide::Student)
        } else if expert.is_blank() {
            Some(AnswerSide::Expert)
        } else {
            None
        }
    }

    fn from_inference(result: Result<QaAnswer, ScoringError>) -> CompletionOutcome {
        match result {
            Ok(answer) => {
                debug!(target: TARGET_SCORING, "Completion span '{}' scored {:.4}", answer.answer, answer.score);
                CompletionOutcome::scored(answer.score)
            }
            Err(e) => {
                warn!(target: TARGET_SCORING, "Completion check failed, scoring 0.0: {}", e);
                CompletionOutcome::neutral(Degradation::ModelUnavailable {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Run inference on the calling thread. Never fails; failures score 0.0.
    pub fn completion_score(&self, student: &Passage, expert: &Passage) -> CompletionOutcome {
        if let Some(side) = Self::degenerate_side(student, expert) {
            return CompletionOutcome::neutral(Degradation::DegenerateInput { side });
        }
        Self::from_inference(self.extractor.infer(expert.as_str(), student.as_str()))
    }

    /// Run inference on the blocking pool, bounded by the inference timeout.
    /// Waiting for a free slot counts against the timeout.
    pub async fn completion_score_with_timeout(
        &self,
        student: &Passage,
        expert: &Passage,
    ) -> CompletionOutcome {
        if let Some(side) = Self::degenerate_side(student, expert) {
            return CompletionOutcome::neutral(Degradation::DegenerateInput { side });
        }

        let extractor = Arc::clone(&self.extractor);
        let slots = Arc::clone(&self.inference_slots);
        let question = expert.as_str().to_string();
        let context = student.as_str().to_string();
        let task = async move {
            let slot = slots.acquire_owned().await.map_err(|e| e.to_string())?;
            tokio::task::spawn_blocking(move || {
                let _slot = slot;
                extractor.infer(&question, &context)
            })
            .await
            .map_err(|e| e.to_string())
        };

        match timeout(self.inference_timeout, task).await {
            Ok(Ok(result)) => Self::from_inference(result),
            Ok(Err(reason)) => {
                warn!(target: TARGET_SCORING, "Completion task aborted: {}", reason);
                CompletionOutcome::neutral(Degradation::ModelUnavailable { reason })
            }
            Err(_) => {
                warn!(target: TARGET_SCORING, "Completion check timed out after {:?}", self.inference_timeout);
                CompletionOutcome::neutral(Degradation::InferenceTimeout {
                    timeout_ms: self.inference_timeout.as_millis() as u64,
                })
            }
        }
    }
}
