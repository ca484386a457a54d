use anyhow::{Context, Result};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::scoring::{calculate_score, AnswerEvaluator, Passage, ScoredAnswer, ScoringError};
use crate::TARGET_WEB_REQUEST;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub evaluator: Arc<AnswerEvaluator>,
}

impl AppState {
    pub fn new(evaluator: AnswerEvaluator) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub student_answer: Option<String>,
    pub expert_answer: Option<String>,
}

/// Newline-separated answers, paired by line.
#[derive(Debug, Deserialize)]
pub struct BatchEvaluateRequest {
    #[serde(default)]
    pub student_answers: String,
    #[serde(default)]
    pub expert_answers: String,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub matched_keywords_count: usize,
    pub completion_score: f64,
    pub intent_score: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ScoreResponse {
    pub final_score: f64,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// A scoring failure rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub ScoringError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            ScoringError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ScoringError::EvaluationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ScoringError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn kind(&self) -> &'static str {
        match self.0 {
            ScoringError::InvalidInput(_) => "invalid_input",
            ScoringError::EvaluationFailed(_) => "evaluation_failed",
            ScoringError::ModelUnavailable(_) => "model_unavailable",
        }
    }
}

impl From<ScoringError> for ApiError {
    fn from(e: ScoringError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.kind(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(status_check))
        .route("/evaluate", post(evaluate))
        .route("/evaluate/batch", post(evaluate_batch))
        .route("/score", post(score))
        .with_state(state)
}

/// Serve the HTTP surface until Ctrl-C.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = router(state);
    let addr = format!("0.0.0.0:{}", port);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(target: TARGET_WEB_REQUEST, "Server running on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!(target: TARGET_WEB_REQUEST, "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(target: TARGET_WEB_REQUEST, "Shutdown signal received"),
        Err(e) => {
            error!(target: TARGET_WEB_REQUEST, "Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

async fn status_check() -> &'static str {
    "OK"
}

async fn evaluate(
    State(state): State<AppState>,
    Json(payload): Json<EvaluateRequest>,
) -> Result<Json<ScoredAnswer>, ApiError> {
    let (student, expert) = AnswerEvaluator::resolve_passages(
        payload.student_answer.as_deref(),
        payload.expert_answer.as_deref(),
    )
    .inspect_err(|e| warn!(target: TARGET_WEB_REQUEST, "Rejected evaluation request: {}", e))?;

    let components = state.evaluator.evaluate(&student, &expert).await;
    let scored = ScoredAnswer::from(components);
    debug!(target: TARGET_WEB_REQUEST, "Evaluation final score {:.4}", scored.final_score);
    Ok(Json(scored))
}

async fn evaluate_batch(
    State(state): State<AppState>,
    Json(payload): Json<BatchEvaluateRequest>,
) -> Json<Vec<ScoredAnswer>> {
    let students = Passage::new(payload.student_answers);
    let experts = Passage::new(payload.expert_answers);

    let results = state.evaluator.evaluate_batch(&students, &experts).await;
    info!(target: TARGET_WEB_REQUEST, "Evaluated batch of {} answers", results.len());
    Json(results)
}

async fn score(Json(payload): Json<ScoreRequest>) -> Result<Json<ScoreResponse>, ApiError> {
    if !payload.completion_score.is_finite() || !payload.intent_score.is_finite() {
        return Err(ScoringError::InvalidInput("scores must be finite".to_string()).into());
    }
    Ok(Json(ScoreResponse {
        final_score: calculate_score(
            payload.matched_keywords_count,
            payload.completion_score,
            payload.intent_score,
        ),
    }))
}
