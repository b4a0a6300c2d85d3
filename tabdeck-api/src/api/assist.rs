//! Text assistance endpoints: LLM classification and keyword detection
//!
//! Neither endpoint touches the document.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tabdeck_common::detect::{self, Detection};
use tracing::error;

use super::JsonBody;
use crate::services::Classification;
use crate::{ApiError, ApiResult, AppState};

/// Body of `POST /api/question`
#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    #[serde(default)]
    pub question: Option<String>,
}

/// Body of `POST /api/detect`. `text` is checked by hand so a non-string
/// value gets the same message as a missing one.
#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    #[serde(default)]
    pub text: Option<Value>,
}

/// POST /api/question
pub async fn ask_question(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<QuestionRequest>,
) -> ApiResult<Json<Classification>> {
    let question = req
        .question
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Question is required".to_string()))?;

    match state.classifier.classify(&question).await {
        Ok(classification) => Ok(Json(classification)),
        Err(e) => {
            error!("Classification failed: {}", e);
            Err(ApiError::Upstream("Failed to process the question".to_string()))
        }
    }
}

/// POST /api/detect
pub async fn detect_keyword(JsonBody(req): JsonBody<DetectRequest>) -> ApiResult<Json<Detection>> {
    match req.text {
        Some(Value::String(text)) => Ok(Json(detect::detect(&text))),
        _ => Err(ApiError::BadRequest("Missing 'text' field".to_string())),
    }
}

pub fn assist_routes() -> Router<AppState> {
    Router::new()
        .route("/api/question", post(ask_question))
        .route("/api/detect", post(detect_keyword))
}
