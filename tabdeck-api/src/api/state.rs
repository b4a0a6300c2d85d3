//! Whole-document endpoints: read, merge, active tab

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use serde::Deserialize;
use tabdeck_common::State as Document;

use super::JsonBody;
use crate::{ApiResult, AppState};

/// Body of `POST /merge` and `POST /activeTab`
#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    pub key: String,
}

/// GET /state
pub async fn get_state(State(state): State<AppState>) -> ApiResult<Json<Document>> {
    Ok(Json(state.service.get_state().await?))
}

/// POST /merge
///
/// Moves every home-tab component into `key` and empties home.
pub async fn merge_tabs(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<KeyRequest>,
) -> ApiResult<Json<Document>> {
    Ok(Json(state.service.merge_into(&req.key).await?))
}

/// POST /activeTab
pub async fn set_active_tab(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<KeyRequest>,
) -> ApiResult<StatusCode> {
    state.service.set_active_tab(&req.key).await?;
    Ok(StatusCode::OK)
}

pub fn state_routes() -> Router<AppState> {
    Router::new()
        .route("/state", get(get_state))
        .route("/merge", post(merge_tabs))
        .route("/activeTab", post(set_active_tab))
}
