//! Component endpoints: add, update, clear

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tabdeck_common::{Component, Tab};

use super::JsonBody;
use crate::{ApiError, ApiResult, AppState};

/// Body of `POST /components`
#[derive(Debug, Deserialize)]
pub struct AddComponentRequest {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

/// Body of `PUT /components/:id`
#[derive(Debug, Deserialize)]
pub struct UpdateComponentRequest {
    pub key: String,
    #[serde(default)]
    pub data: Value,
}

/// Query of `DELETE /components`
#[derive(Debug, Deserialize)]
pub struct ClearQuery {
    pub key: String,
}

/// POST /components
///
/// Appends a component, creating the tab on first use. Responds with the tab.
pub async fn add_component(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AddComponentRequest>,
) -> ApiResult<(StatusCode, Json<Tab>)> {
    let tab = state
        .service
        .add_component(&req.key, &req.kind, req.data)
        .await?;
    Ok((StatusCode::CREATED, Json(tab)))
}

/// PUT /components/:id
pub async fn update_component(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateComponentRequest>,
) -> ApiResult<Json<Component>> {
    let component = state
        .service
        .update_component(&id, &req.key, req.data)
        .await?;
    Ok(Json(component))
}

/// DELETE /components?key=
pub async fn clear_components(
    State(state): State<AppState>,
    query: Result<Query<ClearQuery>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    state.service.clear_components(&query.key).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn component_routes() -> Router<AppState> {
    Router::new()
        .route("/components", post(add_component).delete(clear_components))
        .route("/components/:id", put(update_component))
}
