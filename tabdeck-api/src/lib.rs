//! tabdeck-api library - HTTP surface for the tab/component document
//!
//! Exposes the router and application state for the binary and for
//! integration tests.

pub mod api;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tabdeck_common::TabService;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::Classifier;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Tab/component operations over the backing document
    pub service: TabService,
    /// Question classifier
    pub classifier: Arc<dyn Classifier>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(service: TabService, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            service,
            classifier,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::state_routes())
        .merge(api::component_routes())
        .merge(api::assist_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Browser front end is served from another origin
        .layer(CorsLayer::permissive())
}
