// Presentation layer - JSON view of the sync state for rendering clients
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{diagnostics, health_check, refetch, tracking_snapshot};
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/tracking", get(tracking_snapshot))
        .route("/tracking/refetch", post(refetch))
        .route("/diagnostics", get(diagnostics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
