// HTTP request handlers
use crate::application::sync_controller::RefetchOutcome;
use crate::domain::fetch_state::{ErrorKind, FetchPhase, FetchSnapshot};
use crate::domain::query::BehaviorFilter;
use crate::domain::telemetry::{Behavior, BehaviorInfo, TelemetryRecord};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct TrackingQueryParams {
    /// Comma-separated behavior names, e.g. `foraging,searching`.
    pub behavior: Option<String>,
    pub plottable: Option<bool>,
}

impl TrackingQueryParams {
    fn behavior_filter(&self) -> BehaviorFilter {
        match self.behavior.as_deref().map(str::trim) {
            None | Some("") => BehaviorFilter::All,
            Some(list) => BehaviorFilter::Only(list.split(',').filter_map(Behavior::parse).collect()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView<'a> {
    #[serde(flatten)]
    pub record: &'a TelemetryRecord,
    pub observed_at: Option<DateTime<Utc>>,
    pub plottable: bool,
    pub behavior_info: BehaviorInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotView<'a> {
    pub phase: FetchPhase,
    pub loading: bool,
    pub error: Option<&'a str>,
    pub error_kind: Option<ErrorKind>,
    pub total_count: usize,
    pub last_success: Option<DateTime<Utc>>,
    pub records: Vec<RecordView<'a>>,
}

impl<'a> SnapshotView<'a> {
    pub fn new(snapshot: &'a FetchSnapshot, params: &TrackingQueryParams) -> Self {
        let filter = params.behavior_filter();
        let only_plottable = params.plottable.unwrap_or(false);

        let records = snapshot
            .filtered(&filter)
            .into_iter()
            .filter(|r| !only_plottable || r.is_plottable())
            .map(|record| RecordView {
                record,
                observed_at: record.observed_at(),
                plottable: record.is_plottable(),
                behavior_info: record.behavior_info(),
            })
            .collect();

        Self {
            phase: snapshot.phase,
            loading: snapshot.loading,
            error: snapshot.error.as_deref(),
            error_kind: snapshot.error_kind,
            total_count: snapshot.total_count,
            last_success: snapshot.last_success,
            records,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefetchResponse {
    pub outcome: RefetchOutcome,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current tracking snapshot, optionally filtered client-side
pub async fn tracking_snapshot(
    Query(params): Query<TrackingQueryParams>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let snapshot = state.controller.snapshot();
    Json(SnapshotView::new(&snapshot, &params)).into_response()
}

/// Run a refetch to completion; a no-op while one is already running
pub async fn refetch(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let outcome = state.controller.refetch().await;
    (StatusCode::OK, Json(RefetchResponse { outcome }))
}

/// Probe the tracking API endpoints
pub async fn diagnostics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.probe.run_all().await)
}
