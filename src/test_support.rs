// Shared helpers for tests
use crate::application::telemetry_repository::{ApiError, TelemetryRepository};
use crate::domain::page::{PaginationHints, TelemetryPage};
use crate::domain::query::PageRequest;
use crate::domain::telemetry::TelemetryRecord;
use crate::infrastructure::http_transport::TransportError;
use async_trait::async_trait;
use axum::Router;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{}", addr)
}

pub fn page_of(n: usize) -> TelemetryPage {
    let records = (0..n)
        .map(|i| TelemetryRecord {
            id: Some(i as i64 + 1),
            lat: Some(-23.5),
            lon: Some(-45.2),
            behavior: Some("Forrageando".to_string()),
            ..Default::default()
        })
        .collect();
    TelemetryPage::new(records, PaginationHints::default())
}

pub fn timeout_error() -> ApiError {
    ApiError::Transport(TransportError::Timeout { timeout_ms: 50 })
}

/// Repository replaying scripted results. When gated, each call waits for a
/// permit before answering.
pub struct ScriptedRepository {
    script: Mutex<VecDeque<Result<TelemetryPage, ApiError>>>,
    calls: AtomicUsize,
    gate: Option<Semaphore>,
}

impl ScriptedRepository {
    pub fn new(script: Vec<Result<TelemetryPage, ApiError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn gated(script: Vec<Result<TelemetryPage, ApiError>>) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(script)
        }
    }

    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self) -> Result<TelemetryPage, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(page_of(1)))
    }
}

#[async_trait]
impl TelemetryRepository for ScriptedRepository {
    async fn service_info(&self) -> Result<serde_json::Value, ApiError> {
        Ok(serde_json::json!({"name": "scripted"}))
    }

    async fn list_page(&self, _request: &PageRequest) -> Result<TelemetryPage, ApiError> {
        self.next().await
    }

    async fn latest_positions(&self) -> Result<TelemetryPage, ApiError> {
        self.next().await
    }

    async fn record_by_id(&self, _id: i64) -> Result<Option<TelemetryRecord>, ApiError> {
        Ok(self.next().await?.records.into_iter().next())
    }
}
