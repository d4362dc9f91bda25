// API probe service - Reachability check of the tracking API endpoints
use crate::infrastructure::endpoints::{self, QueryParams};
use crate::infrastructure::http_transport::{HttpTransport, TransportError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Connectivity probe on the bare base URL.
const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub name: &'static str,
    pub endpoint: String,
    pub is_healthy: bool,
    pub response_time_ms: u64,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub base_url: String,
    pub timestamp: DateTime<Utc>,
    pub results: Vec<ProbeResult>,
}

impl ProbeReport {
    pub fn all_healthy(&self) -> bool {
        self.results.iter().all(|r| r.is_healthy)
    }
}

#[derive(Debug, Clone)]
pub struct ApiProbeService {
    transport: HttpTransport,
}

impl ApiProbeService {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    pub async fn run_all(&self) -> ProbeReport {
        let urls = self.transport.urls();
        let mut sample = QueryParams::new();
        sample.set("pageNum", Some(1)).set("itemsPerPage", Some(1));

        let none = QueryParams::new();
        let timeout = self.transport.default_timeout();

        let targets = [
            ("connectivity", urls.base_url().to_string(), CONNECTIVITY_TIMEOUT),
            ("info", urls.build(endpoints::INFO_VERSION, &none), timeout),
            ("tracking_list", urls.build(endpoints::TRACKING_LIST, &sample), timeout),
            ("latest_positions", urls.build(endpoints::TRACKING_LATEST, &none), timeout),
        ];

        let mut results = Vec::with_capacity(targets.len());
        for (name, endpoint, timeout) in targets {
            results.push(self.probe(name, endpoint, timeout).await);
        }

        let report = ProbeReport {
            base_url: urls.base_url().to_string(),
            timestamp: Utc::now(),
            results,
        };
        tracing::info!(
            base_url = %report.base_url,
            healthy = report.all_healthy(),
            "API probe finished"
        );
        report
    }

    async fn probe(&self, name: &'static str, endpoint: String, timeout: Duration) -> ProbeResult {
        let started = Instant::now();
        let outcome = self
            .transport
            .exchange(&endpoint, Default::default(), timeout)
            .await;
        let response_time_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok((status, body)) => {
                tracing::debug!(
                    probe = name,
                    endpoint = %endpoint,
                    status = status.as_u16(),
                    body = body.kind(),
                    response_time_ms,
                    "probe ok"
                );
                ProbeResult {
                    name,
                    endpoint,
                    is_healthy: true,
                    response_time_ms,
                    status_code: Some(status.as_u16()),
                    error: None,
                }
            }
            Err(err) => {
                tracing::warn!(probe = name, endpoint = %endpoint, error = %err, "probe failed");
                let status_code = match &err {
                    TransportError::Http { status, .. } => Some(*status),
                    _ => None,
                };
                ProbeResult {
                    name,
                    endpoint,
                    is_healthy: false,
                    response_time_ms,
                    status_code,
                    error: Some(err.to_string()),
                }
            }
        }
    }
}
