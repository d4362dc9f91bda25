// Repository trait for tracking API access
use crate::domain::fetch_state::ErrorKind;
use crate::domain::page::TelemetryPage;
use crate::domain::query::{PageRequest, TrackingQuery};
use crate::domain::telemetry::TelemetryRecord;
use crate::infrastructure::http_transport::TransportError;
use crate::infrastructure::wire::MappingError;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(TransportError::Timeout { .. }) => ErrorKind::Timeout,
            ApiError::Transport(TransportError::Network { .. }) => ErrorKind::Network,
            ApiError::Transport(TransportError::Http { .. }) => ErrorKind::Http,
            ApiError::Mapping(_) => ErrorKind::Mapping,
        }
    }
}

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Health/info probe payload, passed through undecoded.
    async fn service_info(&self) -> Result<serde_json::Value, ApiError>;

    async fn list_page(&self, request: &PageRequest) -> Result<TelemetryPage, ApiError>;

    /// Most recent record per tracked shark.
    async fn latest_positions(&self) -> Result<TelemetryPage, ApiError>;

    async fn record_by_id(&self, id: i64) -> Result<Option<TelemetryRecord>, ApiError>;
}

impl TrackingQuery {
    pub async fn run(&self, repository: &dyn TelemetryRepository) -> Result<TelemetryPage, ApiError> {
        match self {
            TrackingQuery::LatestPositions => repository.latest_positions().await,
            TrackingQuery::Page(request) => repository.list_page(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_and_messages() {
        let timeout = ApiError::from(TransportError::Timeout { timeout_ms: 50 });
        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert_eq!(timeout.to_string(), "Timeout: the request took longer than 50ms");

        let http = ApiError::from(TransportError::Http {
            status: 503,
            message: "Error 503: Service Unavailable".to_string(),
            body: String::new(),
        });
        assert_eq!(http.kind(), ErrorKind::Http);
        assert_eq!(http.to_string(), "Error 503: Service Unavailable");

        assert_eq!(ApiError::from(MappingError::DataNotArray).kind(), ErrorKind::Mapping);
    }
}
