// Tracking API repository implementation
use crate::application::telemetry_repository::{ApiError, TelemetryRepository};
use crate::domain::page::TelemetryPage;
use crate::domain::query::{PageRequest, TelemetryFilter};
use crate::domain::telemetry::TelemetryRecord;
use crate::infrastructure::endpoints::{self, QueryParams};
use crate::infrastructure::http_transport::{HttpTransport, RawBody};
use crate::infrastructure::wire::{self, MappingError};
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct RestTelemetryRepository {
    transport: HttpTransport,
}

impl RestTelemetryRepository {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        match self.transport.get(url).await? {
            RawBody::Json(json) => Ok(json),
            other => Err(MappingError::UnexpectedBody { kind: other.kind() }.into()),
        }
    }
}

/// Query parameters for a page request, using the backend DTO names.
pub fn page_params(request: &PageRequest) -> QueryParams {
    let mut params = QueryParams::new();
    params
        .set("pageNum", request.page_num)
        .set("itemsPerPage", request.items_per_page);
    append_filter(&mut params, &request.filter);
    params
}

fn append_filter(params: &mut QueryParams, filter: &TelemetryFilter) {
    params
        .set("Id", filter.id)
        .set("Tempo", filter.timestamp.as_deref())
        .set("Lat", filter.lat)
        .set("Lon", filter.lon)
        .set("TempCc", filter.temp_cc)
        .set("PForrageio", filter.p_forrageio)
        .set("Comportamento", filter.behavior.as_deref())
        .set("ChlorAAmbiente", filter.chlor_a)
        .set("SshaAmbiente", filter.ssha);
}

#[async_trait]
impl TelemetryRepository for RestTelemetryRepository {
    async fn service_info(&self) -> Result<Value, ApiError> {
        match self.transport.get(endpoints::INFO_VERSION).await? {
            RawBody::Json(json) => Ok(json),
            RawBody::Text(text) => Ok(Value::String(text)),
            RawBody::Empty => Ok(Value::Null),
        }
    }

    async fn list_page(&self, request: &PageRequest) -> Result<TelemetryPage, ApiError> {
        let url = self
            .transport
            .urls()
            .build(endpoints::TRACKING_LIST, &page_params(request));
        tracing::debug!(url = %url, "fetching tracking page");

        let envelope = self.get_json(&url).await?;
        let page = wire::map_telemetry_page(&envelope)?;
        tracing::debug!(records = page.records.len(), total = page.total_count, "tracking page mapped");
        Ok(page)
    }

    async fn latest_positions(&self) -> Result<TelemetryPage, ApiError> {
        let envelope = self.get_json(endpoints::TRACKING_LATEST).await?;
        let page = wire::map_telemetry_page(&envelope)?;
        tracing::debug!(
            records = page.records.len(),
            plottable = page.records.iter().filter(|r| r.is_plottable()).count(),
            "latest positions mapped"
        );
        Ok(page)
    }

    async fn record_by_id(&self, id: i64) -> Result<Option<TelemetryRecord>, ApiError> {
        let envelope = self.get_json(&endpoints::tracking_by_id(id)).await?;
        Ok(wire::map_single_record(&envelope)?)
    }
}
