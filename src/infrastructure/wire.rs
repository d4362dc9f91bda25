// Mapper from the tracking API envelope to domain records
use crate::domain::page::{PaginationHints, TelemetryPage};
use crate::domain::telemetry::TelemetryRecord;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("unexpected response: envelope is not a JSON object")]
    NotAnObject,
    #[error("unexpected response: envelope has no data field")]
    MissingData,
    #[error("unexpected response: data is not an array")]
    DataNotArray,
    #[error("unexpected response: expected JSON, got {kind} body")]
    UnexpectedBody { kind: &'static str },
}

/// Maps one envelope. Malformed items yield records with `None` fields
/// instead of failing the page.
pub fn map_telemetry_page(envelope: &Value) -> Result<TelemetryPage, MappingError> {
    let items = data_items(envelope)?;
    let records: Vec<TelemetryRecord> = items.iter().map(map_record).collect();

    let mut page = TelemetryPage::new(records, pagination_hints(envelope.get("pagination")));
    page.process_message = envelope
        .get("processMessage")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string);
    page.have_warnings = envelope
        .get("haveWarnings")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if page.have_warnings {
        tracing::warn!(
            message = page.process_message.as_deref().unwrap_or(""),
            "tracking API reported warnings"
        );
    }

    Ok(page)
}

/// The by-id endpoint wraps a single record in the same envelope.
pub fn map_single_record(envelope: &Value) -> Result<Option<TelemetryRecord>, MappingError> {
    Ok(data_items(envelope)?.first().map(map_record))
}

pub fn map_record(item: &Value) -> TelemetryRecord {
    let number = |key: &str| item.get(key).and_then(Value::as_f64);
    let text = |key: &str| item.get(key).and_then(Value::as_str).map(str::to_string);

    TelemetryRecord {
        id: item.get("id").and_then(Value::as_i64),
        timestamp: text("tempo"),
        lat: number("lat"),
        lon: number("lon"),
        temp_cc: number("tempCc"),
        p_forrageio: number("pForrageio"),
        behavior: text("comportamento"),
        chlor_a: number("chlorAAmbiente"),
        ssha: number("sshaAmbiente"),
    }
}

fn data_items(envelope: &Value) -> Result<&Vec<Value>, MappingError> {
    let object = envelope.as_object().ok_or(MappingError::NotAnObject)?;
    let data = object.get("data").ok_or(MappingError::MissingData)?;
    data.as_array().ok_or(MappingError::DataNotArray)
}

fn pagination_hints(block: Option<&Value>) -> PaginationHints {
    let Some(block) = block else {
        return PaginationHints::default();
    };
    let count = |key: &str| block.get(key).and_then(Value::as_u64);

    PaginationHints {
        page_num: count("pageNum"),
        items_per_page: count("itemsPerPage"),
        total_records: count("totalRecords"),
        total_pages: count("totalPages"),
    }
}
