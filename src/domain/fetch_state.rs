// Fetch lifecycle state owned by a sync controller
use super::page::TelemetryPage;
use super::query::BehaviorFilter;
use super::telemetry::TelemetryRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchPhase {
    Idle,
    Loading,
    Ready,
    Refreshing,
    Error,
}

/// Coarse error category carried next to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Timeout,
    Network,
    Http,
    Mapping,
}

/// Read-only view handed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchSnapshot {
    pub phase: FetchPhase,
    pub records: Vec<TelemetryRecord>,
    pub loading: bool,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub total_count: usize,
    pub last_success: Option<DateTime<Utc>>,
}

impl Default for FetchSnapshot {
    fn default() -> Self {
        Self {
            phase: FetchPhase::Idle,
            records: Vec::new(),
            loading: false,
            error: None,
            error_kind: None,
            total_count: 0,
            last_success: None,
        }
    }
}

impl FetchSnapshot {
    pub fn has_data(&self) -> bool {
        self.last_success.is_some()
    }

    /// Enters `Refreshing` when a previous fetch succeeded, `Loading` otherwise.
    /// Any current error stays visible until the fetch resolves.
    pub fn begin_fetch(&mut self) {
        self.phase = if self.has_data() {
            FetchPhase::Refreshing
        } else {
            FetchPhase::Loading
        };
        self.loading = true;
    }

    pub fn apply_page(&mut self, page: TelemetryPage, at: DateTime<Utc>) {
        self.phase = FetchPhase::Ready;
        self.loading = false;
        self.total_count = page.total_count;
        self.records = page.records;
        self.error = None;
        self.error_kind = None;
        self.last_success = Some(at);
    }

    /// Records from the last success are kept.
    pub fn apply_error(&mut self, message: String, kind: ErrorKind) {
        self.phase = FetchPhase::Error;
        self.loading = false;
        self.error = Some(message);
        self.error_kind = Some(kind);
    }

    pub fn filtered(&self, filter: &BehaviorFilter) -> Vec<&TelemetryRecord> {
        self.records.iter().filter(|r| filter.matches(r)).collect()
    }

    pub fn plottable(&self) -> impl Iterator<Item = &TelemetryRecord> {
        self.records.iter().filter(|r| r.is_plottable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::page::PaginationHints;
    use crate::domain::telemetry::Behavior;

    fn page_of(n: usize) -> TelemetryPage {
        let records = (0..n)
            .map(|i| TelemetryRecord {
                id: Some(i as i64),
                lat: Some(-10.0),
                lon: if i == 0 { None } else { Some(20.0) },
                behavior: Some(if i % 2 == 0 { "Busca" } else { "Forrageando" }.to_string()),
                ..Default::default()
            })
            .collect();
        TelemetryPage::new(records, PaginationHints::default())
    }

    #[test]
    fn test_first_fetch_lifecycle() {
        let mut state = FetchSnapshot::default();
        assert_eq!(state.phase, FetchPhase::Idle);

        state.begin_fetch();
        assert_eq!(state.phase, FetchPhase::Loading);
        assert!(state.loading);

        state.apply_page(page_of(4), Utc::now());
        assert_eq!(state.phase, FetchPhase::Ready);
        assert!(!state.loading);
        assert_eq!(state.total_count, 4);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_failure_without_data_leaves_records_empty() {
        let mut state = FetchSnapshot::default();
        state.begin_fetch();
        state.apply_error("offline".to_string(), ErrorKind::Network);

        assert_eq!(state.phase, FetchPhase::Error);
        assert!(state.records.is_empty());
        assert_eq!(state.error_kind, Some(ErrorKind::Network));

        state.begin_fetch();
        assert_eq!(state.phase, FetchPhase::Loading);
        assert_eq!(state.error.as_deref(), Some("offline"));
    }

    #[test]
    fn test_failed_refresh_keeps_stale_records() {
        let mut state = FetchSnapshot::default();
        state.begin_fetch();
        state.apply_page(page_of(3), Utc::now());

        state.begin_fetch();
        assert_eq!(state.phase, FetchPhase::Refreshing);
        assert_eq!(state.records.len(), 3);

        state.apply_error("Error 502: Bad Gateway".to_string(), ErrorKind::Http);
        assert_eq!(state.phase, FetchPhase::Error);
        assert_eq!(state.records.len(), 3);
        assert!(state.error.is_some());

        state.begin_fetch();
        state.apply_page(page_of(1), Utc::now());
        assert!(state.error.is_none());
        assert_eq!(state.records.len(), 1);
    }

    #[test]
    fn test_selectors() {
        let mut state = FetchSnapshot::default();
        state.apply_page(page_of(4), Utc::now());

        assert_eq!(state.plottable().count(), 3);
        let foraging = state.filtered(&BehaviorFilter::only(Behavior::Foraging));
        assert_eq!(foraging.len(), 2);
        assert_eq!(state.filtered(&BehaviorFilter::All).len(), 4);
    }
}
