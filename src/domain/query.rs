// Tracking resources a controller can synchronize
use super::telemetry::{Behavior, TelemetryRecord};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum TrackingQuery {
    /// Most recent record per tracked shark.
    #[default]
    LatestPositions,
    Page(PageRequest),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRequest {
    pub page_num: Option<u32>,
    pub items_per_page: Option<u32>,
    pub filter: TelemetryFilter,
}

impl PageRequest {
    pub fn new(page_num: u32, items_per_page: u32) -> Self {
        Self {
            page_num: Some(page_num),
            items_per_page: Some(items_per_page),
            filter: TelemetryFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: TelemetryFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Server-side filter. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryFilter {
    pub id: Option<i64>,
    pub timestamp: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub temp_cc: Option<f64>,
    pub p_forrageio: Option<f64>,
    pub behavior: Option<String>,
    pub chlor_a: Option<f64>,
    pub ssha: Option<f64>,
}

/// Client-side behavior predicate, applied to records after fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BehaviorFilter {
    #[default]
    All,
    Only(Vec<Behavior>),
}

impl BehaviorFilter {
    pub fn only(behavior: Behavior) -> Self {
        BehaviorFilter::Only(vec![behavior])
    }

    pub fn matches(&self, record: &TelemetryRecord) -> bool {
        match self {
            BehaviorFilter::All => true,
            BehaviorFilter::Only(wanted) => wanted.contains(&record.classification()),
        }
    }
}
