// Telemetry domain models
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

/// One timestamped observation of a tracked shark.
///
/// Every field is optional: records are mapped permissively from the wire and
/// consumers decide how to render missing values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
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

impl TelemetryRecord {
    /// Latitude/longitude pair, only when both are finite and in range.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.lat.filter(|v| v.is_finite() && (-90.0..=90.0).contains(v))?;
        let lon = self.lon.filter(|v| v.is_finite() && (-180.0..=180.0).contains(v))?;
        Some((lat, lon))
    }

    pub fn is_plottable(&self) -> bool {
        self.coordinates().is_some()
    }

    pub fn classification(&self) -> Behavior {
        self.behavior
            .as_deref()
            .map(Behavior::classify)
            .unwrap_or(Behavior::Unknown)
    }

    pub fn behavior_info(&self) -> BehaviorInfo {
        BehaviorInfo::for_label(self.behavior.as_deref().unwrap_or(""))
    }

    /// Parses the wire timestamp. Offset-less ISO-8601 values are taken as UTC.
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?.trim();
        if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
            return Some(time.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    Transiting,
    Searching,
    Foraging,
    Unknown,
}

impl Behavior {
    /// Unrecognized labels fall back to `Unknown`.
    pub fn classify(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "transitando" | "transiting" => Behavior::Transiting,
            "busca" | "searching" => Behavior::Searching,
            "forrageando" | "foraging" => Behavior::Foraging,
            _ => Behavior::Unknown,
        }
    }

    /// Strict lookup for filter input; `unknown` must be named explicitly.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "unknown" | "desconhecido" => Some(Behavior::Unknown),
            other => match Behavior::classify(other) {
                Behavior::Unknown => None,
                known => Some(known),
            },
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Behavior::Transiting => "Transiting",
            Behavior::Searching => "Searching",
            Behavior::Foraging => "Foraging",
            Behavior::Unknown => "Unknown",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Behavior::Transiting => "#3B82F6",
            Behavior::Searching => "#F59E0B",
            Behavior::Foraging => "#10B981",
            Behavior::Unknown => "#6B7280",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Behavior::Transiting | Behavior::Unknown => "Activity",
            Behavior::Searching => "Waves",
            Behavior::Foraging => "Fish",
        }
    }
}

/// Legend entry for a behavior label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorInfo {
    pub behavior: Behavior,
    pub label: String,
    pub translated_label: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
}

impl BehaviorInfo {
    pub fn for_label(label: &str) -> Self {
        let behavior = Behavior::classify(label);
        Self {
            behavior,
            label: label.to_string(),
            translated_label: behavior.display_name(),
            color: behavior.color(),
            icon: behavior.icon(),
        }
    }
}
