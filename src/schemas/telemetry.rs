use std::fs::File;
use std::io::{BufReader, Error, ErrorKind};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Locations probed, in order, when no explicit data path is configured.
pub const TELEMETRY_CANDIDATE_PATHS: [&str; 6] = [
    "api/sample_telemetry.json",
    "sample_telemetry.json",
    "../sample_telemetry.json",
    "/var/task/api/sample_telemetry.json",
    "/var/task/sample_telemetry.json",
    "/tmp/sample_telemetry.json",
];

/// One observation reported by a region.
///
/// Every field is optional on the wire: field presence is checked by the
/// aggregation itself so that a broken record fails the region it belongs
/// to instead of the whole file.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TelemetryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl TelemetryRecord {
    pub fn new(region: &str, latency_ms: f64, uptime: f64) -> Self {
        Self {
            region: Some(region.to_string()),
            latency_ms: Some(latency_ms),
            uptime: Some(uptime),
            timestamp: None,
        }
    }

    pub fn belongs_to(&self, region: &str) -> bool {
        self.region.as_deref() == Some(region)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct RegionMetrics {
    pub avg_latency: f64,
    pub p95_latency: f64,
    pub avg_uptime: f64,
    pub breaches: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MetricsRequest {
    pub regions: Vec<String>,
    pub threshold_ms: f64,
}

/// Per-region metrics, kept in the order the regions were requested.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricsReport {
    entries: Vec<(String, RegionMetrics)>,
}

impl MetricsReport {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Returns false and keeps the first value when the region is already present.
    pub fn insert(&mut self, region: &str, metrics: RegionMetrics) -> bool {
        if self.contains(region) {
            return false;
        }

        self.entries.push((region.to_string(), metrics));
        true
    }

    pub fn contains(&self, region: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == region)
    }

    pub fn get(&self, region: &str) -> Option<&RegionMetrics> {
        self.entries
            .iter()
            .find(|(name, _)| name == region)
            .map(|(_, metrics)| metrics)
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for MetricsReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;

        for (region, metrics) in &self.entries {
            map.serialize_entry(region, metrics)?;
        }

        map.end()
    }
}

/// Picks the data file: the explicit path when given, otherwise the first
/// candidate that exists on disk.
pub fn resolve_telemetry_path(explicit: Option<&str>) -> Result<Option<PathBuf>, Error> {
    resolve_telemetry_path_from(explicit, &TELEMETRY_CANDIDATE_PATHS)
}

pub fn resolve_telemetry_path_from(
    explicit: Option<&str>,
    candidates: &[&str],
) -> Result<Option<PathBuf>, Error> {
    if let Some(path) = explicit {
        let path = PathBuf::from(path);

        if !path.exists() {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("Telemetry data file {} does not exist", path.display()),
            ));
        }

        return Ok(Some(path));
    }

    Ok(candidates
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists()))
}

pub fn load_telemetry(path: &Path) -> Result<Vec<TelemetryRecord>, Error> {
    let file = File::open(path).map_err(|error| {
        Error::new(
            error.kind(),
            format!("Failed to open {}: {}", path.display(), error),
        )
    })?;
    let records: Vec<TelemetryRecord> =
        serde_json::from_reader(BufReader::new(file)).map_err(|error| {
            Error::new(
                ErrorKind::InvalidData,
                format!("Failed to parse {}: {}", path.display(), error),
            )
        })?;

    info!("Loaded {} telemetry records from {}", records.len(), path.display());
    Ok(records)
}

/// Loads the record set, treating "no data file anywhere" as an empty set.
pub fn load_telemetry_data(explicit: Option<&str>) -> Result<Vec<TelemetryRecord>, Error> {
    load_telemetry_data_from(explicit, &TELEMETRY_CANDIDATE_PATHS)
}

pub fn load_telemetry_data_from(
    explicit: Option<&str>,
    candidates: &[&str],
) -> Result<Vec<TelemetryRecord>, Error> {
    match resolve_telemetry_path_from(explicit, candidates)? {
        Some(path) => load_telemetry(&path),
        None => {
            debug!("No telemetry data file found, starting with an empty record set");
            Ok(Vec::new())
        }
    }
}
