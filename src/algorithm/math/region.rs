use std::fmt;

use log::debug;

use crate::schemas::{MetricsReport, MetricsRequest, RegionMetrics, TelemetryRecord};

use super::percentile;

pub const LATENCY_PERCENTILE: f64 = 95.0;

#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryError {
    /// The whole record set is empty, nothing was ingested upstream.
    NoDataAvailable,

    /// A record of the requested region lacks a numeric field.
    MalformedRecord {
        region: String,
        index: usize,
        field: &'static str,
    },
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TelemetryError::NoDataAvailable => write!(f, "No telemetry data available"),
            TelemetryError::MalformedRecord {
                region,
                index,
                field,
            } => write!(
                f,
                "Record #{} of region '{}' is missing '{}'",
                index, region, field
            ),
        }
    }
}

impl std::error::Error for TelemetryError {}

fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);

    (value * scale).round_ties_even() / scale
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Summary statistics of one region.
///
/// A region without any record yields zeroed metrics; a matching record
/// without `latency_ms` or `uptime` fails the region.
pub fn aggregate(
    records: &[TelemetryRecord],
    region: &str,
    threshold_ms: f64,
) -> Result<RegionMetrics, TelemetryError> {
    let mut latencies = Vec::new();
    let mut uptimes = Vec::new();

    for (index, record) in records.iter().enumerate() {
        if !record.belongs_to(region) {
            continue;
        }

        let malformed = |field| TelemetryError::MalformedRecord {
            region: region.to_string(),
            index,
            field,
        };

        latencies.push(record.latency_ms.ok_or_else(|| malformed("latency_ms"))?);
        uptimes.push(record.uptime.ok_or_else(|| malformed("uptime"))?);
    }

    if latencies.is_empty() {
        return Ok(RegionMetrics::default());
    }

    Ok(RegionMetrics {
        avg_latency: round_to(mean(&latencies), 2),
        p95_latency: round_to(percentile(&latencies, LATENCY_PERCENTILE), 2),
        avg_uptime: round_to(mean(&uptimes), 4),
        breaches: latencies
            .iter()
            .filter(|latency| **latency > threshold_ms)
            .count(),
    })
}

/// Metrics of every requested region, in request order.
pub fn summarize(
    records: &[TelemetryRecord],
    request: &MetricsRequest,
) -> Result<MetricsReport, TelemetryError> {
    if records.is_empty() {
        return Err(TelemetryError::NoDataAvailable);
    }

    debug!(
        "Summarize {} regions over {} records with threshold {}ms",
        request.regions.len(),
        records.len(),
        request.threshold_ms
    );

    let mut report = MetricsReport::with_capacity(request.regions.len());

    for region in &request.regions {
        if report.contains(region) {
            continue;
        }

        report.insert(region, aggregate(records, region, request.threshold_ms)?);
    }

    Ok(report)
}
