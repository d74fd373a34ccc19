use std::io::{Error, ErrorKind};

use log::info;

use regionstats::algorithm::summarize;
use regionstats::schemas::{load_telemetry_data, MetricsRequest};

pub fn run(data: Option<&str>, regions: Vec<String>, threshold_ms: f64) -> std::io::Result<()> {
    let records = load_telemetry_data(data)?;
    let request = MetricsRequest {
        regions,
        threshold_ms,
    };

    info!(
        "Summarize {} regions from {} records",
        request.regions.len(),
        records.len()
    );

    let report = summarize(&records, &request)
        .map_err(|error| Error::new(ErrorKind::InvalidData, error.to_string()))?;
    let json = serde_json::to_string_pretty(&report)
        .map_err(|error| Error::new(ErrorKind::Other, error.to_string()))?;

    println!("{}", json);
    Ok(())
}
