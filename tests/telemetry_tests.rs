use rstest::rstest;

use regionstats::algorithm::{aggregate, percentile, summarize, TelemetryError};
use regionstats::schemas::{MetricsRequest, RegionMetrics, TelemetryRecord};

fn fleet() -> Vec<TelemetryRecord> {
    serde_json::from_str(
        r#"[
            {"region": "us-east", "latency_ms": 120.5, "uptime": 0.999, "timestamp": "2024-05-01T10:00:00Z"},
            {"region": "us-east", "latency_ms": 180.0, "uptime": 0.995, "timestamp": "2024-05-01T10:01:00Z"},
            {"region": "us-east", "latency_ms": 95.25, "uptime": 1.0, "timestamp": "2024-05-01T10:02:00Z"},
            {"region": "us-east", "latency_ms": 240.0, "uptime": 0.97, "timestamp": "2024-05-01T10:03:00Z"},
            {"region": "eu-west", "latency_ms": 60.0, "uptime": 1.0, "timestamp": "2024-05-01T10:00:00Z"},
            {"region": "eu-west", "latency_ms": 75.0, "uptime": 0.99, "timestamp": "2024-05-01T10:01:00Z"}
        ]"#,
    )
    .unwrap()
}

#[rstest]
#[case(vec![10.0, 20.0, 30.0, 40.0], 50.0, 25.0)]
#[case(vec![10.0, 20.0, 30.0, 40.0], 0.0, 10.0)]
#[case(vec![10.0, 20.0, 30.0, 40.0], 100.0, 40.0)]
#[case(vec![7.0], 95.0, 7.0)]
#[case(vec![], 95.0, 0.0)]
fn percentile_cases(#[case] values: Vec<f64>, #[case] p: f64, #[case] expected: f64) {
    assert_eq!(percentile(&values, p), expected);
}

#[test]
fn fleet_summary() {
    let records = fleet();
    let request = MetricsRequest {
        regions: vec!["us-east".to_string(), "eu-west".to_string()],
        threshold_ms: 180.0,
    };

    let report = summarize(&records, &request).unwrap();
    let us = report.get("us-east").unwrap();
    let eu = report.get("eu-west").unwrap();

    // (120.5 + 180 + 95.25 + 240) / 4 = 158.9375
    assert_eq!(us.avg_latency, 158.94);
    // sorted [95.25, 120.5, 180, 240], index 2.85 -> 180 + 0.85 * 60
    assert_eq!(us.p95_latency, 231.0);
    assert_eq!(us.avg_uptime, 0.991);
    // 180.0 equals the threshold and is not a breach
    assert_eq!(us.breaches, 1);

    assert_eq!(eu.avg_latency, 67.5);
    assert_eq!(eu.breaches, 0);
    assert_eq!(eu.avg_uptime, 0.995);
}

#[test]
fn unknown_region_is_not_an_error() {
    assert_eq!(
        aggregate(&fleet(), "ap-south", 100.0),
        Ok(RegionMetrics::default())
    );
}

#[test]
fn empty_record_set_has_no_data() {
    let request = MetricsRequest {
        regions: vec!["us-east".to_string()],
        threshold_ms: 100.0,
    };

    assert_eq!(summarize(&[], &request), Err(TelemetryError::NoDataAvailable));
}

#[test]
fn record_without_uptime_fails_only_its_region() {
    let mut records = fleet();
    records.push(serde_json::from_str(r#"{"region": "eu-west", "latency_ms": 80.0}"#).unwrap());

    let request = MetricsRequest {
        regions: vec!["us-east".to_string(), "eu-west".to_string()],
        threshold_ms: 100.0,
    };

    assert!(aggregate(&records, "us-east", 100.0).is_ok());
    assert_eq!(
        summarize(&records, &request),
        Err(TelemetryError::MalformedRecord {
            region: "eu-west".to_string(),
            index: 6,
            field: "uptime",
        })
    );
}
