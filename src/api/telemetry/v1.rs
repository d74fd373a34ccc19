use std::sync::Arc;

use actix_web::web::{Bytes, Data};
use actix_web::{HttpResponse, Result};

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use regionstats::algorithm::{summarize, TelemetryError};
use regionstats::schemas::MetricsRequest;

use crate::api::{AppState, ErrorResponse};

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
struct MetricsPayload {
    #[serde(default)]
    regions: Option<Vec<String>>,

    #[serde(default)]
    threshold_ms: Option<f64>,
}

impl MetricsPayload {
    fn into_request(self) -> Option<MetricsRequest> {
        Some(MetricsRequest {
            regions: self.regions?,
            threshold_ms: self.threshold_ms?,
        })
    }
}

pub async fn get_metrics_of_regions(
    appstate: Data<Arc<AppState>>,
    body: Bytes,
) -> Result<HttpResponse> {
    let request = match serde_json::from_slice::<MetricsPayload>(&body) {
        Ok(payload) => payload.into_request(),
        Err(error) => {
            warn!("Invalid metrics payload: {}", error);
            None
        }
    };
    let request = match request {
        Some(request) => request,
        None => {
            return Ok(HttpResponse::BadRequest()
                .json(ErrorResponse::new("Missing regions or threshold_ms")));
        }
    };

    let records = appstate.snapshot();

    match summarize(&records, &request) {
        Ok(report) => {
            if report.is_empty() {
                warn!("Metrics requested without any region");
            } else {
                debug!("Computed metrics of {} regions", report.len());
            }

            Ok(HttpResponse::Ok().json(report))
        }
        Err(TelemetryError::NoDataAvailable) => {
            error!("Metrics requested but no telemetry data is loaded");
            Ok(HttpResponse::InternalServerError()
                .json(ErrorResponse::new(TelemetryError::NoDataAvailable.to_string())))
        }
        Err(error) => {
            error!("Failed to compute metrics: {}", error);
            Ok(HttpResponse::InternalServerError().json(ErrorResponse::new(error.to_string())))
        }
    }
}
