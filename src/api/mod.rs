use std::io::{Error, ErrorKind, Result as AppStateResult};
use std::sync::Arc;

use actix_web::http::Method;
use actix_web::middleware::DefaultHeaders;
use actix_web::web::Data;
use actix_web::{HttpRequest, HttpResponse, Result as HttpResult};
use actix_web_prometheus::{PrometheusMetrics, PrometheusMetricsBuilder};

use log::{error, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use regionstats::schemas::{load_telemetry_data, TelemetryRecord};

pub mod telemetry;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct Status {
    message: String,
    records: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct Reloaded {
    records: usize,
}

pub struct AppState {
    // @NOTE: monitoring
    prometheus: PrometheusMetrics,

    // @NOTE: data source
    source: Option<String>,
    records: RwLock<Arc<Vec<TelemetryRecord>>>,
}

impl AppState {
    pub fn new() -> AppStateResult<AppState> {
        let source = std::env::var("TELEMETRY_DATA_PATH").ok();
        let records = load_telemetry_data(source.as_deref())?;

        Self::from_records(records, source)
    }

    pub fn from_records(
        records: Vec<TelemetryRecord>,
        source: Option<String>,
    ) -> AppStateResult<AppState> {
        let prometheus = PrometheusMetricsBuilder::new("api")
            .endpoint("/metrics")
            .build()
            .map_err(|e| {
                Error::new(
                    ErrorKind::Other,
                    format!("Failed to build prometheus metrics: {:?}", e),
                )
            })?;

        Ok(AppState {
            prometheus,
            source,
            records: RwLock::new(Arc::new(records)),
        })
    }

    pub fn prometheus(&self) -> &PrometheusMetrics {
        &self.prometheus
    }

    /// Immutable view of the records; a concurrent reload does not affect it.
    pub fn snapshot(&self) -> Arc<Vec<TelemetryRecord>> {
        self.records.read().clone()
    }

    pub fn reload(&self) -> AppStateResult<usize> {
        let records = Arc::new(load_telemetry_data(self.source.as_deref())?);
        let count = records.len();

        *self.records.write() = records;
        Ok(count)
    }
}

pub fn cors() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "GET, POST, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "Content-Type"))
}

pub async fn health(appstate: Data<Arc<AppState>>) -> HttpResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(Status {
        message: "eShop Telemetry API is running".to_string(),
        records: appstate.snapshot().len(),
    }))
}

pub async fn reload(appstate: Data<Arc<AppState>>) -> HttpResult<HttpResponse> {
    match appstate.reload() {
        Ok(records) => {
            info!("Reloaded {} telemetry records", records);
            Ok(HttpResponse::Ok().json(Reloaded { records }))
        }
        Err(error) => {
            error!("Failed to reload telemetry data: {}", error);
            Ok(HttpResponse::InternalServerError().json(ErrorResponse::new(format!(
                "Failed to reload telemetry data: {}",
                error
            ))))
        }
    }
}

/// Answers preflight requests and rejects other methods on a known path.
pub async fn not_allowed(req: HttpRequest) -> HttpResult<HttpResponse> {
    if req.method() == Method::OPTIONS {
        Ok(HttpResponse::Ok().finish())
    } else {
        Ok(HttpResponse::MethodNotAllowed().json(ErrorResponse::new("Method not allowed")))
    }
}

pub async fn not_found(req: HttpRequest) -> HttpResult<HttpResponse> {
    if req.method() == Method::OPTIONS {
        Ok(HttpResponse::Ok().finish())
    } else {
        Ok(HttpResponse::NotFound().json(ErrorResponse::new("Not found")))
    }
}
