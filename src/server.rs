use std::io::{Error, ErrorKind};
use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::web::{get, post, put, resource, scope, to, Data};
use actix_web::{App, HttpServer};

use tokio::signal::unix::{signal, SignalKind};

use chrono::Utc;
use log::{error, info};

use crate::api::{cors, health, not_allowed, not_found, reload, AppState};

pub async fn run() -> std::io::Result<()> {
    // @NOTE: server configuration
    let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("SERVER_PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse::<u16>()
        .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid SERVER_PORT"))?;
    let concurrent = std::env::var("SERVER_CONCURRENT")
        .unwrap_or_else(|_| "1".to_string())
        .parse::<usize>()
        .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid SERVER_CONCURRENT"))?;

    // @NOTE: store appstate
    let appstate = Arc::new(AppState::new()?);

    if appstate.snapshot().is_empty() {
        error!("No telemetry data loaded, metrics requests will fail until a reload succeeds");
    }

    // @NOTE: spawn new http server
    let server = HttpServer::new(move || {
        App::new()
            // @NOTE: monitoring
            .wrap(appstate.prometheus().clone())
            .wrap(Logger::default())
            .wrap(cors())
            // @NOTE: health-check
            .service(
                resource("/health")
                    .route(get().to(health))
                    .default_service(to(not_allowed)),
            )
            // @NOTE: APIs for configuration
            .service(
                scope("/api/config").service(
                    resource("/v1/telemetry/reload")
                        .route(put().to(reload))
                        .default_service(to(not_allowed)),
                ),
            )
            // @NOTE: APIs of telemetry
            .service(
                scope("/api/telemetry").service(
                    resource("/v1/metrics")
                        .route(post().to(crate::api::telemetry::get_metrics_of_regions))
                        .default_service(to(not_allowed)),
                ),
            )
            .default_service(to(not_found))
            // @NOTE: AppState
            .app_data(Data::new(appstate.clone()))
    })
    .workers(concurrent)
    .keep_alive(std::time::Duration::from_secs(100))
    .bind((host.as_str(), port))
    .map_err(|e| {
        Error::new(
            ErrorKind::AddrInUse,
            format!("Failed to bind to {}:{}: {}", host, port, e),
        )
    })?
    .shutdown_timeout(30)
    .run();

    let handler = server.handle();

    info!(
        "Server started at {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
    );

    // @NOTE: graceful shutdown
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    actix_rt::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {}
            _ = sigterm.recv() => {}
        }

        info!("Server is going to shutdown...");
        handler.stop(true).await;
    });

    server.await?;
    info!("Server is downed gracefully...");
    Ok(())
}
