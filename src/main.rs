use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

use bot_detection_service::api;
use bot_detection_service::config::{MetricsConfig, Settings};
use bot_detection_service::service::BotDetectionService;
use bot_detection_service::utils::{init_logging, log_service_event, BotError, BotResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging().context("failed to initialize logging")?;
    tracing::info!("Starting bot detection service...");

    let settings = Settings::load().context("failed to load configuration")?;
    tracing::info!(
        host = %settings.server.host,
        port = %settings.server.port,
        request_threshold = settings.detection.request_threshold,
        window_seconds = settings.detection.window_seconds,
        "Configuration loaded"
    );

    install_metrics(&settings.metrics).context("failed to install metrics exporter")?;

    let service = BotDetectionService::from_settings(&settings)
        .context("failed to initialize classifier")?;
    let sweeper = service.spawn_sweeper();

    let addr = settings.bind_address()?;
    let app = api::router(
        service,
        Duration::from_secs(settings.server.request_timeout_seconds),
    );

    log_service_event("server_listening", true, Some(&addr.to_string()));
    axum::Server::try_bind(&addr)
        .with_context(|| format!("failed to bind {}", addr))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    sweeper.abort();
    log_service_event("server_stopped", true, None);
    Ok(())
}

fn install_metrics(config: &MetricsConfig) -> BotResult<()> {
    let Some(address) = &config.listen_address else {
        return Ok(());
    };
    let address: SocketAddr = address
        .parse()
        .map_err(|e: std::net::AddrParseError| BotError::Metrics(e.to_string()))?;

    PrometheusBuilder::new()
        .with_http_listener(address)
        .install()
        .map_err(|e| BotError::Metrics(e.to_string()))?;
    log_service_event("metrics_listening", true, Some(&address.to_string()));
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log_service_event("signal_handler_failed", false, Some(&e.to_string()));
    }
}
