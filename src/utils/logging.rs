use std::env;
use tracing_subscriber::{
    fmt::{format::FmtSpan, time::ChronoLocal},
    EnvFilter,
};

use super::error::BotResult;

/// Initialize the logging system with the specified log level
pub fn init_logging() -> BotResult<()> {
    // Get the log level from environment variable or default to INFO
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_level(true)
        .with_timer(ChronoLocal::rfc_3339())
        .pretty()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Create a new span for tracking request context
pub fn create_request_span(request_id: &str) -> tracing::Span {
    tracing::info_span!(
        "request",
        request_id = %request_id,
        timestamp = %chrono::Utc::now()
    )
}

/// Log the outcome of one classification
pub fn log_classification(ip: &str, is_bot: bool, user_agent: bool, owner: bool, traffic: bool) {
    if is_bot {
        tracing::info!(
            ip = %ip,
            bot_user_agent = user_agent,
            scraper_isp = owner,
            suspicious_traffic = traffic,
            event = "bot_detected"
        );
    } else {
        tracing::debug!(ip = %ip, event = "classified_human");
    }
}

/// Log a startup or shutdown lifecycle event
pub fn log_service_event(event_type: &str, success: bool, details: Option<&str>) {
    if success {
        tracing::info!(
            event_type = %event_type,
            details = ?details,
            timestamp = %chrono::Utc::now()
        );
    } else {
        tracing::error!(
            event_type = %event_type,
            details = ?details,
            timestamp = %chrono::Utc::now()
        );
    }
}

/// Log a signal source that could not produce a value
pub fn log_signal_unavailable(signal: &str, ip: &str, reason: &dyn std::fmt::Display) {
    tracing::warn!(
        signal = %signal,
        ip = %ip,
        reason = %reason,
        event = "signal_unavailable"
    );
}

/// Log an identity crossing its request budget
pub fn log_excessive_traffic(ip: &str, request_count: usize, threshold: usize) {
    tracing::warn!(
        ip = %ip,
        request_count = %request_count,
        threshold = %threshold,
        event = "excessive_traffic",
        timestamp = %chrono::Utc::now()
    );
}

/// Log a tracker sweep
pub fn log_tracker_sweep(removed: usize, remaining: usize) {
    tracing::debug!(
        removed = %removed,
        remaining = %remaining,
        event = "tracker_sweep"
    );
}
