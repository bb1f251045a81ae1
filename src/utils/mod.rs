//! Utility modules for the bot detection service.
//! This module contains common utilities used across the application.

mod logging;
mod error;

pub use logging::{
    init_logging,
    create_request_span,
    log_classification,
    log_signal_unavailable,
    log_excessive_traffic,
    log_tracker_sweep,
    log_service_event,
};

pub use error::{BotError, BotResult, SignalError, SignalResult};
