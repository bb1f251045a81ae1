//! Bot detection service.
//!
//! Classifies an inbound request as automated or human by OR-ing three
//! weak signals: a user-agent pattern match, a denylisted network owner,
//! and excessive traffic from the client over a sliding window. A country
//! is resolved alongside for the caller. Signal sources that fail or time
//! out never fail the classification.

pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod service;
pub mod signals;
pub mod utils;

pub use crate::core::{Classifier, ClientIdentity, SignalBreakdown, TrafficTracker, Verdict};
pub use crate::service::BotDetectionService;
