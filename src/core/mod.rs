//! Core functionality for the bot detection service.
//! This module contains the classification pipeline: the matching rules,
//! the sliding-window traffic tracker and the classifier combining them.

mod classifier;
mod clock;
mod identity;
mod rules;
mod traffic_tracker;
mod verdict;

pub use classifier::Classifier;
pub use clock::{Clock, MockClock, SystemClock};
pub use identity::ClientIdentity;
pub use rules::{OwnerDenylist, UserAgentRule};
pub use traffic_tracker::{TrafficConfig, TrafficTracker};
pub use verdict::{SignalBreakdown, Verdict, UNKNOWN_COUNTRY};
