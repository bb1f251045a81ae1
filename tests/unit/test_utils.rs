use async_trait::async_trait;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bot_detection_service::config::{DEFAULT_BOT_PATTERNS, DEFAULT_SCRAPER_ISPS};
use bot_detection_service::core::{
    Classifier, OwnerDenylist, TrafficConfig, TrafficTracker, UserAgentRule,
};
use bot_detection_service::signals::{CountryLookup, NetworkOwnerLookup};
use bot_detection_service::utils::{SignalError, SignalResult};

/// Generate a random IP address for testing
pub fn random_ip() -> String {
    format!(
        "{}.{}.{}.{}",
        rand::random::<u8>(),
        rand::random::<u8>(),
        rand::random::<u8>(),
        rand::random::<u8>()
    )
}

/// Lookup that always answers with the same value
pub struct FixedLookup(pub &'static str);

#[async_trait]
impl NetworkOwnerLookup for FixedLookup {
    async fn resolve(&self, _ip: IpAddr) -> SignalResult<String> {
        Ok(self.0.to_string())
    }
}

#[async_trait]
impl CountryLookup for FixedLookup {
    async fn resolve(&self, _ip: IpAddr) -> SignalResult<String> {
        Ok(self.0.to_string())
    }
}

/// Lookup that always fails
pub struct FailingLookup;

#[async_trait]
impl NetworkOwnerLookup for FailingLookup {
    async fn resolve(&self, _ip: IpAddr) -> SignalResult<String> {
        Err(SignalError::Lookup("registry unavailable".to_string()))
    }
}

#[async_trait]
impl CountryLookup for FailingLookup {
    async fn resolve(&self, _ip: IpAddr) -> SignalResult<String> {
        Err(SignalError::Lookup("database unavailable".to_string()))
    }
}

/// Lookup that never answers within any reasonable timeout
pub struct HangingLookup {
    pub calls: AtomicUsize,
}

impl HangingLookup {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    async fn hang(&self) -> SignalResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("too late".to_string())
    }
}

#[async_trait]
impl NetworkOwnerLookup for HangingLookup {
    async fn resolve(&self, _ip: IpAddr) -> SignalResult<String> {
        self.hang().await
    }
}

#[async_trait]
impl CountryLookup for HangingLookup {
    async fn resolve(&self, _ip: IpAddr) -> SignalResult<String> {
        self.hang().await
    }
}

/// Classifier with default rules and a 10-per-30s tracker
pub fn classifier_with(
    owner: Arc<dyn NetworkOwnerLookup>,
    country: Arc<dyn CountryLookup>,
) -> Classifier {
    Classifier::new(
        UserAgentRule::new(DEFAULT_BOT_PATTERNS).unwrap(),
        OwnerDenylist::new(DEFAULT_SCRAPER_ISPS),
        Arc::new(TrafficTracker::new(TrafficConfig::default())),
        owner,
        country,
        Duration::from_millis(100),
    )
}
