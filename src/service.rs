use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::Settings;
use crate::core::{Classifier, OwnerDenylist, TrafficConfig, TrafficTracker, UserAgentRule, Verdict};
use crate::signals::{
    CountryLookup, DisabledLookup, MaxMindCountryLookup, NetworkOwnerLookup, RdapNetworkOwnerLookup,
};
use crate::utils::{log_service_event, BotResult};

/// Main bot detection service: owns the shared classifier and keeps the
/// traffic tracker bounded
#[derive(Clone)]
pub struct BotDetectionService {
    /// Classifier shared by every in-flight request
    classifier: Arc<Classifier>,
    /// Period of the background tracker sweep
    sweep_interval: Duration,
}

impl BotDetectionService {
    /// Creates a service around an already assembled classifier
    pub fn new(classifier: Arc<Classifier>, sweep_interval: Duration) -> Self {
        Self {
            classifier,
            sweep_interval,
        }
    }

    /// Builds the classifier and its signal sources from settings
    ///
    /// # Errors
    ///
    /// Fails when a pattern does not compile, the GeoIP database cannot be
    /// opened or the RDAP client cannot be built. Each of these would
    /// otherwise degrade every request.
    pub fn from_settings(settings: &Settings) -> BotResult<Self> {
        let detection = &settings.detection;
        let lookups = &settings.lookups;

        let network_owner: Arc<dyn NetworkOwnerLookup> = if lookups.rdap_base_url.is_empty() {
            log_service_event("network_owner_lookup_disabled", true, None);
            Arc::new(DisabledLookup)
        } else {
            Arc::new(RdapNetworkOwnerLookup::new(&lookups.rdap_base_url, lookups.timeout())?)
        };

        let country: Arc<dyn CountryLookup> = if lookups.geoip_database_path.is_empty() {
            log_service_event("country_lookup_disabled", true, None);
            Arc::new(DisabledLookup)
        } else {
            Arc::new(MaxMindCountryLookup::open(&lookups.geoip_database_path)?)
        };

        let classifier = Classifier::new(
            UserAgentRule::new(&detection.bot_user_agent_patterns)?,
            OwnerDenylist::new(detection.scraper_isp_denylist.iter().cloned()),
            Arc::new(TrafficTracker::new(TrafficConfig::from(detection))),
            network_owner,
            country,
            lookups.timeout(),
        );

        Ok(Self::new(Arc::new(classifier), detection.sweep_interval()))
    }

    /// Classifies one request
    pub async fn classify(&self, user_agent: &str, ip: &str) -> Verdict {
        self.classifier.classify(user_agent, ip).await
    }

    pub fn classifier(&self) -> &Arc<Classifier> {
        &self.classifier
    }

    /// Removes idle identities from the traffic tracker
    ///
    /// Returns the number of identities removed.
    pub fn cleanup_expired_states(&self) -> usize {
        self.classifier.tracker().sweep(self.classifier.now())
    }

    /// Runs [`BotDetectionService::cleanup_expired_states`] on a fixed period
    /// until the returned task is aborted
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(service.sweep_interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                service.cleanup_expired_states();
            }
        })
    }
}
