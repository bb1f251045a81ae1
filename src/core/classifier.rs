use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::clock::{Clock, SystemClock};
use super::identity::ClientIdentity;
use super::rules::{OwnerDenylist, UserAgentRule};
use super::traffic_tracker::TrafficTracker;
use super::verdict::{SignalBreakdown, Verdict, UNKNOWN_COUNTRY};
use crate::signals::{CountryLookup, NetworkOwnerLookup};
use crate::utils::{log_classification, log_signal_unavailable, SignalError, SignalResult};

/// Combines the user-agent rule, owner denylist, traffic tracker and the
/// two lookups into one verdict.
///
/// Lookups are fail-open: a failed or timed out lookup contributes `false`
/// (owner) or [`UNKNOWN_COUNTRY`] (country) and never fails the evaluation.
pub struct Classifier {
    user_agent_rule: UserAgentRule,
    owner_denylist: OwnerDenylist,
    tracker: Arc<TrafficTracker>,
    network_owner: Arc<dyn NetworkOwnerLookup>,
    country: Arc<dyn CountryLookup>,
    lookup_timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl Classifier {
    pub fn new(
        user_agent_rule: UserAgentRule,
        owner_denylist: OwnerDenylist,
        tracker: Arc<TrafficTracker>,
        network_owner: Arc<dyn NetworkOwnerLookup>,
        country: Arc<dyn CountryLookup>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            user_agent_rule,
            owner_denylist,
            tracker,
            network_owner,
            country,
            lookup_timeout,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source used by [`Classifier::classify`]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Current time according to the injected clock
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn tracker(&self) -> &Arc<TrafficTracker> {
        &self.tracker
    }

    /// Classify a request at the current time
    pub async fn classify(&self, user_agent: &str, ip: &str) -> Verdict {
        let now = self.clock.now();
        self.evaluate(user_agent, ip, now).await
    }

    /// Classify a request observed at `now`
    pub async fn evaluate(&self, user_agent: &str, ip: &str, now: Instant) -> Verdict {
        let identity = ClientIdentity::new(ip);

        let user_agent_matched = self.user_agent_rule.matches(user_agent);
        let traffic_excessive = self.tracker.record(&identity, now);

        let (owner, country) = futures::future::join(
            self.lookup(self.resolve_owner(&identity)),
            self.lookup(self.resolve_country(&identity)),
        )
        .await;

        let network_owner_flagged = match owner {
            Ok(name) => self.owner_denylist.is_flagged(&name),
            Err(e) => {
                signal_unavailable("network_owner", &identity, &e);
                false
            }
        };

        let country = country.unwrap_or_else(|e| {
            signal_unavailable("country", &identity, &e);
            UNKNOWN_COUNTRY.to_string()
        });

        let verdict = Verdict::new(
            SignalBreakdown {
                user_agent_matched,
                network_owner_flagged,
                traffic_excessive,
            },
            country,
        );

        log_classification(
            identity.as_str(),
            verdict.is_bot(),
            user_agent_matched,
            network_owner_flagged,
            traffic_excessive,
        );
        metrics::increment_counter!("bot_detection_requests_total");
        metrics::increment_counter!(
            "bot_detection_verdicts_total",
            "is_bot" => if verdict.is_bot() { "true" } else { "false" }
        );

        verdict
    }

    async fn resolve_owner(&self, identity: &ClientIdentity) -> SignalResult<String> {
        let ip = address_of(identity)?;
        self.network_owner.resolve(ip).await
    }

    async fn resolve_country(&self, identity: &ClientIdentity) -> SignalResult<String> {
        let ip = address_of(identity)?;
        self.country.resolve(ip).await
    }

    async fn lookup<F>(&self, resolve: F) -> SignalResult<String>
    where
        F: Future<Output = SignalResult<String>>,
    {
        tokio::time::timeout(self.lookup_timeout, resolve)
            .await
            .unwrap_or(Err(SignalError::Timeout(self.lookup_timeout)))
    }
}

fn address_of(identity: &ClientIdentity) -> SignalResult<std::net::IpAddr> {
    identity
        .ip()
        .ok_or_else(|| SignalError::InvalidAddress(identity.to_string()))
}

fn signal_unavailable(signal: &'static str, identity: &ClientIdentity, error: &SignalError) {
    // Unconfigured sources and non-IP identities are expected, not worth a warning.
    match error {
        SignalError::Disabled | SignalError::InvalidAddress(_) | SignalError::NotFound(_) => {
            tracing::debug!(signal, ip = %identity, reason = %error, event = "signal_unavailable")
        }
        _ => log_signal_unavailable(signal, identity.as_str(), error),
    }
    metrics::increment_counter!("bot_detection_signal_unavailable_total", "signal" => signal);
}
