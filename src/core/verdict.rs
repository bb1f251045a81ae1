use serde::Serialize;

/// Country reported when geolocation is unavailable
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Per-signal breakdown of a verdict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SignalBreakdown {
    /// The user-agent matched a bot pattern
    #[serde(rename = "bot_user_agent")]
    pub user_agent_matched: bool,
    /// The network owner is on the scraper denylist
    #[serde(rename = "scraper_isp")]
    pub network_owner_flagged: bool,
    /// The identity exceeded its request budget
    #[serde(rename = "suspicious_traffic")]
    pub traffic_excessive: bool,
}

impl SignalBreakdown {
    /// Any single positive signal is sufficient
    pub fn any(&self) -> bool {
        self.user_agent_matched || self.network_owner_flagged || self.traffic_excessive
    }
}

/// Result of classifying one request
///
/// The final decision is derived from the breakdown at construction and
/// cannot be set independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    is_bot: bool,
    country: String,
    details: SignalBreakdown,
}

impl Verdict {
    pub fn new(details: SignalBreakdown, country: impl Into<String>) -> Self {
        Self {
            is_bot: details.any(),
            country: country.into(),
            details,
        }
    }

    pub fn is_bot(&self) -> bool {
        self.is_bot
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn details(&self) -> SignalBreakdown {
        self.details
    }
}
