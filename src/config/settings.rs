use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use crate::utils::{BotError, BotResult};

/// Configuration settings for the bot detection service
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server configuration
    pub server: ServerConfig,
    /// Classification rules and traffic tracking
    pub detection: DetectionConfig,
    /// Signal source configuration
    pub lookups: LookupConfig,
    /// Metrics exporter configuration
    pub metrics: MetricsConfig,
}

/// Server configuration settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind the server to
    pub host: String,
    /// Port number to listen on
    pub port: u16,
    /// Upper bound on the time spent serving one request
    pub request_timeout_seconds: u64,
}

/// Classification rules and traffic tracking settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Requests allowed inside one window before traffic is excessive
    pub request_threshold: usize,
    /// Sliding window length in seconds
    pub window_seconds: u64,
    /// Seconds an identity may stay idle past its window before eviction
    pub idle_retention_seconds: u64,
    /// Upper bound on the number of tracked identities
    pub max_tracked_clients: usize,
    /// Opportunistic sweep cadence, in recorded requests
    pub sweep_every: u64,
    /// Background sweep period in seconds
    pub sweep_interval_seconds: u64,
    /// Patterns searched for in the lowercased user-agent
    pub bot_user_agent_patterns: Vec<String>,
    /// Network owner substrings that flag a hosting/scraper network
    pub scraper_isp_denylist: Vec<String>,
}

/// Signal source settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Per-lookup timeout in milliseconds
    pub timeout_millis: u64,
    /// RDAP bootstrap base URL; empty disables the network owner signal
    pub rdap_base_url: String,
    /// Path to a GeoLite2-Country database; empty disables the country signal
    pub geoip_database_path: String,
}

/// Metrics exporter settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus scrape listener, e.g. `0.0.0.0:9000`; unset disables it
    pub listen_address: Option<String>,
}

/// User-agent patterns flagged by default
pub const DEFAULT_BOT_PATTERNS: [&str; 4] = ["bot", "scraper", "crawl", "spider"];

/// Hosting and scraping operators flagged by default
pub const DEFAULT_SCRAPER_ISPS: [&str; 22] = [
    "Microsoft Corporation",
    "Netcraft",
    "DigitalOcean",
    "Amazon Technologies Inc.",
    "Google LLC",
    "Linode, LLC",
    "OVH SAS",
    "Hetzner Online GmbH",
    "Alibaba",
    "Oracle Corporation",
    "SoftLayer Technologies",
    "Fastly",
    "Cloudflare",
    "Akamai Technologies",
    "Hurricane Electric",
    "Hostwinds",
    "Choopa",
    "Contabo GmbH",
    "Leaseweb",
    "Scaleway",
    "Vultr",
    "Ubiquity",
];

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_seconds: 10,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            request_threshold: 10,
            window_seconds: 30,
            idle_retention_seconds: 300,
            max_tracked_clients: 100_000,
            sweep_every: 1000,
            sweep_interval_seconds: 60,
            bot_user_agent_patterns: DEFAULT_BOT_PATTERNS.iter().map(|p| p.to_string()).collect(),
            scraper_isp_denylist: DEFAULT_SCRAPER_ISPS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            timeout_millis: 1500,
            rdap_base_url: "https://rdap.org".to_string(),
            geoip_database_path: "static/GeoLite2-Country.mmdb".to_string(),
        }
    }
}

impl DetectionConfig {
    /// Sliding window length
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    /// Idle time past the window after which an identity is dropped
    pub fn idle_retention(&self) -> Duration {
        Duration::from_secs(self.idle_retention_seconds)
    }

    /// Background sweep period
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

impl LookupConfig {
    /// Per-lookup timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }
}

impl Settings {
    /// Load configuration from an optional config file, `.env` and `APP_*` variables
    pub fn load() -> BotResult<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("detection.bot_user_agent_patterns")
                    .with_list_parse_key("detection.scraper_isp_denylist")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that would make the classifier meaningless
    pub fn validate(&self) -> BotResult<()> {
        let detection = &self.detection;
        if detection.request_threshold == 0 {
            return Err(invalid("detection.request_threshold", "must be at least 1"));
        }
        if detection.window_seconds == 0 {
            return Err(invalid("detection.window_seconds", "must be at least 1"));
        }
        if detection.max_tracked_clients == 0 {
            return Err(invalid("detection.max_tracked_clients", "must be at least 1"));
        }
        if detection.sweep_interval_seconds == 0 {
            return Err(invalid("detection.sweep_interval_seconds", "must be at least 1"));
        }
        if detection.bot_user_agent_patterns.iter().any(|p| p.is_empty()) {
            return Err(invalid("detection.bot_user_agent_patterns", "contains an empty pattern"));
        }
        // An empty entry would be contained in every owner name.
        if detection.scraper_isp_denylist.iter().any(|e| e.is_empty()) {
            return Err(invalid("detection.scraper_isp_denylist", "contains an empty entry"));
        }
        if self.lookups.timeout_millis == 0 {
            return Err(invalid("lookups.timeout_millis", "must be at least 1"));
        }
        if let Some(addr) = &self.metrics.listen_address {
            addr.parse::<SocketAddr>()
                .map_err(|e| invalid("metrics.listen_address", &e.to_string()))?;
        }
        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> BotResult<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| invalid("server.host", &e.to_string()))
    }
}

fn invalid(key: &'static str, reason: &str) -> BotError {
    BotError::InvalidSetting {
        key,
        reason: reason.to_string(),
    }
}
