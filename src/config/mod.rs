//! Configuration management for the bot detection service.
//! This module handles loading and managing configuration settings
//! from environment variables and configuration files.

mod settings;

pub use settings::{
    DetectionConfig, LookupConfig, MetricsConfig, ServerConfig, Settings, DEFAULT_BOT_PATTERNS,
    DEFAULT_SCRAPER_ISPS,
};

/// Load the application configuration
pub fn load_config() -> crate::utils::BotResult<Settings> {
    Settings::load()
}
