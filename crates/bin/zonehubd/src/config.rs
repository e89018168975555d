//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `zonehub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;
use zonehub_adapter_virtual::demo::DemoOptions;
use zonehub_domain::alert::AlertLevel;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Alert routing.
    pub alerts: AlertsConfig,
    /// Periodic jobs.
    pub scheduler: SchedulerConfig,
    /// Inbound item-change feed.
    pub feed: FeedConfig,
    /// Demo layout toggle.
    pub demo: DemoConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// Owner alerts below this level are dropped.
    pub owner_min_level: AlertLevel,
    /// Whether the admin channel is wired.
    pub admin_enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// How often the inactive-device check runs.
    pub inactive_device_check_hours: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Read `item value` lines from stdin.
    pub stdin: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Build the virtual demo home.
    pub enabled: bool,
}

impl Config {
    /// Load configuration from `zonehub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("zonehub.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ZONEHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = env_flag("ZONEHUB_DEMO") {
            self.demo.enabled = val;
        }
        if let Some(val) = env_flag("ZONEHUB_STDIN_FEED") {
            self.feed.stdin = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.inactive_device_check_hours == 0 {
            return Err(ConfigError::Validation(
                "inactive_device_check_hours must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Options for the demo layout derived from this configuration.
    #[must_use]
    pub fn demo_options(&self) -> DemoOptions {
        DemoOptions {
            inactive_check_every: Duration::from_secs(
                self.scheduler.inactive_device_check_hours * 3600,
            ),
            ..DemoOptions::default()
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    parse_flag(&std::env::var(name).ok()?)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "zonehubd=info,zonehub=info".to_string(),
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            owner_min_level: AlertLevel::Warning,
            admin_enabled: true,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            inactive_device_check_hours: 12,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { stdin: true }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
