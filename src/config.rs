//! Configuration management for the equipment checkout client

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend origin, e.g. `http://localhost:1560`
    pub base_url: String,
    /// Bearer token forwarded on every request
    pub token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PollingConfig {
    pub catalog_interval_secs: u64,
    pub console_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CheckoutConfig {
    /// Loan length applied when a staged request is finalized
    pub duration_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotificationConfig {
    pub duration_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Write a daily rolling log file here in addition to stderr
    pub directory: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub checkout: CheckoutConfig,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `config/default` and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config/default")
    }

    /// Load configuration from files and environment variables
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Base file is optional, every field has a default
            .add_source(File::with_name(path).required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (e.g. CHECKOUT_POLLING__CONSOLE_INTERVAL_SECS)
            .add_source(
                Environment::with_prefix("CHECKOUT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("api.base_url", env::var("EQUIPMENT_API_URL").ok())?
            .set_override_option("api.token", env::var("EQUIPMENT_API_TOKEN").ok())?
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pollers, HTTP client or checkout dates cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Message("api.timeout_secs must be greater than 0".into()));
        }
        if self.polling.catalog_interval_secs == 0 {
            return Err(ConfigError::Message(
                "polling.catalog_interval_secs must be greater than 0".into(),
            ));
        }
        if self.polling.console_interval_secs == 0 {
            return Err(ConfigError::Message(
                "polling.console_interval_secs must be greater than 0".into(),
            ));
        }
        if !CheckoutConfig::DURATION_DAYS.contains(&self.checkout.duration_days) {
            return Err(ConfigError::Message(format!(
                "checkout.duration_days must be between {} and {}, got {}",
                CheckoutConfig::DURATION_DAYS.start(),
                CheckoutConfig::DURATION_DAYS.end(),
                self.checkout.duration_days
            )));
        }
        Ok(())
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PollingConfig {
    pub fn catalog_interval(&self) -> Duration {
        Duration::from_secs(self.catalog_interval_secs)
    }

    pub fn console_interval(&self) -> Duration {
        Duration::from_secs(self.console_interval_secs)
    }
}

impl CheckoutConfig {
    pub const DURATION_DAYS: std::ops::RangeInclusive<i64> = 1..=365;

    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::days(self.duration_days)
    }
}

impl NotificationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1560".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            catalog_interval_secs: 30,
            console_interval_secs: 5,
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self { duration_days: 3 }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { duration_ms: 4000 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}
