use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::pricing::domain::TargetPercentages;
use crate::pricing::rates::DEFAULT_OVERHEAD_PERCENT;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub pricing: PricingDefaults,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            pricing: PricingDefaults::load()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Company-wide pricing fallbacks. Every field has a documented constant
/// default; call sites consume a loaded copy rather than re-reading the
/// environment, so a calculation can never observe half-initialized values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingDefaults {
    pub overhead_percent: f64,
    pub target_margin_percent: f64,
    pub waste_factor_percent: f64,
    pub contingency_percent: f64,
}

/// Guaranteed net margin applied when no override is configured.
pub const DEFAULT_TARGET_MARGIN_PERCENT: f64 = 20.0;
/// Material waste buffer applied when no override is configured.
pub const DEFAULT_WASTE_FACTOR_PERCENT: f64 = 10.0;
/// Labor contingency buffer applied when no override is configured.
pub const DEFAULT_CONTINGENCY_PERCENT: f64 = 5.0;

impl PricingDefaults {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            overhead_percent: percent_var("PRICING_OVERHEAD_PERCENT", DEFAULT_OVERHEAD_PERCENT)?,
            target_margin_percent: percent_var(
                "PRICING_TARGET_MARGIN_PERCENT",
                DEFAULT_TARGET_MARGIN_PERCENT,
            )?,
            waste_factor_percent: buffer_var(
                "PRICING_WASTE_FACTOR_PERCENT",
                DEFAULT_WASTE_FACTOR_PERCENT,
            )?,
            contingency_percent: buffer_var(
                "PRICING_CONTINGENCY_PERCENT",
                DEFAULT_CONTINGENCY_PERCENT,
            )?,
        })
    }

    pub fn target_percentages(&self) -> TargetPercentages {
        TargetPercentages {
            overhead_percent: self.overhead_percent,
            target_margin_percent: self.target_margin_percent,
        }
    }
}

impl Default for PricingDefaults {
    fn default() -> Self {
        Self {
            overhead_percent: DEFAULT_OVERHEAD_PERCENT,
            target_margin_percent: DEFAULT_TARGET_MARGIN_PERCENT,
            waste_factor_percent: DEFAULT_WASTE_FACTOR_PERCENT,
            contingency_percent: DEFAULT_CONTINGENCY_PERCENT,
        }
    }
}

/// Fractions of the selling price; at 100 the reverse solve has nothing left
/// for costs.
fn percent_var(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => {
            let value = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidPercent { name })?;
            if !(0.0..100.0).contains(&value) {
                return Err(ConfigError::InvalidPercent { name });
            }
            Ok(value)
        }
        Err(_) => Ok(default),
    }
}

/// Cost buffers multiply the base costs, so values at or above 100 are
/// legitimate; only negative or non-finite values are rejected.
fn buffer_var(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => {
            let value = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidBuffer { name })?;
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidBuffer { name });
            }
            Ok(value)
        }
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPercent { name: &'static str },
    InvalidBuffer { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPercent { name } => {
                write!(f, "{name} must be a number in [0, 100)")
            }
            ConfigError::InvalidBuffer { name } => {
                write!(f, "{name} must be a non-negative number")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidPercent { .. }
            | ConfigError::InvalidBuffer { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("PRICING_OVERHEAD_PERCENT");
        env::remove_var("PRICING_TARGET_MARGIN_PERCENT");
        env::remove_var("PRICING_WASTE_FACTOR_PERCENT");
        env::remove_var("PRICING_CONTINGENCY_PERCENT");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.pricing, PricingDefaults::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn pricing_overrides_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PRICING_OVERHEAD_PERCENT", "12.5");
        env::set_var("PRICING_TARGET_MARGIN_PERCENT", "25");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.pricing.overhead_percent, 12.5);
        assert_eq!(config.pricing.target_margin_percent, 25.0);
        assert_eq!(
            config.pricing.waste_factor_percent,
            DEFAULT_WASTE_FACTOR_PERCENT
        );
    }

    #[test]
    fn cost_buffers_may_exceed_one_hundred_percent() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PRICING_WASTE_FACTOR_PERCENT", "150");
        env::set_var("PRICING_CONTINGENCY_PERCENT", "100");
        let config = AppConfig::load().expect("large buffers are valid");
        assert_eq!(config.pricing.waste_factor_percent, 150.0);
        assert_eq!(config.pricing.contingency_percent, 100.0);
    }

    #[test]
    fn rejects_negative_cost_buffer() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PRICING_WASTE_FACTOR_PERCENT", "-5");
        let err = AppConfig::load().expect_err("negative buffer shrinks the base cost");
        assert!(matches!(
            err,
            ConfigError::InvalidBuffer {
                name: "PRICING_WASTE_FACTOR_PERCENT"
            }
        ));
    }

    #[test]
    fn rejects_out_of_range_percent() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PRICING_TARGET_MARGIN_PERCENT", "100");
        let err = AppConfig::load().expect_err("margin of 100 leaves nothing for costs");
        assert!(matches!(
            err,
            ConfigError::InvalidPercent {
                name: "PRICING_TARGET_MARGIN_PERCENT"
            }
        ));
    }
}
