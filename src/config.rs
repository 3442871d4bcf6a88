//! Configuration module
//!
//! Reads the engine configuration from a TOML file
//! (`~/.config/parknexus/config.toml` by default, overridable through
//! `PARKNEXUS_CONFIG`). Every section and field is optional; anything
//! missing falls back to the defaults below.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::retry::RetryConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub database: DatabaseSection,
    pub pricing: PricingConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "sqlite://./parknexus.db?mode=rwc".to_string(),
        }
    }
}

/// Rates and floors used by the fee calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// ISO 4217 code recorded on payments
    pub currency: String,
    /// Floor applied to every checkout fee
    pub minimum_fee: Decimal,
    pub standard_hourly_rate: Decimal,
    pub vip_hourly_rate: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            minimum_fee: Decimal::ONE,
            standard_hourly_rate: Decimal::TEN,
            vip_hourly_rate: Decimal::from(20),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Attempts for a spot compare-and-swap that lost a version race
    pub cas_max_attempts: u32,
    /// Initial backoff between CAS attempts
    pub cas_retry_delay_ms: u64,
    /// Reservation length when the caller does not give one
    pub default_reservation_minutes: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cas_max_attempts: 3,
            cas_retry_delay_ms: 5,
            default_reservation_minutes: 120,
        }
    }
}

impl EngineConfig {
    pub fn cas_retry(&self) -> RetryConfig {
        RetryConfig::bounded(
            self.cas_max_attempts,
            Duration::from_millis(self.cas_retry_delay_ms),
        )
    }
}

impl FromStr for AppConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cfg: AppConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

impl AppConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        raw.parse()
    }

    /// Load `path` if it exists, otherwise defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pricing;
        if p.standard_hourly_rate <= Decimal::ZERO || p.vip_hourly_rate <= Decimal::ZERO {
            return Err(ConfigError::Invalid(
                "hourly rates must be positive".to_string(),
            ));
        }
        if p.minimum_fee < Decimal::ZERO {
            return Err(ConfigError::Invalid(
                "minimum_fee must not be negative".to_string(),
            ));
        }
        if p.currency.len() != 3 {
            return Err(ConfigError::Invalid(format!(
                "currency must be a 3-letter code, got {:?}",
                p.currency
            )));
        }
        if self.engine.cas_max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "cas_max_attempts must be at least 1".to_string(),
            ));
        }
        if self.engine.default_reservation_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "default_reservation_minutes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// `$PARKNEXUS_CONFIG`, else `<config dir>/parknexus/config.toml`
pub fn default_config_path() -> PathBuf {
    if let Ok(p) = std::env::var("PARKNEXUS_CONFIG") {
        return PathBuf::from(p);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parknexus")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg: AppConfig = "".parse().unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.pricing.minimum_fee, Decimal::ONE);
        assert_eq!(cfg.engine.default_reservation_minutes, 120);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg: AppConfig = r#"
            [pricing]
            vip_hourly_rate = "15.00"

            [logging]
            format = "json"
        "#
        .parse()
        .unwrap();
        assert_eq!(cfg.pricing.vip_hourly_rate, Decimal::new(1500, 2));
        assert_eq!(cfg.pricing.standard_hourly_rate, Decimal::TEN);
        assert_eq!(cfg.logging.format, "json");
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn rejects_non_positive_rate() {
        let err = r#"
            [pricing]
            standard_hourly_rate = "0"
        "#
        .parse::<AppConfig>()
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_cas_attempts() {
        let err = "[engine]\ncas_max_attempts = 0\n"
            .parse::<AppConfig>()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = "[pricing\n".parse::<AppConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn defaults_survive_a_toml_roundtrip() {
        let cfg = AppConfig::default();
        let parsed: AppConfig = cfg.to_toml().unwrap().parse().unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = AppConfig::load_or_default(Path::new("/nonexistent/parknexus.toml")).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }
}
