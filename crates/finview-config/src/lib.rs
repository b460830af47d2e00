//! Configuration management for finview
//!
//! This module handles loading, validation, and management of
//! finview configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Report engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default time range for new report sessions
    #[serde(default)]
    pub default_range: TimeRange,
    /// Tolerance, in currency units, when reconciling parent/child totals
    #[serde(default = "default_reconcile_tolerance")]
    pub reconcile_tolerance: f64,
    /// Records per page for aggregate tables
    #[serde(default = "default_records_per_page")]
    pub records_per_page: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_range: TimeRange::default(),
            reconcile_tolerance: default_reconcile_tolerance(),
            records_per_page: default_records_per_page(),
        }
    }
}

fn default_reconcile_tolerance() -> f64 {
    1.0
}

fn default_records_per_page() -> usize {
    50
}

/// Feature toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// Persist filter selections across navigation within a session
    #[serde(default = "default_true")]
    pub remember_filters: bool,
    /// Seed the excluded-group set from server-configured defaults
    #[serde(default = "default_true")]
    pub exclusion_defaults: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            remember_filters: true,
            exclusion_defaults: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "debug".to_string()
}

/// Time range enumeration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    /// Current month
    Month,
    /// Last 3 months
    Quarter,
    /// Current year
    Year,
    /// All time
    All,
    /// Custom range
    Custom,
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::Month
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "month" => Ok(TimeRange::Month),
            "quarter" => Ok(TimeRange::Quarter),
            "year" => Ok(TimeRange::Year),
            "all" => Ok(TimeRange::All),
            "custom" => Ok(TimeRange::Custom),
            _ => Err(format!("Invalid time range: {}", s)),
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeRange::Month => write!(f, "month"),
            TimeRange::Quarter => write!(f, "quarter"),
            TimeRange::Year => write!(f, "year"),
            TimeRange::All => write!(f, "all"),
            TimeRange::Custom => write!(f, "custom"),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Report engine settings
    #[serde(default)]
    pub report: ReportConfig,
    /// Feature toggles
    #[serde(default)]
    pub features: FeaturesConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::IoError)?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.report.reconcile_tolerance.is_finite() || self.report.reconcile_tolerance < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "report.reconcile_tolerance".to_string(),
                reason: "Tolerance must be a non-negative number".to_string(),
            });
        }

        if self.report.records_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                field: "report.records_per_page".to_string(),
                reason: "Records per page must be greater than 0".to_string(),
            });
        }

        match self.logging.level.as_str() {
            "debug" | "info" | "warn" | "error" | "" => {}
            other => {
                return Err(ConfigError::InvalidValue {
                    field: "logging.level".to_string(),
                    reason: format!("Unknown log level: {}", other),
                });
            }
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }
}

// ==================== Tests ====================
