use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;

use crate::constants::config::{CONFIG_PATH_ENV, DEFAULT_ALLOCATION_TOLERANCE, DEFAULT_CONFIG_PATH};
use crate::error::ConfigError;

/// Optional cross-field invariants applied during record construction.
///
/// `total_value >= 0` on portfolios is always enforced and has no flag.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidationConfig {
    /// PerformanceResult: end_date >= start_date
    pub enforce_date_range: bool,
    /// prediction_accuracy, accuracy_rate and recent_accuracy within [0, 1]
    pub enforce_accuracy_bounds: bool,
    /// AgentPerformance: accurate_predictions <= total_predictions
    pub enforce_prediction_counts: bool,
    /// Non-empty allocation maps sum to 1 within `allocation_tolerance`
    pub enforce_allocation_sum: bool,
    pub allocation_tolerance: f64,
    pub reject_unknown_fields: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enforce_date_range: true,
            enforce_accuracy_bounds: false,
            enforce_prediction_counts: false,
            enforce_allocation_sum: false,
            allocation_tolerance: DEFAULT_ALLOCATION_TOLERANCE,
            reject_unknown_fields: false,
        }
    }
}

impl ValidationConfig {
    /// Every optional invariant switched on
    pub fn strict() -> Self {
        Self {
            enforce_date_range: true,
            enforce_accuracy_bounds: true,
            enforce_prediction_counts: true,
            enforce_allocation_sum: true,
            allocation_tolerance: DEFAULT_ALLOCATION_TOLERANCE,
            reject_unknown_fields: true,
        }
    }

    /// Type checks only; no cross-field rules
    pub fn permissive() -> Self {
        Self {
            enforce_date_range: false,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by RUST_LOG
    pub log_filter: Option<String>,
    pub validation: ValidationConfig,
}

impl AppConfig {
    /// Path from `MARA_CONFIG`, falling back to `config.yaml`
    pub fn path() -> String {
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    /// `Ok(None)` when the file does not exist, so the caller can fall back
    /// to defaults and say so once logging is up. Unreadable or malformed
    /// files are errors.
    pub fn load_from(path: &str) -> Result<Option<Self>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_string(),
                    source,
                })
            }
        };

        Self::from_yaml(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_string(),
                source,
            })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}
