//! Engine and ingestion configuration
//!
//! Every field has a default, so a partial JSON document (or none at all)
//! yields a usable configuration:
//!
//! ```rust
//! use revcast::config::{AnchorPolicy, RevcastConfig};
//!
//! let config = RevcastConfig::from_json_str(r#"{ "engine": { "anchor": "relabel" } }"#).unwrap();
//! assert_eq!(config.engine.anchor, AnchorPolicy::Relabel);
//! assert_eq!(config.engine.min_history_points, 3);
//! assert_eq!(config.ingest.value_column, "revenue");
//! ```

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use series_math::ArimaOrder;
use std::fs;
use std::path::Path;

/// How projected values are labelled when the history stops short of the
/// month before the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPolicy {
    /// Project across the gap and keep only the values whose calendar month
    /// falls inside the horizon
    #[default]
    Calendar,
    /// Take the first `horizon` projected steps and label them from the
    /// current month onwards
    Relabel,
}

/// Forecasting engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Model order, fixed by policy
    pub order: ArimaOrder,
    /// Fewer historical months than this skips fitting
    pub min_history_points: usize,
    /// Horizon used by requests that do not specify one
    pub default_horizon: usize,
    pub anchor: AnchorPolicy,
    /// Decimal places kept in display rows; `None` keeps full precision
    pub round_decimals: Option<u32>,
    /// Fit categories on the rayon worker pool
    pub parallel: bool,
    /// Search iterations allowed per model fit
    pub max_fit_iterations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            order: ArimaOrder::new(1, 1, 1),
            min_history_points: 3,
            default_horizon: 6,
            anchor: AnchorPolicy::Calendar,
            round_decimals: Some(2),
            parallel: false,
            max_fit_iterations: 2000,
        }
    }
}

impl EngineConfig {
    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.min_history_points == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_history_points must be at least 1".to_string(),
            ));
        }
        if self.default_horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "default_horizon must be at least 1".to_string(),
            ));
        }
        if self.max_fit_iterations == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_fit_iterations must be at least 1".to_string(),
            ));
        }
        if let Some(decimals) = self.round_decimals {
            if decimals > 10 {
                return Err(ForecastError::InvalidParameter(format!(
                    "round_decimals must be <= 10, got {}",
                    decimals
                )));
            }
        }
        Ok(())
    }
}

/// Mapping from raw tabular records to observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Candidate date columns, first match wins
    pub date_columns: Vec<String>,
    pub category_column: String,
    pub value_column: String,
    /// Category assigned when the category column is absent or blank
    pub default_category: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            date_columns: [
                "date",
                "saledate",
                "transaction_date",
                "order_date",
                "txdate",
                "journey_dt",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            category_column: "category".to_string(),
            value_column: "revenue".to_string(),
            default_category: crate::data::DEFAULT_CATEGORY.to_string(),
        }
    }
}

/// Complete configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevcastConfig {
    pub engine: EngineConfig,
    pub ingest: IngestConfig,
}

impl RevcastConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RevcastConfig = serde_json::from_str(json)
            .map_err(|e| ForecastError::ConfigError(e.to_string()))?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
