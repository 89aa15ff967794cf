//! Error types for the revcast crate

use series_math::MathError;
use thiserror::Error;

/// Everything that can go wrong between loading records and rendering rows
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Records that cannot be loaded or a calendar that cannot be extended
    #[error("Data error: {0}")]
    DataError(String),

    /// A model that produced unusable output
    #[error("Forecasting error: {0}")]
    ForecastingError(String),

    /// Inconsistent series or projection shapes
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A dimension that no record carries
    #[error("Dimension '{0}' not found in data columns")]
    UnknownDimension(String),

    #[error("Estimation failed: {0}")]
    MathError(#[from] MathError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(String),

    /// Malformed configuration document
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Rows that could not be rendered
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}
