//! # Series Math
//!
//! Numerical building blocks for monthly series forecasting.
//! This crate provides differencing/integration helpers and an
//! ARIMA(p, d, q) estimator fitted by conditional sum of squares.

use thiserror::Error;

pub mod arima;
pub mod difference;

pub use crate::arima::{Arima, ArimaOrder, FittedArima};

/// Errors that can occur while estimating or projecting a series
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Estimator did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;
