//! Model seam between the forecaster and concrete estimators
//!
//! A [`ForecastModel`] is an untrained configuration. Training it on a
//! [`MonthlySeries`] yields a [`TrainedForecastModel`] that projects the
//! months following the last month of that series.

use crate::error::{ForecastError, Result};
use crate::series::MonthlySeries;
use std::fmt::Debug;

pub mod arima;

/// Range expected to contain a projected value at some confidence level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionBand {
    pub lower: f64,
    pub upper: f64,
}

impl PredictionBand {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

impl From<(f64, f64)> for PredictionBand {
    fn from((lower, upper): (f64, f64)) -> Self {
        Self::new(lower, upper)
    }
}

/// Values projected for consecutive steps past the training data
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    values: Vec<f64>,
    bands: Option<Vec<PredictionBand>>,
}

impl ForecastResult {
    /// Point projections, which must number exactly `steps`
    pub fn new(values: Vec<f64>, steps: usize) -> Result<Self> {
        ensure_len("projected values", values.len(), steps)?;
        Ok(Self { values, bands: None })
    }

    /// Point projections with one band per value
    pub fn with_bands(values: Vec<f64>, bands: Vec<PredictionBand>) -> Result<Self> {
        ensure_len("prediction bands", bands.len(), values.len())?;
        Ok(Self {
            values,
            bands: Some(bands),
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn steps(&self) -> usize {
        self.values.len()
    }

    pub fn bands(&self) -> Option<&[PredictionBand]> {
        self.bands.as_deref()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

fn ensure_len(what: &str, found: usize, expected: usize) -> Result<()> {
    if found == expected {
        Ok(())
    } else {
        Err(ForecastError::ValidationError(format!(
            "Expected {} {}, got {}",
            expected, what, found
        )))
    }
}

/// A model fitted to one monthly series
pub trait TrainedForecastModel: Debug {
    /// Project `steps` months past the end of the training series
    fn forecast(&self, steps: usize) -> Result<ForecastResult>;

    fn name(&self) -> &str;
}

/// Model configuration that can be fitted to a monthly series
pub trait ForecastModel: Debug + Clone {
    type Trained: TrainedForecastModel;

    /// Fit to `series`; estimator failures come back as errors
    fn train(&self, series: &MonthlySeries) -> Result<Self::Trained>;

    fn name(&self) -> &str;
}
