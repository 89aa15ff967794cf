//! ARIMA(p, d, q) behind the model seam

use crate::error::Result;
use crate::models::{ForecastModel, ForecastResult, PredictionBand, TrainedForecastModel};
use crate::series::MonthlySeries;
use series_math::{Arima, ArimaOrder, FittedArima};

/// Unfitted ARIMA configuration
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Display label, e.g. `ARIMA(1,1,1)`
    label: String,
    estimator: Arima,
    /// Attach prediction bands at this level when set
    confidence: Option<f64>,
}

/// ARIMA fitted to one category's history
#[derive(Debug, Clone)]
pub struct TrainedArimaModel {
    label: String,
    fitted: FittedArima,
    confidence: Option<f64>,
}

impl ArimaModel {
    /// Validate `order` and build the estimator
    pub fn new(order: ArimaOrder) -> Result<Self> {
        Ok(Self {
            label: order.to_string(),
            estimator: Arima::new(order)?,
            confidence: None,
        })
    }

    /// Cap the estimator's search iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.estimator = self.estimator.with_max_iterations(max_iterations);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn order(&self) -> ArimaOrder {
        self.estimator.order()
    }
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArimaModel;

    fn train(&self, series: &MonthlySeries) -> Result<TrainedArimaModel> {
        let fitted = self.estimator.fit(&series.values())?;
        Ok(TrainedArimaModel {
            label: self.label.clone(),
            fitted,
            confidence: self.confidence,
        })
    }

    fn name(&self) -> &str {
        &self.label
    }
}

impl TrainedArimaModel {
    /// Estimated coefficients and diagnostics
    pub fn fitted(&self) -> &FittedArima {
        &self.fitted
    }
}

impl TrainedForecastModel for TrainedArimaModel {
    fn forecast(&self, steps: usize) -> Result<ForecastResult> {
        let values = self.fitted.forecast(steps)?;
        let Some(confidence) = self.confidence else {
            return ForecastResult::new(values, steps);
        };

        let bands = self
            .fitted
            .forecast_intervals(steps, confidence)?
            .into_iter()
            .map(PredictionBand::from)
            .collect();
        ForecastResult::with_bands(values, bands)
    }

    fn name(&self) -> &str {
        &self.label
    }
}
