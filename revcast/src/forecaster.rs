//! Per-category forecasting with graceful degradation
//!
//! [`Forecaster::forecast`] never fails because of the data: too little
//! history, an all-zero history or an estimator failure all produce a
//! [`ForecastSeries`] whose entries are undefined, with the reason recorded
//! in its [`ForecastStatus`].

use crate::config::{AnchorPolicy, EngineConfig};
use crate::error::{ForecastError, Result};
use crate::models::arima::ArimaModel;
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::month::Month;
use crate::series::MonthlySeries;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Why fitting was not attempted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer historical months than the policy requires
    TooFewPoints { found: usize, required: usize },
    /// Historical values sum to exactly zero
    ZeroHistory,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooFewPoints { found, required } => write!(
                f,
                "insufficient history: {} months, need at least {}",
                found, required
            ),
            SkipReason::ZeroHistory => write!(f, "history sums to zero"),
        }
    }
}

/// Outcome of forecasting one series
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastStatus {
    /// A model was fitted and projected
    Fitted { model: String },
    /// Fitting was not attempted
    Skipped(SkipReason),
    /// Fitting or projection failed
    Failed(String),
}

/// Projected values per month, covering exactly the requested horizon
///
/// Entries are `None` when no projection is available; months inside the
/// horizon are never absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSeries {
    values: BTreeMap<Month, Option<f64>>,
    status: ForecastStatus,
}

impl ForecastSeries {
    /// `horizon` undefined entries starting at `start`
    pub fn undefined(start: Month, horizon: usize, status: ForecastStatus) -> Result<Self> {
        let values = start
            .sequence(horizon)?
            .into_iter()
            .map(|month| (month, None))
            .collect();
        Ok(Self { values, status })
    }

    fn fitted(months: Vec<Month>, values: Vec<f64>, model: &str) -> Self {
        Self {
            values: months.into_iter().zip(values.into_iter().map(Some)).collect(),
            status: ForecastStatus::Fitted {
                model: model.to_string(),
            },
        }
    }

    /// Projected value for `month`, `None` if undefined or outside the horizon
    pub fn get(&self, month: Month) -> Option<f64> {
        self.values.get(&month).copied().flatten()
    }

    pub fn first_month(&self) -> Option<Month> {
        self.values.keys().next().copied()
    }

    pub fn last_month(&self) -> Option<Month> {
        self.values.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in chronological order
    pub fn iter(&self) -> impl Iterator<Item = (Month, Option<f64>)> + '_ {
        self.values.iter().map(|(m, v)| (*m, *v))
    }

    pub fn status(&self) -> &ForecastStatus {
        &self.status
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self.status, ForecastStatus::Fitted { .. })
    }

    /// Number of defined entries
    pub fn defined_count(&self) -> usize {
        self.values.values().filter(|v| v.is_some()).count()
    }
}

/// Fits a model to a historical slice and projects it onto calendar months
#[derive(Debug, Clone)]
pub struct Forecaster<M: ForecastModel = ArimaModel> {
    model: M,
    min_history_points: usize,
    anchor: AnchorPolicy,
}

impl Forecaster<ArimaModel> {
    /// ARIMA forecaster following the engine configuration
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let model = ArimaModel::new(config.order)?.with_max_iterations(config.max_fit_iterations);
        Ok(Forecaster::new(model)
            .with_min_history_points(config.min_history_points)
            .with_anchor(config.anchor))
    }
}

impl<M: ForecastModel> Forecaster<M> {
    /// Forecaster with the default policy: at least 3 historical months,
    /// calendar anchoring
    pub fn new(model: M) -> Self {
        Self {
            model,
            min_history_points: 3,
            anchor: AnchorPolicy::Calendar,
        }
    }

    pub fn with_min_history_points(mut self, min_history_points: usize) -> Self {
        self.min_history_points = min_history_points;
        self
    }

    pub fn with_anchor(mut self, anchor: AnchorPolicy) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Forecast `horizon` months starting at the month containing `now`
    ///
    /// Only the part of `historical` strictly before that month is used.
    /// The only error is a zero horizon.
    pub fn forecast(&self, historical: &MonthlySeries, horizon: usize, now: NaiveDate) -> Result<ForecastSeries> {
        self.forecast_category("", historical, horizon, now)
    }

    /// As [`Forecaster::forecast`], logging under `category`
    pub fn forecast_category(
        &self,
        category: &str,
        historical: &MonthlySeries,
        horizon: usize,
        now: NaiveDate,
    ) -> Result<ForecastSeries> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1 month".to_string(),
            ));
        }

        let current = Month::from_date(now);
        let historical = historical.before(current);

        if historical.len() < self.min_history_points {
            let reason = SkipReason::TooFewPoints {
                found: historical.len(),
                required: self.min_history_points,
            };
            debug!(category, %reason, "skipping model fit");
            return ForecastSeries::undefined(current, horizon, ForecastStatus::Skipped(reason));
        }
        if historical.sum() == 0.0 {
            debug!(category, reason = %SkipReason::ZeroHistory, "skipping model fit");
            return ForecastSeries::undefined(
                current,
                horizon,
                ForecastStatus::Skipped(SkipReason::ZeroHistory),
            );
        }

        let labels = current.sequence(horizon)?;
        match self.project(&historical, current, horizon) {
            Ok(values) => {
                debug!(category, model = self.model.name(), "model fitted");
                Ok(ForecastSeries::fitted(labels, values, self.model.name()))
            }
            Err(e) => {
                warn!(category, model = self.model.name(), error = %e, "model fit failed, forecast left undefined");
                ForecastSeries::undefined(current, horizon, ForecastStatus::Failed(e.to_string()))
            }
        }
    }

    /// Fit and return exactly `horizon` finite values for the months from
    /// `current` onwards
    fn project(&self, historical: &MonthlySeries, current: Month, horizon: usize) -> Result<Vec<f64>> {
        let skipped = match (self.anchor, historical.last_month()) {
            // Months between the last historical point and `current`
            (AnchorPolicy::Calendar, Some(last)) => {
                usize::try_from(last.months_until(current) - 1).unwrap_or(0)
            }
            _ => 0,
        };

        let trained = self.model.train(historical)?;
        let result = trained.forecast(skipped + horizon)?;
        let values: Vec<f64> = result.values().iter().skip(skipped).copied().collect();

        if values.len() != horizon {
            return Err(ForecastError::ForecastingError(format!(
                "{} returned {} values, expected {}",
                trained.name(),
                values.len(),
                horizon
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ForecastingError(format!(
                "{} produced non-finite values",
                trained.name()
            )));
        }

        Ok(values)
    }
}

/// Forecast `horizon` months with the default ARIMA(1,1,1) policy
pub fn forecast(historical: &MonthlySeries, horizon: usize, now: NaiveDate) -> Result<ForecastSeries> {
    Forecaster::from_config(&EngineConfig::default())?.forecast(historical, horizon, now)
}
