//! Forecast orchestration across categories
//!
//! The engine partitions observations by category, builds each category's
//! monthly series, forecasts it from the months before the current one and
//! reconciles actuals with the forecast. A category that cannot be processed
//! contributes no rows; it never aborts the request.

use crate::config::EngineConfig;
use crate::data::{Observation, ObservationFilter, RecordSnapshot};
use crate::error::{ForecastError, Result};
use crate::forecaster::{ForecastStatus, Forecaster};
use crate::models::arima::ArimaModel;
use crate::models::ForecastModel;
use crate::month::Month;
use crate::reconcile::{reconcile, DisplayRow};
use crate::series::build_monthly_series;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error, info};

fn default_horizon() -> usize {
    EngineConfig::default().default_horizon
}

/// A forecast request against a record snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Months to forecast, starting with the current month
    #[serde(default = "default_horizon", alias = "months")]
    pub horizon: usize,
    #[serde(flatten)]
    pub filter: ObservationFilter,
}

impl ForecastRequest {
    pub fn new(horizon: usize) -> Self {
        Self {
            horizon,
            filter: ObservationFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: ObservationFilter) -> Self {
        self.filter = filter;
        self
    }
}

impl Default for ForecastRequest {
    fn default() -> Self {
        Self::new(default_horizon())
    }
}

/// Runs the per-category pipeline and merges the results
#[derive(Debug, Clone)]
pub struct ForecastEngine<M: ForecastModel = ArimaModel> {
    config: EngineConfig,
    forecaster: Forecaster<M>,
}

impl ForecastEngine<ArimaModel> {
    /// ARIMA engine built from a validated configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let forecaster = Forecaster::from_config(&config)?;
        Ok(Self { config, forecaster })
    }
}

impl<M: ForecastModel + Sync> ForecastEngine<M> {
    /// Engine using a custom forecaster
    pub fn with_forecaster(config: EngineConfig, forecaster: Forecaster<M>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, forecaster })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Display rows for every category in `observations`
    ///
    /// Rows are sorted by `(date, category, is_future)`. Empty input gives
    /// an empty result; the only error is a zero horizon.
    pub fn generate(&self, observations: &[Observation], horizon: usize, now: NaiveDate) -> Result<Vec<DisplayRow>> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1 month".to_string(),
            ));
        }
        if observations.is_empty() {
            debug!("no observations, nothing to forecast");
            return Ok(Vec::new());
        }

        let current = Month::from_date(now);
        let groups = partition_by_category(observations);
        info!(
            categories = groups.len(),
            observations = observations.len(),
            current_month = %current,
            horizon,
            "generating forecast"
        );

        let per_category: Vec<Vec<DisplayRow>> = if self.config.parallel {
            groups
                .par_iter()
                .map(|(category, members)| self.category_rows(category, members, horizon, now))
                .collect()
        } else {
            groups
                .iter()
                .map(|(category, members)| self.category_rows(category, members, horizon, now))
                .collect()
        };

        let mut rows: Vec<DisplayRow> = per_category.into_iter().flatten().collect();
        rows.sort_by(|a, b| {
            (a.date, &a.category, a.is_future).cmp(&(b.date, &b.category, b.is_future))
        });

        info!(rows = rows.len(), "forecast generated");
        Ok(rows)
    }

    /// Apply the request's filter to `snapshot` and generate rows
    pub fn generate_for_snapshot(
        &self,
        snapshot: &RecordSnapshot,
        request: &ForecastRequest,
        now: NaiveDate,
    ) -> Result<Vec<DisplayRow>> {
        let selected = snapshot.select(&request.filter);
        self.generate(&selected, request.horizon, now)
    }

    fn category_rows(&self, category: &str, members: &[&Observation], horizon: usize, now: NaiveDate) -> Vec<DisplayRow> {
        match self.process_category(category, members, horizon, now) {
            Ok(rows) => rows,
            Err(e) => {
                error!(category, error = %e, "failed to process category, omitting its rows");
                Vec::new()
            }
        }
    }

    fn process_category(
        &self,
        category: &str,
        members: &[&Observation],
        horizon: usize,
        now: NaiveDate,
    ) -> Result<Vec<DisplayRow>> {
        let current = Month::from_date(now);
        let full = build_monthly_series(members.iter().copied());
        let historical = full.before(current);
        debug!(
            category,
            observations = members.len(),
            months = full.len(),
            historical_months = historical.len(),
            "built monthly series"
        );

        let forecast = self
            .forecaster
            .forecast_category(category, &historical, horizon, now)?;
        if let ForecastStatus::Skipped(reason) = forecast.status() {
            debug!(category, %reason, "forecast undefined");
        }

        let rows = reconcile(category, &full, &forecast, current)?;
        Ok(match self.config.round_decimals {
            Some(decimals) => rows.into_iter().map(|row| row.rounded(decimals)).collect(),
            None => rows,
        })
    }
}

/// Group observations by category label
fn partition_by_category(observations: &[Observation]) -> Vec<(&str, Vec<&Observation>)> {
    let mut groups: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for observation in observations {
        groups
            .entry(observation.category())
            .or_default()
            .push(observation);
    }
    groups.into_iter().collect()
}

/// Display rows for `observations` with the default ARIMA(1,1,1) engine
pub fn generate_forecast(observations: &[Observation], horizon: usize, now: NaiveDate) -> Result<Vec<DisplayRow>> {
    ForecastEngine::new(EngineConfig::default())?.generate(observations, horizon, now)
}
