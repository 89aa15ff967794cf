//! Merging actuals and forecasts into display rows

use crate::error::{ForecastError, Result};
use crate::forecaster::ForecastSeries;
use crate::month::Month;
use crate::series::MonthlySeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One (category, month) row of the combined actual/forecast view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRow {
    /// First day of the month
    pub date: NaiveDate,
    pub month: Month,
    pub category: String,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
    /// The month is the current month or later
    pub is_future: bool,
}

impl DisplayRow {
    /// Round both values to `decimals` places
    pub fn rounded(mut self, decimals: u32) -> Self {
        self.actual = self.actual.map(|v| round_to(v, decimals));
        self.forecast = self.forecast.map(|v| round_to(v, decimals));
        self
    }
}

/// Values too large to scale are already coarser than `decimals`
fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    if scaled.is_finite() {
        scaled.round() / factor
    } else {
        value
    }
}

/// Combine the full series of a category with its forecast
///
/// Rows run from the first month of `full` through the latest of: the last
/// forecast month, the last month of `full`, and the end of the horizon
/// counted from `current_month`. For months from `current_month` onwards a
/// defined forecast wins, falling back to a non-zero actual; earlier months
/// only ever show actuals. Months with nothing to show produce no row.
pub fn reconcile(
    category: &str,
    full: &MonthlySeries,
    forecast: &ForecastSeries,
    current_month: Month,
) -> Result<Vec<DisplayRow>> {
    let start = full.first_month().unwrap_or(current_month);

    let horizon_end = match forecast.len() {
        0 => current_month,
        len => current_month
            .checked_add(len as i64 - 1)
            .ok_or_else(|| ForecastError::DataError(format!("Horizon of {} months overflows the calendar", len)))?,
    };
    let end = [forecast.last_month(), full.last_month(), Some(horizon_end)]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(horizon_end);

    let mut rows = Vec::new();
    for month in Month::range_inclusive(start, end) {
        let is_future = month >= current_month;
        let actual_value = full.get(month);

        let (actual, forecast_value) = if is_future {
            match forecast.get(month) {
                Some(value) => (None, Some(value)),
                None => (actual_value.filter(|v| *v != 0.0), None),
            }
        } else {
            (actual_value, None)
        };

        if actual.is_none() && forecast_value.is_none() {
            continue;
        }

        rows.push(DisplayRow {
            date: month.first_day(),
            month,
            category: category.to_string(),
            actual,
            forecast: forecast_value,
            is_future,
        });
    }

    Ok(rows)
}

/// Render rows as a JSON array
pub fn rows_to_json(rows: &[DisplayRow]) -> Result<String> {
    Ok(serde_json::to_string(rows)?)
}
