//! # Revcast workspace
//!
//! Umbrella crate over the workspace members:
//!
//! - [`revcast`]: monthly series, per-category forecasting and
//!   reconciliation of actuals with forecasts
//! - [`series_math`]: ARIMA estimation and differencing
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use revcast_workspace::revcast::{generate_forecast, Observation};
//!
//! let now = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let observations = vec![Observation::new(
//!     NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
//!     "Widgets",
//!     12.0,
//! )];
//!
//! // One month of history is too little to fit, so only the actual shows
//! let rows = generate_forecast(&observations, 2, now).unwrap();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].actual, Some(12.0));
//! ```

pub use revcast;
pub use series_math;

pub use revcast::{
    generate_forecast, DisplayRow, EngineConfig, ForecastEngine, ForecastRequest, Observation,
    RecordSnapshot, RevcastConfig,
};
