//! # Revcast
//!
//! Monthly per-category forecasting and actual/forecast reconciliation.
//!
//! ## Features
//!
//! - Irregularly dated records aggregated into zero-filled monthly series
//! - One ARIMA(1,1,1) fit per category, trained only on months before the
//!   current one
//! - Graceful degradation: short, all-zero or unfittable histories yield
//!   undefined forecasts instead of errors
//! - Reconciliation of actuals and forecasts into one chronological list of
//!   display rows per category
//! - CSV ingestion into immutable record snapshots, with salesperson and
//!   dimension filters
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use revcast::{generate_forecast, Observation};
//!
//! let now = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
//! let observations: Vec<Observation> = (1..=6)
//!     .map(|m| {
//!         let date = NaiveDate::from_ymd_opt(2024, m, 10).unwrap();
//!         Observation::new(date, "Widgets", 100.0 + 10.0 * m as f64)
//!     })
//!     .collect();
//!
//! let rows = generate_forecast(&observations, 3, now).unwrap();
//! assert_eq!(rows.iter().filter(|r| r.is_future).count(), 3);
//! assert!(rows.iter().filter(|r| !r.is_future).all(|r| r.forecast.is_none()));
//! ```

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod forecaster;
pub mod models;
pub mod month;
pub mod reconcile;
pub mod series;
pub mod telemetry;

// Re-export commonly used types
pub use crate::config::{AnchorPolicy, EngineConfig, IngestConfig, RevcastConfig};
pub use crate::data::{DataLoader, Observation, ObservationFilter, RecordSnapshot};
pub use crate::engine::{generate_forecast, ForecastEngine, ForecastRequest};
pub use crate::error::ForecastError;
pub use crate::forecaster::{forecast, ForecastSeries, ForecastStatus, Forecaster, SkipReason};
pub use crate::models::{ForecastModel, ForecastResult, PredictionBand, TrainedForecastModel};
pub use crate::month::Month;
pub use crate::reconcile::{reconcile, DisplayRow};
pub use crate::series::{build_monthly_series, MonthlySeries};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
