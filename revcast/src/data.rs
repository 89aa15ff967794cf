//! Observations and record ingestion
//!
//! Raw tabular records are turned into typed [`Observation`]s once, at load
//! time, according to an explicit [`IngestConfig`]. The resulting
//! [`RecordSnapshot`] is immutable and is handed to each forecast request.

use crate::config::IngestConfig;
use crate::error::{ForecastError, Result};
use crate::month::Month;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Category given to records that carry none
pub const DEFAULT_CATEGORY: &str = "Total Sales";

/// Attribute holding the salesperson a record belongs to
pub const SALES_PERSON_ATTRIBUTE: &str = "sales_person";

/// Dimension name that addresses the category label itself
pub const CATEGORY_DIMENSION: &str = "category";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

/// One dated, categorised numeric record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    timestamp: NaiveDate,
    category: String,
    value: f64,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
}

impl Observation {
    /// Create an observation; non-finite values are coerced to zero
    pub fn new(timestamp: NaiveDate, category: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp,
            category: category.into(),
            value: if value.is_finite() { value } else { 0.0 },
            attributes: BTreeMap::new(),
        }
    }

    /// Create an observation from loosely typed fields
    ///
    /// A missing or blank category becomes [`DEFAULT_CATEGORY`]; a missing
    /// or non-numeric value becomes zero.
    pub fn from_raw(timestamp: NaiveDate, category: Option<&str>, value: Option<&str>) -> Self {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);
        Self::new(timestamp, category, coerce_value(value))
    }

    /// Attach a string attribute (name is normalised like a column header)
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes
            .insert(normalize_column_name(name), value.into().trim().to_string());
        self
    }

    pub fn timestamp(&self) -> NaiveDate {
        self.timestamp
    }

    /// Month containing the timestamp
    pub fn month(&self) -> Month {
        Month::from_date(self.timestamp)
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Value of a filterable dimension; `category` addresses the label
    pub fn dimension_value(&self, dimension: &str) -> Option<&str> {
        if dimension == CATEGORY_DIMENSION {
            Some(&self.category)
        } else {
            self.attribute(dimension)
        }
    }
}

/// Parse a numeric field, treating anything unparseable as zero
pub fn coerce_value(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Lowercase a header and replace spaces with underscores
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Parse a date written in any of the accepted layouts
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Case-insensitive equality on one dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionFilter {
    pub column: String,
    pub value: String,
}

impl DimensionFilter {
    /// True when the column or value is blank; such filters are not applied
    pub fn is_blank(&self) -> bool {
        self.column.trim().is_empty() || self.value.is_empty()
    }
}

/// Pre-forecast record selection supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationFilter {
    /// Keep only records of this salesperson
    pub sales_person: Option<String>,
    /// Keep only records whose dimension equals a value
    pub dimension: Option<DimensionFilter>,
}

impl ObservationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_sales_person(name: impl Into<String>) -> Self {
        Self {
            sales_person: Some(name.into()),
            dimension: None,
        }
    }

    pub fn with_dimension(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimension = Some(DimensionFilter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sales_person.as_deref().map_or(true, str::is_empty)
            && self.dimension.as_ref().map_or(true, DimensionFilter::is_blank)
    }
}

/// Immutable set of observations loaded at a point in time
#[derive(Debug, Clone)]
pub struct RecordSnapshot {
    observations: Arc<[Observation]>,
    loaded_at: DateTime<Utc>,
}

impl RecordSnapshot {
    /// Snapshot `observations`, stamped with the current time
    pub fn new(observations: Vec<Observation>) -> Self {
        Self {
            observations: observations.into(),
            loaded_at: Utc::now(),
        }
    }

    pub fn with_loaded_at(mut self, loaded_at: DateTime<Utc>) -> Self {
        self.loaded_at = loaded_at;
        self
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Whether any record carries the dimension
    pub fn has_dimension(&self, dimension: &str) -> bool {
        dimension == CATEGORY_DIMENSION
            || self
                .observations
                .iter()
                .any(|o| o.attribute(dimension).is_some())
    }

    /// Records matching `filter`
    ///
    /// A predicate on a dimension that no record carries is skipped rather
    /// than matching nothing.
    pub fn select(&self, filter: &ObservationFilter) -> Vec<Observation> {
        let mut predicates: Vec<(String, String)> = Vec::new();

        if let Some(person) = filter.sales_person.as_deref().filter(|p| !p.is_empty()) {
            if self.has_dimension(SALES_PERSON_ATTRIBUTE) {
                predicates.push((SALES_PERSON_ATTRIBUTE.to_string(), person.to_lowercase()));
            } else {
                warn!("'{}' not found in data, skipping sales person filter", SALES_PERSON_ATTRIBUTE);
            }
        }

        if let Some(dimension) = filter.dimension.as_ref().filter(|d| !d.is_blank()) {
            let column = normalize_column_name(&dimension.column);
            if self.has_dimension(&column) {
                predicates.push((column, dimension.value.to_lowercase()));
            } else {
                warn!(dimension = %dimension.column, "dimension not found in data, skipping dimension filter");
            }
        }

        let selected: Vec<Observation> = self
            .observations
            .iter()
            .filter(|o| {
                predicates.iter().all(|(column, expected)| {
                    o.dimension_value(column)
                        .map_or(false, |actual| actual.to_lowercase() == *expected)
                })
            })
            .cloned()
            .collect();

        debug!(
            before = self.observations.len(),
            after = selected.len(),
            "applied observation filter"
        );
        selected
    }

    /// Sorted distinct values of a dimension, trimmed and lowercased,
    /// among the records of `sales_person` (all records when `None`)
    ///
    /// Blank values count as missing. The date and value columns are typed
    /// fields, not dimensions.
    pub fn unique_values(&self, dimension: &str, sales_person: Option<&str>) -> Result<Vec<String>> {
        let filter = ObservationFilter {
            sales_person: sales_person.map(str::to_string),
            dimension: None,
        };
        let selected = self.select(&filter);
        if selected.is_empty() {
            return Ok(Vec::new());
        }

        let column = normalize_column_name(dimension);
        if !self.has_dimension(&column) {
            return Err(ForecastError::UnknownDimension(dimension.to_string()));
        }

        let values: BTreeSet<String> = selected
            .iter()
            .filter_map(|o| o.dimension_value(&column))
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .collect();

        Ok(values.into_iter().collect())
    }
}

/// Loader turning CSV records into a [`RecordSnapshot`]
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load records from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P, config: &IngestConfig) -> Result<RecordSnapshot> {
        let file = File::open(path)?;
        Self::from_reader(file, config)
    }

    /// Load records from any CSV source
    pub fn from_reader<R: Read>(reader: R, config: &IngestConfig) -> Result<RecordSnapshot> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(normalize_column_name)
            .collect();

        let date_idx = Self::detect_date_column(&headers, config)?;
        let value_idx = Self::find_column(&headers, &config.value_column).ok_or_else(|| {
            ForecastError::DataError(format!(
                "Value column '{}' not found in {:?}",
                config.value_column, headers
            ))
        })?;
        let category_idx = Self::find_column(&headers, &config.category_column);
        if category_idx.is_none() {
            warn!(
                default_category = %config.default_category,
                "category column not found, assigning every record to the default category"
            );
        }

        let mut observations = Vec::new();
        let mut dropped = 0usize;
        for record in csv_reader.records() {
            let record = record?;
            let Some(timestamp) = record.get(date_idx).and_then(parse_date) else {
                dropped += 1;
                continue;
            };

            let category = category_idx
                .and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(config.default_category.as_str());

            let mut observation =
                Observation::new(timestamp, category, coerce_value(record.get(value_idx)));
            for (i, header) in headers.iter().enumerate() {
                if i == date_idx || i == value_idx || Some(i) == category_idx {
                    continue;
                }
                if let Some(field) = record.get(i) {
                    observation = observation.with_attribute(header, field);
                }
            }
            observations.push(observation);
        }

        if dropped > 0 {
            warn!(dropped, "dropped records with unparseable dates");
        }
        info!(rows = observations.len(), "records loaded");

        Ok(RecordSnapshot::new(observations))
    }

    fn find_column(headers: &[String], name: &str) -> Option<usize> {
        let name = normalize_column_name(name);
        headers.iter().position(|h| *h == name)
    }

    /// First configured date column present in the headers
    fn detect_date_column(headers: &[String], config: &IngestConfig) -> Result<usize> {
        for candidate in &config.date_columns {
            if let Some(idx) = Self::find_column(headers, candidate) {
                debug!(column = %headers[idx], "using date column");
                return Ok(idx);
            }
        }

        Err(ForecastError::DataError(format!(
            "No date column found in {:?} (checked {:?})",
            headers, config.date_columns
        )))
    }
}
