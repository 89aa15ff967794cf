//! Regular monthly series built from irregular observations

use crate::data::Observation;
use crate::error::Result;
use crate::month::Month;
use std::collections::BTreeMap;

/// Summed values per calendar month for one category
///
/// A series built by [`build_monthly_series`] holds an entry for every
/// month between its first and last month; months without observations
/// hold `0.0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySeries {
    values: BTreeMap<Month, f64>,
}

impl MonthlySeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contiguous series of `values` starting at `start`
    pub fn from_values(start: Month, values: &[f64]) -> Result<Self> {
        let months = start.sequence(values.len())?;
        Ok(Self {
            values: months.into_iter().zip(values.iter().copied()).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value recorded for `month`, if the series covers it
    pub fn get(&self, month: Month) -> Option<f64> {
        self.values.get(&month).copied()
    }

    pub fn first_month(&self) -> Option<Month> {
        self.values.keys().next().copied()
    }

    pub fn last_month(&self) -> Option<Month> {
        self.values.keys().next_back().copied()
    }

    /// Entries in chronological order
    pub fn iter(&self) -> impl Iterator<Item = (Month, f64)> + '_ {
        self.values.iter().map(|(m, v)| (*m, *v))
    }

    /// Values in chronological order
    pub fn values(&self) -> Vec<f64> {
        self.values.values().copied().collect()
    }

    pub fn sum(&self) -> f64 {
        self.values.values().sum()
    }

    /// The part of the series strictly before `month`
    pub fn before(&self, month: Month) -> MonthlySeries {
        Self {
            values: self
                .values
                .range(..month)
                .map(|(m, v)| (*m, *v))
                .collect(),
        }
    }

    /// True when no month between the first and last is missing
    pub fn is_contiguous(&self) -> bool {
        match (self.first_month(), self.last_month()) {
            (Some(first), Some(last)) => first.months_until(last) + 1 == self.values.len() as i64,
            _ => true,
        }
    }
}

/// Aggregate observations of one category into a zero-filled monthly series
///
/// Observations are summed per calendar month and every month between the
/// earliest and latest observed month is present. Empty input gives an
/// empty series.
pub fn build_monthly_series<'a, I>(observations: I) -> MonthlySeries
where
    I: IntoIterator<Item = &'a Observation>,
{
    let mut totals: BTreeMap<Month, f64> = BTreeMap::new();
    for observation in observations {
        let value = observation.value();
        *totals.entry(observation.month()).or_insert(0.0) += if value.is_finite() { value } else { 0.0 };
    }

    let (first, last) = match (totals.keys().next(), totals.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return MonthlySeries::new(),
    };

    let values = Month::range_inclusive(first, last)
        .map(|month| (month, totals.get(&month).copied().unwrap_or(0.0)))
        .collect();

    MonthlySeries { values }
}
