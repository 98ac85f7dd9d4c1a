//! Core data types for unemployment rate series.
//!
//! Rates are always stored in percentage units (0-100). Conversion from
//! fractional input happens once, in the loader.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single historical data point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation date
    pub date: NaiveDate,

    /// Unemployment rate in percent
    pub rate: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, rate: f64) -> Self {
        Self { date, rate }
    }
}

/// A forecast value for a future date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Forecast date (strictly after the last observation)
    pub date: NaiveDate,

    /// Predicted unemployment rate in percent
    pub predicted_rate: f64,
}

impl Prediction {
    pub fn new(date: NaiveDate, predicted_rate: f64) -> Self {
        Self {
            date,
            predicted_rate,
        }
    }
}

/// Historical observations ordered by date.
///
/// Construction sorts the observations ascending by date (stable, so rows
/// sharing a date keep their file order). Duplicate dates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    observations: Vec<Observation>,
}

impl HistoricalSeries {
    /// Create a series, sorting the observations by date.
    pub fn new(mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.date);
        Self { observations }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Rates in chronological order.
    pub fn rates(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.rate).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.iter().map(|o| o.date).min()
    }

    /// Latest observation date.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.iter().map(|o| o.date).max()
    }

    /// Rate of the first observation recorded on `date`.
    pub fn rate_on(&self, date: NaiveDate) -> Option<f64> {
        self.observations
            .iter()
            .find(|o| o.date == date)
            .map(|o| o.rate)
    }

    /// The most recent `n` observations (fewer if the series is shorter).
    pub fn tail(&self, n: usize) -> &[Observation] {
        let start = self.observations.len().saturating_sub(n);
        &self.observations[start..]
    }

    /// Minimum and maximum rate, if any.
    pub fn rate_range(&self) -> Option<(f64, f64)> {
        if self.observations.is_empty() {
            return None;
        }
        let min = self
            .observations
            .iter()
            .map(|o| o.rate)
            .fold(f64::INFINITY, f64::min);
        let max = self
            .observations
            .iter()
            .map(|o| o.rate)
            .fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }
}
