//! Trailing moving-average forecaster.
//!
//! Each step predicts the mean of the last `window` values of a growing
//! series made of the historical rates followed by the predictions emitted
//! so far. Once the horizon reaches past the window, predictions average
//! earlier predictions.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::data::{HistoricalSeries, Prediction};

#[derive(Error, Debug, PartialEq)]
pub enum ForecastError {
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Historical series is empty")]
    EmptyHistory,
}

pub type ForecastResult<T> = Result<T, ForecastError>;

/// Forecast parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of future days to predict.
    pub horizon: usize,
    /// Number of most recent values averaged per prediction.
    pub window: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: 12,
            window: 5,
        }
    }
}

impl ForecastConfig {
    pub fn new(horizon: usize, window: usize) -> Self {
        Self { horizon, window }
    }

    /// Reject zero horizon or window.
    pub fn validate(&self) -> ForecastResult<()> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter {
                name: "horizon",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.window == 0 {
            return Err(ForecastError::InvalidParameter {
                name: "window",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Moving-average forecaster over a daily series.
#[derive(Debug, Clone, Default)]
pub struct MovingAverageForecaster {
    config: ForecastConfig,
}

impl MovingAverageForecaster {
    /// Create a forecaster, validating the parameters up front.
    pub fn new(config: ForecastConfig) -> ForecastResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Predict `horizon` daily values following the last historical date.
    ///
    /// A window larger than the history uses every available value.
    pub fn forecast(&self, history: &HistoricalSeries) -> ForecastResult<Vec<Prediction>> {
        self.config.validate()?;
        let last_date = history.last_date().ok_or(ForecastError::EmptyHistory)?;

        info!(
            "Forecasting {} days after {} (window {})",
            self.config.horizon, last_date, self.config.window
        );

        let mut values = history.rates();
        values.reserve(self.config.horizon);
        let mut predictions = Vec::with_capacity(self.config.horizon);

        for step in 1..=self.config.horizon {
            let predicted_rate = trailing_mean(&values, self.config.window);
            let date = last_date + Duration::days(step as i64);
            debug!("{}: {:.6}", date, predicted_rate);

            predictions.push(Prediction::new(date, predicted_rate));
            values.push(predicted_rate);
        }

        Ok(predictions)
    }
}

/// Mean of the last `window` values (or all of them, if fewer).
///
/// `values` must be non-empty.
fn trailing_mean(values: &[f64], window: usize) -> f64 {
    let start = values.len().saturating_sub(window);
    let tail = &values[start..];
    tail.iter().sum::<f64>() / tail.len() as f64
}
