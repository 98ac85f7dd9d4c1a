//! Forecasting module.
//!
//! Provides the trailing moving-average forecaster used by the pipeline.

pub mod moving_average;

pub use moving_average::{ForecastConfig, ForecastError, ForecastResult, MovingAverageForecaster};
