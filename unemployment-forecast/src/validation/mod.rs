//! Validation module for loaded series.

pub mod series;

pub use series::{validate_series, CheckResult, SeriesReport};
