pub mod chart;
pub mod config;
pub mod data;
pub mod forecast;
pub mod pipeline;
pub mod report;
pub mod validation;

// Re-export commonly used types
pub use chart::{ChartData, ChartError};
pub use config::{ConfigError, PipelineConfig};
pub use data::{
    DataLoader, HistoricalSeries, LoaderConfig, LoaderError, Observation, Prediction,
    PredictionWriter, TableFormat, WriterConfig, WriterError,
};
pub use forecast::{ForecastConfig, ForecastError, MovingAverageForecaster};
pub use pipeline::{Pipeline, PipelineError, PipelineOutcome};
pub use validation::{validate_series, CheckResult, SeriesReport};
