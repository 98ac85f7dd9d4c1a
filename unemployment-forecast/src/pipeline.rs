//! Load, forecast, plot and save, in that order.
//!
//! Each stage consumes the previous stage's output by reference. Any stage
//! error aborts the run; nothing is retried.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::chart::{show_chart, ChartData, ChartError};
use crate::config::{ConfigError, PipelineConfig};
use crate::data::{DataLoader, HistoricalSeries, LoaderError, Prediction, PredictionWriter, WriterError};
use crate::forecast::{ForecastError, MovingAverageForecaster};
use crate::report::{prediction_lines, recent_observations, RECENT_OBSERVATIONS};
use crate::validation::{validate_series, SeriesReport};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Loader error: {0}")]
    Loader(#[from] LoaderError),

    #[error("Forecast error: {0}")]
    Forecast(#[from] ForecastError),

    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),

    #[error("Writer error: {0}")]
    Writer(#[from] WriterError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Artifacts of a completed run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub history: HistoricalSeries,
    pub predictions: Vec<Prediction>,
    pub series_report: SeriesReport,
    pub output: PathBuf,
}

/// Linear load → forecast → plot → save pipeline.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline, rejecting invalid forecast parameters.
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self) -> PipelineResult<PipelineOutcome> {
        let forecaster = MovingAverageForecaster::new(self.config.forecast)?;
        let loader = DataLoader::new(self.config.loader.clone());
        let writer = PredictionWriter::new(self.config.writer.clone());

        // 1. Load
        let history = loader.load(&self.config.input)?;

        let series_report = validate_series(&history);
        info!("{}", series_report.summary());
        for check in series_report.failed_checks() {
            warn!(
                "{}: {}{}",
                check.name,
                check.message,
                check.details
                    .as_ref()
                    .map(|d| format!(" ({})", d))
                    .unwrap_or_default()
            );
        }

        info!(
            "Last {} observations:\n{}",
            history.tail(RECENT_OBSERVATIONS).len(),
            recent_observations(&history, RECENT_OBSERVATIONS)
        );

        // 2. Forecast
        let predictions = forecaster.forecast(&history)?;
        info!("Predictions:\n{}", prediction_lines(&predictions));

        // 3. Plot
        if self.config.show_chart {
            let chart = ChartData::build(&history, &predictions);
            show_chart(&chart)?;
        }

        // 4. Save
        writer.write(&predictions, &self.config.output)?;

        Ok(PipelineOutcome {
            history,
            predictions,
            series_report,
            output: self.config.output.clone(),
        })
    }
}
