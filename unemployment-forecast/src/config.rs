//! Pipeline configuration.
//!
//! Defaults reproduce the fixed behavior of the forecaster: read
//! `desempleo.xlsx`, predict 12 days with a 5-value window, show the chart,
//! and write `predicciones_desempleo.xlsx`. A JSON file may override any
//! subset of fields.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{LoaderConfig, WriterConfig};
use crate::forecast::{ForecastConfig, ForecastError};

/// Default input spreadsheet.
pub const DEFAULT_INPUT: &str = "desempleo.xlsx";

/// Default output spreadsheet.
pub const DEFAULT_OUTPUT: &str = "predicciones_desempleo.xlsx";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid forecast parameters: {0}")]
    Forecast(#[from] ForecastError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration for a full load/forecast/plot/save run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input table path.
    pub input: PathBuf,

    /// Output table path.
    pub output: PathBuf,

    /// Input column names.
    pub loader: LoaderConfig,

    /// Horizon and window.
    pub forecast: ForecastConfig,

    /// Output layout.
    pub writer: WriterConfig,

    /// Display the chart and wait for the user before saving.
    pub show_chart: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            loader: LoaderConfig::default(),
            forecast: ForecastConfig::default(),
            writer: WriterConfig::default(),
            show_chart: true,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.forecast.validate()?;
        Ok(())
    }
}
