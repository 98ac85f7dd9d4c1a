//! Prediction writer.
//!
//! Serializes predictions as a two-column table: the date formatted as
//! day/month/year text, and the predicted rate as a number. Row order
//! follows the prediction order.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use rust_xlsxwriter::{Workbook, XlsxError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::format::TableFormat;
use super::types::Prediction;

/// Date column header in the output file.
pub const OUTPUT_DATE_COLUMN: &str = "Fecha";

/// Rate column header in the output file.
pub const OUTPUT_RATE_COLUMN: &str = "Tasa_Predicha (%)";

/// Day/month/year layout used for output dates.
pub const OUTPUT_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Xlsx error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WriterResult<T> = Result<T, WriterError>;

/// Output table layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Header of the date column.
    pub date_column: String,
    /// Header of the predicted rate column.
    pub rate_column: String,
    /// chrono format string for dates.
    pub date_format: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            date_column: OUTPUT_DATE_COLUMN.to_string(),
            rate_column: OUTPUT_RATE_COLUMN.to_string(),
            date_format: OUTPUT_DATE_FORMAT.to_string(),
        }
    }
}

/// Writes prediction tables to xlsx, CSV or Parquet.
pub struct PredictionWriter {
    config: WriterConfig,
}

impl Default for PredictionWriter {
    fn default() -> Self {
        Self::new(WriterConfig::default())
    }
}

impl PredictionWriter {
    pub fn new(config: WriterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Format prediction dates for output, preserving order.
    pub fn format_rows(&self, predictions: &[Prediction]) -> Vec<(String, f64)> {
        predictions
            .iter()
            .map(|p| {
                (
                    p.date.format(&self.config.date_format).to_string(),
                    p.predicted_rate,
                )
            })
            .collect()
    }

    /// Write `predictions` to `path`, choosing the format from the extension.
    pub fn write(&self, predictions: &[Prediction], path: impl AsRef<Path>) -> WriterResult<()> {
        let path = path.as_ref();
        let format = TableFormat::from_path(path)
            .filter(|f| f.is_writable())
            .ok_or_else(|| WriterError::UnsupportedFormat(path.display().to_string()))?;

        info!("Saving {} predictions to '{}'", predictions.len(), path.display());

        let rows = self.format_rows(predictions);
        match format {
            TableFormat::Xlsx => self.write_xlsx(&rows, path)?,
            TableFormat::Csv => {
                let mut df = self.to_dataframe(&rows)?;
                let mut file = File::create(path)?;
                CsvWriter::new(&mut file).finish(&mut df)?;
            }
            TableFormat::Parquet => {
                let mut df = self.to_dataframe(&rows)?;
                let file = File::create(path)?;
                ParquetWriter::new(file).finish(&mut df)?;
            }
            TableFormat::LegacyWorkbook => {
                return Err(WriterError::UnsupportedFormat(path.display().to_string()));
            }
        }

        info!("Predictions saved to '{}'", path.display());
        Ok(())
    }

    fn write_xlsx(&self, rows: &[(String, f64)], path: &Path) -> WriterResult<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.write_string(0, 0, &self.config.date_column)?;
        worksheet.write_string(0, 1, &self.config.rate_column)?;

        for (idx, (date, rate)) in rows.iter().enumerate() {
            let row = idx as u32 + 1;
            worksheet.write_string(row, 0, date)?;
            worksheet.write_number(row, 1, *rate)?;
        }

        workbook.save(path)?;
        Ok(())
    }

    fn to_dataframe(&self, rows: &[(String, f64)]) -> WriterResult<DataFrame> {
        let dates: Vec<&str> = rows.iter().map(|(d, _)| d.as_str()).collect();
        let rates: Vec<f64> = rows.iter().map(|(_, r)| *r).collect();

        let df = DataFrame::new(vec![
            Series::new(self.config.date_column.as_str().into(), dates).into(),
            Series::new(self.config.rate_column.as_str().into(), rates).into(),
        ])?;
        Ok(df)
    }
}
