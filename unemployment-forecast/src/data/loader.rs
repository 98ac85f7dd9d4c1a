//! Data loader for unemployment rate spreadsheets.
//!
//! Reads a tabular file into a [`HistoricalSeries`]. The input must contain
//! a date column and a numeric rate column; any other columns are ignored.
//!
//! Workbooks (`.xlsx`, `.xlsm`, `.xls`, `.ods`) are read with calamine from
//! the first worksheet, whose first row is the header. CSV and Parquet files
//! go through polars.
//!
//! Rates given as fractions are converted to percent: if the largest value
//! in the column is below 1.0, every value is multiplied by 100. A series
//! whose real percentages are all below 1% is therefore scaled as well.
//! Set [`LoaderConfig::normalize_fractions`] to `false` to read values as
//! stored, e.g. when reading back a predictions file.
//!
//! Slash-separated text dates are read day first (`15/03/2024`), matching the
//! layout the prediction writer emits. Month-first text is not recognized.

use std::fs::File;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::format::TableFormat;
use super::types::{HistoricalSeries, Observation};

/// Date column name used by the source spreadsheets.
pub const DEFAULT_DATE_COLUMN: &str = "Fecha";

/// Rate column name used by the source spreadsheets (two spaces before `(%)`).
pub const DEFAULT_RATE_COLUMN: &str = "Tasa de Desempleo  (%)";

/// Columns whose maximum is below this value are treated as fractions.
pub const FRACTION_THRESHOLD: f64 = 1.0;

/// Accepted textual date layouts, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Invalid date in row {row}: '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("Invalid rate in row {row}: '{value}'")]
    InvalidRate { row: usize, value: String },

    #[error("No observations found in {0}")]
    EmptySeries(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LoaderResult<T> = Result<T, LoaderError>;

/// Column names the loader looks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Header of the date column.
    pub date_column: String,
    /// Header of the rate column.
    pub rate_column: String,
    /// Scale the column by 100 when its maximum is below [`FRACTION_THRESHOLD`].
    pub normalize_fractions: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            rate_column: DEFAULT_RATE_COLUMN.to_string(),
            normalize_fractions: true,
        }
    }
}

impl LoaderConfig {
    pub fn new(date_column: &str, rate_column: &str) -> Self {
        Self {
            date_column: date_column.to_string(),
            rate_column: rate_column.to_string(),
            normalize_fractions: true,
        }
    }

    pub fn with_normalize_fractions(mut self, normalize: bool) -> Self {
        self.normalize_fractions = normalize;
        self
    }
}

/// Tabular file loader producing a sorted, percent-normalized series.
pub struct DataLoader {
    config: LoaderConfig,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl DataLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load a historical series from `path`.
    pub fn load(&self, path: impl AsRef<Path>) -> LoaderResult<HistoricalSeries> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoaderError::FileNotFound(path.display().to_string()));
        }
        let format = TableFormat::from_path(path)
            .ok_or_else(|| LoaderError::UnsupportedFormat(path.display().to_string()))?;

        info!("Reading '{}'", path.display());

        let mut observations = match format {
            TableFormat::Xlsx | TableFormat::LegacyWorkbook => self.read_workbook(path)?,
            TableFormat::Csv => self.observations_from_frame(&read_csv(path)?)?,
            TableFormat::Parquet => self.observations_from_frame(&read_parquet(path)?)?,
        };

        if observations.is_empty() {
            return Err(LoaderError::EmptySeries(path.display().to_string()));
        }

        if self.config.normalize_fractions && normalize_rates(&mut observations) {
            info!("Rates are below {FRACTION_THRESHOLD}, converting fractions to percent");
        }

        let series = HistoricalSeries::new(observations);
        info!(
            "Loaded {} observations ({} to {})",
            series.len(),
            series.first_date().map(|d| d.to_string()).unwrap_or_default(),
            series.last_date().map(|d| d.to_string()).unwrap_or_default()
        );

        Ok(series)
    }

    /// Read the first worksheet of a workbook.
    fn read_workbook(&self, path: &Path) -> LoaderResult<Vec<Observation>> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook.worksheet_range_at(0).ok_or_else(|| {
            LoaderError::InvalidData(format!("{} has no worksheets", path.display()))
        })??;

        self.observations_from_range(&range)
    }

    /// Extract observations from a worksheet range whose first row is the header.
    ///
    /// Values are returned as read; unit normalization happens in [`DataLoader::load`].
    pub fn observations_from_range(&self, range: &Range<Data>) -> LoaderResult<Vec<Observation>> {
        let mut rows = range.rows();
        let header: Vec<String> = rows
            .next()
            .map(|cells| cells.iter().map(|c| c.to_string()).collect())
            .unwrap_or_default();
        debug!("Columns: {:?}", header);

        let date_idx = find_column(&header, &self.config.date_column)?;
        let rate_idx = find_column(&header, &self.config.rate_column)?;

        let mut observations = Vec::with_capacity(range.height().saturating_sub(1));

        for (idx, cells) in rows.enumerate() {
            if cells.iter().all(|c| matches!(c, Data::Empty)) {
                continue;
            }
            let row = idx + 1;
            let date_cell = cells.get(date_idx).unwrap_or(&Data::Empty);
            let rate_cell = cells.get(rate_idx).unwrap_or(&Data::Empty);

            let date = cell_to_date(date_cell).ok_or_else(|| LoaderError::InvalidDate {
                row,
                value: date_cell.to_string(),
            })?;
            let rate = cell_to_rate(rate_cell).ok_or_else(|| LoaderError::InvalidRate {
                row,
                value: rate_cell.to_string(),
            })?;

            observations.push(Observation::new(date, rate));
        }

        Ok(observations)
    }

    /// Extract observations from a DataFrame.
    ///
    /// The date column may hold text or a temporal dtype; the rate column any
    /// numeric dtype or numeric text.
    pub fn observations_from_frame(&self, df: &DataFrame) -> LoaderResult<Vec<Observation>> {
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        debug!("Columns: {:?}", names);

        let date_name = &names[find_column(&names, &self.config.date_column)?];
        let rate_name = &names[find_column(&names, &self.config.rate_column)?];

        let date_text = df.column(date_name)?.cast(&DataType::String)?;
        let rate_col = df.column(rate_name)?;
        let rate_text = rate_col.cast(&DataType::String)?;
        let rate_values = rate_col.cast(&DataType::Float64)?;

        let date_text = date_text.str()?;
        let rate_text = rate_text.str()?;
        let rate_values = rate_values.f64()?;

        let mut observations = Vec::with_capacity(df.height());

        for idx in 0..df.height() {
            let raw_date = date_text.get(idx);
            let raw_rate = rate_text.get(idx);
            if raw_date.is_none() && raw_rate.is_none() {
                continue;
            }
            let row = idx + 1;

            let date = raw_date
                .and_then(parse_date_text)
                .ok_or_else(|| LoaderError::InvalidDate {
                    row,
                    value: raw_date.unwrap_or_default().to_string(),
                })?;
            let rate = rate_values
                .get(idx)
                .filter(|v| v.is_finite())
                .ok_or_else(|| LoaderError::InvalidRate {
                    row,
                    value: raw_rate.unwrap_or_default().to_string(),
                })?;

            observations.push(Observation::new(date, rate));
        }

        Ok(observations)
    }
}

/// Scale fractional rates to percent.
///
/// Returns `true` when scaling was applied, i.e. when the maximum rate is
/// below [`FRACTION_THRESHOLD`].
pub fn normalize_rates(observations: &mut [Observation]) -> bool {
    if observations.is_empty() {
        return false;
    }
    let max = observations
        .iter()
        .map(|o| o.rate)
        .fold(f64::NEG_INFINITY, f64::max);
    if max >= FRACTION_THRESHOLD {
        return false;
    }
    for observation in observations.iter_mut() {
        observation.rate *= 100.0;
    }
    true
}

/// Parse a date from text in any accepted layout, discarding time of day.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    // Datetime text with an unrecognized time part: keep the date token.
    let date_part = text.split([' ', 'T']).next()?;
    if date_part.len() < text.len() {
        return DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok());
    }
    None
}

/// Convert an Excel serial day number to a date.
///
/// Serials beyond chrono's date range yield `None`.
fn date_from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let offset = Duration::try_days(serial.floor() as i64)?;
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(offset)
}

fn cell_to_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|d| d.date()),
        Data::DateTimeIso(s) | Data::String(s) => parse_date_text(s),
        Data::Float(f) => date_from_excel_serial(*f),
        Data::Int(i) => date_from_excel_serial(*i as f64),
        _ => None,
    }
}

fn cell_to_rate(cell: &Data) -> Option<f64> {
    let value = match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

fn find_column(headers: &[String], name: &str) -> LoaderResult<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name.trim())
        .ok_or_else(|| LoaderError::MissingColumn(name.to_string()))
}

fn read_csv(path: &Path) -> LoaderResult<DataFrame> {
    let file = File::open(path)?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file)
        .finish()?;
    Ok(df)
}

fn read_parquet(path: &Path) -> LoaderResult<DataFrame> {
    let file = File::open(path)?;
    Ok(ParquetReader::new(file).finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = LoaderConfig::default();
        assert_eq!(config.date_column, "Fecha");
        assert_eq!(config.rate_column, "Tasa de Desempleo  (%)");
        assert!(config.normalize_fractions);
    }

    #[test]
    fn test_normalize_fractional_rates() {
        let mut obs = vec![
            Observation::new(date(2024, 1, 1), 0.05),
            Observation::new(date(2024, 1, 2), 0.085),
        ];

        assert!(normalize_rates(&mut obs));
        assert_relative_eq!(obs[0].rate, 5.0, epsilon = 1e-9);
        assert_relative_eq!(obs[1].rate, 8.5, epsilon = 1e-9);
    }

    #[test]
    fn test_normalize_leaves_percentages() {
        let mut obs = vec![
            Observation::new(date(2024, 1, 1), 0.5),
            Observation::new(date(2024, 1, 2), 8.5),
        ];

        assert!(!normalize_rates(&mut obs));
        assert_eq!(obs[0].rate, 0.5);
        assert_eq!(obs[1].rate, 8.5);
    }

    #[test]
    fn test_normalize_exactly_one_is_percent() {
        let mut obs = vec![Observation::new(date(2024, 1, 1), 1.0)];
        assert!(!normalize_rates(&mut obs));
        assert_eq!(obs[0].rate, 1.0);
    }

    #[test]
    fn test_parse_date_text() {
        assert_eq!(parse_date_text("2024-03-15"), Some(date(2024, 3, 15)));
        assert_eq!(parse_date_text("15/03/2024"), Some(date(2024, 3, 15)));
        assert_eq!(parse_date_text("2024/03/15"), Some(date(2024, 3, 15)));
        assert_eq!(parse_date_text(" 2024-03-15 00:00:00 "), Some(date(2024, 3, 15)));
        assert_eq!(parse_date_text("2024-03-15T08:30:00"), Some(date(2024, 3, 15)));
        assert_eq!(
            parse_date_text("2024-03-15 00:00:00.000000000"),
            Some(date(2024, 3, 15))
        );
        assert_eq!(parse_date_text("not a date"), None);
        assert_eq!(parse_date_text(""), None);
    }

    #[test]
    fn test_date_from_excel_serial() {
        // 45000 = 2023-03-15
        assert_eq!(date_from_excel_serial(45000.0), Some(date(2023, 3, 15)));
        assert_eq!(date_from_excel_serial(45000.75), Some(date(2023, 3, 15)));
        assert_eq!(date_from_excel_serial(0.0), None);
        assert_eq!(date_from_excel_serial(f64::NAN), None);
    }

    #[test]
    fn test_date_from_excel_serial_out_of_range() {
        assert_eq!(date_from_excel_serial(1e15), None);
        assert_eq!(date_from_excel_serial(f64::MAX), None);
        assert_eq!(date_from_excel_serial(1e8), None);
    }

    #[test]
    fn test_observations_from_range_huge_serial_is_invalid_date() {
        let mut range: Range<Data> = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), Data::String("Fecha".to_string()));
        range.set_value((0, 1), Data::String("Tasa de Desempleo  (%)".to_string()));
        range.set_value((1, 0), Data::Float(1e15));
        range.set_value((1, 1), Data::Float(7.0));

        let err = DataLoader::default().observations_from_range(&range).unwrap_err();
        assert!(matches!(err, LoaderError::InvalidDate { row: 1, .. }));
    }

    #[test]
    fn test_observations_from_frame() {
        let df = df!(
            "Fecha" => &["2024-01-02", "2024-01-01"],
            "Tasa de Desempleo  (%)" => &[7.5, 7.0],
            "Notas" => &["b", "a"]
        )
        .unwrap();

        let loader = DataLoader::default();
        let obs = loader.observations_from_frame(&df).unwrap();

        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0], Observation::new(date(2024, 1, 2), 7.5));
        assert_eq!(obs[1], Observation::new(date(2024, 1, 1), 7.0));
    }

    #[test]
    fn test_observations_from_frame_missing_column() {
        let df = df!(
            "Fecha" => &["2024-01-01"],
            "Rate" => &[7.0]
        )
        .unwrap();

        let err = DataLoader::default().observations_from_frame(&df).unwrap_err();
        match err {
            LoaderError::MissingColumn(name) => assert_eq!(name, DEFAULT_RATE_COLUMN),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_observations_from_frame_invalid_rate() {
        let df = df!(
            "Fecha" => &["2024-01-01", "2024-01-02"],
            "Tasa de Desempleo  (%)" => &["7.0", "n/a"]
        )
        .unwrap();

        let err = DataLoader::default().observations_from_frame(&df).unwrap_err();
        match err {
            LoaderError::InvalidRate { row, value } => {
                assert_eq!(row, 2);
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_observations_from_frame_invalid_date() {
        let df = df!(
            "Fecha" => &["yesterday"],
            "Tasa de Desempleo  (%)" => &[7.0]
        )
        .unwrap();

        let err = DataLoader::default().observations_from_frame(&df).unwrap_err();
        assert!(matches!(err, LoaderError::InvalidDate { row: 1, .. }));
    }

    #[test]
    fn test_observations_from_range() {
        let mut range: Range<Data> = Range::new((0, 0), (3, 1));
        range.set_value((0, 0), Data::String("Fecha".to_string()));
        range.set_value((0, 1), Data::String("Tasa de Desempleo  (%)".to_string()));
        range.set_value((1, 0), Data::String("01/02/2024".to_string()));
        range.set_value((1, 1), Data::Float(0.07));
        range.set_value((2, 0), Data::Float(45000.0));
        range.set_value((2, 1), Data::Int(8));
        // Row 3 left empty.

        let obs = DataLoader::default().observations_from_range(&range).unwrap();

        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0], Observation::new(date(2024, 2, 1), 0.07));
        assert_eq!(obs[1], Observation::new(date(2023, 3, 15), 8.0));
    }

    #[test]
    fn test_observations_from_range_missing_date_column() {
        let mut range: Range<Data> = Range::new((0, 0), (1, 0));
        range.set_value((0, 0), Data::String("Tasa de Desempleo  (%)".to_string()));
        range.set_value((1, 0), Data::Float(7.0));

        let err = DataLoader::default().observations_from_range(&range).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn(ref c) if c == "Fecha"));
    }

    #[test]
    fn test_load_csv_normalizes_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.csv");
        std::fs::write(
            &path,
            "Fecha,Tasa de Desempleo  (%)\n2024-01-03,0.06\n2024-01-01,0.085\n2024-01-02,0.07\n",
        )
        .unwrap();

        let series = DataLoader::default().load(&path).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.first_date(), Some(date(2024, 1, 1)));
        assert_eq!(series.last_date(), Some(date(2024, 1, 3)));
        let rates = series.rates();
        assert_relative_eq!(rates[0], 8.5, epsilon = 1e-9);
        assert_relative_eq!(rates[1], 7.0, epsilon = 1e-9);
        assert_relative_eq!(rates[2], 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_load_without_normalization_keeps_fractions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.csv");
        std::fs::write(&path, "Fecha,Tasa de Desempleo  (%)\n2024-01-01,0.5\n2024-01-02,0.6\n")
            .unwrap();

        let config = LoaderConfig::default().with_normalize_fractions(false);
        let series = DataLoader::new(config).load(&path).unwrap();

        assert_eq!(series.rates(), vec![0.5, 0.6]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = DataLoader::default().load("does/not/exist.xlsx").unwrap_err();
        assert!(matches!(err, LoaderError::FileNotFound(_)));
    }

    #[test]
    fn test_load_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.txt");
        std::fs::write(&path, "Fecha,Tasa\n").unwrap();

        let err = DataLoader::default().load(&path).unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_load_header_only_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.csv");
        std::fs::write(&path, "Fecha,Tasa de Desempleo  (%)\n").unwrap();

        let err = DataLoader::default().load(&path).unwrap_err();
        assert!(matches!(err, LoaderError::EmptySeries(_)));
    }
}
