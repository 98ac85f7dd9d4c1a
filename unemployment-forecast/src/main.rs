//! Unemployment rate forecaster.
//!
//! # Usage
//!
//! ```bash
//! # Read desempleo.xlsx, show the chart, write predicciones_desempleo.xlsx
//! unemployment-forecast
//!
//! # Different files and parameters, no chart
//! unemployment-forecast --input rates.csv --output forecast.csv --horizon 30 --window 7 --no-chart
//!
//! # Settings from a JSON file (flags still take precedence)
//! unemployment-forecast --config forecast.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use unemployment_forecast::config::PipelineConfig;
use unemployment_forecast::report::section;
use unemployment_forecast::Pipeline;

/// Unemployment rate forecaster CLI.
#[derive(Parser)]
#[command(name = "unemployment-forecast")]
#[command(about = "Forecast unemployment rates with a trailing moving average")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input spreadsheet (xlsx, xls, ods, csv or parquet)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output spreadsheet (xlsx, csv or parquet)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of days to predict
    #[arg(long)]
    horizon: Option<usize>,

    /// Number of most recent values averaged per prediction
    #[arg(long)]
    window: Option<usize>,

    /// Skip the interactive chart
    #[arg(long)]
    no_chart: bool,
}

impl Cli {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(horizon) = self.horizon {
            config.forecast.horizon = horizon;
        }
        if let Some(window) = self.window {
            config.forecast.window = window;
        }
        if self.no_chart {
            config.show_chart = false;
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("unemployment_forecast=info".parse()?),
        )
        .init();

    let config = Cli::parse().into_config()?;
    let input = config.input.display().to_string();

    let pipeline = Pipeline::new(config).context("Invalid configuration")?;
    let outcome = pipeline
        .run()
        .with_context(|| format!("Forecast run failed for '{}'", input))?;

    let body = format!(
        "  Input: {}\n  Observations: {}\n  Predictions: {}\n  Output: {}",
        input,
        outcome.history.len(),
        outcome.predictions.len(),
        outcome.output.display()
    );
    println!("\n{}", section("Forecast complete", &body));

    Ok(())
}
