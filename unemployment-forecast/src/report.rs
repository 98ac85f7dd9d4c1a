//! Console listings for observations and predictions.

use crate::data::{HistoricalSeries, Prediction};

/// Date layout used in console listings.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Number of trailing observations listed before forecasting.
pub const RECENT_OBSERVATIONS: usize = 5;

const SEPARATOR: &str = "============================================================";

/// List the last `n` observations, one per line.
pub fn recent_observations(series: &HistoricalSeries, n: usize) -> String {
    series
        .tail(n)
        .iter()
        .map(|o| {
            format!(
                "Date: {}, Unemployment rate: {:.6}%",
                o.date.format(DISPLAY_DATE_FORMAT),
                o.rate
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// List predictions, one per line.
pub fn prediction_lines(predictions: &[Prediction]) -> String {
    predictions
        .iter()
        .map(|p| {
            format!(
                "Date: {}, Prediction: {:.6}%",
                p.date.format(DISPLAY_DATE_FORMAT),
                p.predicted_rate
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Framed block with a title line and body.
pub fn section(title: &str, body: &str) -> String {
    format!("{SEPARATOR}\n{title}\n{SEPARATOR}\n{body}")
}
