//! Plot geometry for the history/forecast chart.
//!
//! Dates map to x as whole days since the earliest plotted date, rates map
//! to y unchanged.

use chrono::NaiveDate;

use crate::data::{HistoricalSeries, Prediction};

/// Points sampled along the transition segment.
const CONNECTOR_SAMPLES: usize = 48;

/// Consecutive samples drawn (then skipped) per dash.
const DASH_LENGTH: usize = 4;

/// Dashed segment from the last observation to the first prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub start: (f64, f64),
    pub end: (f64, f64),
    /// Visible dash points, `start` and `end` included.
    pub points: Vec<(f64, f64)>,
}

/// Everything needed to draw the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    /// Date at x = 0.
    pub origin: NaiveDate,
    pub historical: Vec<(f64, f64)>,
    pub predicted: Vec<(f64, f64)>,
    pub connector: Option<Connector>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl ChartData {
    /// Build the chart geometry. Neither input is modified.
    pub fn build(history: &HistoricalSeries, predictions: &[Prediction]) -> Self {
        let first_prediction = predictions.iter().map(|p| p.date).min();
        let origin = match (history.first_date(), first_prediction) {
            (Some(h), Some(p)) => h.min(p),
            (Some(h), None) => h,
            (None, Some(p)) => p,
            (None, None) => NaiveDate::default(),
        };
        let x = |date: NaiveDate| (date - origin).num_days() as f64;

        let historical: Vec<(f64, f64)> = history
            .observations()
            .iter()
            .map(|o| (x(o.date), o.rate))
            .collect();
        let predicted: Vec<(f64, f64)> = predictions
            .iter()
            .map(|p| (x(p.date), p.predicted_rate))
            .collect();

        let connector = match (history.last_date(), first_prediction) {
            (Some(last), Some(first)) if last < first => {
                let start_rate = history.rate_on(last);
                let end_rate = predictions
                    .iter()
                    .find(|p| p.date == first)
                    .map(|p| p.predicted_rate);
                match (start_rate, end_rate) {
                    (Some(s), Some(e)) => {
                        let start = (x(last), s);
                        let end = (x(first), e);
                        Some(Connector {
                            start,
                            end,
                            points: dashed_segment(start, end),
                        })
                    }
                    _ => None,
                }
            }
            _ => None,
        };

        let max_x = historical
            .iter()
            .chain(predicted.iter())
            .map(|&(x, _)| x)
            .fold(0.0, f64::max);

        let y_bounds = value_bounds(historical.iter().chain(predicted.iter()).map(|&(_, y)| y));

        Self {
            origin,
            historical,
            predicted,
            connector,
            x_bounds: [0.0, max_x.max(1.0)],
            y_bounds,
        }
    }

    /// Date labels for the start, middle and end of the x axis.
    pub fn x_labels(&self, date_format: &str) -> Vec<String> {
        let [lo, hi] = self.x_bounds;
        [lo, (lo + hi) / 2.0, hi]
            .iter()
            .map(|&x| {
                (self.origin + chrono::Duration::days(x.round() as i64))
                    .format(date_format)
                    .to_string()
            })
            .collect()
    }

    /// Rate labels for the bottom, middle and top of the y axis.
    pub fn y_labels(&self) -> Vec<String> {
        let [lo, hi] = self.y_bounds;
        vec![
            format!("{:.2}", lo),
            format!("{:.2}", (lo + hi) / 2.0),
            format!("{:.2}", hi),
        ]
    }
}

/// Pad the value range by 5% of its span, or by 0.5 when flat.
fn value_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let span = max - min;
    let pad = if span > 0.0 { span * 0.05 } else { 0.5 };
    [min - pad, max + pad]
}

fn dashed_segment(start: (f64, f64), end: (f64, f64)) -> Vec<(f64, f64)> {
    (0..=CONNECTOR_SAMPLES)
        .filter(|i| (i / DASH_LENGTH) % 2 == 0)
        .map(|i| {
            let t = i as f64 / CONNECTOR_SAMPLES as f64;
            (
                start.0 + (end.0 - start.0) * t,
                start.1 + (end.1 - start.1) * t,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Observation;
    use chrono::Duration;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn history() -> HistoricalSeries {
        HistoricalSeries::new(vec![
            Observation::new(date(1), 5.0),
            Observation::new(date(2), 6.0),
            Observation::new(date(3), 7.0),
        ])
    }

    fn predictions() -> Vec<Prediction> {
        vec![
            Prediction::new(date(4), 6.0),
            Prediction::new(date(5), 6.5),
        ]
    }

    #[test]
    fn test_build_positions() {
        let data = ChartData::build(&history(), &predictions());

        assert_eq!(data.origin, date(1));
        assert_eq!(data.historical, vec![(0.0, 5.0), (1.0, 6.0), (2.0, 7.0)]);
        assert_eq!(data.predicted, vec![(3.0, 6.0), (4.0, 6.5)]);
        assert_eq!(data.x_bounds, [0.0, 4.0]);
    }

    #[test]
    fn test_connector_links_last_and_first() {
        let data = ChartData::build(&history(), &predictions());

        let connector = data.connector.expect("connector expected");
        assert_eq!(connector.start, (2.0, 7.0));
        assert_eq!(connector.end, (3.0, 6.0));
        assert_eq!(connector.points.first(), Some(&(2.0, 7.0)));
        assert_eq!(connector.points.last(), Some(&(3.0, 6.0)));
        assert!(connector.points.len() < CONNECTOR_SAMPLES + 1);
    }

    #[test]
    fn test_no_connector_when_prediction_not_after_history() {
        let overlapping = vec![Prediction::new(date(3), 6.0)];
        let data = ChartData::build(&history(), &overlapping);
        assert!(data.connector.is_none());

        let data = ChartData::build(&history(), &[]);
        assert!(data.connector.is_none());
        assert!(data.predicted.is_empty());
    }

    #[test]
    fn test_y_bounds_padded() {
        let data = ChartData::build(&history(), &predictions());
        assert!(data.y_bounds[0] < 5.0);
        assert!(data.y_bounds[1] > 7.0);
    }

    #[test]
    fn test_flat_series_bounds() {
        let flat = HistoricalSeries::new(vec![Observation::new(date(1), 7.0)]);
        let preds = vec![Prediction::new(date(1) + Duration::days(1), 7.0)];

        let data = ChartData::build(&flat, &preds);

        assert_eq!(data.y_bounds, [6.5, 7.5]);
    }

    #[test]
    fn test_x_labels() {
        let data = ChartData::build(&history(), &predictions());
        let labels = data.x_labels("%d/%m/%Y");
        assert_eq!(labels, vec!["01/01/2024", "03/01/2024", "05/01/2024"]);
    }

    #[test]
    fn test_empty_inputs() {
        let data = ChartData::build(&HistoricalSeries::default(), &[]);
        assert_eq!(data.x_bounds, [0.0, 1.0]);
        assert_eq!(data.y_bounds, [0.0, 1.0]);
    }
}
