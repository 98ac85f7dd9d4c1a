//! Integrity checks for a loaded historical series.
//!
//! Checks:
//! - Duplicate dates
//! - Daily spacing between consecutive observations
//! - Rates within the 0-100 percent range
//!
//! The checks are informational. The forecaster assumes neither unique nor
//! evenly spaced dates.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::data::HistoricalSeries;

/// Maximum number of offending items listed in a check's details.
const MAX_DETAILS: usize = 5;

/// Result of a single validation check.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    pub fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
            details,
        }
    }
}

/// Integrity report for one series.
#[derive(Debug, Clone)]
pub struct SeriesReport {
    pub observations: usize,
    pub checks: Vec<CheckResult>,
}

impl SeriesReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_checks(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    pub fn summary(&self) -> String {
        let passed = self.checks.iter().filter(|c| c.passed).count();
        format!(
            "{} observations: {}/{} checks passed",
            self.observations,
            passed,
            self.checks.len()
        )
    }
}

/// Run every check on `series`.
pub fn validate_series(series: &HistoricalSeries) -> SeriesReport {
    SeriesReport {
        observations: series.len(),
        checks: vec![
            check_duplicate_dates(series),
            check_daily_spacing(series),
            check_rate_range(series),
        ],
    }
}

fn check_duplicate_dates(series: &HistoricalSeries) -> CheckResult {
    let mut seen = HashSet::new();
    let mut duplicates: Vec<NaiveDate> = Vec::new();
    for obs in series.observations() {
        if !seen.insert(obs.date) && !duplicates.contains(&obs.date) {
            duplicates.push(obs.date);
        }
    }

    if duplicates.is_empty() {
        CheckResult::pass("duplicate_dates", "All dates unique")
    } else {
        CheckResult::fail(
            "duplicate_dates",
            &format!("{} dates appear more than once", duplicates.len()),
            Some(join_limited(duplicates.iter().map(|d| d.to_string()))),
        )
    }
}

fn check_daily_spacing(series: &HistoricalSeries) -> CheckResult {
    let gaps: Vec<String> = series
        .observations()
        .windows(2)
        .filter_map(|pair| {
            let days = (pair[1].date - pair[0].date).num_days();
            (days > 1).then(|| format!("{} to {} ({} days)", pair[0].date, pair[1].date, days))
        })
        .collect();

    if gaps.is_empty() {
        CheckResult::pass("daily_spacing", "Observations are at most one day apart")
    } else {
        CheckResult::fail(
            "daily_spacing",
            &format!("{} gaps longer than one day", gaps.len()),
            Some(join_limited(gaps.into_iter())),
        )
    }
}

fn check_rate_range(series: &HistoricalSeries) -> CheckResult {
    let out_of_range: Vec<String> = series
        .observations()
        .iter()
        .filter(|o| !(0.0..=100.0).contains(&o.rate))
        .map(|o| format!("{}: {}", o.date, o.rate))
        .collect();

    if out_of_range.is_empty() {
        CheckResult::pass("rate_range", "All rates within [0, 100]")
    } else {
        CheckResult::fail(
            "rate_range",
            &format!("{} rates outside [0, 100]", out_of_range.len()),
            Some(join_limited(out_of_range.into_iter())),
        )
    }
}

fn join_limited(items: impl Iterator<Item = String>) -> String {
    let items: Vec<String> = items.collect();
    let shown = items.iter().take(MAX_DETAILS).cloned().collect::<Vec<_>>().join(", ");
    if items.len() > MAX_DETAILS {
        format!("{} (+{} more)", shown, items.len() - MAX_DETAILS)
    } else {
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Observation;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_clean_series_passes() {
        let series = HistoricalSeries::new(
            (1..=5).map(|d| Observation::new(date(d), 7.0)).collect(),
        );

        let report = validate_series(&series);

        assert!(report.all_passed());
        assert_eq!(report.summary(), "5 observations: 3/3 checks passed");
    }

    #[test]
    fn test_duplicates_flagged() {
        let series = HistoricalSeries::new(vec![
            Observation::new(date(1), 7.0),
            Observation::new(date(2), 7.1),
            Observation::new(date(2), 7.2),
            Observation::new(date(2), 7.3),
        ]);

        let report = validate_series(&series);
        let failed = report.failed_checks();

        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].name, "duplicate_dates");
        assert_eq!(failed[0].details.as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn test_gaps_flagged() {
        let series = HistoricalSeries::new(vec![
            Observation::new(date(1), 7.0),
            Observation::new(date(8), 7.0),
        ]);

        let check = check_daily_spacing(&series);

        assert!(!check.passed);
        assert_eq!(check.details.as_deref(), Some("2024-01-01 to 2024-01-08 (7 days)"));
    }

    #[test]
    fn test_rate_range_flagged() {
        let series = HistoricalSeries::new(vec![
            Observation::new(date(1), -1.0),
            Observation::new(date(2), 150.0),
            Observation::new(date(3), 100.0),
        ]);

        let check = check_rate_range(&series);

        assert!(!check.passed);
        assert_eq!(check.message, "2 rates outside [0, 100]");
    }

    #[test]
    fn test_join_limited() {
        let items = (0..7).map(|i| i.to_string());
        assert_eq!(join_limited(items), "0, 1, 2, 3, 4 (+2 more)");
    }

    #[test]
    fn test_check_result() {
        let pass = CheckResult::pass("test", "passed");
        assert!(pass.passed);

        let fail = CheckResult::fail("test", "failed", Some("details".to_string()));
        assert!(!fail.passed);
        assert_eq!(fail.details, Some("details".to_string()));
    }
}
