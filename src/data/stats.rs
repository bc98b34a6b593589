//! Aggregate statistics and ordering for a set of city reports.

use serde::Serialize;

use super::reading::CityReport;

/// Aggregate figures over the successful reports of one poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Mean index, rounded to the nearest integer.
    pub average: u32,
    pub min: u32,
    pub max: u32,
    /// First city (in report order) with the lowest index.
    pub best_city: String,
    /// First city (in report order) with the highest index.
    pub worst_city: String,
    /// Number of reports that produced a reading.
    pub succeeded: usize,
    /// Number of reports in the poll.
    pub total: usize,
}

impl Summary {
    /// Computes the summary over non-error reports only.
    ///
    /// Returns `None` when no report succeeded, so the caller can show a
    /// "no data" placeholder instead of stats.
    pub fn compute(reports: &[CityReport]) -> Option<Self> {
        let readings: Vec<_> = reports.iter().filter_map(|r| r.reading()).collect();
        if readings.is_empty() {
            return None;
        }

        let sum: u64 = readings.iter().map(|r| r.aqi as u64).sum();
        let count = readings.len() as u64;
        let average = ((sum as f64) / (count as f64)).round() as u32;

        // First occurrence wins on ties at both ends.
        let min = readings.iter().map(|r| r.aqi).min()?;
        let max = readings.iter().map(|r| r.aqi).max()?;
        let best = readings.iter().find(|r| r.aqi == min)?;
        let worst = readings.iter().find(|r| r.aqi == max)?;

        Some(Self {
            average,
            min,
            max,
            best_city: best.city.clone(),
            worst_city: worst.city.clone(),
            succeeded: readings.len(),
            total: reports.len(),
        })
    }
}

/// Returns the reports in display order: successes by descending index,
/// then every failed report.
///
/// The sort is stable, so equal indices (and all failures) keep their
/// registry order.
pub fn sorted_reports(reports: &[CityReport]) -> Vec<&CityReport> {
    let mut sorted: Vec<&CityReport> = reports.iter().collect();
    sorted.sort_by(|a, b| match (a.aqi(), b.aqi()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    sorted
}

/// Returns the most severe band index among successful reports.
pub fn worst_severity(reports: &[CityReport]) -> Option<usize> {
    reports
        .iter()
        .filter_map(|r| r.reading())
        .map(|r| r.category.severity())
        .max()
}
