//! Weight-trend series for the progress chart.
//!
//! The weight ledger is newest-first; charts want oldest-first. This module
//! flips it into a plottable series and can export that series as CSV.

use crate::{Result, WeightEntry};
use chrono::{DateTime, Utc};
use std::io::Write;

/// One point on the weight chart
#[derive(Clone, Debug, PartialEq)]
pub struct WeightPoint {
    pub date: DateTime<Utc>,
    pub weight: f64,
    pub body_fat: Option<f64>,
}

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    weight: f64,
    body_fat: Option<f64>,
}

impl From<&WeightPoint> for CsvRow {
    fn from(point: &WeightPoint) -> Self {
        CsvRow {
            date: point.date.to_rfc3339(),
            weight: point.weight,
            body_fat: point.body_fat,
        }
    }
}

/// Chronological (oldest first) series from the newest-first ledger
pub fn weight_series(weights: &[WeightEntry]) -> Vec<WeightPoint> {
    weights
        .iter()
        .rev()
        .map(|w| WeightPoint {
            date: w.date,
            weight: w.weight,
            body_fat: w.body_fat,
        })
        .collect()
}

/// Net change from the first to the last point, if there are two or more
pub fn net_change(series: &[WeightPoint]) -> Option<f64> {
    match (series.first(), series.last()) {
        (Some(first), Some(last)) if series.len() > 1 => Some(last.weight - first.weight),
        _ => None,
    }
}

/// Write the series as CSV with a header row
pub fn write_csv<W: Write>(series: &[WeightPoint], writer: W) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(writer);

    for point in series {
        writer.serialize(CsvRow::from(point))?;
    }
    writer.flush()?;

    tracing::debug!("Wrote {} weight points as CSV", series.len());
    Ok(series.len())
}
