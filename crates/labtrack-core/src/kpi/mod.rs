//! Aggregation engine: read-only reporting queries over the store.
//!
//! Every function produces a chart-shaped value (`ChartSeries` /
//! `MultiSeries`). Calendar-dependent reports take the reference date as
//! a parameter instead of reading the clock, so they are testable; callers
//! pass `Local::now().date_naive()`.

mod volume;
mod quality;
mod demographics;
mod fields;

pub use fields::*;

#[allow(unused_imports)]
pub use quality::*;

use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::ChartSeries;

/// Reporting errors.
#[derive(Error, Debug)]
pub enum KpiError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("The field '{name}' does not exist on the {entity} entity")]
    UnknownField { entity: &'static str, name: String },

    #[error("Invalid operation '{0}' (expected sum or avg)")]
    InvalidOperation(String),

    #[error("Operation avg requires a numeric field, got '{0}'")]
    NonNumericField(String),
}

impl From<rusqlite::Error> for KpiError {
    fn from(e: rusqlite::Error) -> Self {
        KpiError::Db(DbError::Sqlite(e))
    }
}

pub type KpiResult<T> = Result<T, KpiError>;

/// Read-only report runner borrowing the store.
pub struct Reports<'a> {
    db: &'a Database,
}

impl<'a> Reports<'a> {
    /// Create a new report runner.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub(crate) fn db(&self) -> &Database {
        self.db
    }
}

/// Fixed month labels for the monthly volume chart.
pub(crate) const MONTH_LABELS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Turn grouped counts into a percentage-of-total series.
///
/// All zeros when the total is zero; no division-by-zero ever escapes.
pub(crate) fn to_percentages(counts: Vec<(String, i64)>) -> ChartSeries {
    let total: i64 = counts.iter().map(|(_, n)| n).sum();
    let data = counts
        .iter()
        .map(|(_, n)| {
            if total > 0 {
                *n as f64 / total as f64 * 100.0
            } else {
                0.0
            }
        })
        .collect();
    ChartSeries {
        labels: counts.into_iter().map(|(label, _)| label).collect(),
        data,
    }
}

/// Round to two decimal places, the precision ratings are reported at.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_percentages() {
        let series = to_percentages(vec![("a".into(), 1), ("b".into(), 3)]);
        assert_eq!(series.labels, vec!["a", "b"]);
        assert_eq!(series.data, vec![25.0, 75.0]);
        assert!((series.total() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_to_percentages_empty_total() {
        let series = to_percentages(vec![("a".into(), 0), ("b".into(), 0)]);
        assert_eq!(series.data, vec![0.0, 0.0]);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(7.456), 7.46);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(3.333333), 3.33);
    }
}
