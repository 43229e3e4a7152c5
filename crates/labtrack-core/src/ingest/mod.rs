//! Bulk CSV ingestion.
//!
//! Two upload shapes exist: person files and test files. Each call parses
//! and validates the whole file first, then persists everything in a single
//! transaction — a failure anywhere leaves nothing from the call behind.
//! Errors surface as one human-readable message; there is no per-row
//! success report.

mod reader;
mod persons;

pub use reader::*;
pub use persons::*;
pub use lab_tests::*;

use std::fmt;
use std::ops::RangeInclusive;

use thiserror::Error;

use crate::db::DbError;

/// Ingestion errors.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("The file must have .csv format, got: {0}")]
    UnsupportedExtension(String),

    #[error("The file is not valid UTF-8")]
    Encoding,

    #[error("The file has no header row")]
    Empty,

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Row {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {line}: invalid date '{value}' (expected MM/DD/YYYY)")]
    MalformedDate { line: usize, value: String },

    #[error("Row {line}: invalid number '{value}' in column {column}")]
    InvalidNumber {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("Row {line}: invalid value '{value}' in column {column}")]
    InvalidValue {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("Unresolved references: {0}")]
    MissingReferences(MissingReferences),
}

pub type IngestResult<T> = Result<T, IngestError>;

/// Foreign keys a test file referenced that the store does not have.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingReferences {
    pub categories: Vec<i64>,
    pub clients: Vec<i64>,
    pub staff: Vec<i64>,
}

impl MissingReferences {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.clients.is_empty() && self.staff.is_empty()
    }
}

impl fmt::Display for MissingReferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "categories {:?}, clients {:?}, staff {:?}",
            self.categories, self.clients, self.staff
        )
    }
}

/// What to do when a test row references a person or category id the store
/// does not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingRefPolicy {
    /// Insert a placeholder person with a random id from the configured
    /// range and reuse it for every row naming the same missing id.
    /// Missing categories are stored as no category.
    Fabricate,
    /// Fail the upload with the full missing-reference report; nothing is
    /// persisted.
    Reject,
}

/// Upload configuration.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub missing_refs: MissingRefPolicy,
    /// Id range for fabricated client placeholders
    pub client_id_range: RangeInclusive<i64>,
    /// Id range for fabricated staff placeholders
    pub staff_id_range: RangeInclusive<i64>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            missing_refs: MissingRefPolicy::Fabricate,
            client_id_range: 1000..=3000,
            staff_id_range: 1000..=2000,
        }
    }
}

/// Uploads are only accepted with a `.csv` extension.
pub fn ensure_csv_extension(filename: &str) -> IngestResult<()> {
    if filename.ends_with(".csv") {
        Ok(())
    } else {
        Err(IngestError::UnsupportedExtension(filename.to_string()))
    }
}
