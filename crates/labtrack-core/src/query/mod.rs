//! Execution boundary for the natural-language query collaborator.
//!
//! The collaborator turns free text into a query string; this module is the
//! only place that string may be executed. Defense is layered: a validator
//! rejects anything but a single SELECT statement, and execution runs under
//! SQLite's `query_only` pragma so even a validator miss cannot write.

use rusqlite::types::ValueRef;
use serde::Serialize;
use thiserror::Error;

use crate::db::{Database, DbError};

/// Version tag for [`SCHEMA_DESCRIPTION`]. Bump when the queryable surface
/// changes so the collaborator can detect drift.
pub const SCHEMA_VERSION: &str = "1";

/// Static description of the queryable tables, handed to the collaborator
/// as prompt context.
pub const SCHEMA_DESCRIPTION: &str = r#"
Table: persons
  - id (INTEGER)
  - name (TEXT)
  - surname (TEXT)
  - sex (TEXT: 'masculino' or 'femenino')
  - birth_date (TEXT, ISO date, may be NULL)
  - phone (TEXT)
  - role (TEXT: 'cliente' or 'personal')
  - specialty (TEXT, may be NULL)

Table: categories
  - id (INTEGER)
  - name (TEXT)

Table: lab_tests
  - id (INTEGER)
  - name (TEXT)
  - requested_date (TEXT, ISO date)
  - delivery_date (TEXT, ISO date)
  - status (TEXT)
  - observations (TEXT, may be NULL)
  - rating (INTEGER)
  - category_id (INTEGER, references categories.id, may be NULL)
  - client_id (INTEGER, references persons.id)
  - staff_id (INTEGER, references persons.id)

Table: lab_results
  - id (INTEGER)
  - test_id (INTEGER, references lab_tests.id)
  - result (TEXT)
  - date (TEXT, ISO date)
  - interpretation (TEXT)
  - details (TEXT)
"#;

/// The schema description for the collaborator.
pub fn schema_description() -> &'static str {
    SCHEMA_DESCRIPTION
}

/// Query boundary errors.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Query rejected: {0}")]
    Rejected(String),
}

impl From<rusqlite::Error> for QueryError {
    fn from(e: rusqlite::Error) -> Self {
        QueryError::Db(DbError::Sqlite(e))
    }
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Rows returned across the boundary.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl QueryOutput {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Statement keywords that never belong in a collaborator query.
const FORBIDDEN_KEYWORDS: &[&str] = &[
    "insert", "update", "delete", "drop", "alter", "create", "replace", "attach", "detach",
    "pragma", "vacuum", "reindex", "begin", "commit", "rollback",
];

/// Check a collaborator query: exactly one statement, and it must be a
/// SELECT with no mutating or administrative keywords anywhere.
pub fn validate_query(raw: &str) -> QueryResult<String> {
    let trimmed = raw.trim().trim_end_matches(';').trim();
    if trimmed.is_empty() {
        return Err(QueryError::Rejected("empty query".into()));
    }
    if trimmed.contains(';') {
        return Err(QueryError::Rejected(
            "multiple statements are not allowed".into(),
        ));
    }

    let lower = trimmed.to_lowercase();
    let mut words = lower.split(|c: char| !c.is_alphanumeric() && c != '_');
    if words.next() != Some("select") {
        return Err(QueryError::Rejected("only SELECT queries are allowed".into()));
    }
    for word in words {
        if FORBIDDEN_KEYWORDS.contains(&word) {
            return Err(QueryError::Rejected(format!("forbidden keyword: {}", word)));
        }
    }

    Ok(trimmed.to_string())
}

/// Validate and execute a collaborator query read-only.
pub fn execute_query(db: &Database, raw: &str) -> QueryResult<QueryOutput> {
    let query = validate_query(raw)?;

    let conn = db.conn();
    conn.pragma_update(None, "query_only", true)?;
    let result = run_select(db, &query);
    conn.pragma_update(None, "query_only", false)?;
    result
}

/// The lenient boundary: failures are logged and become an empty result
/// set, never a hard failure to the caller.
pub fn execute_query_or_empty(db: &Database, raw: &str) -> QueryOutput {
    match execute_query(db, raw) {
        Ok(output) => output,
        Err(e) => {
            log::warn!("collaborator query failed: {}", e);
            QueryOutput::empty()
        }
    }
}

fn run_select(db: &Database, query: &str) -> QueryResult<QueryOutput> {
    let mut stmt = db.conn().prepare(query)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let ncols = columns.len();

    let mut out_rows = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut out = Vec::with_capacity(ncols);
        for i in 0..ncols {
            out.push(value_to_json(row.get_ref(i)?));
        }
        out_rows.push(out);
    }

    Ok(QueryOutput {
        columns,
        rows: out_rows,
    })
}

fn value_to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => i.into(),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(t) => serde_json::Value::String(String::from_utf8_lossy(t).into_owned()),
        // Blobs are not part of the queryable surface
        ValueRef::Blob(_) => serde_json::Value::Null,
    }
}
