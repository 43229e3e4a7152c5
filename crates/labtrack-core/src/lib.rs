//! Labtrack Core Library
//!
//! Record store, bulk ingestion, and reporting engine for a clinical test
//! management service.
//!
//! # Architecture
//!
//! ```text
//! CSV upload → Bulk Loader → validation / normalization
//!                                     │
//!                     ┌───────────────┼────────────────┐
//!                     │               │                │
//!              reference caches   Synthetic      placeholder
//!              (persons,          Result         fabrication
//!               categories)       Generator      (policy-driven)
//!                     │               │                │
//!                     └───────────────▼────────────────┘
//!                          single-transaction commit
//!                                     │
//!                              ┌──────▼──────┐
//!                              │   SQLite    │
//!                              │   store     │
//!                              └──────┬──────┘
//!                     ┌───────────────┼────────────────┐
//!                     ▼               ▼                ▼
//!               Aggregation      Ad-hoc Query     NL Query
//!               Engine (KPIs)    Gateway          Boundary
//! ```
//!
//! # Core Principle
//!
//! **Nothing user-supplied ever becomes statement text.** Free-form field
//! names resolve through static allow-list enums, and collaborator query
//! strings pass a SELECT-only validator before running under `query_only`.
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer
//! - [`models`]: Domain types (Person, Category, LabTest, LabResult)
//! - [`ingest`]: Bulk CSV loaders with reference-patching policies
//! - [`synth`]: Keyword-driven synthetic result generator
//! - [`kpi`]: Chart-shaped aggregation reports
//! - [`query`]: Read-only execution boundary for the NL collaborator

pub mod db;
pub mod ingest;
pub mod kpi;
pub mod models;
pub mod query;
pub mod synth;

// Re-export commonly used types
pub use db::Database;
pub use ingest::{
    load_persons, load_tests, IngestError, LoadOptions, MissingRefPolicy, PersonLoadReport,
    TestLoadReport,
};
pub use kpi::{AggOp, KpiError, PersonField, Reports, SortOrder, TestField};
pub use models::{
    Category, ChartSeries, Dataset, LabResult, LabTest, MultiSeries, Person, Role, Sex,
};
pub use query::{execute_query, execute_query_or_empty, schema_description, QueryOutput};
pub use synth::SyntheticResult;
