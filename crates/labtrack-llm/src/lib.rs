//! Natural-language-to-query collaborator for labtrack.
//!
//! Turns a free-text reporting request plus the core's schema description
//! into a single SQL query string. This crate only produces the string;
//! execution stays behind `labtrack_core::query`, which validates and runs
//! it read-only.

pub mod prompts;
pub mod synthesis;

#[cfg(feature = "remote")]
pub mod client;

pub use prompts::*;
pub use synthesis::*;
