//! Test category lookup entity.

use serde::{Deserialize, Serialize};

/// A classification a test can belong to. Referenced, never owned, by tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// Store-assigned id; `None` until inserted
    pub id: Option<i64>,
    pub name: String,
}

impl Category {
    pub fn new(name: String) -> Self {
        Self { id: None, name }
    }
}
