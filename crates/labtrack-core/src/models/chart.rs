//! Chart-shaped reporting payloads.

use serde::{Deserialize, Serialize};

/// A single labeled series, ready for a chart frontend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

impl ChartSeries {
    pub fn new(labels: Vec<String>, data: Vec<f64>) -> Self {
        debug_assert_eq!(labels.len(), data.len());
        Self { labels, data }
    }

    /// Build from (label, value) pairs preserving their order.
    pub fn from_pairs(pairs: Vec<(String, f64)>) -> Self {
        let (labels, data) = pairs.into_iter().unzip();
        Self { labels, data }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.data.iter().sum()
    }
}

/// One line/bar in a multi-series chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

/// Shared labels with one dataset per series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MultiSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}
