//! Resampled, long-form run tables

use serde::{Deserialize, Serialize};

use crate::event::Entities;

/// One condition channel sampled on the run's time grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// A run resampled onto a fixed `TR` grid.
///
/// Rows are time bins in ascending order; `onset[k] == k * tr`. Every column
/// has exactly `onset.len()` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResampledRun {
    /// Identity of the run this grid was computed from
    pub entities: Entities,
    /// Bin width in seconds
    pub tr: f64,
    /// Start time of every bin
    pub onset: Vec<f64>,
    /// Condition channels, ordered by first appearance in the source table
    pub columns: Vec<Column>,
}

impl ResampledRun {
    /// Number of time bins
    pub fn n_bins(&self) -> usize {
        self.onset.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Keep only the named columns, preserving the table's column order.
    pub fn retain_columns(&mut self, keep: &[String]) {
        self.columns.retain(|c| keep.iter().any(|k| *k == c.name));
    }
}
