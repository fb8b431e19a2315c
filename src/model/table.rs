//! Reference Table Module
//!
//! Loads the reference training table (CSV, header row of feature names,
//! numeric cells) and exposes per-column means. The means are computed once
//! at load time; the table never changes afterwards, so they double as the
//! baseline feature values for reconstruction.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CropStressError, Result};

/// An immutable numeric table reduced to its column statistics.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    columns: Vec<String>,
    means: HashMap<String, f64>,
    n_rows: usize,
}

impl ReferenceTable {
    /// Load a table from a CSV file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    /// Load a table from any reader producing CSV with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        if columns.is_empty() {
            return Err(CropStressError::Table(
                "reference table has no columns".to_string(),
            ));
        }

        let mut sums = vec![0.0f64; columns.len()];
        let mut n_rows = 0usize;

        for (row, record) in reader.records().enumerate() {
            let record = record?;
            // CSV line numbers: header is line 1. Ragged rows are rejected
            // by the reader itself before we get here.
            let line = row + 2;
            for (col, cell) in record.iter().enumerate() {
                let value: f64 = cell.trim().parse().map_err(|_| {
                    CropStressError::Table(format!(
                        "line {line}, column '{}': not a number: '{cell}'",
                        columns[col]
                    ))
                })?;
                sums[col] += value;
            }
            n_rows += 1;
        }

        if n_rows == 0 {
            return Err(CropStressError::Table(
                "reference table has no data rows".to_string(),
            ));
        }

        let means = columns
            .iter()
            .zip(&sums)
            .map(|(name, sum)| (name.clone(), sum / n_rows as f64))
            .collect();

        Ok(Self {
            columns,
            means,
            n_rows,
        })
    }

    /// Column names in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of data rows the means were computed over.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Per-column mean values.
    pub fn column_means(&self) -> &HashMap<String, f64> {
        &self.means
    }

    /// Consume the table, keeping only the mean map.
    pub fn into_column_means(self) -> HashMap<String, f64> {
        self.means
    }
}
