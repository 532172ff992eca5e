//! Append-only diagnostic table

use std::collections::BTreeMap;

use serde::Serialize;

use super::column::{Column, ColumnKey, ColumnKind};
use crate::error::{DiagnosticError, Result};

/// Table of per-sample columns that only ever grows by whole columns.
///
/// The row count is fixed at construction. A column can be written once; a
/// second write to the same key fails and leaves the stored column untouched.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IterationStore {
    row_count: usize,
    columns: BTreeMap<ColumnKey, Column>,
    iterations: Vec<usize>,
}

impl IterationStore {
    /// Create an empty table with a fixed number of rows
    pub fn new(row_count: usize) -> Self {
        Self {
            row_count,
            columns: BTreeMap::new(),
            iterations: Vec::new(),
        }
    }

    /// Number of rows (samples)
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of written columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Write a new column
    pub fn append(&mut self, key: ColumnKey, column: impl Into<Column>) -> Result<()> {
        let column = column.into();
        self.check_append(key, column.len())?;
        if key.kind() == ColumnKind::Prediction {
            if let Some(iteration) = key.iteration() {
                self.iterations.push(iteration);
            }
        }
        self.columns.insert(key, column);
        Ok(())
    }

    /// Check that a column of `len` values could be written under `key`
    pub fn check_append(&self, key: ColumnKey, len: usize) -> Result<()> {
        if self.columns.contains_key(&key) {
            return Err(DiagnosticError::ColumnAlreadyWritten { column: key });
        }
        if len != self.row_count {
            return Err(DiagnosticError::RowCountMismatch {
                column: key,
                expected: self.row_count,
                actual: len,
            });
        }
        Ok(())
    }

    pub fn contains(&self, key: ColumnKey) -> bool {
        self.columns.contains_key(&key)
    }

    pub fn get(&self, key: ColumnKey) -> Option<&Column> {
        self.columns.get(&key)
    }

    /// Written column keys in kind/iteration order
    pub fn keys(&self) -> impl Iterator<Item = ColumnKey> + '_ {
        self.columns.keys().copied()
    }

    /// Group ids, if the group column was written
    pub fn group(&self) -> Option<&[usize]> {
        self.get(ColumnKey::group()).and_then(Column::as_labels)
    }

    /// Columns written for iteration `i`: its predictions and, after
    /// pretraining, its adjusted targets
    pub fn columns_for_iteration(&self, iteration: usize) -> Vec<ColumnKey> {
        let mut keys = vec![ColumnKey::prediction(iteration)];
        if iteration > 0 {
            keys.push(ColumnKey::adjusted_target(iteration));
        }
        keys.retain(|key| self.contains(*key));
        keys
    }

    /// Recorded iterations in arrival order
    pub fn iterations(&self) -> impl Iterator<Item = usize> + '_ {
        self.iterations.iter().copied()
    }

    /// Number of recorded iterations
    pub fn iteration_count(&self) -> usize {
        self.iterations.len()
    }

    /// Most recently recorded iteration
    pub fn last_iteration(&self) -> Option<usize> {
        self.iterations.last().copied()
    }

    /// Serialize the table as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
