//! Error types with actionable diagnostics.
//!
//! Every failure in this crate is local and synchronous: lifecycle calls are
//! deterministic and caller-driven, so nothing is retried. An error aborts the
//! diagnostics of the current run.

use thiserror::Error;

use crate::callback::LifecycleState;
use crate::config::GroupEncoding;
use crate::store::ColumnKey;

/// Result type alias for diagnostic operations.
pub type Result<T> = std::result::Result<T, DiagnosticError>;

/// Errors raised while collecting or reducing iteration diagnostics.
#[derive(Error, Debug)]
pub enum DiagnosticError {
    /// The protected-feature prefix matched no feature column.
    #[error("No feature column starts with protected prefix '{prefix}'\n  → Check the protected feature name against the feature table columns")]
    AttributeNotFound { prefix: String },

    /// The configured group encoding disagrees with the matched columns.
    #[error("Protected prefix '{prefix}' matched {matched} column(s), which is invalid for {encoding} encoding")]
    EncodingMismatch {
        prefix: String,
        encoding: GroupEncoding,
        matched: usize,
    },

    /// A single-column group value cannot be used as a group id.
    #[error("Invalid group value {value} at row {row} (group ids must be finite and non-negative)")]
    InvalidGroupValue { row: usize, value: f64 },

    /// A class-oriented target is not a non-negative integral label.
    #[error("Invalid class label {value} at row {row} of {column}")]
    InvalidLabel {
        column: ColumnKey,
        row: usize,
        value: f64,
    },

    /// Iteration events arrived out of the 0, 1, 2, ... sequence.
    #[error("Out-of-order iteration: expected {expected}, got {actual}")]
    OutOfOrderIteration { expected: usize, actual: usize },

    /// A column's length disagrees with the row count snapshot.
    #[error("Row count mismatch for {column}: table has {expected} rows, got {actual} values\n  → Upstream data changed size mid-run")]
    RowCountMismatch {
        column: ColumnKey,
        expected: usize,
        actual: usize,
    },

    /// A column the reduction needs was never written.
    #[error("Column {column} is missing from the diagnostic table")]
    MissingColumn { column: ColumnKey },

    /// A column was written twice.
    #[error("Column {column} has already been written")]
    ColumnAlreadyWritten { column: ColumnKey },

    /// An iteration after pretraining arrived without adjusted targets.
    #[error("Iteration {iteration} has no adjusted targets (required for every iteration > 0)")]
    MissingAdjustedTarget { iteration: usize },

    /// A lifecycle call was made outside its required state.
    #[error("Cannot call {operation} while listener is {state}")]
    InvalidState {
        operation: &'static str,
        state: LifecycleState,
    },

    /// Input arrays have inconsistent shapes.
    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// Configuration value is invalid.
    #[error("Invalid configuration value for '{field}': {message}")]
    InvalidConfig { field: String, message: String },

    /// Report or configuration (de)serialization failed.
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl DiagnosticError {
    /// Create a configuration error for `field`.
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the error points at the caller breaking the lifecycle contract
    /// rather than at bad input data.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::OutOfOrderIteration { .. }
                | Self::ColumnAlreadyWritten { .. }
                | Self::MissingAdjustedTarget { .. }
                | Self::InvalidState { .. }
        )
    }
}

impl From<serde_json::Error> for DiagnosticError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for DiagnosticError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}
