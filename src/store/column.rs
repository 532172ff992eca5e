//! Typed column keys and column payloads

use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{DiagnosticError, Result};

/// What a column holds
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnKind {
    /// Targets as supplied at process start
    OriginalTarget,
    /// Group id per sample
    Group,
    /// Constraint-adjusted targets of one iteration
    AdjustedTarget,
    /// Predictions of one iteration
    Prediction,
}

/// Column identity: a kind plus, for per-iteration kinds, the iteration.
///
/// Keys are only built through the constructors, so a per-iteration kind
/// always carries its iteration and the run-level kinds never do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnKey {
    kind: ColumnKind,
    iteration: Option<usize>,
}

impl ColumnKey {
    pub fn original_target() -> Self {
        Self {
            kind: ColumnKind::OriginalTarget,
            iteration: None,
        }
    }

    pub fn group() -> Self {
        Self {
            kind: ColumnKind::Group,
            iteration: None,
        }
    }

    pub fn prediction(iteration: usize) -> Self {
        Self {
            kind: ColumnKind::Prediction,
            iteration: Some(iteration),
        }
    }

    /// Adjusted targets of `iteration`.
    ///
    /// The pretraining iteration has no adjusted targets: its target slot is
    /// the original target, so `adjusted_target(0)` is the original target key.
    pub fn adjusted_target(iteration: usize) -> Self {
        if iteration == 0 {
            return Self::original_target();
        }
        Self {
            kind: ColumnKind::AdjustedTarget,
            iteration: Some(iteration),
        }
    }

    /// The target column compared against `prediction(iteration)`
    pub fn target_for(iteration: usize) -> Self {
        Self::adjusted_target(iteration)
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn iteration(&self) -> Option<usize> {
        self.iteration
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.iteration) {
            (ColumnKind::OriginalTarget, _) => f.write_str("original_target"),
            (ColumnKind::Group, _) => f.write_str("group"),
            (ColumnKind::AdjustedTarget, Some(i)) => write!(f, "adjusted_target_{i}"),
            (ColumnKind::Prediction, Some(i)) => write!(f, "prediction_{i}"),
            (kind, None) => write!(f, "{kind:?}"),
        }
    }
}

impl Serialize for ColumnKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Column payload
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    /// Discrete values: class labels or group ids
    Labels(Vec<usize>),
    /// Continuous values
    Values(Vec<f64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Labels(v) => v.len(),
            Column::Values(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_labels(&self) -> Option<&[usize]> {
        match self {
            Column::Labels(v) => Some(v),
            Column::Values(_) => None,
        }
    }

    pub fn as_values(&self) -> Option<&[f64]> {
        match self {
            Column::Values(v) => Some(v),
            Column::Labels(_) => None,
        }
    }

    /// Values as class labels; continuous values must be non-negative integers
    pub fn labels(&self, key: ColumnKey) -> Result<Cow<'_, [usize]>> {
        match self {
            Column::Labels(v) => Ok(Cow::Borrowed(v)),
            Column::Values(v) => labels_from_values(key, v).map(Cow::Owned),
        }
    }

    /// Values as floats, converting labels
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            Column::Labels(v) => v.iter().map(|&l| l as f64).collect(),
            Column::Values(v) => v.clone(),
        }
    }
}

/// Read class labels supplied as floats (e.g. `[0.0, 1.0, 2.0]`)
pub(crate) fn labels_from_values(key: ColumnKey, values: &[f64]) -> Result<Vec<usize>> {
    values
        .iter()
        .enumerate()
        .map(|(row, &value)| {
            if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
                Ok(value as usize)
            } else {
                Err(DiagnosticError::InvalidLabel {
                    column: key,
                    row,
                    value,
                })
            }
        })
        .collect()
}

impl From<Vec<usize>> for Column {
    fn from(labels: Vec<usize>) -> Self {
        Column::Labels(labels)
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Column::Values(values)
    }
}
