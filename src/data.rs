//! Input data handed over by the host optimizer

use ndarray::{Array2, ArrayView1};

use crate::error::{DiagnosticError, Result};

/// Named feature matrix, one row per sample
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureTable {
    names: Vec<String>,
    values: Array2<f64>,
}

impl FeatureTable {
    /// Create a feature table from column names and a `(samples, features)` matrix
    pub fn new<S: Into<String>>(names: Vec<S>, values: Array2<f64>) -> Result<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() != values.ncols() {
            return Err(DiagnosticError::ShapeMismatch {
                context: "feature table columns".into(),
                expected: values.ncols(),
                actual: names.len(),
            });
        }
        Ok(Self { names, values })
    }

    /// Build a table from named columns of equal length
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<f64>)>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, |(_, c)| c.len());
        let mut values = Array2::zeros((n_rows, columns.len()));
        let mut names = Vec::with_capacity(columns.len());
        for (j, (name, column)) in columns.into_iter().enumerate() {
            let name = name.into();
            if column.len() != n_rows {
                return Err(DiagnosticError::ShapeMismatch {
                    context: format!("feature column '{name}'"),
                    expected: n_rows,
                    actual: column.len(),
                });
            }
            for (i, v) in column.into_iter().enumerate() {
                values[[i, j]] = v;
            }
            names.push(name);
        }
        Ok(Self { names, values })
    }

    /// Number of samples
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of feature columns
    pub fn n_columns(&self) -> usize {
        self.values.ncols()
    }

    /// Column names in matrix order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The raw matrix
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Column view by position
    pub fn column(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.column(index)
    }

    /// Positions of the columns whose name starts with `prefix`, in matrix order
    pub fn columns_with_prefix(&self, prefix: &str) -> Vec<usize> {
        self.names
            .iter()
            .enumerate()
            .filter(|(_, name)| name.starts_with(prefix))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Model output for one iteration
#[derive(Clone, Debug, PartialEq)]
pub enum Predictions {
    /// One value per sample: regression outputs or binary scores
    Values(Vec<f64>),
    /// `(samples, classes)` scores: probabilities or logits
    Scores(Array2<f64>),
}

impl Predictions {
    /// Number of samples covered
    pub fn len(&self) -> usize {
        match self {
            Predictions::Values(v) => v.len(),
            Predictions::Scores(s) => s.nrows(),
        }
    }

    /// Whether no sample is covered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<f64>> for Predictions {
    fn from(values: Vec<f64>) -> Self {
        Predictions::Values(values)
    }
}

impl From<Array2<f64>> for Predictions {
    fn from(scores: Array2<f64>) -> Self {
        Predictions::Scores(scores)
    }
}

/// Held-out data the optimizer evaluates against
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationData {
    pub features: FeatureTable,
    pub targets: Vec<f64>,
}

impl ValidationData {
    pub fn new(features: FeatureTable, targets: Vec<f64>) -> Self {
        Self { features, targets }
    }

    /// Number of validation samples
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
