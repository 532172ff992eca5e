//! Diagnostic configuration
//!
//! A configuration fixes, per listener, which diagnostic is collected, how
//! the protected feature is encoded in the feature table, and how many
//! subplot columns the renderer should lay panels out on.
//!
//! # Example
//!
//! ```
//! use ajuste::{DiagnosticConfig, DiagnosticMode, GroupEncoding};
//!
//! let config = DiagnosticConfig::from_yaml(
//!     r#"
//! mode: fairness_classification
//! num_columns: 2
//! protected:
//!   prefix: race
//!   encoding: one_hot
//! "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.mode, DiagnosticMode::FairnessClassification);
//! assert_eq!(config.protected.unwrap().encoding, GroupEncoding::OneHot);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DiagnosticError, Result};

/// Which comparison the listener collects and reduces
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticMode {
    /// Class counts of targets vs predictions, independent of groups
    Balance,
    /// Per-group spread of continuous targets vs predictions
    FairnessRegression,
    /// Per-group percentage of predicted classes
    FairnessClassification,
}

impl DiagnosticMode {
    /// Whether predictions are reduced to class labels before storage
    pub fn is_class_oriented(&self) -> bool {
        !matches!(self, DiagnosticMode::FairnessRegression)
    }

    /// Whether the mode conditions its statistics on group membership
    pub fn requires_groups(&self) -> bool {
        !matches!(self, DiagnosticMode::Balance)
    }

    /// Default number of subplot columns for this mode
    pub fn default_num_columns(&self) -> usize {
        match self {
            DiagnosticMode::Balance => 4,
            DiagnosticMode::FairnessRegression | DiagnosticMode::FairnessClassification => 3,
        }
    }
}

impl fmt::Display for DiagnosticMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticMode::Balance => "balance",
            DiagnosticMode::FairnessRegression => "fairness-regression",
            DiagnosticMode::FairnessClassification => "fairness-classification",
        };
        f.write_str(name)
    }
}

/// How the protected attribute is laid out across feature columns
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupEncoding {
    /// One column holding the group id (binary or already categorical)
    SingleColumn,
    /// One column per group; the group id is the index of the maximal column
    OneHot,
}

impl fmt::Display for GroupEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupEncoding::SingleColumn => f.write_str("single-column"),
            GroupEncoding::OneHot => f.write_str("one-hot"),
        }
    }
}

/// Protected attribute selector
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedFeature {
    /// Every feature column whose name starts with this prefix belongs to the attribute
    pub prefix: String,
    /// Column layout of the attribute
    pub encoding: GroupEncoding,
}

impl ProtectedFeature {
    /// Create a new protected feature selector
    pub fn new(prefix: impl Into<String>, encoding: GroupEncoding) -> Self {
        Self {
            prefix: prefix.into(),
            encoding,
        }
    }
}

/// Per-listener diagnostic configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticConfig {
    /// Diagnostic to collect
    pub mode: DiagnosticMode,
    /// Protected attribute, required by the fairness modes
    #[serde(default)]
    pub protected: Option<ProtectedFeature>,
    /// Number of subplot columns in the rendered grid
    #[serde(default)]
    pub num_columns: Option<usize>,
    /// Binary decision threshold: class 1 iff score > threshold
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.5
}

impl DiagnosticConfig {
    /// Create a configuration for `mode` with default settings
    pub fn new(mode: DiagnosticMode) -> Self {
        Self {
            mode,
            protected: None,
            num_columns: None,
            threshold: default_threshold(),
        }
    }

    /// Class balance diagnostic
    pub fn balance() -> Self {
        Self::new(DiagnosticMode::Balance)
    }

    /// Group-conditioned spread of continuous targets and predictions
    pub fn fairness_regression(prefix: impl Into<String>, encoding: GroupEncoding) -> Self {
        Self::new(DiagnosticMode::FairnessRegression).with_protected(prefix, encoding)
    }

    /// Group-conditioned percentages of predicted classes
    pub fn fairness_classification(prefix: impl Into<String>, encoding: GroupEncoding) -> Self {
        Self::new(DiagnosticMode::FairnessClassification).with_protected(prefix, encoding)
    }

    /// Set the protected attribute
    pub fn with_protected(mut self, prefix: impl Into<String>, encoding: GroupEncoding) -> Self {
        self.protected = Some(ProtectedFeature::new(prefix, encoding));
        self
    }

    /// Set the number of subplot columns
    pub fn with_num_columns(mut self, num_columns: usize) -> Self {
        self.num_columns = Some(num_columns);
        self
    }

    /// Set the binary decision threshold (0.0 for logits)
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Number of subplot columns, falling back to the mode default
    pub fn display_columns(&self) -> usize {
        self.num_columns.unwrap_or_else(|| self.mode.default_num_columns())
    }

    /// Parse and validate a YAML configuration
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for inconsistent values
    pub fn validate(&self) -> Result<()> {
        if self.num_columns == Some(0) {
            return Err(DiagnosticError::config("num_columns", "must be > 0"));
        }
        if !self.threshold.is_finite() {
            return Err(DiagnosticError::config(
                "threshold",
                format!("{} is not finite", self.threshold),
            ));
        }
        match &self.protected {
            Some(protected) if protected.prefix.is_empty() => Err(DiagnosticError::config(
                "protected.prefix",
                "cannot be empty (it would match every feature column)",
            )),
            None if self.mode.requires_groups() => Err(DiagnosticError::config(
                "protected",
                format!("{} diagnostics need a protected feature", self.mode),
            )),
            _ => Ok(()),
        }
    }
}
