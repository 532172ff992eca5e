//! Protected feature → group id reduction

use crate::config::{GroupEncoding, ProtectedFeature};
use crate::data::FeatureTable;
use crate::error::{DiagnosticError, Result};

use super::class::argmax;

/// Derives one group id per sample from the protected feature columns.
///
/// The attributor is built from an explicit [`ProtectedFeature`], so the
/// encoding is validated against the feature table instead of guessed from
/// the number of matching columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupAttributor {
    protected: ProtectedFeature,
}

impl GroupAttributor {
    /// Create an attributor for the given protected feature
    pub fn new(protected: ProtectedFeature) -> Self {
        Self { protected }
    }

    /// The protected feature selector
    pub fn protected(&self) -> &ProtectedFeature {
        &self.protected
    }

    /// Compute group ids for every row of `features`
    pub fn attribute(&self, features: &FeatureTable) -> Result<Vec<usize>> {
        self.attribute_with_count(features).map(|(ids, _)| ids)
    }

    /// Group ids plus the number of groups the encoding spans, if it fixes one.
    ///
    /// A one-hot block spans one group per column, even when some column
    /// has no members. A single column holds arbitrary ids and spans only
    /// the ids it contains, so it reports no count.
    pub fn attribute_with_count(
        &self,
        features: &FeatureTable,
    ) -> Result<(Vec<usize>, Option<usize>)> {
        let prefix = &self.protected.prefix;
        let matched = features.columns_with_prefix(prefix);
        if matched.is_empty() {
            return Err(DiagnosticError::AttributeNotFound {
                prefix: prefix.clone(),
            });
        }
        match self.protected.encoding {
            GroupEncoding::SingleColumn if matched.len() != 1 => {
                Err(DiagnosticError::EncodingMismatch {
                    prefix: prefix.clone(),
                    encoding: GroupEncoding::SingleColumn,
                    matched: matched.len(),
                })
            }
            GroupEncoding::SingleColumn => Ok((single_column(features, matched[0])?, None)),
            GroupEncoding::OneHot => Ok((one_hot(features, &matched), Some(matched.len()))),
        }
    }
}

/// Compute group ids, inferring the encoding from the number of matched columns.
///
/// One matching column is read as group ids directly; several are read as a
/// one-hot block and reduced by argmax (ties to the lowest column).
///
/// # Example
///
/// ```
/// use ajuste::{attribute, FeatureTable};
/// use ndarray::array;
///
/// let features = FeatureTable::new(
///     vec!["race_a", "race_b", "race_c"],
///     array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, 0.0]],
/// )
/// .unwrap();
/// assert_eq!(attribute(&features, "race").unwrap(), vec![0, 1, 2, 0]);
/// ```
pub fn attribute(features: &FeatureTable, prefix: &str) -> Result<Vec<usize>> {
    let matched = features.columns_with_prefix(prefix);
    match matched.as_slice() {
        [] => Err(DiagnosticError::AttributeNotFound {
            prefix: prefix.to_string(),
        }),
        [column] => single_column(features, *column),
        _ => Ok(one_hot(features, &matched)),
    }
}

fn single_column(features: &FeatureTable, column: usize) -> Result<Vec<usize>> {
    features
        .column(column)
        .iter()
        .enumerate()
        .map(|(row, &value)| {
            // usize::MAX as f64 rounds up to 2^64, the first value that saturates
            if value.is_finite() && value >= 0.0 && value < usize::MAX as f64 {
                Ok(value.trunc() as usize)
            } else {
                Err(DiagnosticError::InvalidGroupValue { row, value })
            }
        })
        .collect()
}

fn one_hot(features: &FeatureTable, columns: &[usize]) -> Vec<usize> {
    let block = features.values().select(ndarray::Axis(1), columns);
    block.rows().into_iter().map(argmax).collect()
}
