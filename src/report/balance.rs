//! Class balance: label counts of targets vs predictions

use std::collections::BTreeMap;

use super::series::{LabelCount, PanelSeries, Source};
use super::required;
use crate::error::Result;
use crate::store::{ColumnKey, IterationStore};

/// Count target and prediction labels of one iteration.
///
/// The target side is the original target at iteration 0 and the adjusted
/// target afterwards. Counts are ordered by label, targets before predictions;
/// labels absent from a source have no entry for it.
pub fn balance_series(store: &IterationStore, iteration: usize) -> Result<PanelSeries> {
    let target_key = ColumnKey::target_for(iteration);
    let prediction_key = ColumnKey::prediction(iteration);
    let targets = required(store, target_key)?.labels(target_key)?;
    let predictions = required(store, prediction_key)?.labels(prediction_key)?;

    let mut counts: BTreeMap<(usize, Source), usize> = BTreeMap::new();
    let target_source = Source::target_for(iteration);
    for &label in targets.iter() {
        *counts.entry((label, target_source)).or_insert(0) += 1;
    }
    for &label in predictions.iter() {
        *counts.entry((label, Source::Predictions)).or_insert(0) += 1;
    }

    Ok(PanelSeries::Counts(
        counts
            .into_iter()
            .map(|((label, source), count)| LabelCount {
                label,
                source,
                count,
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiagnosticError;

    fn store() -> IterationStore {
        let mut store = IterationStore::new(4);
        store
            .append(ColumnKey::original_target(), vec![0usize, 0, 1, 1])
            .unwrap();
        store
            .append(ColumnKey::prediction(0), vec![0usize, 1, 1, 1])
            .unwrap();
        store
            .append(ColumnKey::adjusted_target(1), vec![0usize, 1, 1, 2])
            .unwrap();
        store
            .append(ColumnKey::prediction(1), vec![0usize, 1, 1, 1])
            .unwrap();
        store
    }

    #[test]
    fn test_pretraining_counts() {
        let series = balance_series(&store(), 0).unwrap();
        let targets = series.counts_for(Source::Targets);
        let predictions = series.counts_for(Source::Predictions);
        assert_eq!(targets, BTreeMap::from([(0, 2), (1, 2)]));
        assert_eq!(predictions, BTreeMap::from([(0, 1), (1, 3)]));
        assert!(series.counts_for(Source::Adjusted).is_empty());
    }

    #[test]
    fn test_later_iteration_uses_adjusted() {
        let series = balance_series(&store(), 1).unwrap();
        assert!(series.counts_for(Source::Targets).is_empty());
        assert_eq!(
            series.counts_for(Source::Adjusted),
            BTreeMap::from([(0, 1), (1, 2), (2, 1)])
        );
    }

    #[test]
    fn test_counts_ordered_by_label_then_source() {
        let PanelSeries::Counts(counts) = balance_series(&store(), 0).unwrap() else {
            panic!("expected counts");
        };
        let order: Vec<_> = counts.iter().map(|c| (c.label, c.source)).collect();
        assert_eq!(
            order,
            vec![
                (0, Source::Targets),
                (0, Source::Predictions),
                (1, Source::Targets),
                (1, Source::Predictions),
            ]
        );
    }

    #[test]
    fn test_float_targets_are_read_as_labels() {
        let mut store = IterationStore::new(2);
        store
            .append(ColumnKey::original_target(), vec![1.0, 0.0])
            .unwrap();
        store.append(ColumnKey::prediction(0), vec![1usize, 1]).unwrap();
        let series = balance_series(&store, 0).unwrap();
        assert_eq!(
            series.counts_for(Source::Targets),
            BTreeMap::from([(0, 1), (1, 1)])
        );
    }

    #[test]
    fn test_missing_adjusted_column() {
        let mut store = IterationStore::new(1);
        store.append(ColumnKey::original_target(), vec![0usize]).unwrap();
        store.append(ColumnKey::prediction(1), vec![0usize]).unwrap();
        let err = balance_series(&store, 1).unwrap_err();
        assert!(matches!(err, DiagnosticError::MissingColumn { .. }));
    }
}
