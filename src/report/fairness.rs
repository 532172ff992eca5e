//! Group-conditioned comparisons
//!
//! Groups are keyed by id, so sparse ids (e.g. `{0, 3_000_000_000}` from a
//! raw single-column attribute) cost one entry each.

use std::collections::{BTreeMap, BTreeSet};

use super::required;
use super::series::{ClassShare, GroupShares, GroupSpread, PanelSeries, Source, SpreadSummary};
use crate::error::{DiagnosticError, Result};
use crate::store::{ColumnKey, IterationStore};

fn groups(store: &IterationStore) -> Result<&[usize]> {
    store.group().ok_or(DiagnosticError::MissingColumn {
        column: ColumnKey::group(),
    })
}

/// Group ids to report, ascending: every observed id plus `0..hint`
fn group_ids(group: &[usize], hint: Option<usize>) -> BTreeSet<usize> {
    let mut ids: BTreeSet<usize> = group.iter().copied().collect();
    ids.extend(0..hint.unwrap_or(0));
    ids
}

/// Values of `column` bucketed by the group id of their row
fn bucket(group: &[usize], column: &[f64]) -> BTreeMap<usize, Vec<f64>> {
    let mut buckets: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
    for (&g, &v) in group.iter().zip(column) {
        buckets.entry(g).or_default().push(v);
    }
    buckets
}

/// Per-group target and prediction values of one iteration, with a box summary.
///
/// Entries are ordered by group, target side first. A group without members
/// gets empty series and no summary.
pub fn regression_series(
    store: &IterationStore,
    iteration: usize,
    group_hint: Option<usize>,
) -> Result<PanelSeries> {
    let group = groups(store)?;
    let target_key = ColumnKey::target_for(iteration);
    let targets = required(store, target_key)?.to_f64();
    let predictions = required(store, ColumnKey::prediction(iteration))?.to_f64();
    let mut targets = bucket(group, &targets);
    let mut predictions = bucket(group, &predictions);

    let ids = group_ids(group, group_hint);
    let mut spreads = Vec::with_capacity(ids.len() * 2);
    for g in ids {
        for (source, buckets) in [
            (Source::target_for(iteration), &mut targets),
            (Source::Predictions, &mut predictions),
        ] {
            let values = buckets.remove(&g).unwrap_or_default();
            spreads.push(GroupSpread {
                group: g,
                source,
                summary: SpreadSummary::from_values(&values),
                values,
            });
        }
    }
    Ok(PanelSeries::Spread(spreads))
}

/// Per-group percentage of each predicted class at one iteration.
///
/// For every group `g` and every class `c` predicted anywhere in the
/// iteration, the share is `count(class = c, group = g) / count(group = g) * 100`,
/// so all non-empty groups list the same classes (absent ones at 0%).
/// Groups without members have an empty share list.
pub fn classification_series(
    store: &IterationStore,
    iteration: usize,
    group_hint: Option<usize>,
) -> Result<PanelSeries> {
    let group = groups(store)?;
    let prediction_key = ColumnKey::prediction(iteration);
    let predictions = required(store, prediction_key)?.labels(prediction_key)?;

    let classes: BTreeSet<usize> = predictions.iter().copied().collect();
    let mut counts: BTreeMap<usize, (usize, BTreeMap<usize, usize>)> = BTreeMap::new();
    for (&g, &class) in group.iter().zip(predictions.iter()) {
        let (members, per_class) = counts.entry(g).or_default();
        *members += 1;
        *per_class.entry(class).or_insert(0) += 1;
    }

    let shares = group_ids(group, group_hint)
        .into_iter()
        .map(|g| match counts.remove(&g) {
            Some((members, per_class)) => GroupShares {
                group: g,
                members,
                shares: classes
                    .iter()
                    .map(|&class| ClassShare {
                        class,
                        percent: per_class.get(&class).copied().unwrap_or(0) as f64
                            / members as f64
                            * 100.0,
                    })
                    .collect(),
            },
            None => GroupShares {
                group: g,
                members: 0,
                shares: Vec::new(),
            },
        })
        .collect();
    Ok(PanelSeries::Percentages(shares))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn classification_store() -> IterationStore {
        let mut store = IterationStore::new(4);
        store.append(ColumnKey::group(), vec![0usize, 0, 1, 1]).unwrap();
        store
            .append(ColumnKey::original_target(), vec![0usize, 1, 0, 1])
            .unwrap();
        store
            .append(ColumnKey::prediction(0), vec![0usize, 0, 0, 1])
            .unwrap();
        store
            .append(ColumnKey::adjusted_target(1), vec![0usize, 1, 1, 0])
            .unwrap();
        store
            .append(ColumnKey::prediction(1), vec![0usize, 1, 1, 0])
            .unwrap();
        store
    }

    #[test]
    fn test_even_split_percentages() {
        let series = classification_series(&classification_store(), 1, None).unwrap();
        for g in 0..2 {
            let shares = series.shares_for(g).unwrap();
            assert_relative_eq!(shares[&0], 50.0);
            assert_relative_eq!(shares[&1], 50.0);
        }
    }

    #[test]
    fn test_uneven_percentages() {
        let series = classification_series(&classification_store(), 0, None).unwrap();
        let g0 = series.shares_for(0).unwrap();
        assert_eq!(g0.len(), 2);
        assert_relative_eq!(g0[&0], 100.0);
        assert_relative_eq!(g0[&1], 0.0);
        let g1 = series.shares_for(1).unwrap();
        assert_relative_eq!(g1[&0], 50.0);
        assert_relative_eq!(g1[&1], 50.0);
    }

    #[test]
    fn test_empty_group_has_empty_shares() {
        let series = classification_series(&classification_store(), 1, Some(3)).unwrap();
        let PanelSeries::Percentages(groups) = &series else {
            panic!("expected percentages");
        };
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[2].members, 0);
        assert!(groups[2].shares.is_empty());
        assert!(groups[2].shares.iter().all(|s| !s.percent.is_nan()));
    }

    #[test]
    fn test_every_group_lists_every_predicted_class() {
        let mut store = IterationStore::new(4);
        store.append(ColumnKey::group(), vec![0usize, 0, 1, 1]).unwrap();
        store
            .append(ColumnKey::original_target(), vec![0usize, 0, 1, 1])
            .unwrap();
        store
            .append(ColumnKey::prediction(0), vec![0usize, 0, 1, 0])
            .unwrap();

        let series = classification_series(&store, 0, None).unwrap();
        let g0 = series.shares_for(0).unwrap();
        let g1 = series.shares_for(1).unwrap();
        assert_eq!(g0.keys().collect::<Vec<_>>(), vec![&0, &1]);
        assert_eq!(g0.keys().collect::<Vec<_>>(), g1.keys().collect::<Vec<_>>());
        assert_relative_eq!(g0[&0], 100.0);
        assert_relative_eq!(g0[&1], 0.0);
        assert_relative_eq!(g1[&0], 50.0);
        assert_relative_eq!(g1[&1], 50.0);
    }

    #[test]
    fn test_sparse_group_ids() {
        let mut store = IterationStore::new(3);
        store
            .append(ColumnKey::group(), vec![0usize, 3_000_000_000, 3_000_000_000])
            .unwrap();
        store
            .append(ColumnKey::original_target(), vec![0.5, 1.5, 2.5])
            .unwrap();
        store.append(ColumnKey::prediction(0), vec![0usize, 1, 1]).unwrap();

        let PanelSeries::Percentages(groups) = classification_series(&store, 0, None).unwrap()
        else {
            panic!("expected percentages");
        };
        let ids: Vec<usize> = groups.iter().map(|g| g.group).collect();
        assert_eq!(ids, vec![0, 3_000_000_000]);
        assert_eq!(groups[1].members, 2);

        let series = regression_series(&store, 0, None).unwrap();
        let PanelSeries::Spread(spreads) = &series else {
            panic!("expected spreads");
        };
        assert_eq!(spreads.len(), 4);
        let targets = series.spread_for(3_000_000_000, Source::Targets).unwrap();
        assert_eq!(targets.values, vec![1.5, 2.5]);
    }

    #[test]
    fn test_hint_never_hides_observed_groups() {
        let series = classification_series(&classification_store(), 1, Some(1)).unwrap();
        assert!(series.shares_for(1).is_some());
    }

    #[test]
    fn test_regression_spread_per_group() {
        let mut store = IterationStore::new(4);
        store.append(ColumnKey::group(), vec![0usize, 1, 0, 1]).unwrap();
        store
            .append(ColumnKey::original_target(), vec![1.0, 2.0, 3.0, 4.0])
            .unwrap();
        store
            .append(ColumnKey::prediction(0), vec![1.5, 2.5, 2.5, 3.5])
            .unwrap();

        let series = regression_series(&store, 0, None).unwrap();
        let targets = series.spread_for(0, Source::Targets).unwrap();
        assert_eq!(targets.values, vec![1.0, 3.0]);
        assert_relative_eq!(targets.summary.unwrap().median, 2.0);
        let preds = series.spread_for(1, Source::Predictions).unwrap();
        assert_eq!(preds.values, vec![2.5, 3.5]);
        assert!(series.spread_for(0, Source::Adjusted).is_none());
    }

    #[test]
    fn test_regression_empty_group() {
        let mut store = IterationStore::new(2);
        store.append(ColumnKey::group(), vec![0usize, 0]).unwrap();
        store.append(ColumnKey::original_target(), vec![1.0, 2.0]).unwrap();
        store.append(ColumnKey::prediction(0), vec![1.0, 2.0]).unwrap();
        let series = regression_series(&store, 0, Some(2)).unwrap();
        let empty = series.spread_for(1, Source::Predictions).unwrap();
        assert!(empty.values.is_empty());
        assert!(empty.summary.is_none());
    }

    #[test]
    fn test_missing_group_column() {
        let mut store = IterationStore::new(1);
        store.append(ColumnKey::original_target(), vec![0usize]).unwrap();
        store.append(ColumnKey::prediction(0), vec![0usize]).unwrap();
        let err = classification_series(&store, 0, None).unwrap_err();
        assert!(
            matches!(err, DiagnosticError::MissingColumn { column } if column == ColumnKey::group())
        );
    }
}
