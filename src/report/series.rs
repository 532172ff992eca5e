//! Renderer-agnostic series descriptors

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::layout::GridCell;

/// Where a plotted value comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Original targets (pretraining iteration only)
    Targets,
    /// Adjusted targets of the iteration
    Adjusted,
    /// Model predictions of the iteration
    Predictions,
}

impl Source {
    /// Source of the target side of `iteration`
    pub fn target_for(iteration: usize) -> Self {
        if iteration == 0 {
            Source::Targets
        } else {
            Source::Adjusted
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Targets => "targets",
            Source::Adjusted => "adjusted",
            Source::Predictions => "predictions",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bar of a grouped count plot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: usize,
    pub source: Source,
    pub count: usize,
}

/// Five-number summary of a value series (quartiles linearly interpolated)
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpreadSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl SpreadSummary {
    /// Summarize `values`; `None` when empty
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }

    /// Interquartile range
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// One box of a group-conditioned spread plot
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupSpread {
    pub group: usize,
    pub source: Source,
    pub values: Vec<f64>,
    pub summary: Option<SpreadSummary>,
}

/// Percentage of a group's members predicted as `class`
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ClassShare {
    pub class: usize,
    pub percent: f64,
}

/// One stacked bar: the predicted-class distribution of a group.
///
/// `shares` is empty when the group has no members.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupShares {
    pub group: usize,
    pub members: usize,
    pub shares: Vec<ClassShare>,
}

/// Plot-ready data of one iteration
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum PanelSeries {
    Counts(Vec<LabelCount>),
    Spread(Vec<GroupSpread>),
    Percentages(Vec<GroupShares>),
}

impl PanelSeries {
    /// Label → count map of one source (empty for non-count series)
    pub fn counts_for(&self, source: Source) -> BTreeMap<usize, usize> {
        match self {
            PanelSeries::Counts(counts) => counts
                .iter()
                .filter(|c| c.source == source)
                .map(|c| (c.label, c.count))
                .collect(),
            _ => BTreeMap::new(),
        }
    }

    /// Class → percent map of one group, if the series has that group
    pub fn shares_for(&self, group: usize) -> Option<BTreeMap<usize, f64>> {
        match self {
            PanelSeries::Percentages(groups) => groups
                .iter()
                .find(|g| g.group == group)
                .map(|g| g.shares.iter().map(|s| (s.class, s.percent)).collect()),
            _ => None,
        }
    }

    /// Spread entry of one group and source
    pub fn spread_for(&self, group: usize, source: Source) -> Option<&GroupSpread> {
        match self {
            PanelSeries::Spread(spreads) => spreads
                .iter()
                .find(|s| s.group == group && s.source == source),
            _ => None,
        }
    }
}

/// One subplot: an iteration's series plus its placement and labels
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IterationPanel {
    pub iteration: usize,
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub cell: GridCell,
    pub series: PanelSeries,
}

impl fmt::Display for IterationPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        match &self.series {
            PanelSeries::Counts(counts) => {
                writeln!(f, "{:>8} {:>12} {:>8}", self.x_label, "source", self.y_label)?;
                for c in counts {
                    writeln!(f, "{:>8} {:>12} {:>8}", c.label, c.source, c.count)?;
                }
            }
            PanelSeries::Spread(spreads) => {
                writeln!(
                    f,
                    "{:>8} {:>12} {:>10} {:>10} {:>10}",
                    self.x_label, "source", "q1", "median", "q3"
                )?;
                for s in spreads {
                    match s.summary {
                        Some(sum) => writeln!(
                            f,
                            "{:>8} {:>12} {:>10.4} {:>10.4} {:>10.4}",
                            s.group, s.source, sum.q1, sum.median, sum.q3
                        )?,
                        None => writeln!(f, "{:>8} {:>12} {:>10}", s.group, s.source, "-")?,
                    }
                }
            }
            PanelSeries::Percentages(groups) => {
                for g in groups {
                    write!(f, "{:>8} {:>8}", self.x_label, g.group)?;
                    for s in &g.shares {
                        write!(f, "  class {}: {:>6.2}{}", s.class, s.percent, self.y_label)?;
                    }
                    writeln!(f)?;
                }
            }
        }
        Ok(())
    }
}
