//! Cross-iteration comparative statistics
//!
//! Reduces a finalized diagnostic table into one plot-ready panel per
//! recorded iteration:
//!
//! - `balance`: label counts of targets vs predictions
//! - `fairness`: per-group spreads (regression) or per-group predicted class
//!   percentages (classification)
//! - `layout`: subplot grid placement
//! - `series`: the renderer-agnostic descriptors

mod balance;
mod fairness;
mod layout;
mod series;

use std::fmt;

use serde::Serialize;

pub use balance::balance_series;
pub use fairness::{classification_series, regression_series};
pub use layout::{GridCell, GridLayout};
pub use series::{
    ClassShare, GroupShares, GroupSpread, IterationPanel, LabelCount, PanelSeries, Source,
    SpreadSummary,
};

use crate::config::DiagnosticMode;
use crate::error::{DiagnosticError, Result};
use crate::store::{Column, ColumnKey, IterationStore};

pub(crate) fn required(store: &IterationStore, key: ColumnKey) -> Result<&Column> {
    store
        .get(key)
        .ok_or(DiagnosticError::MissingColumn { column: key })
}

/// Reduced diagnostics of a whole run, ready for a renderer
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiagnosticReport {
    pub mode: DiagnosticMode,
    pub layout: GridLayout,
    pub panels: Vec<IterationPanel>,
}

impl DiagnosticReport {
    /// Panel of `iteration`, if recorded
    pub fn panel(&self, iteration: usize) -> Option<&IterationPanel> {
        self.panels.iter().find(|p| p.iteration == iteration)
    }

    /// Serialize the report as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} diagnostics: {} iteration(s) on a {}x{} grid",
            self.mode,
            self.panels.len(),
            self.layout.num_rows,
            self.layout.num_columns
        )?;
        for panel in &self.panels {
            writeln!(f)?;
            write!(f, "{panel}")?;
        }
        Ok(())
    }
}

/// Display-side collaborator that receives the finished report.
///
/// Rendering owns all figure state; the report is read-only to it.
pub trait Renderer: Send {
    fn render(&mut self, report: &DiagnosticReport);
}

/// Turns a diagnostic table into per-iteration panels for one mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComparativeReducer {
    mode: DiagnosticMode,
    num_columns: usize,
    group_count: Option<usize>,
}

impl ComparativeReducer {
    /// Create a reducer laying panels out on `num_columns` columns
    pub fn new(mode: DiagnosticMode, num_columns: usize) -> Self {
        Self {
            mode,
            num_columns,
            group_count: None,
        }
    }

    /// Report every group in `0..count`, including groups without members
    pub fn with_group_count(mut self, count: usize) -> Self {
        self.group_count = Some(count);
        self
    }

    pub fn mode(&self) -> DiagnosticMode {
        self.mode
    }

    /// Series of a single iteration
    pub fn reduce_iteration(&self, store: &IterationStore, iteration: usize) -> Result<PanelSeries> {
        match self.mode {
            DiagnosticMode::Balance => balance_series(store, iteration),
            DiagnosticMode::FairnessRegression => {
                regression_series(store, iteration, self.group_count)
            }
            DiagnosticMode::FairnessClassification => {
                classification_series(store, iteration, self.group_count)
            }
        }
    }

    /// Panels for every recorded iteration, in arrival order
    pub fn reduce(&self, store: &IterationStore) -> Result<DiagnosticReport> {
        let layout = GridLayout::new(store.iteration_count(), self.num_columns);
        let (x_label, y_label) = self.axis_labels();
        let panels = store
            .iterations()
            .enumerate()
            .map(|(position, iteration)| {
                Ok(IterationPanel {
                    iteration,
                    title: format!("iteration: {iteration}"),
                    x_label,
                    y_label,
                    cell: layout.cell(position),
                    series: self.reduce_iteration(store, iteration)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DiagnosticReport {
            mode: self.mode,
            layout,
            panels,
        })
    }

    fn axis_labels(&self) -> (&'static str, &'static str) {
        match self.mode {
            DiagnosticMode::Balance => ("class", "count"),
            DiagnosticMode::FairnessRegression => ("group", "value"),
            DiagnosticMode::FairnessClassification => ("group", "%"),
        }
    }
}
