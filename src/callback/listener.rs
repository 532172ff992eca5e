//! Diagnostic listener: the lifecycle state machine that fills the table

use std::fmt;

use serde::Serialize;

use super::traits::{IterationContext, ProcessCallback, ProcessContext};
use crate::config::{DiagnosticConfig, DiagnosticMode};
use crate::data::Predictions;
use crate::error::{DiagnosticError, Result};
use crate::reduce::{ClassReducer, GroupAttributor};
use crate::report::{ComparativeReducer, DiagnosticReport, Renderer};
use crate::store::{labels_from_values, Column, ColumnKey, IterationStore};

/// Lifecycle state of a [`DiagnosticListener`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Waiting for the process to start
    Idle,
    /// Recording iterations
    Collecting,
    /// Process ended and the report is built
    Finalized,
    /// A lifecycle call failed; the table keeps what was recorded before it
    Aborted,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Collecting => "collecting",
            LifecycleState::Finalized => "finalized",
            LifecycleState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Listener collecting one diagnostic over a whole optimizer run.
///
/// Composes a configuration, the stateless reducers and the diagnostic table.
/// Iterations must arrive as 0, 1, 2, ...; any failed call moves the listener
/// to [`LifecycleState::Aborted`] except calls rejected for being made in the
/// wrong state, which leave the state untouched.
///
/// # Example
///
/// ```
/// use ajuste::{
///     DiagnosticConfig, DiagnosticListener, FeatureTable, IterationContext, Predictions,
///     ProcessCallback, ProcessContext, Source,
/// };
/// use ndarray::array;
///
/// let features = FeatureTable::new(vec!["x"], array![[0.1], [0.4], [0.6], [0.9]]).unwrap();
/// let targets = [0.0, 0.0, 1.0, 1.0];
///
/// let mut listener = DiagnosticListener::new(DiagnosticConfig::balance()).unwrap();
/// listener.on_process_start(&ProcessContext::new(&features, &targets)).unwrap();
///
/// let p0 = Predictions::Values(vec![0.2, 0.7, 0.8, 0.9]);
/// listener.on_training_end(&IterationContext::new(&p0)).unwrap();
/// listener.on_process_end().unwrap();
///
/// let report = listener.report().unwrap();
/// let counts = report.panels[0].series.counts_for(Source::Predictions);
/// assert_eq!(counts[&1], 3);
/// ```
pub struct DiagnosticListener {
    config: DiagnosticConfig,
    classes: ClassReducer,
    attributor: Option<GroupAttributor>,
    state: LifecycleState,
    table: Option<IterationStore>,
    group_count: Option<usize>,
    next_iteration: usize,
    report: Option<DiagnosticReport>,
    renderer: Option<Box<dyn Renderer>>,
}

impl DiagnosticListener {
    /// Create a listener from a validated configuration
    pub fn new(config: DiagnosticConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classes: ClassReducer::new(config.threshold),
            attributor: config.protected.clone().map(GroupAttributor::new),
            config,
            state: LifecycleState::Idle,
            table: None,
            group_count: None,
            next_iteration: 0,
            report: None,
            renderer: None,
        })
    }

    /// Hand the finished report to `renderer` at process end
    pub fn with_renderer<R: Renderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn config(&self) -> &DiagnosticConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// The diagnostic table, once the process has started
    pub fn table(&self) -> Option<&IterationStore> {
        self.table.as_ref()
    }

    /// The reduced report, once the process has ended
    pub fn report(&self) -> Option<&DiagnosticReport> {
        self.report.as_ref()
    }

    /// Index the next `on_training_end` call must carry
    pub fn next_iteration(&self) -> usize {
        self.next_iteration
    }

    /// Start collecting: snapshot the row count, store the original targets
    /// and, when a protected feature is configured, the group ids.
    pub fn start(&mut self, ctx: &ProcessContext<'_>) -> Result<()> {
        self.require(LifecycleState::Idle, "on_process_start")?;
        let result = self.build_table(ctx);
        let table = self.settle(result)?;

        tracing::info!(
            mode = %self.config.mode,
            rows = table.row_count(),
            groups = ?self.group_count,
            validation_rows = ?ctx.validation.map(|v| v.len()),
            "diagnostic process started"
        );
        self.table = Some(table);
        self.state = LifecycleState::Collecting;
        Ok(())
    }

    /// Record one iteration's predictions and, after pretraining, its
    /// adjusted targets.
    ///
    /// The pretraining iteration compares against the original targets, so
    /// adjusted targets supplied for it fail with `ColumnAlreadyWritten`.
    /// Both columns are checked before either is written, so a failed call
    /// leaves no partial iteration behind.
    pub fn record_iteration(
        &mut self,
        iteration: usize,
        predictions: &Predictions,
        adjusted_targets: Option<&[f64]>,
    ) -> Result<()> {
        self.require(LifecycleState::Collecting, "on_training_end")?;
        let result = self.write_iteration(iteration, predictions, adjusted_targets);
        self.settle(result)?;

        tracing::debug!(iteration, mode = %self.config.mode, "iteration recorded");
        self.next_iteration += 1;
        Ok(())
    }

    /// Stop collecting, reduce the table and hand the report to the renderer
    pub fn finish(&mut self) -> Result<()> {
        self.require(LifecycleState::Collecting, "on_process_end")?;
        let result = self.reduce();
        let report = self.settle(result)?;

        tracing::info!(
            mode = %self.config.mode,
            iterations = report.panels.len(),
            "diagnostic process finished"
        );
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&report);
        }
        self.report = Some(report);
        self.state = LifecycleState::Finalized;
        Ok(())
    }

    fn require(&self, expected: LifecycleState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(DiagnosticError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Abort on failure; pass success through
    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            tracing::warn!(mode = %self.config.mode, error = %err, "diagnostics aborted");
            self.state = LifecycleState::Aborted;
        }
        result
    }

    fn build_table(&mut self, ctx: &ProcessContext<'_>) -> Result<IterationStore> {
        let mut table = IterationStore::new(ctx.features.n_rows());
        let targets = self.target_column(ColumnKey::original_target(), ctx.targets)?;
        table.append(ColumnKey::original_target(), targets)?;

        if let Some(attributor) = &self.attributor {
            let (ids, count) = attributor.attribute_with_count(ctx.features)?;
            table.append(ColumnKey::group(), ids)?;
            self.group_count = count;
        }
        Ok(table)
    }

    fn write_iteration(
        &mut self,
        iteration: usize,
        predictions: &Predictions,
        adjusted_targets: Option<&[f64]>,
    ) -> Result<()> {
        if iteration != self.next_iteration {
            return Err(DiagnosticError::OutOfOrderIteration {
                expected: self.next_iteration,
                actual: iteration,
            });
        }

        let prediction_key = ColumnKey::prediction(iteration);
        let prediction = self.prediction_column(predictions)?;
        let adjusted = match (iteration, adjusted_targets) {
            (0, Some(_)) => {
                return Err(DiagnosticError::ColumnAlreadyWritten {
                    column: ColumnKey::adjusted_target(0),
                })
            }
            (0, None) => None,
            (_, None) => return Err(DiagnosticError::MissingAdjustedTarget { iteration }),
            (_, Some(values)) => {
                let key = ColumnKey::adjusted_target(iteration);
                Some((key, self.target_column(key, values)?))
            }
        };

        let table = self.table.as_mut().ok_or(DiagnosticError::InvalidState {
            operation: "on_training_end",
            state: LifecycleState::Idle,
        })?;
        table.check_append(prediction_key, prediction.len())?;
        if let Some((key, column)) = &adjusted {
            table.check_append(*key, column.len())?;
        }
        if let Some((key, column)) = adjusted {
            table.append(key, column)?;
        }
        table.append(prediction_key, prediction)
    }

    fn reduce(&self) -> Result<DiagnosticReport> {
        let table = self.table.as_ref().ok_or(DiagnosticError::InvalidState {
            operation: "on_process_end",
            state: LifecycleState::Idle,
        })?;
        let mut reducer = ComparativeReducer::new(self.config.mode, self.config.display_columns());
        if let Some(count) = self.group_count {
            reducer = reducer.with_group_count(count);
        }
        reducer.reduce(table)
    }

    fn target_column(&self, key: ColumnKey, values: &[f64]) -> Result<Column> {
        if self.config.mode.is_class_oriented() {
            labels_from_values(key, values).map(Column::Labels)
        } else {
            Ok(Column::Values(values.to_vec()))
        }
    }

    fn prediction_column(&self, predictions: &Predictions) -> Result<Column> {
        if self.config.mode.is_class_oriented() {
            return Ok(Column::Labels(self.classes.reduce(predictions)));
        }
        match predictions {
            Predictions::Values(values) => Ok(Column::Values(values.clone())),
            Predictions::Scores(scores) if scores.ncols() == 1 => {
                Ok(Column::Values(scores.column(0).to_vec()))
            }
            Predictions::Scores(scores) => Err(DiagnosticError::ShapeMismatch {
                context: format!("{} predictions (columns)", DiagnosticMode::FairnessRegression),
                expected: 1,
                actual: scores.ncols(),
            }),
        }
    }
}

impl fmt::Debug for DiagnosticListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticListener")
            .field("mode", &self.config.mode)
            .field("state", &self.state)
            .field("next_iteration", &self.next_iteration)
            .field("has_renderer", &self.renderer.is_some())
            .finish()
    }
}

impl ProcessCallback for DiagnosticListener {
    fn on_process_start(&mut self, ctx: &ProcessContext<'_>) -> Result<()> {
        self.start(ctx)
    }

    fn on_training_end(&mut self, ctx: &IterationContext<'_>) -> Result<()> {
        let iteration = ctx.iteration.unwrap_or(self.next_iteration);
        self.record_iteration(iteration, ctx.predictions, ctx.adjusted_targets)
    }

    fn on_process_end(&mut self) -> Result<()> {
        self.finish()
    }

    fn name(&self) -> &'static str {
        "DiagnosticListener"
    }
}
