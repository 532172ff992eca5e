//! # Ajuste: iteration-indexed diagnostics for moving-targets learners
//!
//! Constraint-adjusting optimizers alternate between training a learner and
//! rewriting the training targets so that a constraint (class balance,
//! demographic parity, ...) holds. Ajuste listens to such a run and records,
//! for every iteration, the learner's predictions next to the adjusted targets
//! it was trained on. At the end of the run the table is reduced into
//! per-iteration comparative statistics ready for plotting.
//!
//! ## Modules
//!
//! - `callback`: lifecycle hooks and the [`DiagnosticListener`] state machine
//! - `config`: diagnostic modes and YAML/JSON configuration
//! - `data`: feature tables, predictions and validation data
//! - `reduce`: class and protected-group reductions
//! - `store`: the write-once, iteration-indexed diagnostic table
//! - `report`: balance and fairness statistics, grid layout, renderers
//!
//! ## Example
//!
//! ```
//! use ajuste::{
//!     DiagnosticConfig, DiagnosticListener, FeatureTable, GroupEncoding, IterationContext,
//!     Predictions, ProcessCallback, ProcessContext,
//! };
//! use ndarray::array;
//!
//! let features = FeatureTable::new(
//!     vec!["age", "sex"],
//!     array![[31.0, 0.0], [45.0, 0.0], [28.0, 1.0], [52.0, 1.0]],
//! )?;
//! let targets = [0.0, 1.0, 0.0, 1.0];
//!
//! let config = DiagnosticConfig::fairness_classification("sex", GroupEncoding::SingleColumn);
//! let mut listener = DiagnosticListener::new(config)?;
//! listener.on_process_start(&ProcessContext::new(&features, &targets))?;
//!
//! let p0 = Predictions::Values(vec![0.3, 0.8, 0.1, 0.6]);
//! listener.on_training_end(&IterationContext::new(&p0))?;
//!
//! let p1 = Predictions::Values(vec![0.2, 0.9, 0.7, 0.6]);
//! let z1 = [0.0, 1.0, 1.0, 1.0];
//! listener.on_training_end(&IterationContext::new(&p1).with_adjusted_targets(&z1))?;
//! listener.on_process_end()?;
//!
//! let report = listener.report().expect("finalized");
//! assert_eq!(report.panels.len(), 2);
//! # Ok::<(), ajuste::DiagnosticError>(())
//! ```

pub mod callback;
pub mod config;
pub mod data;
pub mod error;
pub mod reduce;
pub mod report;
pub mod store;

pub use callback::{
    CallbackManager, DiagnosticListener, IterationContext, LifecycleState, ProcessCallback,
    ProcessContext,
};
pub use config::{DiagnosticConfig, DiagnosticMode, GroupEncoding, ProtectedFeature};
pub use data::{FeatureTable, Predictions, ValidationData};
pub use error::{DiagnosticError, Result};
pub use reduce::{attribute, ClassReducer, GroupAttributor};
pub use report::{
    ComparativeReducer, DiagnosticReport, GridCell, GridLayout, IterationPanel, PanelSeries,
    Renderer, Source,
};
pub use store::{Column, ColumnKey, ColumnKind, IterationStore};
