//! Core traits and types for the lifecycle callback system
//!
//! - `ProcessContext` - data available when the process starts
//! - `IterationContext` - data emitted at the end of each iteration's training
//! - `ProcessCallback` - the trait every diagnostic listener implements

use crate::data::{FeatureTable, Predictions, ValidationData};
use crate::error::Result;

/// Data handed over when the optimizer starts a process
#[derive(Clone, Copy, Debug)]
pub struct ProcessContext<'a> {
    /// Training features, one row per sample
    pub features: &'a FeatureTable,
    /// Original targets, one per sample
    pub targets: &'a [f64],
    /// Held-out data, if the optimizer has any
    pub validation: Option<&'a ValidationData>,
}

impl<'a> ProcessContext<'a> {
    pub fn new(features: &'a FeatureTable, targets: &'a [f64]) -> Self {
        Self {
            features,
            targets,
            validation: None,
        }
    }

    pub fn with_validation(mut self, validation: &'a ValidationData) -> Self {
        self.validation = Some(validation);
        self
    }
}

/// Data handed over when one iteration's training ends
#[derive(Clone, Copy, Debug)]
pub struct IterationContext<'a> {
    /// Iteration index as reported by the optimizer; when `None` the
    /// listener uses the next index in call order
    pub iteration: Option<usize>,
    /// Model output of this iteration
    pub predictions: &'a Predictions,
    /// Targets the model was trained on in this iteration (the adjusted
    /// targets for every iteration after pretraining)
    pub adjusted_targets: Option<&'a [f64]>,
    /// Held-out data, if the optimizer has any
    pub validation: Option<&'a ValidationData>,
}

impl<'a> IterationContext<'a> {
    pub fn new(predictions: &'a Predictions) -> Self {
        Self {
            iteration: None,
            predictions,
            adjusted_targets: None,
            validation: None,
        }
    }

    pub fn with_iteration(mut self, iteration: usize) -> Self {
        self.iteration = Some(iteration);
        self
    }

    pub fn with_adjusted_targets(mut self, targets: &'a [f64]) -> Self {
        self.adjusted_targets = Some(targets);
        self
    }

    pub fn with_validation(mut self, validation: &'a ValidationData) -> Self {
        self.validation = Some(validation);
        self
    }
}

/// Hooks the optimizer calls, strictly in this order: `on_process_start`
/// once, `on_training_end` once per iteration, `on_process_end` once.
///
/// Every hook returns an error instead of degrading silently; the optimizer
/// decides whether a failed diagnostic stops the run.
pub trait ProcessCallback: Send {
    /// Called once before the first iteration
    fn on_process_start(&mut self, ctx: &ProcessContext<'_>) -> Result<()>;

    /// Called after each iteration's training step
    fn on_training_end(&mut self, ctx: &IterationContext<'_>) -> Result<()>;

    /// Called once after the last iteration
    fn on_process_end(&mut self) -> Result<()>;

    /// Get callback name for logging
    fn name(&self) -> &'static str {
        "ProcessCallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_iteration_context_builder() {
        let predictions = Predictions::Values(vec![0.2, 0.9]);
        let adjusted = [0.0, 1.0];
        let ctx = IterationContext::new(&predictions)
            .with_iteration(3)
            .with_adjusted_targets(&adjusted);
        assert_eq!(ctx.iteration, Some(3));
        assert_eq!(ctx.adjusted_targets, Some(&adjusted[..]));
        assert!(ctx.validation.is_none());
    }

    #[test]
    fn test_process_context_validation() {
        let features = FeatureTable::new(vec!["x"], Array2::zeros((2, 1))).unwrap();
        let validation = ValidationData::new(features.clone(), vec![1.0, 0.0]);
        let ctx = ProcessContext::new(&features, &[0.0, 1.0]).with_validation(&validation);
        assert_eq!(ctx.validation.map(ValidationData::len), Some(2));
    }

    #[test]
    fn test_default_name() {
        struct Noop;
        impl ProcessCallback for Noop {
            fn on_process_start(&mut self, _: &ProcessContext<'_>) -> Result<()> {
                Ok(())
            }
            fn on_training_end(&mut self, _: &IterationContext<'_>) -> Result<()> {
                Ok(())
            }
            fn on_process_end(&mut self) -> Result<()> {
                Ok(())
            }
        }
        assert_eq!(Noop.name(), "ProcessCallback");
    }
}
