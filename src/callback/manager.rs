//! Callback manager for dispatching lifecycle events to multiple listeners

use super::traits::{IterationContext, ProcessCallback, ProcessContext};
use crate::error::Result;

/// Manages multiple callbacks and dispatches events in registration order.
///
/// Dispatch stops at the first failing callback and returns its error;
/// callbacks registered after it do not see the event.
pub struct CallbackManager {
    callbacks: Vec<Box<dyn ProcessCallback>>,
}

impl CallbackManager {
    /// Create new callback manager
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Add a callback
    pub fn add<C: ProcessCallback + 'static>(&mut self, callback: C) {
        self.callbacks.push(Box::new(callback));
    }

    /// Check if no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Get number of callbacks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Names of the registered callbacks
    pub fn names(&self) -> Vec<&'static str> {
        self.callbacks.iter().map(|cb| cb.name()).collect()
    }

    /// Fire process start event
    pub fn on_process_start(&mut self, ctx: &ProcessContext<'_>) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_process_start(ctx).inspect_err(|err| {
                tracing::warn!(callback = cb.name(), error = %err, "on_process_start failed");
            })?;
        }
        Ok(())
    }

    /// Fire training end event
    pub fn on_training_end(&mut self, ctx: &IterationContext<'_>) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_training_end(ctx).inspect_err(|err| {
                tracing::warn!(callback = cb.name(), error = %err, "on_training_end failed");
            })?;
        }
        Ok(())
    }

    /// Fire process end event
    pub fn on_process_end(&mut self) -> Result<()> {
        for cb in &mut self.callbacks {
            cb.on_process_end().inspect_err(|err| {
                tracing::warn!(callback = cb.name(), error = %err, "on_process_end failed");
            })?;
        }
        Ok(())
    }
}

impl Default for CallbackManager {
    fn default() -> Self {
        Self::new()
    }
}
