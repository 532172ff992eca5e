//! Lifecycle callbacks driven by the host optimizer
//!
//! The optimizer fires three events, in order:
//! - `on_process_start` once, with the training data
//! - `on_training_end` once per iteration, with predictions and adjusted targets
//! - `on_process_end` once
//!
//! # Example
//!
//! ```rust
//! use ajuste::callback::{IterationContext, ProcessCallback, ProcessContext};
//! use ajuste::Result;
//!
//! struct IterationCounter(usize);
//!
//! impl ProcessCallback for IterationCounter {
//!     fn on_process_start(&mut self, _ctx: &ProcessContext<'_>) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn on_training_end(&mut self, _ctx: &IterationContext<'_>) -> Result<()> {
//!         self.0 += 1;
//!         Ok(())
//!     }
//!
//!     fn on_process_end(&mut self) -> Result<()> {
//!         println!("{} iterations", self.0);
//!         Ok(())
//!     }
//! }
//! ```

mod listener;
mod manager;
mod traits;


pub use listener::{DiagnosticListener, LifecycleState};
pub use manager::CallbackManager;
pub use traits::{IterationContext, ProcessCallback, ProcessContext};
