//! Stateless reductions applied before values enter the diagnostic table
//!
//! - `ClassReducer`: scores/probabilities → class labels
//! - `GroupAttributor`: protected feature columns → group ids

mod class;
mod group;

pub use class::ClassReducer;
pub use group::{attribute, GroupAttributor};
