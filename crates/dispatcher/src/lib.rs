//! Classification Dispatcher
//!
//! Normalizes a reading, asks the loaded classifier, and falls back to the
//! rule engine when there is no classifier or it fails.

mod dispatcher;
mod outcome;

pub use dispatcher::{run_model, Dispatcher};
pub use outcome::{ClassificationResult, ModelOutcome};
