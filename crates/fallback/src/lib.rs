//! Rule-Based Fallback System
//!
//! Provides threshold heuristics when ML inference is unavailable.

mod rules;

pub use rules::{FallbackReason, Rule, RuleEngine, RuleThresholds};
