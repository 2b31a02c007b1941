//! # Intent Module
//!
//! Pattern-driven intent detection with confidence scoring.
//!
//! Rule evaluation and resolution are two separable stages: `rules` holds a
//! flat bank of independent `(predicate, kind, confidence)` tests that may
//! all fire on one query, and `classifier` reduces the collected signals to
//! a primary intent under contextual overrides. New rules can be added
//! without touching resolution logic.

pub mod classifier;
pub mod rules;

pub use classifier::{IntentAnalysis, IntentClassifier, IntentSignal};
pub use rules::IntentKind;
