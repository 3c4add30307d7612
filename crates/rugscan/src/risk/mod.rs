//! Heuristic rug-pull risk flags and the verdict derived from them.

mod rules;

pub use rules::{evaluate_risks, RiskAssessment, RiskFlag, RiskInput, RiskThresholds, Verdict};
