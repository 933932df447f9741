//! Candidate ranking rules and rule engine.
//!
//! When several employees could fill a seat, the greedy path ranks them
//! with a composable chain of rules (must-work, office balance, workload,
//! streak length) and takes the best.
//!
//! # Usage
//!
//! ```
//! use u_roster::dispatching::RuleEngine;
//! use u_roster::dispatching::rules;
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::MustWork)
//!     .with_rule(rules::LeastAssigned);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"

mod context;
mod engine;
pub mod rules;

pub use context::{Candidate, SelectionContext};
pub use engine::RuleEngine;

use std::fmt::Debug;

/// Score returned by a candidate rule.
///
/// Lower scores = higher priority (picked first).
pub type RuleScore = f64;

/// A rule that scores how strongly a candidate should be picked.
///
/// # Score Convention
/// **Lower score = higher priority.**
pub trait CandidateRule: Send + Sync + Debug {
    /// Rule name (e.g., "MUST_WORK").
    fn name(&self) -> &'static str;

    /// Scores a candidate in the given selection context.
    fn evaluate(&self, candidate: &Candidate<'_>, context: &SelectionContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
