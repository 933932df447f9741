//! Constraint-based roster formulation.
//!
//! Translates a roster, its rules and the month into a declarative 0/1
//! linear model (boolean variables, linear constraints, linear objective)
//! and solves it with a pluggable [`CpSolver`].
//!
//! # Key Components
//!
//! - **Model**: [`CpModel`], [`BoolVar`], [`LinearConstraint`]
//! - **Solver**: [`CpSolver`] trait, [`BranchAndBoundSolver`]
//! - **Builder**: [`RosterCpBuilder`] → [`RosterModel`]
//!
//! # Design
//!
//! The modeling layer knows nothing about rosters; the builder owns the
//! domain translation and the decoding of solutions. Any solver that
//! implements [`CpSolver`] can be plugged into
//! [`OptimizingScheduler`](crate::scheduler::OptimizingScheduler).
//!
//! # References
//!
//! - Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"

mod builder;
mod model;
mod solver;

pub use builder::{RosterCpBuilder, RosterModel};
pub use model::{BoolVar, CpModel, LinearConstraint, VarId};
pub use solver::{BranchAndBoundSolver, CpSolution, CpSolver, SolverConfig, SolverStatus};
