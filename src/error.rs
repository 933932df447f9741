//! Error types for rostering runs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Assignment;
use crate::validation::ValidationError;

/// Why a seat stayed empty on the greedy path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShortfallKind {
    /// Not enough eligible employees.
    Headcount {
        /// Required headcount.
        required: u32,
        /// Employees actually placed.
        assigned: u32,
    },
    /// No eligible shift lead for a running shift.
    NoShiftLead,
}

/// One unfilled (day, shift).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    /// Date concerned.
    pub date: NaiveDate,
    /// Shift concerned.
    pub shift_code: String,
    /// What is missing.
    pub kind: ShortfallKind,
}

impl Shortfall {
    /// Headcount shortfall.
    pub fn headcount(
        date: NaiveDate,
        shift_code: impl Into<String>,
        required: u32,
        assigned: u32,
    ) -> Self {
        Self {
            date,
            shift_code: shift_code.into(),
            kind: ShortfallKind::Headcount { required, assigned },
        }
    }

    /// Missing shift lead.
    pub fn no_shift_lead(date: NaiveDate, shift_code: impl Into<String>) -> Self {
        Self {
            date,
            shift_code: shift_code.into(),
            kind: ShortfallKind::NoShiftLead,
        }
    }
}

/// Errors returned by an [`AssignmentStrategy`](crate::scheduler::AssignmentStrategy).
#[derive(Debug, Error)]
pub enum RosterError {
    /// Input failed validation; nothing was scheduled.
    #[error("invalid configuration: {}", join(.0))]
    InvalidConfig(Vec<ValidationError>),

    /// No roster satisfies the hard rules.
    #[error("no feasible roster; implicated constraints: {}", .constraints.join(", "))]
    Infeasible {
        /// Identifiers of the constraints involved.
        constraints: Vec<String>,
    },

    /// The greedy path could not fill every seat.
    #[error("{} shift(s) left uncovered", .shortfalls.len())]
    PartialCoverage {
        /// Unfilled (day, shift) entries.
        shortfalls: Vec<Shortfall>,
        /// The roster as far as it could be built.
        partial: Box<Assignment>,
    },

    /// The solver hit its time or node limit before finding a roster.
    #[error("solver stopped after {elapsed_ms} ms without a roster")]
    SolverTimeout {
        /// Wall-clock time spent.
        elapsed_ms: u64,
    },

    /// The caller's cancellation flag was raised.
    #[error("rostering cancelled")]
    Cancelled,
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ValidationError>> for RosterError {
    fn from(errors: Vec<ValidationError>) -> Self {
        RosterError::InvalidConfig(errors)
    }
}

impl From<ValidationError> for RosterError {
    fn from(error: ValidationError) -> Self {
        RosterError::InvalidConfig(vec![error])
    }
}
