//! Monthly shift rostering for the U-Engine ecosystem.
//!
//! Turns a roster of employees, shift definitions with per-day-type
//! headcounts, approved leaves and a target month into an employee × day
//! grid of duties (shift with WFO/WFH presence, OFF, REST, LEAVE).
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Employee`, `Shift`, `RuleConfig`,
//!   `Calendar`, `LeaveBook`, `Assignment`, `Violation`
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown shifts,
//!   team-lead designations, missing shift leads)
//! - **`state`**: Per-run employee state (streaks, rest blocks, office quota)
//! - **`dispatching`**: Candidate ranking rules for the greedy path
//! - **`cp`**: 0/1 linear model, roster builder and branch-and-bound solver
//! - **`scheduler`**: `GreedyScheduler`, `OptimizingScheduler`, audit and KPIs
//! - **`error`**: `RosterError` and greedy shortfalls
//!
//! # Quick Start
//!
//! ```
//! use u_roster::models::{DayType, Employee, RuleConfig, Shift};
//! use u_roster::scheduler::{AssignmentStrategy, GreedyScheduler, ScheduleRequest};
//!
//! let rules = RuleConfig::new(vec![Shift::new("S1"), Shift::new("S2")])
//!     .with_requirements(DayType::Weekday, &[("S1", 2), ("S2", 2)]);
//! let employees = vec![
//!     Employee::shift_lead("L1"),
//!     Employee::shift_lead("L2"),
//!     Employee::associate("A1"),
//!     Employee::associate("A2"),
//! ];
//! let request = ScheduleRequest::new(employees, rules, 2025, 9);
//! let roster = GreedyScheduler::new().assign(&request).unwrap();
//! assert_eq!(roster.days.len(), 30);
//! ```
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 13

pub mod cp;
pub mod dispatching;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod state;
pub mod validation;

pub use error::{RosterError, Shortfall, ShortfallKind};
pub use scheduler::{
    AssignmentStrategy, GreedyScheduler, OptimizingScheduler, RosterKpi, ScheduleRequest,
};
