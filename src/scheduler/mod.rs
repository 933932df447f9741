//! Roster strategies, audit and KPI evaluation.
//!
//! Two strategies implement [`AssignmentStrategy`]:
//!
//! - [`GreedyScheduler`]: walks the month day by day, placing team leads,
//!   then one shift lead per shift, then associates ranked by a
//!   [`RuleEngine`](crate::dispatching::RuleEngine). Always fast; may
//!   leave seats empty ([`RosterError::PartialCoverage`]).
//! - [`OptimizingScheduler`]: builds a 0/1 model and hands it to a
//!   [`CpSolver`](crate::cp::CpSolver). Either every hard rule holds or
//!   the run fails with a typed error.
//!
//! Both share the [`StateTracker`](crate::state::StateTracker) for
//! presence decisions and the [`audit`] for warnings.
//!
//! # KPI
//!
//! [`RosterKpi`] summarises workload, weekend and office distribution and
//! coverage of a finished roster.
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"

mod audit;
mod greedy;
mod kpi;
mod optimal;

pub use audit::audit;
pub use greedy::GreedyScheduler;
pub use kpi::RosterKpi;
pub use optimal::OptimizingScheduler;

use serde::{Deserialize, Serialize};

use crate::error::RosterError;
use crate::models::{Assignment, Calendar, Employee, LeaveBook, LeaveRequest, RuleConfig};
use crate::validation::validate_input;

/// Input container for a rostering run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Employees in roster order.
    pub employees: Vec<Employee>,
    /// Rule set.
    pub rules: RuleConfig,
    /// Calendar year.
    pub year: i32,
    /// Month (1–12).
    pub month: u32,
    /// Leave requests (only approved ones are used).
    #[serde(default)]
    pub leaves: Vec<LeaveRequest>,
}

impl ScheduleRequest {
    /// Creates a request without leaves.
    pub fn new(employees: Vec<Employee>, rules: RuleConfig, year: i32, month: u32) -> Self {
        Self {
            employees,
            rules,
            year,
            month,
            leaves: Vec::new(),
        }
    }

    /// Sets the leave requests.
    pub fn with_leaves(mut self, leaves: Vec<LeaveRequest>) -> Self {
        self.leaves = leaves;
        self
    }

    /// Adds one leave request.
    pub fn with_leave(mut self, leave: LeaveRequest) -> Self {
        self.leaves.push(leave);
        self
    }

    /// Parses a request from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validates the request and enumerates the month.
    ///
    /// # Errors
    /// `RosterError::InvalidConfig` with every detected problem.
    pub fn prepare(&self) -> Result<(Calendar, LeaveBook), RosterError> {
        validate_input(&self.employees, &self.rules, &self.leaves)?;
        let calendar = Calendar::for_month(self.year, self.month)?;
        Ok((calendar, LeaveBook::new(&self.leaves)))
    }
}

/// A way of building a month roster.
pub trait AssignmentStrategy {
    /// Strategy name for logging.
    fn name(&self) -> &'static str;

    /// Builds the roster for the request.
    fn assign(&self, request: &ScheduleRequest) -> Result<Assignment, RosterError>;
}
