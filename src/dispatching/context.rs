//! Selection context for candidate rule evaluation.

use chrono::NaiveDate;

use crate::models::{Day, Employee};
use crate::state::EmployeeState;

/// An employee being considered for a seat.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Position in the roster.
    pub index: usize,
    /// The employee.
    pub employee: &'a Employee,
    /// Their state at the start of the decision.
    pub state: &'a EmployeeState,
    /// Idle yesterday, so idling today would break the no-double-OFF rule.
    pub must_work: bool,
}

/// Per-seat information passed to candidate rules.
#[derive(Debug, Clone)]
pub struct SelectionContext {
    /// Date being filled.
    pub date: NaiveDate,
    /// Saturday or Sunday.
    pub is_weekend: bool,
    /// Shift being filled.
    pub shift_code: String,
    /// Whether the shift still needs office-present members.
    pub office_seats_open: bool,
}

impl SelectionContext {
    /// Creates a context for one shift on one day.
    pub fn for_shift(day: &Day, shift_code: impl Into<String>) -> Self {
        Self {
            date: day.date,
            is_weekend: day.is_weekend,
            shift_code: shift_code.into(),
            office_seats_open: false,
        }
    }

    /// Sets whether office seats remain open.
    pub fn with_office_seats_open(mut self, open: bool) -> Self {
        self.office_seats_open = open;
        self
    }
}
