//! Per-run employee state.
//!
//! A [`StateTracker`] owns one [`EmployeeState`] per employee for a
//! single rostering run. Days are fed to it strictly in ascending order;
//! every placement decision of the greedy path and the presence replay of
//! the optimizing path read and update it.
//!
//! # Rest cycle
//!
//! ```text
//! work ×6 ──► needs_mandatory_rest ──► rest ×2 ──► cleared
//!   ▲                                               │
//!   └───────────────────────────────────────────────┘
//! ```
//!
//! Leave days count as rest days.
//!
//! # Office seats
//!
//! When [`OfficeRules::seats`](crate::models::OfficeRules::seats) is set,
//! office presence is granted only while the day has a free seat. Exempt
//! employees always work from the office and occupy a seat.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Day, Employee, LeaveBook, Presence, RuleConfig};

/// Mutable state of one employee within a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeState {
    /// Current run of consecutive working days.
    pub consecutive_work_days: u32,
    /// Last date a shift was worked.
    pub last_work_date: Option<NaiveDate>,
    /// Code of the last shift worked.
    pub last_shift_code: Option<String>,
    /// Set once the streak reaches the maximum; cleared after the rest block.
    pub needs_mandatory_rest: bool,
    /// Rest days observed since the flag was raised.
    pub rest_days_observed: u32,
    /// Last non-working date.
    pub last_rest_date: Option<NaiveDate>,
    /// Last approved-leave date.
    pub last_leave_date: Option<NaiveDate>,
    /// Weekend shifts worked this month.
    pub weekend_shift_count: u32,
    /// Office days this week.
    pub weekly_office_days: u32,
    /// Office dates this week.
    pub weekly_office_dates: Vec<NaiveDate>,
    /// Office days this month.
    pub total_office_days: u32,
    /// Shifts worked this month.
    pub total_shifts: u32,
}

/// Outcome of an eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// May be placed.
    Eligible,
    /// Approved leave on this date.
    OnLeave,
    /// Role forbids the shift on this day type.
    RoleForbids,
    /// The shift does not run on this day.
    ShiftNotRunning,
    /// Inside a mandatory rest block.
    MandatoryRest,
    /// Already placed on this date.
    AlreadyWorking,
    /// Yesterday's shift may not be followed by this one.
    ForbiddenSuccession,
}

impl Eligibility {
    /// Whether placement is allowed.
    #[inline]
    pub fn is_eligible(self) -> bool {
        self == Eligibility::Eligible
    }
}

/// Sequential per-run employee state.
#[derive(Debug, Clone)]
pub struct StateTracker<'a> {
    employees: &'a [Employee],
    rules: &'a RuleConfig,
    leaves: &'a LeaveBook,
    states: Vec<EmployeeState>,
    current: Option<Day>,
    previous: Option<Day>,
    office_seats_taken: u32,
}

impl<'a> StateTracker<'a> {
    /// Creates a tracker with fresh state for every employee.
    pub fn new(employees: &'a [Employee], rules: &'a RuleConfig, leaves: &'a LeaveBook) -> Self {
        Self {
            employees,
            rules,
            leaves,
            states: vec![EmployeeState::default(); employees.len()],
            current: None,
            previous: None,
            office_seats_taken: 0,
        }
    }

    /// Advances to `day`. Frees the office seats and clears weekly office
    /// counters on Mondays.
    pub fn begin_day(&mut self, day: &Day) {
        debug_assert!(
            self.current.as_ref().is_none_or(|c| c.date < day.date),
            "days must be processed in ascending order"
        );
        self.previous = self.current.replace(day.clone());
        self.office_seats_taken = 0;
        if day.is_monday() {
            for s in &mut self.states {
                s.weekly_office_days = 0;
                s.weekly_office_dates.clear();
            }
        }
    }

    /// Day currently being processed.
    pub fn current_day(&self) -> Option<&Day> {
        self.current.as_ref()
    }

    /// State of one employee.
    pub fn state(&self, employee: usize) -> &EmployeeState {
        &self.states[employee]
    }

    /// All states in roster order.
    pub fn states(&self) -> &[EmployeeState] {
        &self.states
    }

    /// Office seats occupied today.
    pub fn office_seats_taken(&self) -> u32 {
        self.office_seats_taken
    }

    /// Whether an office seat is still free today. Always true without a
    /// seat limit.
    pub fn has_office_seat(&self) -> bool {
        self.rules
            .office
            .seats
            .is_none_or(|seats| self.office_seats_taken < seats)
    }

    /// Whether `employee` is on approved leave on `day`.
    pub fn is_on_leave(&self, employee: usize, day: &Day) -> bool {
        self.leaves
            .is_on_leave(&self.employees[employee].id, day.date)
    }

    /// Checks whether `employee` may work `shift_code` on `day`.
    pub fn eligibility(&self, employee: usize, day: &Day, shift_code: &str) -> Eligibility {
        let emp = &self.employees[employee];
        let state = &self.states[employee];

        if self.leaves.is_on_leave(&emp.id, day.date) {
            return Eligibility::OnLeave;
        }
        if !emp.can_work(shift_code, day.day_type()) {
            return Eligibility::RoleForbids;
        }
        if self.rules.required_on(day, shift_code) == 0 {
            return Eligibility::ShiftNotRunning;
        }
        if state.needs_mandatory_rest {
            return Eligibility::MandatoryRest;
        }
        if state.last_work_date == Some(day.date) {
            return Eligibility::AlreadyWorking;
        }
        if let (Some(prev), Some(last)) = (state.last_work_date, state.last_shift_code.as_deref()) {
            if day.date.pred_opt() == Some(prev) && self.rules.rest.is_forbidden(last, shift_code) {
                return Eligibility::ForbiddenSuccession;
            }
        }
        Eligibility::Eligible
    }

    /// Shorthand for [`eligibility`](Self::eligibility)`.is_eligible()`.
    #[inline]
    pub fn is_eligible(&self, employee: usize, day: &Day, shift_code: &str) -> bool {
        self.eligibility(employee, day, shift_code).is_eligible()
    }

    /// Records a worked shift and returns where it is worked.
    ///
    /// Office is granted when requested, unless the weekly quota is used
    /// up or no office seat is free today. Exempt employees always work
    /// from the office and are not counted against the quota.
    pub fn record_assignment(
        &mut self,
        employee: usize,
        day: &Day,
        shift_code: &str,
        wants_office: bool,
    ) -> Presence {
        let exempt = self.employees[employee].office_exempt;
        let quota = self.rules.office.weekly_quota;
        let seat_free = self.has_office_seat();
        let max_streak = self.rules.rest.max_consecutive_days;
        let state = &mut self.states[employee];

        state.consecutive_work_days += 1;
        state.total_shifts += 1;
        state.last_work_date = Some(day.date);
        state.last_shift_code = Some(shift_code.to_string());
        if day.is_weekend {
            state.weekend_shift_count += 1;
        }

        let presence = if exempt {
            Presence::Office
        } else if wants_office && seat_free && state.weekly_office_days < quota {
            state.weekly_office_days += 1;
            state.weekly_office_dates.push(day.date);
            state.total_office_days += 1;
            Presence::Office
        } else {
            Presence::Remote
        };

        if state.consecutive_work_days >= max_streak {
            state.needs_mandatory_rest = true;
            state.rest_days_observed = 0;
        }
        if presence == Presence::Office {
            self.office_seats_taken += 1;
        }
        presence
    }

    /// Records a non-working day.
    pub fn record_rest(&mut self, employee: usize, day: &Day) {
        let rest_days = self.rules.rest.mandatory_rest_days;
        let state = &mut self.states[employee];
        state.consecutive_work_days = 0;
        state.last_rest_date = Some(day.date);
        if state.needs_mandatory_rest {
            state.rest_days_observed += 1;
            if state.rest_days_observed >= rest_days {
                state.needs_mandatory_rest = false;
                state.rest_days_observed = 0;
            }
        }
    }

    /// Records an approved-leave day. Counts as rest.
    pub fn record_leave(&mut self, employee: usize, day: &Day) {
        self.states[employee].last_leave_date = Some(day.date);
        self.record_rest(employee, day);
    }

    /// Whether `employee` must work today to avoid two adjacent
    /// non-working days that are not both weekend.
    ///
    /// False on the first day, when either day is leave, or when the
    /// employee worked yesterday.
    pub fn must_work(&self, employee: usize, day: &Day) -> bool {
        let Some(prev) = &self.previous else {
            return false;
        };
        let state = &self.states[employee];
        if prev.is_weekend && day.is_weekend {
            return false;
        }
        if state.last_work_date == Some(prev.date) || state.last_leave_date == Some(prev.date) {
            return false;
        }
        !self.is_on_leave(employee, day)
    }

    /// Whether `employee` is inside a mandatory rest block.
    #[inline]
    pub fn in_mandatory_rest(&self, employee: usize) -> bool {
        self.states[employee].needs_mandatory_rest
    }

    /// Whether the employee's last shift was worked on the previous day.
    pub fn worked_previous_day(&self, employee: usize) -> bool {
        match &self.previous {
            Some(prev) => self.states[employee].last_work_date == Some(prev.date),
            None => false,
        }
    }
}
