//! Built-in candidate rules.
//!
//! # Categories
//!
//! - **Coverage**: MUST_WORK
//! - **Presence**: FEWEST_OFFICE
//! - **Load**: LEAST_ASSIGNED, FEWEST_WEEKEND, SHORTEST_STREAK
//!
//! # Score Convention
//! All rules return lower scores for candidates that should be picked first.

use super::{Candidate, CandidateRule, RuleScore, SelectionContext};

/// Must-work-today first.
///
/// Scores 0 for candidates idle yesterday (an idle today would create a
/// double OFF), 1 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct MustWork;

impl CandidateRule for MustWork {
    fn name(&self) -> &'static str {
        "MUST_WORK"
    }

    fn evaluate(&self, candidate: &Candidate<'_>, _context: &SelectionContext) -> RuleScore {
        if candidate.must_work {
            0.0
        } else {
            1.0
        }
    }

    fn description(&self) -> &'static str {
        "Idle yesterday, must work today"
    }
}

/// Fewest office days this week.
///
/// Only active while the shift still has open office seats; neutral
/// otherwise. Exempt employees are neutral.
#[derive(Debug, Clone, Copy)]
pub struct FewestOfficeDays;

impl CandidateRule for FewestOfficeDays {
    fn name(&self) -> &'static str {
        "FEWEST_OFFICE"
    }

    fn evaluate(&self, candidate: &Candidate<'_>, context: &SelectionContext) -> RuleScore {
        if !context.office_seats_open || candidate.employee.office_exempt {
            return 0.0;
        }
        candidate.state.weekly_office_days as f64
    }

    fn description(&self) -> &'static str {
        "Fewest office days this week"
    }
}

/// Fewest weekend shifts this month.
#[derive(Debug, Clone, Copy)]
pub struct FewestWeekendShifts;

impl CandidateRule for FewestWeekendShifts {
    fn name(&self) -> &'static str {
        "FEWEST_WEEKEND"
    }

    fn evaluate(&self, candidate: &Candidate<'_>, _context: &SelectionContext) -> RuleScore {
        candidate.state.weekend_shift_count as f64
    }

    fn description(&self) -> &'static str {
        "Fewest weekend shifts"
    }
}

/// Fewest shifts this month.
#[derive(Debug, Clone, Copy)]
pub struct LeastAssigned;

impl CandidateRule for LeastAssigned {
    fn name(&self) -> &'static str {
        "LEAST_ASSIGNED"
    }

    fn evaluate(&self, candidate: &Candidate<'_>, _context: &SelectionContext) -> RuleScore {
        candidate.state.total_shifts as f64
    }

    fn description(&self) -> &'static str {
        "Least assigned this month"
    }
}

/// Shortest current working streak.
#[derive(Debug, Clone, Copy)]
pub struct ShortestStreak;

impl CandidateRule for ShortestStreak {
    fn name(&self) -> &'static str {
        "SHORTEST_STREAK"
    }

    fn evaluate(&self, candidate: &Candidate<'_>, _context: &SelectionContext) -> RuleScore {
        candidate.state.consecutive_work_days as f64
    }

    fn description(&self) -> &'static str {
        "Shortest working streak"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Calendar, Employee};
    use crate::state::EmployeeState;

    fn weekend_ctx() -> SelectionContext {
        let cal = Calendar::for_month(2025, 8).unwrap();
        SelectionContext::for_shift(&cal.days[1], "S2")
    }

    #[test]
    fn test_fewest_weekend() {
        let emp = Employee::shift_lead("L1");
        let st = EmployeeState {
            weekend_shift_count: 3,
            ..Default::default()
        };
        let c = Candidate { index: 0, employee: &emp, state: &st, must_work: false };
        let ctx = weekend_ctx();
        assert!(ctx.is_weekend);
        assert!((FewestWeekendShifts.evaluate(&c, &ctx) - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_office_exempt_neutral() {
        let tl = Employee::team_lead("T1", "S2");
        let st = EmployeeState {
            weekly_office_days: 3,
            ..Default::default()
        };
        let c = Candidate { index: 0, employee: &tl, state: &st, must_work: false };
        let ctx = weekend_ctx().with_office_seats_open(true);
        assert_eq!(FewestOfficeDays.evaluate(&c, &ctx), 0.0);
    }

    #[test]
    fn test_rule_names() {
        assert_eq!(MustWork.name(), "MUST_WORK");
        assert_eq!(FewestOfficeDays.name(), "FEWEST_OFFICE");
        assert_eq!(LeastAssigned.description(), "Least assigned this month");
        assert_eq!(ShortestStreak.name(), "SHORTEST_STREAK");
    }
}
