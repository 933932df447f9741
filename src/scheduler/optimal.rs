//! Constraint-model roster builder.
//!
//! Builds the month as a 0/1 model with [`RosterCpBuilder`], solves it
//! with any [`CpSolver`], then replays the decoded shifts through a
//! [`StateTracker`] to decide office/remote presence and to mark rest
//! blocks.

use std::time::Instant;

use tracing::{error, info, warn};

use super::{audit, AssignmentStrategy, ScheduleRequest};
use crate::cp::{BranchAndBoundSolver, CpSolver, RosterCpBuilder, SolverConfig, SolverStatus};
use crate::error::RosterError;
use crate::models::{Assignment, Calendar, Duty, Employee, LeaveBook, Presence, RuleConfig};
use crate::state::StateTracker;

/// Roster builder backed by a constraint solver.
///
/// Either every hard rule holds in the returned roster, or the run fails
/// with [`RosterError::Infeasible`], [`RosterError::SolverTimeout`] or
/// [`RosterError::Cancelled`].
///
/// # Example
/// ```
/// use std::time::Duration;
/// use u_roster::cp::SolverConfig;
/// use u_roster::models::{DayType, Employee, RuleConfig, Shift};
/// use u_roster::scheduler::{AssignmentStrategy, OptimizingScheduler, ScheduleRequest};
///
/// let rules = RuleConfig::new(vec![Shift::new("S1"), Shift::new("S2")])
///     .with_requirements(DayType::Weekday, &[("S1", 2), ("S2", 2)]);
/// let employees = vec![
///     Employee::shift_lead("L1"),
///     Employee::shift_lead("L2"),
///     Employee::associate("A1"),
///     Employee::associate("A2"),
/// ];
/// let request = ScheduleRequest::new(employees, rules, 2025, 9);
///
/// let scheduler = OptimizingScheduler::new()
///     .with_config(SolverConfig::default().with_time_limit(Duration::from_secs(10)));
/// let roster = scheduler.assign(&request).unwrap();
/// assert_eq!(roster.headcount(0, "S1"), 2);
/// ```
#[derive(Debug, Clone)]
pub struct OptimizingScheduler<S: CpSolver = BranchAndBoundSolver> {
    solver: S,
    config: SolverConfig,
}

impl OptimizingScheduler<BranchAndBoundSolver> {
    /// Creates a scheduler using the built-in branch-and-bound solver.
    pub fn new() -> Self {
        Self::with_solver(BranchAndBoundSolver::new())
    }
}

impl Default for OptimizingScheduler<BranchAndBoundSolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CpSolver> OptimizingScheduler<S> {
    /// Creates a scheduler using the given solver.
    pub fn with_solver(solver: S) -> Self {
        Self {
            solver,
            config: SolverConfig::default(),
        }
    }

    /// Sets time limit, node limit and cancellation.
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Solver configuration in use.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

impl<S: CpSolver> AssignmentStrategy for OptimizingScheduler<S> {
    fn name(&self) -> &'static str {
        "optimizing"
    }

    fn assign(&self, request: &ScheduleRequest) -> Result<Assignment, RosterError> {
        let start = Instant::now();
        let (calendar, leaves) = request.prepare()?;
        let employees = &request.employees;
        let rules = &request.rules;
        info!(
            strategy = self.name(),
            solver = self.solver.name(),
            year = request.year,
            month = request.month,
            employees = employees.len(),
            "building roster"
        );

        let built = RosterCpBuilder::new(employees, rules, &calendar, &leaves).build()?;
        let solution = self.solver.solve(&built.model, &self.config);

        match solution.status {
            SolverStatus::Optimal | SolverStatus::Feasible => {}
            SolverStatus::Infeasible => {
                warn!(conflicts = ?solution.conflicts, "roster infeasible");
                return Err(RosterError::Infeasible {
                    constraints: solution.conflicts,
                });
            }
            SolverStatus::Timeout => {
                return Err(RosterError::SolverTimeout {
                    elapsed_ms: start.elapsed().as_millis() as u64,
                });
            }
            SolverStatus::Cancelled => return Err(RosterError::Cancelled),
            SolverStatus::ModelInvalid => {
                error!(model = %built.model.name, "solver rejected the model");
                return Err(RosterError::Infeasible {
                    constraints: vec![format!("model/{}", built.model.name)],
                });
            }
        }

        let shifts = built.decode(&solution);
        let mut roster = replay(&calendar, employees, rules, &leaves, &shifts);
        roster.warnings = audit(&roster, employees, rules, &leaves);
        info!(
            status = ?solution.status,
            objective = ?solution.objective_value,
            nodes = solution.nodes,
            warnings = roster.warnings.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "roster complete"
        );
        Ok(roster)
    }
}

/// Turns decoded shift indices into duties, deciding presence and rest
/// the same way the greedy path does.
fn replay(
    calendar: &Calendar,
    employees: &[Employee],
    rules: &RuleConfig,
    leaves: &LeaveBook,
    shifts: &[Vec<Option<usize>>],
) -> Assignment {
    let mut tracker = StateTracker::new(employees, rules, leaves);
    let mut roster = Assignment::new(calendar, employees);
    // Exempt employees claim their office seats first.
    let mut order: Vec<usize> = (0..employees.len()).collect();
    order.sort_by_key(|&e| !employees[e].office_exempt);

    for day in &calendar.days {
        tracker.begin_day(day);
        let mut office = vec![0u32; rules.shifts.len()];

        for &e in &order {
            let emp = &employees[e];
            if tracker.is_on_leave(e, day) {
                roster.set(e, day.index, Duty::Leave);
                tracker.record_leave(e, day);
                continue;
            }
            match shifts[e][day.index] {
                Some(c) => {
                    let code = &rules.shifts[c].code;
                    let target = rules.office.shift_target(rules.required_on(day, code));
                    let presence = tracker.record_assignment(e, day, code, office[c] < target);
                    if presence == Presence::Office && !emp.office_exempt {
                        office[c] += 1;
                    }
                    roster.set(e, day.index, Duty::shift(code.clone(), presence));
                }
                None => {
                    let duty = if tracker.in_mandatory_rest(e) {
                        Duty::Rest
                    } else {
                        Duty::Off
                    };
                    roster.set(e, day.index, duty);
                    tracker.record_rest(e, day);
                }
            }
        }
    }
    roster
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayType, OfficeRules, Shift};
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::time::Duration;

    fn rules() -> RuleConfig {
        RuleConfig::new(vec![Shift::new("S1"), Shift::new("S2")])
            .with_requirements(DayType::Weekday, &[("S1", 2), ("S2", 2)])
    }

    fn four() -> Vec<Employee> {
        vec![
            Employee::shift_lead("L1"),
            Employee::shift_lead("L2"),
            Employee::associate("A1"),
            Employee::associate("A2"),
        ]
    }

    #[test]
    fn test_four_person_month() {
        let req = ScheduleRequest::new(four(), rules(), 2025, 9);
        let roster = OptimizingScheduler::new().assign(&req).unwrap();
        assert!(roster.is_clean(), "{:?}", roster.warnings);
        for day in &roster.days {
            let expected = if day.is_weekend { 0 } else { 2 };
            assert_eq!(roster.headcount(day.index, "S1"), expected);
            assert_eq!(roster.headcount(day.index, "S2"), expected);
        }
        for e in 0..4 {
            assert_eq!(roster.shifts_worked(e), 22);
        }
    }

    #[test]
    fn test_office_presence_split() {
        let req = ScheduleRequest::new(four(), rules(), 2025, 9);
        let roster = OptimizingScheduler::new().assign(&req).unwrap();
        // Monday: target 1 office seat per shift of 2.
        for code in ["S1", "S2"] {
            let office = roster
                .assigned(0, code)
                .into_iter()
                .filter(|&e| roster.duties[e][0].presence() == Some(Presence::Office))
                .count();
            assert_eq!(office, 1);
        }
    }

    #[test]
    fn test_office_seat_limit() {
        let mut employees = four();
        employees.push(Employee::team_lead("T1", "S2"));
        let rules = RuleConfig::new(vec![Shift::new("S1"), Shift::new("S2")])
            .with_requirements(DayType::Weekday, &[("S1", 2), ("S2", 3)])
            .with_office(OfficeRules::default().with_seats(2));
        let req = ScheduleRequest::new(employees, rules, 2025, 9);
        let roster = OptimizingScheduler::new().assign(&req).unwrap();

        let t1 = roster.employee_index("T1").unwrap();
        for day in roster.days.iter().filter(|d| !d.is_weekend) {
            let office = (0..roster.duties.len())
                .filter(|&e| roster.duties[e][day.index].presence() == Some(Presence::Office))
                .count();
            assert_eq!(office, 2, "{}", day.date);
            assert_eq!(roster.duties[t1][day.index].presence(), Some(Presence::Office));
        }
    }

    #[test]
    fn test_infeasible_headcount() {
        let employees = vec![
            Employee::shift_lead("L1"),
            Employee::shift_lead("L2"),
            Employee::associate("A1"),
        ];
        let req = ScheduleRequest::new(employees, rules(), 2025, 9);
        match OptimizingScheduler::new().assign(&req) {
            Err(RosterError::Infeasible { constraints }) => {
                assert!(constraints.iter().any(|c| c == "cover/2025-09-01"));
            }
            other => panic!("expected infeasible, got {other:?}"),
        }
    }

    #[test]
    fn test_timeout() {
        let req = ScheduleRequest::new(four(), rules(), 2025, 9);
        let scheduler = OptimizingScheduler::new()
            .with_config(SolverConfig::default().with_time_limit(Duration::ZERO));
        assert!(matches!(
            scheduler.assign(&req),
            Err(RosterError::SolverTimeout { .. })
        ));
    }

    #[test]
    fn test_cancelled() {
        let req = ScheduleRequest::new(four(), rules(), 2025, 9);
        let flag = Arc::new(AtomicBool::new(true));
        let scheduler =
            OptimizingScheduler::new().with_config(SolverConfig::default().with_cancel_flag(flag));
        assert!(matches!(scheduler.assign(&req), Err(RosterError::Cancelled)));
    }

    #[test]
    fn test_team_lead_variant() {
        let mut employees = four();
        employees.push(Employee::team_lead("T1", "S2"));
        let rules = RuleConfig::new(vec![Shift::new("S1"), Shift::new("S2")])
            .with_requirements(DayType::Weekday, &[("S1", 2), ("S2", 3)]);
        let req = ScheduleRequest::new(employees, rules, 2025, 9);
        let roster = OptimizingScheduler::new().assign(&req).unwrap();
        assert!(roster.is_clean(), "{:?}", roster.warnings);

        let t1 = roster.employee_index("T1").unwrap();
        for day in &roster.days {
            let duty = &roster.duties[t1][day.index];
            if day.is_weekend {
                assert!(!duty.is_working());
            } else {
                assert_eq!(duty.shift_code(), Some("S2"));
                assert_eq!(duty.presence(), Some(Presence::Office));
            }
        }
    }
}
