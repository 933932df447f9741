//! Greedy day-by-day roster builder.
//!
//! # Algorithm
//!
//! For each day of the month, in order:
//!
//! 1. Approved leave is marked.
//! 2. Team leads fill their designated shift, leaving one seat for a
//!    shift lead when lead coverage is on.
//! 3. One shift lead per running shift. Weekdays rotate the starting
//!    lead by `(shift position + day of month) % lead count`; weekends pick
//!    the lead with the fewest weekend shifts.
//! 4. Remaining seats go to associates ranked by the [`RuleEngine`], then
//!    to spare shift leads.
//! 5. Everybody else is off (or resting, inside a mandatory rest block).
//!
//! Seats that cannot be filled are collected; the roster is still
//! completed and returned inside [`RosterError::PartialCoverage`].
//!
//! # Complexity
//! O(D × S × E log E) for D days, S shifts and E employees.

use tracing::{debug, info, trace, warn};

use super::{audit, AssignmentStrategy, ScheduleRequest};
use crate::dispatching::rules::{FewestWeekendShifts, LeastAssigned};
use crate::dispatching::{Candidate, RuleEngine, SelectionContext};
use crate::error::{RosterError, Shortfall};
use crate::models::{Assignment, Day, Duty, Employee, Presence, Role, RuleConfig};
use crate::state::StateTracker;

/// Greedy rule-based roster builder.
///
/// # Example
/// ```
/// use u_roster::models::{DayType, Employee, RuleConfig, Shift};
/// use u_roster::scheduler::{AssignmentStrategy, GreedyScheduler, ScheduleRequest};
///
/// let rules = RuleConfig::new(vec![Shift::new("S1")])
///     .with_requirements(DayType::Weekday, &[("S1", 1)]);
/// let employees = vec![Employee::shift_lead("L1"), Employee::shift_lead("L2")];
/// let request = ScheduleRequest::new(employees, rules, 2025, 9);
///
/// let roster = GreedyScheduler::new().assign(&request).unwrap();
/// assert_eq!(roster.headcount(0, "S1"), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GreedyScheduler {
    associates: RuleEngine,
    weekend_leads: RuleEngine,
    team_leads: RuleEngine,
}

impl GreedyScheduler {
    /// Creates a scheduler with the default associate ranking.
    pub fn new() -> Self {
        Self {
            associates: RuleEngine::associate_default(),
            weekend_leads: RuleEngine::new().with_rule(FewestWeekendShifts),
            team_leads: RuleEngine::new().with_rule(LeastAssigned),
        }
    }

    /// Replaces the associate ranking.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.associates = engine;
        self
    }
}

impl Default for GreedyScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// One running shift being filled.
struct Seat {
    code: String,
    position: usize,
    required: u32,
    assigned: u32,
    office: u32,
    office_target: u32,
}

impl Seat {
    fn is_open(&self) -> bool {
        self.assigned < self.required
    }

    fn wants_office(&self) -> bool {
        self.office < self.office_target
    }
}

/// Working state of one day.
struct DayFill<'t, 'a> {
    day: &'t Day,
    employees: &'a [Employee],
    tracker: &'t mut StateTracker<'a>,
    roster: &'t mut Assignment,
    placed: Vec<bool>,
    must_work: Vec<bool>,
}

impl DayFill<'_, '_> {
    fn free(&self, employee: usize, code: &str) -> bool {
        !self.placed[employee] && self.tracker.is_eligible(employee, self.day, code)
    }

    fn place(&mut self, employee: usize, seat: &mut Seat) {
        let presence =
            self.tracker
                .record_assignment(employee, self.day, &seat.code, seat.wants_office());
        self.roster
            .set(employee, self.day.index, Duty::shift(seat.code.clone(), presence));
        seat.assigned += 1;
        if presence == Presence::Office && !self.employees[employee].office_exempt {
            seat.office += 1;
        }
        self.placed[employee] = true;
        trace!(
            date = %self.day.date,
            employee = %self.employees[employee].id,
            shift = %seat.code,
            presence = presence.code(),
            "placed"
        );
    }

    /// Best of `pool` for `seat` under `engine`.
    fn pick(&self, engine: &RuleEngine, pool: &[usize], seat: &Seat) -> Option<usize> {
        let candidates: Vec<Candidate<'_>> = pool
            .iter()
            .map(|&e| Candidate {
                index: e,
                employee: &self.employees[e],
                state: self.tracker.state(e),
                must_work: self.must_work[e],
            })
            .collect();
        let ctx = SelectionContext::for_shift(self.day, seat.code.clone())
            .with_office_seats_open(seat.wants_office() && self.tracker.has_office_seat());
        engine.select_best(&candidates, &ctx).map(|i| pool[i])
    }

    fn pool(&self, seat: &Seat, role: Role) -> Vec<usize> {
        (0..self.employees.len())
            .filter(|&e| self.employees[e].role == role && self.free(e, &seat.code))
            .collect()
    }
}

impl GreedyScheduler {
    fn fill_day<'a>(
        &self,
        day: &Day,
        employees: &'a [Employee],
        rules: &RuleConfig,
        tracker: &mut StateTracker<'a>,
        roster: &mut Assignment,
        shortfalls: &mut Vec<Shortfall>,
    ) {
        let n = employees.len();
        let leads: Vec<usize> = (0..n).filter(|&e| employees[e].is_shift_lead()).collect();
        let must_work: Vec<bool> = (0..n).map(|e| tracker.must_work(e, day)).collect();
        let lead_seat = rules.lead_presence.every_shift && !leads.is_empty();

        let mut seats: Vec<Seat> = rules
            .running_shifts(day.day_type())
            .into_iter()
            .map(|(position, shift, required)| Seat {
                code: shift.code.clone(),
                position,
                required,
                assigned: 0,
                office: 0,
                office_target: rules.office.shift_target(required),
            })
            .collect();

        let mut fill = DayFill {
            day,
            employees,
            tracker,
            roster,
            placed: vec![false; n],
            must_work,
        };

        for e in 0..n {
            if fill.tracker.is_on_leave(e, day) {
                fill.roster.set(e, day.index, Duty::Leave);
                fill.tracker.record_leave(e, day);
                fill.placed[e] = true;
            }
        }

        // Team leads, one seat kept back for the shift lead.
        for seat in &mut seats {
            let capacity = if lead_seat {
                seat.required.saturating_sub(1)
            } else {
                seat.required
            };
            while seat.assigned < capacity {
                let pool = fill.pool(seat, Role::TeamLead);
                let Some(e) = fill.pick(&self.team_leads, &pool, seat) else {
                    break;
                };
                fill.place(e, seat);
            }
        }

        if lead_seat {
            for seat in &mut seats {
                if !seat.is_open() {
                    continue;
                }
                let chosen = if day.is_weekend {
                    let pool = fill.pool(seat, Role::ShiftLead);
                    fill.pick(&self.weekend_leads, &pool, seat)
                } else {
                    let start = (seat.position + day.day_of_month() as usize) % leads.len();
                    (0..leads.len())
                        .map(|i| leads[(start + i) % leads.len()])
                        .find(|&e| fill.free(e, &seat.code))
                };
                match chosen {
                    Some(e) => fill.place(e, seat),
                    None => {
                        warn!(date = %day.date, shift = %seat.code, "no shift lead available");
                        shortfalls.push(Shortfall::no_shift_lead(day.date, seat.code.clone()));
                    }
                }
            }
        }

        // With lead coverage off, shift leads rank alongside associates.
        let general: &[Role] = if lead_seat {
            &[Role::Associate]
        } else {
            &[Role::Associate, Role::ShiftLead]
        };
        for seat in &mut seats {
            while seat.is_open() {
                let mut pool = Vec::new();
                for &role in general {
                    pool.extend(fill.pool(seat, role));
                }
                pool.sort_unstable();
                let mut chosen = fill.pick(&self.associates, &pool, seat);
                if chosen.is_none() && lead_seat {
                    let spare = fill.pool(seat, Role::ShiftLead);
                    chosen = fill.pick(&self.associates, &spare, seat);
                }
                let Some(e) = chosen else {
                    break;
                };
                fill.place(e, seat);
            }
            if seat.is_open() {
                warn!(
                    date = %day.date,
                    shift = %seat.code,
                    required = seat.required,
                    assigned = seat.assigned,
                    "shift under-staffed"
                );
                shortfalls.push(Shortfall::headcount(
                    day.date,
                    seat.code.clone(),
                    seat.required,
                    seat.assigned,
                ));
            }
        }

        for e in 0..n {
            if fill.placed[e] {
                continue;
            }
            let duty = if fill.tracker.in_mandatory_rest(e) {
                Duty::Rest
            } else {
                Duty::Off
            };
            fill.roster.set(e, day.index, duty);
            fill.tracker.record_rest(e, day);
        }

        debug!(
            date = %day.date,
            working = seats.iter().map(|s| s.assigned).sum::<u32>(),
            "day filled"
        );
    }
}

impl AssignmentStrategy for GreedyScheduler {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn assign(&self, request: &ScheduleRequest) -> Result<Assignment, RosterError> {
        let (calendar, leaves) = request.prepare()?;
        let employees = &request.employees;
        let rules = &request.rules;
        info!(
            strategy = self.name(),
            year = request.year,
            month = request.month,
            employees = employees.len(),
            "building roster"
        );

        let mut tracker = StateTracker::new(employees, rules, &leaves);
        let mut roster = Assignment::new(&calendar, employees);
        let mut shortfalls = Vec::new();

        for day in &calendar.days {
            tracker.begin_day(day);
            self.fill_day(
                day,
                employees,
                rules,
                &mut tracker,
                &mut roster,
                &mut shortfalls,
            );
        }

        roster.warnings = audit(&roster, employees, rules, &leaves);
        if !shortfalls.is_empty() {
            warn!(shortfalls = shortfalls.len(), "roster incomplete");
            return Err(RosterError::PartialCoverage {
                shortfalls,
                partial: Box::new(roster),
            });
        }
        info!(warnings = roster.warnings.len(), "roster complete");
        Ok(roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShortfallKind;
    use crate::models::{DayType, LeaveRequest, Shift, ViolationType};
    use chrono::NaiveDate;

    fn request(employees: Vec<Employee>, rules: RuleConfig) -> ScheduleRequest {
        ScheduleRequest::new(employees, rules, 2025, 9)
    }

    fn two_shift() -> RuleConfig {
        RuleConfig::new(vec![Shift::new("S1"), Shift::new("S2")])
            .with_requirements(DayType::Weekday, &[("S1", 2), ("S2", 2)])
    }

    fn staff() -> Vec<Employee> {
        vec![
            Employee::shift_lead("L1"),
            Employee::shift_lead("L2"),
            Employee::shift_lead("L3"),
            Employee::associate("A1"),
            Employee::associate("A2"),
            Employee::associate("A3"),
        ]
    }

    #[test]
    fn test_covers_every_weekday() {
        let roster = GreedyScheduler::new()
            .assign(&request(staff(), two_shift()))
            .unwrap();
        let employees = staff();
        for day in &roster.days {
            for code in ["S1", "S2"] {
                let on = roster.assigned(day.index, code);
                if day.is_weekend {
                    assert!(on.is_empty());
                } else {
                    assert_eq!(on.len(), 2, "{} {code}", day.date);
                    assert!(on.iter().any(|&e| employees[e].is_shift_lead()));
                }
            }
        }
        assert!(roster.warnings_of(&ViolationType::UnderCoverage).is_empty());
        assert!(roster.warnings_of(&ViolationType::MissingShiftLead).is_empty());
    }

    #[test]
    fn test_weekday_lead_rotation() {
        let roster = GreedyScheduler::new()
            .assign(&request(staff(), two_shift()))
            .unwrap();
        // Monday 1st: S1 starts at (0 + 1) % 3 = L2, S2 at (1 + 1) % 3 = L3.
        assert_eq!(roster.duty(1, 0).and_then(|d| d.shift_code()), Some("S1"));
        assert_eq!(roster.duty(2, 0).and_then(|d| d.shift_code()), Some("S2"));
        // Tuesday 2nd: S1 starts at L3, S2 at L1.
        assert_eq!(roster.duty(2, 1).and_then(|d| d.shift_code()), Some("S1"));
        assert_eq!(roster.duty(0, 1).and_then(|d| d.shift_code()), Some("S2"));
    }

    #[test]
    fn test_leave_is_respected() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 3).unwrap();
        let req = request(staff(), two_shift()).with_leave(LeaveRequest::approved("A1", date));
        let roster = GreedyScheduler::new().assign(&req).unwrap();
        assert_eq!(roster.duty_of("A1", 3), Some(&Duty::Leave));
    }

    #[test]
    fn test_team_lead_in_designated_shift() {
        let mut employees = staff();
        employees.push(Employee::team_lead("T1", "S2"));
        let rules = two_shift().with_requirement(DayType::Saturday, "S1", 1);
        let roster = GreedyScheduler::new()
            .assign(&request(employees, rules))
            .unwrap();
        let t1 = roster.employee_index("T1").unwrap();
        for day in &roster.days {
            let duty = &roster.duties[t1][day.index];
            if day.is_weekend {
                assert!(!duty.is_working());
            } else {
                assert_eq!(duty.shift_code(), Some("S2"), "{}", day.date);
                assert_eq!(duty.presence(), Some(Presence::Office));
            }
        }
    }

    #[test]
    fn test_partial_coverage() {
        // One lead cannot work every weekday of the month.
        let rules = RuleConfig::new(vec![Shift::new("S1")])
            .with_requirements(DayType::Weekday, &[("S1", 1)])
            .with_requirements(DayType::Saturday, &[("S1", 1)])
            .with_requirements(DayType::Sunday, &[("S1", 1)]);
        let employees = vec![Employee::shift_lead("L1"), Employee::associate("A1")];
        match GreedyScheduler::new().assign(&request(employees, rules)) {
            Err(RosterError::PartialCoverage { shortfalls, partial }) => {
                assert!(shortfalls
                    .iter()
                    .any(|s| s.kind == ShortfallKind::NoShiftLead));
                assert_eq!(partial.days.len(), 30);
                // L1 works the first six days, then rests.
                assert_eq!(partial.duty_of("L1", 7), Some(&Duty::Rest));
                assert_eq!(partial.duty_of("L1", 8), Some(&Duty::Rest));
            }
            other => panic!("expected partial coverage, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_config() {
        let employees = vec![Employee::associate("A1")];
        let result = GreedyScheduler::new().assign(&request(employees, two_shift()));
        assert!(matches!(result, Err(RosterError::InvalidConfig(_))));
    }

    #[test]
    fn test_deterministic() {
        let a = GreedyScheduler::new()
            .assign(&request(staff(), two_shift()))
            .unwrap();
        let b = GreedyScheduler::new()
            .assign(&request(staff(), two_shift()))
            .unwrap();
        assert_eq!(a, b);
    }
}
