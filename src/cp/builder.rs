//! Roster → 0/1 model translation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::model::{BoolVar, CpModel, LinearConstraint, VarId};
use super::solver::CpSolution;
use crate::error::RosterError;
use crate::models::{
    BalanceBasis, Calendar, Employee, LeaveBook, RuleConfig, TieBreak, WeekdayPresence,
};

/// Builds a [`CpModel`] from a roster, its rules and the month.
///
/// # Variables
/// - `x/{emp}/{date}/{code}`: employee works the shift. Combinations
///   ruled out by leave, role or a zero requirement are fixed to 0.
/// - `rest/{emp}/{date}`: auxiliary licence; 1 only if the employee
///   worked the maximal streak right before `date`, which starts a
///   mandatory rest block.
///
/// # Constraints
///
/// | Id prefix | Meaning |
/// |-----------|---------|
/// | `one_shift` | at most one shift per employee per day |
/// | `cover` | exact headcount per running shift |
/// | `presence` | no idle weekday outside leave or a rest block |
/// | `streak` | at most `max_consecutive_days` in any longer window |
/// | `rest_block` | a maximal streak is followed by the full rest block |
/// | `licence` | a licence requires the preceding streak |
/// | `no_double_off` | no two idle days in a row unless both weekend |
/// | `lead_cover` | a shift lead in every running shift |
/// | `lead_daily` | every shift lead works every day (opt-in) |
/// | `turnaround` | forbidden next-day successions |
/// | `balance_min` / `balance_max` | monthly workload band |
///
/// # Example
/// ```
/// use u_roster::cp::RosterCpBuilder;
/// use u_roster::models::{Calendar, DayType, Employee, LeaveBook, RuleConfig, Shift};
///
/// let employees = vec![Employee::shift_lead("L1"), Employee::associate("A1")];
/// let rules = RuleConfig::new(vec![Shift::new("S1")])
///     .with_requirements(DayType::Weekday, &[("S1", 2)]);
/// let calendar = Calendar::for_month(2025, 9).unwrap();
/// let leaves = LeaveBook::default();
///
/// let roster = RosterCpBuilder::new(&employees, &rules, &calendar, &leaves)
///     .build()
///     .unwrap();
/// assert_eq!(roster.shift_vars.len(), 2);
/// ```
pub struct RosterCpBuilder<'a> {
    employees: &'a [Employee],
    rules: &'a RuleConfig,
    calendar: &'a Calendar,
    leaves: &'a LeaveBook,
}

/// A built model plus the variable layout needed to decode it.
#[derive(Debug, Clone)]
pub struct RosterModel {
    /// The model.
    pub model: CpModel,
    /// `[employee][day][shift]` shift variables.
    pub shift_vars: Vec<Vec<Vec<VarId>>>,
    /// `[employee][day]` licence variables (absent before the first
    /// day a full streak could end).
    pub rest_vars: Vec<Vec<Option<VarId>>>,
}

impl RosterModel {
    /// Shift index worked per `[employee][day]`.
    pub fn decode(&self, solution: &CpSolution) -> Vec<Vec<Option<usize>>> {
        self.shift_vars
            .iter()
            .map(|days| {
                days.iter()
                    .map(|codes| codes.iter().position(|&v| solution.value(v)))
                    .collect()
            })
            .collect()
    }

    /// Rest-block starts per `[employee][day]`.
    pub fn rest_starts(&self, solution: &CpSolution) -> Vec<Vec<bool>> {
        self.rest_vars
            .iter()
            .map(|days| {
                days.iter()
                    .map(|v| v.is_some_and(|v| solution.value(v)))
                    .collect()
            })
            .collect()
    }
}

impl<'a> RosterCpBuilder<'a> {
    /// Creates a new builder.
    pub fn new(
        employees: &'a [Employee],
        rules: &'a RuleConfig,
        calendar: &'a Calendar,
        leaves: &'a LeaveBook,
    ) -> Self {
        Self {
            employees,
            rules,
            calendar,
            leaves,
        }
    }

    fn on_leave(&self, e: usize, d: usize) -> bool {
        self.leaves
            .is_on_leave(&self.employees[e].id, self.calendar.days[d].date)
    }

    fn is_free(&self, e: usize, d: usize, code: &str) -> bool {
        let day = &self.calendar.days[d];
        !self.on_leave(e, d)
            && self.employees[e].can_work(code, day.day_type())
            && self.rules.required_on(day, code) > 0
    }

    /// Cheap counting checks that prove infeasibility without search.
    ///
    /// Returns the ids of the violated constraints (empty = no proof).
    pub fn pre_check(&self) -> Vec<String> {
        let mut failed = Vec::new();
        let k = self.rules.rest.max_consecutive_days as usize;

        for (d, day) in self.calendar.days.iter().enumerate() {
            let running = self.rules.running_shifts(day.day_type());
            if running.is_empty() {
                continue;
            }
            let present: Vec<usize> = (0..self.employees.len())
                .filter(|&e| !self.on_leave(e, d))
                .collect();

            for &(_, shift, required) in &running {
                let eligible = present
                    .iter()
                    .filter(|&&e| self.employees[e].can_work(&shift.code, day.day_type()))
                    .count();
                if (eligible as u32) < required {
                    failed.push(format!("cover/{}/{}", day.date, shift.code));
                }
            }

            let available: Vec<usize> = present
                .iter()
                .copied()
                .filter(|&e| {
                    running
                        .iter()
                        .any(|(_, s, _)| self.employees[e].can_work(&s.code, day.day_type()))
                })
                .collect();

            if self.rules.lead_presence.every_shift {
                let leads = available
                    .iter()
                    .filter(|&&e| self.employees[e].is_shift_lead())
                    .count();
                if leads < running.len() {
                    failed.push(format!("lead_cover/{}", day.date));
                }
            }

            let demand = self.rules.day_demand(day.day_type()) as usize;
            if available.len() < demand {
                failed.push(format!("cover/{}", day.date));
            }

            // No licence can reach the first days: everyone available must work.
            if self.rules.weekday_presence == WeekdayPresence::Required
                && !day.is_weekend
                && d < k
                && available.len() > demand
            {
                failed.push(format!("presence/{}", day.date));
            }
        }
        failed
    }

    /// Builds the model.
    ///
    /// # Errors
    /// `RosterError::Infeasible` when [`pre_check`](Self::pre_check) finds
    /// a counting proof of infeasibility.
    pub fn build(&self) -> Result<RosterModel, RosterError> {
        let failed = self.pre_check();
        if !failed.is_empty() {
            return Err(RosterError::Infeasible {
                constraints: failed,
            });
        }

        let rules = self.rules;
        let days = &self.calendar.days;
        let n_emp = self.employees.len();
        let n_days = days.len();
        let n_codes = rules.shifts.len();
        let k = rules.rest.max_consecutive_days as usize;
        let m = rules.rest.mandatory_rest_days as usize;

        let mut model = CpModel::new(format!("roster-{}-{:02}", self.calendar.year, self.calendar.month));
        let mut jitter = match rules.tie_break {
            TieBreak::Lexicographic => None,
            TieBreak::Seeded(seed) => Some(StdRng::seed_from_u64(seed)),
        };
        let total = (n_emp * n_days * n_codes).max(1) as f64;

        // Shift variables
        let mut shift_vars = vec![vec![Vec::with_capacity(n_codes); n_days]; n_emp];
        let mut free = vec![vec![vec![false; n_codes]; n_days]; n_emp];
        for (e, emp) in self.employees.iter().enumerate() {
            for (d, day) in days.iter().enumerate() {
                for (c, shift) in rules.shifts.iter().enumerate() {
                    let tie = match jitter.as_mut() {
                        Some(rng) => rng.random_range(0.0..0.1),
                        None => 0.1 * ((e * n_days + d) * n_codes + c) as f64 / total,
                    };
                    let mut var = BoolVar::new(format!("x/{}/{}/{}", emp.id, day.date, shift.code))
                        .with_weight(1.0 + tie);
                    if self.is_free(e, d, &shift.code) {
                        free[e][d][c] = true;
                    } else {
                        var = var.fixed(false);
                    }
                    shift_vars[e][d].push(model.add_var(var));
                }
            }
        }

        // Licence variables
        let mut rest_vars = vec![vec![None; n_days]; n_emp];
        for (e, emp) in self.employees.iter().enumerate() {
            for d in k.min(n_days)..n_days {
                let var = BoolVar::new(format!("rest/{}/{}", emp.id, days[d].date)).auxiliary();
                rest_vars[e][d] = Some(model.add_var(var));
            }
        }

        let worked = |e: usize, d: usize| -> Vec<(VarId, i32)> {
            (0..n_codes)
                .filter(|&c| free[e][d][c])
                .map(|c| (shift_vars[e][d][c], 1))
                .collect()
        };
        let has_free = |e: usize, d: usize| free[e][d].iter().any(|&f| f);

        // one_shift
        for (e, emp) in self.employees.iter().enumerate() {
            for (d, day) in days.iter().enumerate() {
                let terms = worked(e, d);
                if terms.len() > 1 {
                    model.add_constraint(
                        LinearConstraint::at_most(format!("one_shift/{}/{}", emp.id, day.date), terms, 1)
                            .with_priority(d as u32),
                    );
                }
            }
        }

        // cover, lead_cover
        for (d, day) in days.iter().enumerate() {
            for (c, shift, required) in rules.running_shifts(day.day_type()) {
                let terms: Vec<(VarId, i32)> = (0..n_emp)
                    .filter(|&e| free[e][d][c])
                    .map(|e| (shift_vars[e][d][c], 1))
                    .collect();
                model.add_constraint(
                    LinearConstraint::equal(format!("cover/{}/{}", day.date, shift.code), terms, required as i64)
                        .with_priority(d as u32),
                );

                if rules.lead_presence.every_shift {
                    let leads: Vec<(VarId, i32)> = (0..n_emp)
                        .filter(|&e| self.employees[e].is_shift_lead() && free[e][d][c])
                        .map(|e| (shift_vars[e][d][c], 1))
                        .collect();
                    model.add_constraint(
                        LinearConstraint::at_least(format!("lead_cover/{}/{}", day.date, shift.code), leads, 1)
                            .with_priority(d as u32),
                    );
                }
            }
        }

        for (e, emp) in self.employees.iter().enumerate() {
            // presence
            if rules.weekday_presence == WeekdayPresence::Required {
                for (d, day) in days.iter().enumerate() {
                    if day.is_weekend || self.on_leave(e, d) || !has_free(e, d) {
                        continue;
                    }
                    let mut terms = worked(e, d);
                    for j in 0..m.min(d + 1) {
                        if let Some(a) = rest_vars[e][d - j] {
                            terms.push((a, 1));
                        }
                    }
                    model.add_constraint(
                        LinearConstraint::at_least(format!("presence/{}/{}", emp.id, day.date), terms, 1)
                            .with_priority(d as u32),
                    );
                }
            }

            if n_days > k {
                // streak: any k+1 consecutive days hold at most k worked days
                for s in 0..n_days - k {
                    let terms: Vec<(VarId, i32)> = (s..=s + k).flat_map(|i| worked(e, i)).collect();
                    if terms.len() > k {
                        model.add_constraint(
                            LinearConstraint::at_most(format!("streak/{}/{}", emp.id, days[s].date), terms, k as i64)
                                .with_priority(s as u32),
                        );
                    }
                }

                for d in k..n_days {
                    // rest_block: a full streak ending at d-1 keeps d+j off
                    for j in 1..m {
                        if d + j >= n_days {
                            break;
                        }
                        let mut terms: Vec<(VarId, i32)> =
                            (d - k..d).flat_map(|i| worked(e, i)).collect();
                        terms.extend(worked(e, d + j));
                        if terms.len() > k {
                            model.add_constraint(
                                LinearConstraint::at_most(
                                    format!("rest_block/{}/{}/{j}", emp.id, days[d].date),
                                    terms,
                                    k as i64,
                                )
                                .with_priority(d as u32),
                            );
                        }
                    }

                    // licence: rest/{d} implies every day of the streak was worked
                    if let Some(a) = rest_vars[e][d] {
                        for i in d - k..d {
                            let mut terms = vec![(a, 1)];
                            terms.extend(worked(e, i).into_iter().map(|(v, _)| (v, -1)));
                            model.add_constraint(
                                LinearConstraint::at_most(
                                    format!("licence/{}/{}/{}", emp.id, days[d].date, days[i].date),
                                    terms,
                                    0,
                                )
                                .with_priority(d as u32),
                            );
                        }
                    }
                }
            }

            // no_double_off
            for d in 1..n_days {
                let (prev, day) = (&days[d - 1], &days[d]);
                if (prev.is_weekend && day.is_weekend) || self.on_leave(e, d - 1) || self.on_leave(e, d) {
                    continue;
                }
                if !has_free(e, d - 1) && !has_free(e, d) {
                    continue;
                }
                let mut terms = worked(e, d - 1);
                terms.extend(worked(e, d));
                for b in (d + 1).saturating_sub(m)..d {
                    if let Some(a) = rest_vars[e][b] {
                        terms.push((a, 1));
                    }
                }
                model.add_constraint(
                    LinearConstraint::at_least(format!("no_double_off/{}/{}", emp.id, day.date), terms, 1)
                        .with_priority((d - 1) as u32),
                );
            }

            // lead_daily
            if rules.lead_presence.every_day && emp.is_shift_lead() {
                for (d, day) in days.iter().enumerate() {
                    if self.on_leave(e, d) || !has_free(e, d) {
                        continue;
                    }
                    model.add_constraint(
                        LinearConstraint::at_least(format!("lead_daily/{}/{}", emp.id, day.date), worked(e, d), 1)
                            .with_priority(d as u32),
                    );
                }
            }

            // turnaround
            for succession in &rules.rest.forbidden_successions {
                let (Some(from), Some(to)) =
                    (rules.shift_index(&succession.from), rules.shift_index(&succession.to))
                else {
                    continue;
                };
                for d in 1..n_days {
                    if free[e][d - 1][from] && free[e][d][to] {
                        model.add_constraint(
                            LinearConstraint::at_most(
                                format!(
                                    "turnaround/{}/{}/{}/{}",
                                    emp.id, days[d].date, succession.from, succession.to
                                ),
                                vec![(shift_vars[e][d - 1][from], 1), (shift_vars[e][d][to], 1)],
                                1,
                            )
                            .with_priority(d as u32),
                        );
                    }
                }
            }
        }

        // balance
        if let Some(balance) = rules.balance {
            let basis: u32 = match balance.basis {
                BalanceBasis::Demand => days.iter().map(|d| rules.day_demand(d.day_type())).sum(),
                BalanceBasis::ShiftCodes => (n_days * n_codes) as u32,
            };
            let avg = basis / n_emp.max(1) as u32;
            for (e, emp) in self.employees.iter().enumerate() {
                if !emp.is_balanced() {
                    continue;
                }
                let terms: Vec<(VarId, i32)> = (0..n_days).flat_map(|d| worked(e, d)).collect();
                let available = (0..n_days).filter(|&d| has_free(e, d)).count() as u32;
                let lower = avg.saturating_sub(balance.tolerance).min(available);
                let upper = avg + balance.tolerance;
                if lower > 0 {
                    model.add_constraint(
                        LinearConstraint::at_least(format!("balance_min/{}", emp.id), terms.clone(), lower as i64)
                            .with_priority(u32::MAX),
                    );
                }
                model.add_constraint(
                    LinearConstraint::at_most(format!("balance_max/{}", emp.id), terms, upper as i64)
                        .with_priority(u32::MAX),
                );
            }
        }

        debug!(
            model = %model.name,
            vars = model.num_vars(),
            constraints = model.constraints.len(),
            "roster model built"
        );

        Ok(RosterModel {
            model,
            shift_vars,
            rest_vars,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayType, LeadPresence, LeaveRequest, Shift};

    fn scenario_a_rules() -> RuleConfig {
        RuleConfig::new(vec![Shift::new("S1"), Shift::new("S2"), Shift::new("S3")])
            .with_requirements(DayType::Weekday, &[("S1", 3), ("S2", 2), ("S3", 3)])
            .with_requirements(DayType::Saturday, &[("S1", 2), ("S2", 2), ("S3", 2)])
            .with_requirements(DayType::Sunday, &[("S1", 0), ("S2", 2), ("S3", 2)])
    }

    fn scenario_a_roster() -> Vec<Employee> {
        let mut roster: Vec<Employee> = (1..=5).map(|i| Employee::shift_lead(format!("L{i}"))).collect();
        roster.extend((1..=7).map(|i| Employee::associate(format!("A{i}"))));
        roster.push(Employee::team_lead("T1", "S2"));
        roster.push(Employee::team_lead("T2", "S1"));
        roster
    }

    fn four_person() -> (Vec<Employee>, RuleConfig) {
        let roster = vec![
            Employee::shift_lead("L1"),
            Employee::shift_lead("L2"),
            Employee::associate("A1"),
            Employee::associate("A2"),
        ];
        let rules = RuleConfig::new(vec![Shift::new("S1"), Shift::new("S2")])
            .with_requirements(DayType::Weekday, &[("S1", 2), ("S2", 2)]);
        (roster, rules)
    }

    #[test]
    fn test_sunday_s1_has_no_free_variable() {
        let roster = scenario_a_roster();
        let rules = scenario_a_rules().with_weekday_presence(WeekdayPresence::Preferred);
        let cal = Calendar::for_month(2025, 8).unwrap();
        let leaves = LeaveBook::default();
        let built = RosterCpBuilder::new(&roster, &rules, &cal, &leaves).build().unwrap();

        for day in cal.days.iter().filter(|d| d.is_sunday) {
            for e in 0..roster.len() {
                let v = built.shift_vars[e][day.index][0];
                assert_eq!(built.model.vars[v].fixed, Some(false));
            }
        }
        let sunday_s1_cover = built
            .model
            .constraints
            .iter()
            .filter(|c| c.id == "cover/2025-08-03/S1")
            .count();
        assert_eq!(sunday_s1_cover, 0);
    }

    #[test]
    fn test_scenario_a_presence_precheck() {
        let roster = scenario_a_roster();
        let rules = scenario_a_rules();
        let cal = Calendar::for_month(2025, 8).unwrap();
        let leaves = LeaveBook::default();
        let err = RosterCpBuilder::new(&roster, &rules, &cal, &leaves)
            .build()
            .unwrap_err();
        match err {
            RosterError::Infeasible { constraints } => {
                assert!(constraints.contains(&"presence/2025-08-01".to_string()));
            }
            other => panic!("expected Infeasible, got {other:?}"),
        }
    }

    #[test]
    fn test_team_lead_and_leave_fixed() {
        let roster = scenario_a_roster();
        let rules = scenario_a_rules().with_weekday_presence(WeekdayPresence::Preferred);
        let cal = Calendar::for_month(2025, 8).unwrap();
        let leaves = LeaveBook::new(&[LeaveRequest::approved("A1", cal.days[11].date)]);
        let built = RosterCpBuilder::new(&roster, &rules, &cal, &leaves).build().unwrap();
        let vars = &built.model.vars;

        // A1 (index 5) on leave on the 12th
        assert!(built.shift_vars[5][11].iter().all(|&v| vars[v].fixed == Some(false)));
        // T1 (index 12): only S2 on weekdays
        let mon = 3;
        assert_eq!(vars[built.shift_vars[12][mon][0]].fixed, Some(false));
        assert_eq!(vars[built.shift_vars[12][mon][1]].fixed, None);
        let sat = 1;
        assert!(built.shift_vars[12][sat].iter().all(|&v| vars[v].fixed == Some(false)));
    }

    #[test]
    fn test_constraint_families() {
        let (roster, rules) = four_person();
        let cal = Calendar::for_month(2025, 9).unwrap();
        let leaves = LeaveBook::default();
        let built = RosterCpBuilder::new(&roster, &rules, &cal, &leaves).build().unwrap();
        let count = |prefix: &str| {
            built
                .model
                .constraints
                .iter()
                .filter(|c| c.id.starts_with(prefix))
                .count()
        };

        // September 2025: 22 weekdays, two shifts each
        assert_eq!(count("cover/"), 44);
        assert_eq!(count("lead_cover/"), 44);
        assert_eq!(count("presence/"), 4 * 22);
        assert_eq!(count("balance_max/"), 4);
        assert_eq!(count("balance_min/"), 4);
        assert_eq!(count("lead_daily/"), 0);
        assert!(built.model.validate().is_ok());
        assert!(built.model.var_id("x/L1/2025-09-01/S1").is_some());
        assert!(built.model.var_id("rest/L1/2025-09-07").is_some());
        assert!(built.model.var_id("rest/L1/2025-09-06").is_none());
    }

    #[test]
    fn test_precheck_headcount() {
        let (mut roster, rules) = four_person();
        roster.pop();
        let cal = Calendar::for_month(2025, 9).unwrap();
        let leaves = LeaveBook::default();
        let failed = RosterCpBuilder::new(&roster, &rules, &cal, &leaves).pre_check();
        assert!(failed.contains(&"cover/2025-09-01".to_string()));
    }

    #[test]
    fn test_lead_daily_opt_in() {
        let (roster, rules) = four_person();
        let rules = rules.with_lead_presence(LeadPresence {
            every_shift: true,
            every_day: true,
        });
        let cal = Calendar::for_month(2025, 9).unwrap();
        let leaves = LeaveBook::default();
        let built = RosterCpBuilder::new(&roster, &rules, &cal, &leaves).build().unwrap();
        let n = built
            .model
            .constraints
            .iter()
            .filter(|c| c.id.starts_with("lead_daily/"))
            .count();
        // two leads, weekdays only (nothing runs at weekends)
        assert_eq!(n, 2 * 22);
    }

    #[test]
    fn test_seeded_tie_break_is_reproducible() {
        let (roster, rules) = four_person();
        let rules = rules.with_tie_break(TieBreak::Seeded(7));
        let cal = Calendar::for_month(2025, 9).unwrap();
        let leaves = LeaveBook::default();
        let a = RosterCpBuilder::new(&roster, &rules, &cal, &leaves).build().unwrap();
        let b = RosterCpBuilder::new(&roster, &rules, &cal, &leaves).build().unwrap();
        let weights = |m: &RosterModel| m.model.vars.iter().map(|v| v.weight).collect::<Vec<_>>();
        assert_eq!(weights(&a), weights(&b));
        assert!(a.model.vars.iter().all(|v| v.auxiliary || (1.0..1.1).contains(&v.weight)));
    }
}
