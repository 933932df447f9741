//! Rule engine for multi-criteria candidate ranking.
//!
//! Applies candidate rules in sequence: a later rule is consulted only
//! when every earlier rule ties. Remaining ties go to the lower roster
//! position, so ranking is deterministic.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use super::{Candidate, CandidateRule, SelectionContext};

/// A composable rule engine for candidate prioritization.
///
/// # Example
/// ```
/// use u_roster::dispatching::RuleEngine;
/// use u_roster::dispatching::rules;
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::LeastAssigned)
///     .with_rule(rules::ShortestStreak);
/// assert_eq!(engine.rule_names(), vec!["LEAST_ASSIGNED", "SHORTEST_STREAK"]);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn CandidateRule>>,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            epsilon: 1e-9,
        }
    }

    /// Ranking used for associates on the greedy path: must-work first,
    /// then office balance, workload, streak length and roster order.
    pub fn associate_default() -> Self {
        Self::new()
            .with_rule(super::rules::MustWork)
            .with_rule(super::rules::FewestOfficeDays)
            .with_rule(super::rules::LeastAssigned)
            .with_rule(super::rules::ShortestStreak)
    }

    /// Appends a rule, consulted after the rules already added.
    pub fn with_rule<R: CandidateRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Names of the rules in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Sorts candidates by priority (highest priority first).
    ///
    /// Returns indices into the candidate slice.
    pub fn sort_indices(
        &self,
        candidates: &[Candidate<'_>],
        context: &SelectionContext,
    ) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..candidates.len()).collect();
        indices.sort_by(|&a, &b| self.compare(&candidates[a], &candidates[b], context));
        indices
    }

    /// Returns the index of the highest-priority candidate.
    pub fn select_best(
        &self,
        candidates: &[Candidate<'_>],
        context: &SelectionContext,
    ) -> Option<usize> {
        self.sort_indices(candidates, context).first().copied()
    }

    fn compare(&self, a: &Candidate<'_>, b: &Candidate<'_>, context: &SelectionContext) -> Ordering {
        for rule in &self.rules {
            let score_a = rule.evaluate(a, context);
            let score_b = rule.evaluate(b, context);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
            }
        }
        a.index.cmp(&b.index)
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::rules;
    use crate::models::{Calendar, Employee};
    use crate::state::EmployeeState;

    fn state(total: u32, streak: u32, office: u32) -> EmployeeState {
        EmployeeState {
            total_shifts: total,
            consecutive_work_days: streak,
            weekly_office_days: office,
            ..Default::default()
        }
    }

    fn ctx(office_open: bool) -> SelectionContext {
        let cal = Calendar::for_month(2025, 8).unwrap();
        SelectionContext::for_shift(&cal.days[3], "S1").with_office_seats_open(office_open)
    }

    #[test]
    fn test_least_assigned_ordering() {
        let emps = [Employee::associate("A"), Employee::associate("B"), Employee::associate("C")];
        let states = [state(5, 0, 0), state(2, 0, 0), state(3, 0, 0)];
        let cands: Vec<Candidate> = (0..3)
            .map(|i| Candidate { index: i, employee: &emps[i], state: &states[i], must_work: false })
            .collect();
        let engine = RuleEngine::new().with_rule(rules::LeastAssigned);

        assert_eq!(engine.sort_indices(&cands, &ctx(false)), vec![1, 2, 0]);
    }

    #[test]
    fn test_must_work_first() {
        let emps = [Employee::associate("A"), Employee::associate("B")];
        let states = [state(0, 0, 0), state(9, 0, 0)];
        let cands = vec![
            Candidate { index: 0, employee: &emps[0], state: &states[0], must_work: false },
            Candidate { index: 1, employee: &emps[1], state: &states[1], must_work: true },
        ];
        let engine = RuleEngine::associate_default();
        assert_eq!(engine.select_best(&cands, &ctx(false)), Some(1));
    }

    #[test]
    fn test_office_rule_only_while_open() {
        let emps = [Employee::associate("A"), Employee::associate("B")];
        // A has fewer shifts but more office days
        let states = [state(1, 0, 2), state(4, 0, 0)];
        let cands = vec![
            Candidate { index: 0, employee: &emps[0], state: &states[0], must_work: false },
            Candidate { index: 1, employee: &emps[1], state: &states[1], must_work: false },
        ];
        let engine = RuleEngine::associate_default();
        assert_eq!(engine.select_best(&cands, &ctx(true)), Some(1));
        assert_eq!(engine.select_best(&cands, &ctx(false)), Some(0));
    }

    #[test]
    fn test_ties_go_to_roster_order() {
        let emps = [Employee::associate("B"), Employee::associate("A")];
        let states = [state(1, 0, 0), state(1, 0, 0)];
        let cands = vec![
            Candidate { index: 7, employee: &emps[0], state: &states[0], must_work: false },
            Candidate { index: 3, employee: &emps[1], state: &states[1], must_work: false },
        ];
        let engine = RuleEngine::new().with_rule(rules::LeastAssigned);
        assert_eq!(engine.select_best(&cands, &ctx(false)), Some(1));

        // No rules at all still ranks by roster position.
        assert_eq!(RuleEngine::new().sort_indices(&cands, &ctx(false)), vec![1, 0]);
    }

    #[test]
    fn test_empty_candidates() {
        let engine = RuleEngine::associate_default();
        assert!(engine.sort_indices(&[], &ctx(false)).is_empty());
        assert!(engine.select_best(&[], &ctx(false)).is_none());
    }

    #[test]
    fn test_rule_names() {
        let engine = RuleEngine::associate_default();
        assert_eq!(
            engine.rule_names(),
            vec!["MUST_WORK", "FEWEST_OFFICE", "LEAST_ASSIGNED", "SHORTEST_STREAK"]
        );
        assert!(format!("{engine:?}").contains("MUST_WORK"));
    }
}
