//! CP solver interface and a branch-and-bound implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::model::{CpModel, VarId};

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Search space exhausted; the solution is optimal.
    Optimal,
    /// A solution was found but optimality is not proven.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// Time or node limit reached without a solution.
    Timeout,
    /// Cancellation flag raised without a solution.
    Cancelled,
}

/// Solution from a CP solver.
#[derive(Debug, Clone)]
pub struct CpSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Objective value, if a solution was found.
    pub objective_value: Option<f64>,
    /// Variable values, indexed by [`VarId`]. Empty without a solution.
    pub values: Vec<bool>,
    /// Constraint ids most often involved in failures, worst first.
    pub conflicts: Vec<String>,
    /// Search nodes visited.
    pub nodes: u64,
    /// Solve time in milliseconds.
    pub solve_time_ms: u64,
}

impl CpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: Vec::new(),
            conflicts: Vec::new(),
            nodes: 0,
            solve_time_ms: 0,
        }
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }

    /// Value of a variable (false when no solution was found).
    pub fn value(&self, var: VarId) -> bool {
        self.values.get(var).copied().unwrap_or(false)
    }
}

/// Solver configuration.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Wall-clock limit.
    pub time_limit: Duration,
    /// Maximum number of search nodes.
    pub node_limit: Option<u64>,
    /// Stop after finding the first feasible solution.
    pub stop_after_first: bool,
    /// Cooperative cancellation flag.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(30),
            node_limit: None,
            stop_after_first: true,
            cancel: None,
        }
    }
}

impl SolverConfig {
    /// Sets the time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// Sets the node limit.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Sets whether to stop at the first solution.
    pub fn with_stop_after_first(mut self, stop: bool) -> Self {
        self.stop_after_first = stop;
        self
    }

    /// Sets the cancellation flag.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Whether the cancellation flag is raised.
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|f| f.load(Ordering::Relaxed))
    }
}

/// Trait for CP solver implementations.
///
/// Implementors provide the actual constraint solving logic. This can wrap
/// an external solver or provide a custom search.
pub trait CpSolver {
    /// Solver name for logging.
    fn name(&self) -> &'static str;

    /// Solves the model and returns a solution.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}

/// Depth-first branch-and-bound over 0/1 linear constraints.
///
/// # Algorithm
/// 1. Fix preset variables and propagate bounds to a fixpoint.
/// 2. Branch on the most urgent constraint whose lower bound is unmet
///    (lowest priority hint, then least slack); within it pick the
///    least-loaded variable and try 1 before 0.
/// 3. When only upper bounds remain open, branch towards entailment.
/// 4. When every constraint is entailed, complete the assignment with the
///    objective-preferred values and record an incumbent.
/// 5. Prune nodes whose objective bound cannot beat the incumbent.
///
/// Limits and cancellation are checked every `check_interval` nodes,
/// starting at the root.
///
/// # Reference
/// Achterberg (2007), "Constraint Integer Programming", Ch. 7 (domain propagation)
#[derive(Debug, Clone)]
pub struct BranchAndBoundSolver {
    check_interval: u64,
}

impl BranchAndBoundSolver {
    /// Creates a solver with the default check interval (1024 nodes).
    pub fn new() -> Self {
        Self {
            check_interval: 1024,
        }
    }

    /// Sets how often (in nodes) limits are checked.
    pub fn with_check_interval(mut self, nodes: u64) -> Self {
        self.check_interval = nodes.max(1);
        self
    }
}

impl Default for BranchAndBoundSolver {
    fn default() -> Self {
        Self::new()
    }
}

const UNASSIGNED: i8 = -1;
const MAX_REPORTED_CONFLICTS: usize = 5;

#[derive(Debug, Clone, Copy)]
struct Frame {
    var: VarId,
    trail_len: usize,
    alternative: bool,
    retried: bool,
}

enum Branch {
    Decide { var: VarId, first: bool },
    Complete,
}

enum Stop {
    First,
    Exhausted,
    Limit,
    Cancelled,
}

struct Search<'m> {
    model: &'m CpModel,
    var_cons: Vec<Vec<(usize, i64)>>,
    value: Vec<i8>,
    min_act: Vec<i64>,
    max_act: Vec<i64>,
    trail: Vec<VarId>,
    queue: Vec<usize>,
    queued: Vec<bool>,
    partial_obj: f64,
    neg_free: f64,
    conflicts: Vec<u32>,
}

impl<'m> Search<'m> {
    fn new(model: &'m CpModel) -> Self {
        let n_cons = model.constraints.len();
        let mut var_cons = vec![Vec::new(); model.vars.len()];
        let mut min_act = vec![0i64; n_cons];
        let mut max_act = vec![0i64; n_cons];

        for (ci, c) in model.constraints.iter().enumerate() {
            for &(v, a) in &c.terms {
                let a = a as i64;
                var_cons[v].push((ci, a));
                min_act[ci] += a.min(0);
                max_act[ci] += a.max(0);
            }
        }

        Self {
            model,
            var_cons,
            value: vec![UNASSIGNED; model.vars.len()],
            min_act,
            max_act,
            trail: Vec::new(),
            queue: (0..n_cons).collect(),
            queued: vec![true; n_cons],
            partial_obj: 0.0,
            neg_free: model.vars.iter().map(|v| v.weight.min(0.0)).sum(),
            conflicts: vec![0; n_cons],
        }
    }

    fn assign(&mut self, var: VarId, val: bool) {
        self.value[var] = val as i8;
        self.trail.push(var);

        let w = self.model.vars[var].weight;
        if w < 0.0 {
            self.neg_free -= w;
        }
        if val {
            self.partial_obj += w;
        }

        for &(c, a) in &self.var_cons[var] {
            let set = if val { a } else { 0 };
            self.min_act[c] += set - a.min(0);
            self.max_act[c] += set - a.max(0);
            if !self.queued[c] {
                self.queued[c] = true;
                self.queue.push(c);
            }
        }
    }

    fn undo_to(&mut self, len: usize) {
        while self.trail.len() > len {
            let Some(var) = self.trail.pop() else {
                break;
            };
            let val = self.value[var] == 1;
            let w = self.model.vars[var].weight;
            if val {
                self.partial_obj -= w;
            }
            if w < 0.0 {
                self.neg_free += w;
            }
            for &(c, a) in &self.var_cons[var] {
                let set = if val { a } else { 0 };
                self.min_act[c] -= set - a.min(0);
                self.max_act[c] -= set - a.max(0);
            }
            self.value[var] = UNASSIGNED;
        }
        self.clear_queue();
    }

    fn clear_queue(&mut self) {
        for c in self.queue.drain(..) {
            self.queued[c] = false;
        }
    }

    /// Bounds propagation to a fixpoint. Returns the failing constraint.
    fn propagate(&mut self) -> Result<(), usize> {
        let model = self.model;
        while let Some(c) = self.queue.pop() {
            self.queued[c] = false;
            let con = &model.constraints[c];

            if con.upper.is_some_and(|u| self.min_act[c] > u)
                || con.lower.is_some_and(|l| self.max_act[c] < l)
            {
                self.conflicts[c] += 1;
                self.clear_queue();
                return Err(c);
            }

            for &(v, a) in &con.terms {
                if self.value[v] != UNASSIGNED {
                    continue;
                }
                let a = a as i64;
                let (min, max) = (self.min_act[c], self.max_act[c]);
                let forced = if a > 0 {
                    if con.upper.is_some_and(|u| min + a > u) {
                        Some(false)
                    } else if con.lower.is_some_and(|l| max - a < l) {
                        Some(true)
                    } else {
                        None
                    }
                } else if con.lower.is_some_and(|l| max + a < l) {
                    Some(false)
                } else if con.upper.is_some_and(|u| min - a > u) {
                    Some(true)
                } else {
                    None
                };
                if let Some(val) = forced {
                    self.assign(v, val);
                }
            }
        }
        Ok(())
    }

    fn bound(&self) -> f64 {
        self.partial_obj + self.neg_free
    }

    /// Highest used share of any upper-bounded constraint the variable
    /// would add to.
    fn pressure(&self, var: VarId) -> f64 {
        self.var_cons[var]
            .iter()
            .filter(|&&(_, a)| a > 0)
            .filter_map(|&(c, _)| {
                let u = self.model.constraints[c].upper?;
                (u > 0).then(|| self.min_act[c] as f64 / u as f64)
            })
            .fold(0.0, f64::max)
    }

    fn choose(&self) -> Branch {
        let constraints = &self.model.constraints;

        let mut urgent: Option<(u32, i64, usize)> = None;
        for (ci, c) in constraints.iter().enumerate() {
            if let Some(l) = c.lower {
                if self.min_act[ci] < l {
                    let key = (c.priority, self.max_act[ci] - l, ci);
                    if urgent.is_none_or(|best| key < best) {
                        urgent = Some(key);
                    }
                }
            }
        }
        if let Some((_, _, ci)) = urgent {
            if let Some(branch) = self.raise_branch(ci) {
                return branch;
            }
        }

        let mut open: Option<(u32, usize)> = None;
        for (ci, c) in constraints.iter().enumerate() {
            if c.upper.is_some_and(|u| self.max_act[ci] > u) {
                let key = (c.priority, ci);
                if open.is_none_or(|best| key < best) {
                    open = Some(key);
                }
            }
        }
        if let Some((_, ci)) = open {
            if let Some(&(var, a)) = constraints[ci]
                .terms
                .iter()
                .find(|&&(v, _)| self.value[v] == UNASSIGNED)
            {
                return Branch::Decide {
                    var,
                    first: a < 0,
                };
            }
        }

        Branch::Complete
    }

    /// Branch that raises the activity of constraint `ci`.
    fn raise_branch(&self, ci: usize) -> Option<Branch> {
        let vars = &self.model.vars;
        let free = self.model.constraints[ci]
            .terms
            .iter()
            .filter(|&&(v, _)| self.value[v] == UNASSIGNED);

        let mut best: Option<(bool, f64, f64, VarId)> = None;
        let mut negative: Option<VarId> = None;
        for &(v, a) in free {
            if a < 0 {
                negative.get_or_insert(v);
                continue;
            }
            let key = (vars[v].auxiliary, self.pressure(v), vars[v].weight, v);
            let better = match &best {
                None => true,
                Some(b) => {
                    key.0
                        .cmp(&b.0)
                        .then(key.1.total_cmp(&b.1))
                        .then(key.2.total_cmp(&b.2))
                        .then(key.3.cmp(&b.3))
                        .is_lt()
                }
            };
            if better {
                best = Some(key);
            }
        }

        match (best, negative) {
            (Some((_, _, _, var)), _) => Some(Branch::Decide { var, first: true }),
            (None, Some(var)) => Some(Branch::Decide { var, first: false }),
            (None, None) => None,
        }
    }

    fn complete(&mut self) {
        for v in 0..self.value.len() {
            if self.value[v] == UNASSIGNED {
                let val = self.model.vars[v].weight < 0.0;
                self.assign(v, val);
            }
        }
        self.clear_queue();
    }

    fn values(&self) -> Vec<bool> {
        self.value.iter().map(|&x| x == 1).collect()
    }

    fn backtrack(&mut self, stack: &mut Vec<Frame>) -> bool {
        loop {
            let Some(frame) = stack.last_mut() else {
                return false;
            };
            let Frame {
                var,
                trail_len,
                alternative,
                retried,
            } = *frame;
            frame.retried = true;

            self.undo_to(trail_len);
            if retried {
                stack.pop();
                continue;
            }
            self.assign(var, alternative);
            if self.propagate().is_ok() {
                return true;
            }
        }
    }

    fn top_conflicts(&self) -> Vec<String> {
        let mut ranked: Vec<(u32, usize)> = self
            .conflicts
            .iter()
            .enumerate()
            .filter(|(_, &n)| n > 0)
            .map(|(c, &n)| (n, c))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        ranked
            .into_iter()
            .take(MAX_REPORTED_CONFLICTS)
            .map(|(_, c)| self.model.constraints[c].id.clone())
            .collect()
    }
}

impl CpSolver for BranchAndBoundSolver {
    fn name(&self) -> &'static str {
        "branch-and-bound"
    }

    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let start = Instant::now();
        let elapsed_ms = || start.elapsed().as_millis() as u64;

        if let Err(reason) = model.validate() {
            warn!(model = %model.name, %reason, "invalid model");
            let mut sol = CpSolution::empty(SolverStatus::ModelInvalid);
            sol.solve_time_ms = elapsed_ms();
            return sol;
        }

        let mut search = Search::new(model);
        for (v, var) in model.vars.iter().enumerate() {
            if let Some(val) = var.fixed {
                search.assign(v, val);
            }
        }
        let fixed = search.trail.len();
        if let Err(c) = search.propagate() {
            debug!(
                model = %model.name,
                constraint = %model.constraints[c].id,
                "root propagation failed"
            );
            let mut sol = CpSolution::empty(SolverStatus::Infeasible);
            sol.conflicts = search.top_conflicts();
            sol.solve_time_ms = elapsed_ms();
            return sol;
        }
        debug!(
            model = %model.name,
            vars = model.vars.len(),
            constraints = model.constraints.len(),
            fixed,
            implied = search.trail.len() - fixed,
            "root propagation done"
        );

        let mut stack: Vec<Frame> = Vec::new();
        let mut best: Option<(f64, Vec<bool>)> = None;
        let mut nodes: u64 = 0;

        let stop = loop {
            if nodes % self.check_interval == 0 {
                if config.is_cancelled() {
                    break Stop::Cancelled;
                }
                if start.elapsed() >= config.time_limit {
                    break Stop::Limit;
                }
            }
            if config.node_limit.is_some_and(|n| nodes >= n) {
                break Stop::Limit;
            }
            nodes += 1;

            let pruned = best
                .as_ref()
                .is_some_and(|(obj, _)| search.bound() >= obj - 1e-9);
            if !pruned {
                match search.choose() {
                    Branch::Complete => {
                        search.complete();
                        let values = search.values();
                        let obj = model.objective(&values);
                        debug!(model = %model.name, nodes, objective = obj, "incumbent");
                        best = Some((obj, values));
                        if config.stop_after_first {
                            break Stop::First;
                        }
                    }
                    Branch::Decide { var, first } => {
                        stack.push(Frame {
                            var,
                            trail_len: search.trail.len(),
                            alternative: !first,
                            retried: false,
                        });
                        search.assign(var, first);
                        if search.propagate().is_ok() {
                            continue;
                        }
                    }
                }
            }

            if !search.backtrack(&mut stack) {
                break Stop::Exhausted;
            }
        };

        let status = match (&stop, best.is_some()) {
            (Stop::Exhausted, true) => SolverStatus::Optimal,
            (Stop::Exhausted, false) => SolverStatus::Infeasible,
            (_, true) => SolverStatus::Feasible,
            (Stop::Cancelled, false) => SolverStatus::Cancelled,
            (_, false) => SolverStatus::Timeout,
        };
        if matches!(stop, Stop::Limit | Stop::Cancelled) {
            warn!(model = %model.name, nodes, ?status, "search stopped early");
        }

        let mut sol = CpSolution::empty(status);
        sol.nodes = nodes;
        sol.solve_time_ms = elapsed_ms();
        if status == SolverStatus::Infeasible {
            sol.conflicts = search.top_conflicts();
        }
        if let Some((obj, values)) = best {
            sol.objective_value = Some(obj);
            sol.values = values;
        }
        sol
    }
}
