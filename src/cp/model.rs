//! 0/1 linear model definition.

use std::collections::HashMap;

/// Index of a variable within a [`CpModel`].
pub type VarId = usize;

/// A boolean decision variable.
#[derive(Debug, Clone, PartialEq)]
pub struct BoolVar {
    /// Unique name.
    pub name: String,
    /// Objective coefficient (minimized).
    pub weight: f64,
    /// Value fixed before search, if any.
    pub fixed: Option<bool>,
    /// Helper variable; never chosen first when branching on coverage.
    pub auxiliary: bool,
}

impl BoolVar {
    /// Creates a free variable with weight 0.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight: 0.0,
            fixed: None,
            auxiliary: false,
        }
    }

    /// Sets the objective coefficient.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Fixes the value.
    pub fn fixed(mut self, value: bool) -> Self {
        self.fixed = Some(value);
        self
    }

    /// Marks the variable as auxiliary.
    pub fn auxiliary(mut self) -> Self {
        self.auxiliary = true;
        self
    }
}

/// `lower <= Σ coef·var <= upper` over boolean variables.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// Identifier reported in conflicts (e.g., `cover/2025-08-04/S1`).
    pub id: String,
    /// (variable, coefficient) pairs.
    pub terms: Vec<(VarId, i32)>,
    /// Lower bound, if any.
    pub lower: Option<i64>,
    /// Upper bound, if any.
    pub upper: Option<i64>,
    /// Branching hint: lower = decided earlier.
    pub priority: u32,
}

impl LinearConstraint {
    /// `Σ terms <= upper`.
    pub fn at_most(id: impl Into<String>, terms: Vec<(VarId, i32)>, upper: i64) -> Self {
        Self {
            id: id.into(),
            terms,
            lower: None,
            upper: Some(upper),
            priority: 0,
        }
    }

    /// `Σ terms >= lower`.
    pub fn at_least(id: impl Into<String>, terms: Vec<(VarId, i32)>, lower: i64) -> Self {
        Self {
            id: id.into(),
            terms,
            lower: Some(lower),
            upper: None,
            priority: 0,
        }
    }

    /// `Σ terms == value`.
    pub fn equal(id: impl Into<String>, terms: Vec<(VarId, i32)>, value: i64) -> Self {
        Self {
            id: id.into(),
            terms,
            lower: Some(value),
            upper: Some(value),
            priority: 0,
        }
    }

    /// Sets the branching priority.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Activity of the left-hand side under a full assignment.
    pub fn activity(&self, values: &[bool]) -> i64 {
        self.terms
            .iter()
            .filter(|&&(v, _)| values[v])
            .map(|&(_, a)| a as i64)
            .sum()
    }

    /// Whether a full assignment satisfies the constraint.
    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        let act = self.activity(values);
        self.lower.is_none_or(|l| act >= l) && self.upper.is_none_or(|u| act <= u)
    }
}

/// A 0/1 linear model: boolean variables, linear constraints, and a
/// linear objective to minimize.
///
/// # Examples
///
/// ```
/// use u_roster::cp::{BoolVar, CpModel, LinearConstraint};
///
/// let mut model = CpModel::new("pick-one");
/// let a = model.add_var(BoolVar::new("a").with_weight(2.0));
/// let b = model.add_var(BoolVar::new("b").with_weight(1.0));
/// model.add_constraint(LinearConstraint::equal("one", vec![(a, 1), (b, 1)], 1));
/// assert!(model.validate().is_ok());
/// assert_eq!(model.var_id("b"), Some(b));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CpModel {
    /// Model name.
    pub name: String,
    /// Variables, indexed by [`VarId`].
    pub vars: Vec<BoolVar>,
    /// Constraints.
    pub constraints: Vec<LinearConstraint>,
    index: HashMap<String, VarId>,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds a variable and returns its id.
    pub fn add_var(&mut self, var: BoolVar) -> VarId {
        let id = self.vars.len();
        self.index.insert(var.name.clone(), id);
        self.vars.push(var);
        id
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    /// Looks up a variable by name.
    pub fn var_id(&self, name: &str) -> Option<VarId> {
        self.index.get(name).copied()
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// Objective value of a full assignment.
    pub fn objective(&self, values: &[bool]) -> f64 {
        self.vars
            .iter()
            .zip(values)
            .filter(|(_, &v)| v)
            .map(|(var, _)| var.weight)
            .sum()
    }

    /// Validates the model for consistency.
    ///
    /// Checks unique variable names, in-range variable references,
    /// non-zero coefficients, and `lower <= upper`.
    pub fn validate(&self) -> Result<(), String> {
        if self.index.len() != self.vars.len() {
            return Err("duplicate variable name".into());
        }
        for c in &self.constraints {
            for &(v, a) in &c.terms {
                if v >= self.vars.len() {
                    return Err(format!("{}: undefined variable {v}", c.id));
                }
                if a == 0 {
                    return Err(format!("{}: zero coefficient", c.id));
                }
            }
            if let (Some(l), Some(u)) = (c.lower, c.upper) {
                if l > u {
                    return Err(format!("{}: lower bound {l} above upper bound {u}", c.id));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup() {
        let mut m = CpModel::new("t");
        let a = m.add_var(BoolVar::new("a"));
        let b = m.add_var(BoolVar::new("b").fixed(false).auxiliary());
        assert_eq!((a, b), (0, 1));
        assert_eq!(m.var_id("a"), Some(0));
        assert!(m.var_id("zz").is_none());
        assert!(m.vars[b].auxiliary);
        assert_eq!(m.num_vars(), 2);
    }

    #[test]
    fn test_validate() {
        let mut m = CpModel::new("t");
        let a = m.add_var(BoolVar::new("a"));
        m.add_constraint(LinearConstraint::at_most("ok", vec![(a, 1)], 1));
        assert!(m.validate().is_ok());

        m.add_constraint(LinearConstraint::at_most("bad", vec![(7, 1)], 1));
        assert!(m.validate().unwrap_err().contains("bad"));
    }

    #[test]
    fn test_validate_bounds_and_duplicates() {
        let mut m = CpModel::new("t");
        let a = m.add_var(BoolVar::new("a"));
        m.add_constraint(LinearConstraint {
            id: "inverted".into(),
            terms: vec![(a, 1)],
            lower: Some(2),
            upper: Some(1),
            priority: 0,
        });
        assert!(m.validate().is_err());

        let mut dup = CpModel::new("dup");
        dup.add_var(BoolVar::new("a"));
        dup.add_var(BoolVar::new("a"));
        assert!(dup.validate().is_err());
    }

    #[test]
    fn test_satisfaction_and_objective() {
        let mut m = CpModel::new("t");
        let a = m.add_var(BoolVar::new("a").with_weight(1.5));
        let b = m.add_var(BoolVar::new("b").with_weight(2.0));
        let c = LinearConstraint::equal("eq", vec![(a, 1), (b, 1)], 1).with_priority(3);
        assert_eq!(c.priority, 3);
        assert!(c.is_satisfied(&[true, false]));
        assert!(!c.is_satisfied(&[true, true]));
        assert!(!c.is_satisfied(&[false, false]));
        assert!((m.objective(&[true, true]) - 3.5).abs() < 1e-12);
    }
}
