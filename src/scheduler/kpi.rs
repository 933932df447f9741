//! Roster quality metrics (KPIs).
//!
//! Computes workload and coverage indicators from a finished roster.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Shifts per employee | Working days in the month |
//! | Workload spread | max − min shifts over balanced employees |
//! | Weekend shifts | Saturday/Sunday shifts per employee |
//! | Office days | WFO shifts per employee |
//! | Coverage rate | Σ min(assigned, required) / Σ required |
//! | Leave days | Approved-leave days taken |
//!
//! # Reference
//! Burke et al. (2004), "The State of the Art of Nurse Rostering", §2.3

use std::collections::HashMap;

use crate::models::{Assignment, Duty, Employee, Presence, RuleConfig};

/// Roster performance indicators.
#[derive(Debug, Clone)]
pub struct RosterKpi {
    /// Shifts worked per employee id.
    pub shifts_by_employee: HashMap<String, u32>,
    /// Weekend shifts per employee id.
    pub weekend_shifts_by_employee: HashMap<String, u32>,
    /// Office days per employee id.
    pub office_days_by_employee: HashMap<String, u32>,
    /// Fewest shifts among balanced employees.
    pub min_shifts: u32,
    /// Most shifts among balanced employees.
    pub max_shifts: u32,
    /// `max_shifts - min_shifts`.
    pub workload_spread: u32,
    /// Mean shifts per balanced employee.
    pub avg_shifts: f64,
    /// Fraction of required seats filled (0.0..=1.0).
    pub coverage_rate: f64,
    /// Leave days in the roster.
    pub leave_days: u32,
    /// Audit findings attached to the roster.
    pub warning_count: usize,
}

impl RosterKpi {
    /// Computes KPIs from a roster.
    ///
    /// # Arguments
    /// * `assignment` - The finished roster.
    /// * `employees` - The roster's employees (for balance exemptions).
    /// * `rules` - The rule set (for required headcounts).
    pub fn calculate(assignment: &Assignment, employees: &[Employee], rules: &RuleConfig) -> Self {
        let mut shifts_by_employee = HashMap::new();
        let mut weekend_shifts_by_employee = HashMap::new();
        let mut office_days_by_employee = HashMap::new();
        let mut balanced = Vec::new();
        let mut leave_days = 0;

        for (e, emp) in employees.iter().enumerate() {
            let Some(row) = assignment.duties.get(e) else {
                continue;
            };
            let mut worked = 0;
            let mut weekend = 0;
            let mut office = 0;
            for (duty, day) in row.iter().zip(&assignment.days) {
                match duty {
                    Duty::Shift { presence, .. } => {
                        worked += 1;
                        if day.is_weekend {
                            weekend += 1;
                        }
                        if *presence == Presence::Office {
                            office += 1;
                        }
                    }
                    Duty::Leave => leave_days += 1,
                    Duty::Off | Duty::Rest => {}
                }
            }
            shifts_by_employee.insert(emp.id.clone(), worked);
            weekend_shifts_by_employee.insert(emp.id.clone(), weekend);
            office_days_by_employee.insert(emp.id.clone(), office);
            if emp.is_balanced() {
                balanced.push(worked);
            }
        }

        let min_shifts = balanced.iter().copied().min().unwrap_or(0);
        let max_shifts = balanced.iter().copied().max().unwrap_or(0);
        let avg_shifts = if balanced.is_empty() {
            0.0
        } else {
            balanced.iter().sum::<u32>() as f64 / balanced.len() as f64
        };

        let mut required_total = 0u32;
        let mut filled_total = 0u32;
        for day in &assignment.days {
            for shift in &rules.shifts {
                let required = rules.required_on(day, &shift.code);
                required_total += required;
                filled_total += assignment.headcount(day.index, &shift.code).min(required);
            }
        }
        let coverage_rate = if required_total == 0 {
            1.0
        } else {
            filled_total as f64 / required_total as f64
        };

        Self {
            shifts_by_employee,
            weekend_shifts_by_employee,
            office_days_by_employee,
            min_shifts,
            max_shifts,
            workload_spread: max_shifts - min_shifts,
            avg_shifts,
            coverage_rate,
            leave_days,
            warning_count: assignment.warnings.len(),
        }
    }

    /// Whether the roster meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_spread: u32, min_coverage: f64) -> bool {
        self.workload_spread <= max_spread && self.coverage_rate >= min_coverage
    }
}
