//! Input validation for rostering problems.
//!
//! Checks structural integrity of the roster, the rule configuration and
//! the leave list before scheduling. Detects:
//! - Duplicate IDs (employees, shift codes, requirement entries)
//! - References to undefined shifts or employees
//! - Role misconfiguration (team lead without a designated shift, or
//!   designated to a shift that never runs on a weekday)
//! - Missing shift leads while lead coverage is required
//! - Malformed rule parameters
//!
//! All problems are collected; nothing stops at the first error.

use std::collections::HashSet;
use std::fmt;

use crate::models::{DayType, Employee, LeaveRequest, Role, RuleConfig};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A requirement or employee references a shift that doesn't exist.
    UnknownShift,
    /// A team lead has no designated shift.
    MissingDesignatedShift,
    /// A team lead's designated shift never runs on a weekday.
    IneligibleForShift,
    /// Lead coverage is required but no shift lead is configured.
    NoShiftLeads,
    /// A leave references an employee that doesn't exist.
    UnknownEmployee,
    /// A rule parameter is out of range.
    InvalidRule,
    /// The roster has no employees.
    EmptyRoster,
    /// Year/month do not name a calendar month.
    InvalidPeriod,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Validates the input data for a rostering run.
///
/// Checks:
/// 1. The roster is not empty and employee IDs are unique
/// 2. Shift codes and (day type, shift) requirement entries are unique
/// 3. Requirements reference defined shifts
/// 4. Team leads have a defined designated shift
/// 5. A team lead's designated shift runs on weekdays
/// 6. A shift lead exists when lead coverage is required
/// 7. Leaves reference known employees
/// 8. Rest and office parameters are in range
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    employees: &[Employee],
    rules: &RuleConfig,
    leaves: &[LeaveRequest],
) -> ValidationResult {
    let mut errors = Vec::new();

    if employees.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyRoster,
            "Roster has no employees",
        ));
    }

    let mut employee_ids = HashSet::new();
    for e in employees {
        if !employee_ids.insert(e.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate employee ID: {}", e.id),
            ));
        }
    }

    let mut shift_codes = HashSet::new();
    for s in &rules.shifts {
        if !shift_codes.insert(s.code.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate shift code: {}", s.code),
            ));
        }
    }

    let mut entries = HashSet::new();
    for r in &rules.requirements {
        if !shift_codes.contains(r.shift_code.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownShift,
                format!(
                    "Requirement for {:?} references unknown shift '{}'",
                    r.day_type, r.shift_code
                ),
            ));
        }
        if !entries.insert((r.day_type, r.shift_code.as_str())) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!(
                    "Duplicate requirement for {:?} / {}",
                    r.day_type, r.shift_code
                ),
            ));
        }
    }

    // (day type, code) pairs that actually run
    let running: Vec<(DayType, &str)> = DayType::ALL
        .iter()
        .flat_map(|&dt| {
            rules
                .running_shifts(dt)
                .into_iter()
                .map(move |(_, s, _)| (dt, s.code.as_str()))
        })
        .collect();

    for e in employees {
        if e.role != Role::TeamLead {
            // Shift leads and associates are eligible for every code.
            continue;
        }
        match e.designated_shift.as_deref() {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::MissingDesignatedShift,
                format!("Team lead '{}' has no designated shift", e.id),
            )),
            Some(code) if !shift_codes.contains(code) => errors.push(ValidationError::new(
                ValidationErrorKind::UnknownShift,
                format!("Team lead '{}' designated to unknown shift '{code}'", e.id),
            )),
            Some(code) => {
                if !running.is_empty() && !running.iter().any(|&(dt, c)| e.can_work(c, dt)) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::IneligibleForShift,
                        format!(
                            "Team lead '{}' designated to '{code}', which never runs on a weekday",
                            e.id
                        ),
                    ));
                }
            }
        }
    }

    if rules.lead_presence.every_shift
        && !running.is_empty()
        && !employees.iter().any(Employee::is_shift_lead)
    {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoShiftLeads,
            "Every running shift needs a shift lead, but none is configured",
        ));
    }

    for leave in leaves {
        if !employee_ids.contains(leave.employee_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownEmployee,
                format!(
                    "Leave on {} references unknown employee '{}'",
                    leave.date, leave.employee_id
                ),
            ));
        }
    }

    if rules.rest.max_consecutive_days == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidRule,
            "max_consecutive_days must be at least 1",
        ));
    }
    if rules.rest.mandatory_rest_days == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidRule,
            "mandatory_rest_days must be at least 1",
        ));
    }
    for s in &rules.rest.forbidden_successions {
        if !shift_codes.contains(s.from.as_str()) || !shift_codes.contains(s.to.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownShift,
                format!("Forbidden succession {} -> {} names an unknown shift", s.from, s.to),
            ));
        }
    }
    if !(0.0..=1.0).contains(&rules.office.shift_ratio) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidRule,
            format!("office shift_ratio {} outside 0..=1", rules.office.shift_ratio),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RestRules, Shift};
    use chrono::NaiveDate;

    fn sample_rules() -> RuleConfig {
        RuleConfig::new(vec![Shift::new("S1"), Shift::new("S2")])
            .with_requirements(DayType::Weekday, &[("S1", 2), ("S2", 2)])
    }

    fn sample_roster() -> Vec<Employee> {
        vec![
            Employee::shift_lead("L1"),
            Employee::shift_lead("L2"),
            Employee::associate("A1"),
            Employee::team_lead("T1", "S2"),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_roster(), &sample_rules(), &[]).is_ok());
    }

    #[test]
    fn test_duplicate_employee_id() {
        let roster = vec![Employee::shift_lead("L1"), Employee::associate("L1")];
        let errors = validate_input(&roster, &sample_rules(), &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("employee")));
    }

    #[test]
    fn test_unknown_shift_in_requirement() {
        let rules = sample_rules().with_requirement(DayType::Saturday, "S9", 1);
        let errors = validate_input(&sample_roster(), &rules, &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownShift));
    }

    #[test]
    fn test_team_lead_without_shift() {
        let mut roster = sample_roster();
        roster.push(Employee::new("T2", Role::TeamLead));
        let errors = validate_input(&roster, &sample_rules(), &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::MissingDesignatedShift));
    }

    #[test]
    fn test_no_shift_leads() {
        let roster = vec![Employee::associate("A1"), Employee::team_lead("T1", "S2")];
        let errors = validate_input(&roster, &sample_rules(), &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::NoShiftLeads));
    }

    #[test]
    fn test_leads_and_associates_cover_every_code() {
        let roster = vec![Employee::shift_lead("L1"), Employee::associate("A1")];
        let rules = sample_rules().with_requirement(DayType::Sunday, "S2", 1);
        assert!(validate_input(&roster, &rules, &[]).is_ok());
        for e in &roster {
            for dt in DayType::ALL {
                for (_, shift, _) in rules.running_shifts(dt) {
                    assert!(e.can_work(&shift.code, dt), "{} on {}", e.id, shift.code);
                }
            }
        }

        // A narrowing list in the input is not part of the model.
        let json = r#"{"id":"A2","name":"A2","role":"Associate","shift_codes":["S1"]}"#;
        let a2: Employee = serde_json::from_str(json).unwrap();
        assert!(a2.can_work("S2", DayType::Weekday));
    }

    #[test]
    fn test_team_lead_shift_never_runs() {
        let rules = RuleConfig::new(vec![Shift::new("S1"), Shift::new("S2")])
            .with_requirements(DayType::Weekday, &[("S1", 1)])
            .with_requirements(DayType::Saturday, &[("S2", 1)]);
        let roster = vec![Employee::shift_lead("L1"), Employee::team_lead("T1", "S2")];
        let errors = validate_input(&roster, &rules, &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::IneligibleForShift && e.message.contains("T1")));
    }

    #[test]
    fn test_unknown_leave_employee() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();
        let leaves = vec![LeaveRequest::approved("GHOST", date)];
        let errors = validate_input(&sample_roster(), &sample_rules(), &leaves).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownEmployee));
    }

    #[test]
    fn test_multiple_errors() {
        let rules = sample_rules().with_rest(RestRules {
            max_consecutive_days: 0,
            mandatory_rest_days: 0,
            forbidden_successions: Vec::new(),
        });
        let errors = validate_input(&[], &rules, &[]).unwrap_err();
        assert!(errors.len() >= 3);
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::EmptyRoster));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidRule));
    }

    #[test]
    fn test_display() {
        let e = ValidationError::new(ValidationErrorKind::EmptyRoster, "nobody");
        assert_eq!(e.to_string(), "EmptyRoster: nobody");
    }
}
