//! Assignment (roster) model.
//!
//! The assignment is the only durable output of a rostering run: for
//! every employee and every day of the month exactly one [`Duty`]. It may
//! carry [`Violation`] warnings for soft-rule breaches the producing
//! strategy could not avoid.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Calendar, Day, Employee};

/// Where an assigned shift is worked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Presence {
    /// Work from office.
    Office,
    /// Work from home.
    Remote,
}

impl Presence {
    /// Exporter code ("WFO" / "WFH").
    pub fn code(self) -> &'static str {
        match self {
            Presence::Office => "WFO",
            Presence::Remote => "WFH",
        }
    }
}

/// One employee's duty on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Duty {
    /// Works the given shift.
    Shift {
        /// Shift code.
        code: String,
        /// Office or remote.
        presence: Presence,
    },
    /// Not scheduled.
    Off,
    /// Not scheduled; part of a mandatory rest block.
    Rest,
    /// Approved leave.
    Leave,
}

impl Duty {
    /// Creates a shift duty.
    pub fn shift(code: impl Into<String>, presence: Presence) -> Self {
        Duty::Shift {
            code: code.into(),
            presence,
        }
    }

    /// Shift code, if working.
    pub fn shift_code(&self) -> Option<&str> {
        match self {
            Duty::Shift { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Presence, if working.
    pub fn presence(&self) -> Option<Presence> {
        match self {
            Duty::Shift { presence, .. } => Some(*presence),
            _ => None,
        }
    }

    /// Whether a shift is worked.
    #[inline]
    pub fn is_working(&self) -> bool {
        matches!(self, Duty::Shift { .. })
    }

    /// OFF or REST.
    #[inline]
    pub fn is_off(&self) -> bool {
        matches!(self, Duty::Off | Duty::Rest)
    }

    /// Exporter status code: WFO, WFH, OFF or LEAVE.
    pub fn status_code(&self) -> &'static str {
        match self {
            Duty::Shift { presence, .. } => presence.code(),
            Duty::Off | Duty::Rest => "OFF",
            Duty::Leave => "LEAVE",
        }
    }
}

impl fmt::Display for Duty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Duty::Shift { code, presence } => write!(f, "{code} ({})", presence.code()),
            Duty::Off => f.write_str("OFF"),
            Duty::Rest => f.write_str("REST"),
            Duty::Leave => f.write_str("LEAVE"),
        }
    }
}

/// A rule breach recorded on an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity (employee ID or shift code).
    pub entity_id: String,
    /// Date concerned, if any.
    pub date: Option<NaiveDate>,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of roster violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Fewer employees than required on a shift.
    UnderCoverage,
    /// More employees than required on a shift.
    OverCoverage,
    /// A running shift without a shift lead.
    MissingShiftLead,
    /// A shift lead absent on a day they must work.
    LeadAbsent,
    /// Role restriction broken (e.g., team lead on a weekend).
    RoleViolation,
    /// Employee idle on a weekday without leave or rest.
    WeekdayIdle,
    /// Two adjacent non-working days that are not both weekend.
    ConsecutiveOff,
    /// More consecutive working days than allowed.
    StreakExceeded,
    /// Mandatory rest block shorter than required.
    RestBlockBroken,
    /// Forbidden next-day shift succession.
    Turnaround,
    /// Domain-specific violation.
    Custom(String),
}

impl Violation {
    fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        date: Option<NaiveDate>,
        message: impl Into<String>,
        severity: i32,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            date,
            message: message.into(),
            severity,
        }
    }

    /// Shift staffed below or above its requirement.
    pub fn coverage(shift_code: &str, date: NaiveDate, required: u32, assigned: u32) -> Self {
        let violation_type = if assigned < required {
            ViolationType::UnderCoverage
        } else {
            ViolationType::OverCoverage
        };
        Self::new(
            violation_type,
            shift_code,
            Some(date),
            format!("{shift_code} on {date}: {assigned} assigned, {required} required"),
            95,
        )
    }

    /// Running shift without a shift lead.
    pub fn missing_shift_lead(shift_code: &str, date: NaiveDate) -> Self {
        Self::new(
            ViolationType::MissingShiftLead,
            shift_code,
            Some(date),
            format!("{shift_code} on {date} has no shift lead"),
            90,
        )
    }

    /// Shift lead not working on a day they must.
    pub fn lead_absent(employee_id: &str, date: NaiveDate) -> Self {
        Self::new(
            ViolationType::LeadAbsent,
            employee_id,
            Some(date),
            format!("Shift lead {employee_id} not scheduled on {date}"),
            70,
        )
    }

    /// Role restriction broken.
    pub fn role(employee_id: &str, date: NaiveDate, message: impl Into<String>) -> Self {
        Self::new(ViolationType::RoleViolation, employee_id, Some(date), message, 90)
    }

    /// Idle weekday.
    pub fn weekday_idle(employee_id: &str, date: NaiveDate) -> Self {
        Self::new(
            ViolationType::WeekdayIdle,
            employee_id,
            Some(date),
            format!("{employee_id} is OFF on weekday {date}"),
            40,
        )
    }

    /// Adjacent non-working days.
    pub fn consecutive_off(employee_id: &str, date: NaiveDate) -> Self {
        Self::new(
            ViolationType::ConsecutiveOff,
            employee_id,
            Some(date),
            format!("{employee_id} is not working on {date} nor the day before"),
            50,
        )
    }

    /// Working streak too long.
    pub fn streak_exceeded(employee_id: &str, date: NaiveDate, streak: u32) -> Self {
        Self::new(
            ViolationType::StreakExceeded,
            employee_id,
            Some(date),
            format!("{employee_id} reaches {streak} consecutive working days on {date}"),
            85,
        )
    }

    /// Rest block cut short.
    pub fn rest_block_broken(employee_id: &str, date: NaiveDate) -> Self {
        Self::new(
            ViolationType::RestBlockBroken,
            employee_id,
            Some(date),
            format!("{employee_id} works on {date} inside a mandatory rest block"),
            85,
        )
    }

    /// Forbidden succession.
    pub fn turnaround(employee_id: &str, date: NaiveDate, from: &str, to: &str) -> Self {
        Self::new(
            ViolationType::Turnaround,
            employee_id,
            Some(date),
            format!("{employee_id} works {to} on {date} right after {from}"),
            80,
        )
    }
}

/// A complete month roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Calendar year.
    pub year: i32,
    /// Month (1–12).
    pub month: u32,
    /// Days in ascending order.
    pub days: Vec<Day>,
    /// Employee IDs in roster order.
    pub employee_ids: Vec<String>,
    /// Duties indexed `[employee][day]`.
    pub duties: Vec<Vec<Duty>>,
    /// Soft-rule breaches.
    pub warnings: Vec<Violation>,
}

impl Assignment {
    /// Creates an all-OFF roster for the month.
    pub fn new(calendar: &Calendar, employees: &[Employee]) -> Self {
        Self {
            year: calendar.year,
            month: calendar.month,
            days: calendar.days.clone(),
            employee_ids: employees.iter().map(|e| e.id.clone()).collect(),
            duties: vec![vec![Duty::Off; calendar.len()]; employees.len()],
            warnings: Vec::new(),
        }
    }

    /// Sets a duty.
    ///
    /// # Panics
    /// Panics if `employee` or `day` is outside the grid. Positions come
    /// from the same roster and calendar the grid was built from.
    pub fn set(&mut self, employee: usize, day: usize, duty: Duty) {
        self.duties[employee][day] = duty;
    }

    /// Duty by position.
    pub fn duty(&self, employee: usize, day: usize) -> Option<&Duty> {
        self.duties.get(employee).and_then(|row| row.get(day))
    }

    /// Duty by employee ID and 1-based day of month.
    pub fn duty_of(&self, employee_id: &str, day_of_month: u32) -> Option<&Duty> {
        let e = self.employee_index(employee_id)?;
        let d = (day_of_month as usize).checked_sub(1)?;
        self.duty(e, d)
    }

    /// A whole row by employee ID.
    pub fn row(&self, employee_id: &str) -> Option<&[Duty]> {
        self.employee_index(employee_id)
            .map(|e| self.duties[e].as_slice())
    }

    /// Position of an employee.
    pub fn employee_index(&self, employee_id: &str) -> Option<usize> {
        self.employee_ids.iter().position(|id| id == employee_id)
    }

    /// Employees working `shift_code` on day index `day`.
    pub fn assigned(&self, day: usize, shift_code: &str) -> Vec<usize> {
        self.duties
            .iter()
            .enumerate()
            .filter(|(_, row)| row.get(day).and_then(Duty::shift_code) == Some(shift_code))
            .map(|(e, _)| e)
            .collect()
    }

    /// Number of employees working `shift_code` on day index `day`.
    pub fn headcount(&self, day: usize, shift_code: &str) -> u32 {
        self.assigned(day, shift_code).len() as u32
    }

    /// Shifts worked by an employee over the month.
    pub fn shifts_worked(&self, employee: usize) -> u32 {
        self.duties
            .get(employee)
            .map(|row| row.iter().filter(|d| d.is_working()).count() as u32)
            .unwrap_or(0)
    }

    /// Records a warning.
    pub fn add_warning(&mut self, violation: Violation) {
        self.warnings.push(violation);
    }

    /// Whether the roster carries no warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Warnings of a given type.
    pub fn warnings_of(&self, violation_type: &ViolationType) -> Vec<&Violation> {
        self.warnings
            .iter()
            .filter(|v| &v.violation_type == violation_type)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Assignment {
        let cal = Calendar::for_month(2025, 8).unwrap();
        let employees = vec![
            Employee::shift_lead("L1"),
            Employee::associate("A1"),
            Employee::associate("A2"),
        ];
        let mut a = Assignment::new(&cal, &employees);
        a.set(0, 0, Duty::shift("S1", Presence::Office));
        a.set(1, 0, Duty::shift("S1", Presence::Remote));
        a.set(2, 0, Duty::Leave);
        a.set(2, 1, Duty::Rest);
        a
    }

    #[test]
    fn test_new_is_all_off() {
        let cal = Calendar::for_month(2025, 8).unwrap();
        let a = Assignment::new(&cal, &[Employee::associate("A1")]);
        assert_eq!(a.duties[0].len(), 31);
        assert!(a.duties[0].iter().all(|d| *d == Duty::Off));
        assert!(a.is_clean());
    }

    #[test]
    #[should_panic]
    fn test_set_out_of_range_panics() {
        let mut a = sample();
        a.set(0, 31, Duty::Rest);
    }

    #[test]
    fn test_queries() {
        let a = sample();
        assert_eq!(a.headcount(0, "S1"), 2);
        assert_eq!(a.assigned(0, "S1"), vec![0, 1]);
        assert_eq!(a.shifts_worked(0), 1);
        assert_eq!(a.duty_of("A2", 1), Some(&Duty::Leave));
        assert_eq!(a.duty_of("A2", 2), Some(&Duty::Rest));
        assert!(a.duty_of("A2", 0).is_none());
        assert!(a.duty_of("ZZ", 1).is_none());
        assert_eq!(a.row("L1").unwrap().len(), 31);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Duty::shift("S1", Presence::Office).status_code(), "WFO");
        assert_eq!(Duty::shift("S1", Presence::Remote).status_code(), "WFH");
        assert_eq!(Duty::Off.status_code(), "OFF");
        assert_eq!(Duty::Rest.status_code(), "OFF");
        assert_eq!(Duty::Leave.status_code(), "LEAVE");
        assert_eq!(Duty::shift("S3", Presence::Remote).to_string(), "S3 (WFH)");
        assert!(Duty::Rest.is_off());
        assert!(!Duty::Leave.is_off());
    }

    #[test]
    fn test_warnings() {
        let mut a = sample();
        let date = a.days[3].date;
        a.add_warning(Violation::weekday_idle("A1", date));
        a.add_warning(Violation::coverage("S1", date, 3, 2));
        assert!(!a.is_clean());
        assert_eq!(a.warnings_of(&ViolationType::WeekdayIdle).len(), 1);
        assert_eq!(a.warnings_of(&ViolationType::UnderCoverage).len(), 1);
    }

    #[test]
    fn test_serde_roundtrip_keeps_shape() {
        let a = sample();
        let json = serde_json::to_string(&a).unwrap();
        let back: Assignment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
