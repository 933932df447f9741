//! Employee model.
//!
//! # Roles
//!
//! | Role | Shifts | Weekends | Office quota |
//! |------|--------|----------|--------------|
//! | ShiftLead | all codes | yes | tracked |
//! | TeamLead | designated code only | never | exempt |
//! | Associate | all codes | yes | tracked |

use serde::{Deserialize, Serialize};

use super::DayType;

/// Employee role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Must be present in every running shift (one lead per shift).
    ShiftLead,
    /// Restricted to one designated shift code, weekdays only.
    TeamLead,
    /// General staff.
    Associate,
}

/// A schedulable employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Stable unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: Role,
    /// The only shift code a TeamLead may work.
    #[serde(default)]
    pub designated_shift: Option<String>,
    /// Excluded from office-presence tracking.
    #[serde(default)]
    pub office_exempt: bool,
}

impl Employee {
    /// Creates an employee with the given role.
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            role,
            designated_shift: None,
            office_exempt: false,
        }
    }

    /// Creates a shift lead.
    pub fn shift_lead(id: impl Into<String>) -> Self {
        Self::new(id, Role::ShiftLead)
    }

    /// Creates an associate.
    pub fn associate(id: impl Into<String>) -> Self {
        Self::new(id, Role::Associate)
    }

    /// Creates a team lead bound to `shift_code`. Team leads are office-exempt.
    pub fn team_lead(id: impl Into<String>, shift_code: impl Into<String>) -> Self {
        let mut e = Self::new(id, Role::TeamLead);
        e.designated_shift = Some(shift_code.into());
        e.office_exempt = true;
        e
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets office-presence exemption.
    pub fn with_office_exempt(mut self, exempt: bool) -> Self {
        self.office_exempt = exempt;
        self
    }

    /// Whether the employee is a shift lead.
    #[inline]
    pub fn is_shift_lead(&self) -> bool {
        self.role == Role::ShiftLead
    }

    /// Whether the employee is a team lead.
    #[inline]
    pub fn is_team_lead(&self) -> bool {
        self.role == Role::TeamLead
    }

    /// Role and eligibility check, ignoring leave and fatigue state.
    pub fn can_work(&self, shift_code: &str, day_type: DayType) -> bool {
        match self.role {
            Role::TeamLead => {
                !day_type.is_weekend() && self.designated_shift.as_deref() == Some(shift_code)
            }
            Role::ShiftLead | Role::Associate => true,
        }
    }

    /// Whether the employee counts towards the workload balance.
    #[inline]
    pub fn is_balanced(&self) -> bool {
        self.role != Role::TeamLead
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_lead_restrictions() {
        let tl = Employee::team_lead("Dinesh", "S2");
        assert!(tl.office_exempt);
        assert!(tl.can_work("S2", DayType::Weekday));
        assert!(!tl.can_work("S1", DayType::Weekday));
        assert!(!tl.can_work("S2", DayType::Saturday));
        assert!(!tl.can_work("S2", DayType::Sunday));
    }

    #[test]
    fn test_associate_all_codes() {
        let a = Employee::associate("Jeeva");
        assert!(a.can_work("S1", DayType::Sunday));
        assert!(a.can_work("S3", DayType::Weekday));
    }

    #[test]
    fn test_shift_lead_all_codes() {
        let l = Employee::shift_lead("L1");
        assert!(l.can_work("S1", DayType::Saturday));
        assert!(l.can_work("S2", DayType::Weekday));
    }

    #[test]
    fn test_builder() {
        let l = Employee::shift_lead("L1").with_name("Jeyakaran");
        assert_eq!(l.id, "L1");
        assert_eq!(l.name, "Jeyakaran");
        assert!(l.is_shift_lead());
        assert!(l.is_balanced());
        assert!(!Employee::team_lead("T", "S2").is_balanced());
    }
}
