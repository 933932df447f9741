//! Rostering domain models.
//!
//! Provides the plain-data inputs (roster, rules, leaves, calendar) and
//! the output roster of a scheduling run.
//!
//! # Domain Mappings
//!
//! | u-roster | Contact centre | Hospital ward | Operations desk |
//! |----------|----------------|---------------|-----------------|
//! | ShiftLead | Floor supervisor | Charge nurse | Duty lead |
//! | TeamLead | Team manager | Ward manager | Desk manager |
//! | Associate | Agent | Staff nurse | Operator |
//! | Assignment | Monthly rota | Duty roster | On-call plan |

mod assignment;
mod calendar;
mod employee;
mod leave;
mod rules;
mod shift;

pub use assignment::{Assignment, Duty, Presence, Violation, ViolationType};
pub use calendar::{Calendar, Day, DayType};
pub use employee::{Employee, Role};
pub use leave::{LeaveBook, LeaveRequest, LeaveStatus};
pub use rules::{
    BalanceBasis, BalanceRule, LeadPresence, OfficeRules, RestRules, RuleConfig, Succession,
    TieBreak, WeekdayPresence,
};
pub use shift::{Requirement, Shift};
