//! Rule configuration.
//!
//! Everything the engine needs to know besides the roster and leaves:
//! shift definitions, headcount tables, rest/fatigue limits, the office
//! presence quota, and balancing/tie-break settings. Plain data with
//! defaults so it can be loaded from JSON and overridden piecemeal.

use serde::{Deserialize, Serialize};

use super::{Day, DayType, Requirement, Shift};

/// A forbidden next-day shift succession (e.g., night shift followed by
/// an early shift).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Succession {
    /// Shift worked on the previous day.
    pub from: String,
    /// Shift that may not follow on the next day.
    pub to: String,
}

/// Rest and fatigue limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestRules {
    /// Longest allowed run of consecutive working days.
    pub max_consecutive_days: u32,
    /// Length of the rest block that follows a maximal run.
    pub mandatory_rest_days: u32,
    /// Next-day successions that are never allowed.
    pub forbidden_successions: Vec<Succession>,
}

impl Default for RestRules {
    fn default() -> Self {
        Self {
            max_consecutive_days: 6,
            mandatory_rest_days: 2,
            forbidden_successions: Vec::new(),
        }
    }
}

impl RestRules {
    /// Whether working `to` the day after `from` is forbidden.
    pub fn is_forbidden(&self, from: &str, to: &str) -> bool {
        self.forbidden_successions
            .iter()
            .any(|s| s.from == from && s.to == to)
    }
}

/// Office-presence ("WFO") quota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeRules {
    /// Office days per employee per week (weeks start on Monday).
    pub weekly_quota: u32,
    /// Target share of a shift's headcount present in the office.
    pub shift_ratio: f64,
    /// Upper bound on the per-shift office target.
    pub shift_cap: u32,
    /// Office seats available per day. `None` = unlimited.
    pub seats: Option<u32>,
}

impl Default for OfficeRules {
    fn default() -> Self {
        Self {
            weekly_quota: 3,
            shift_ratio: 0.5,
            shift_cap: 2,
            seats: None,
        }
    }
}

impl OfficeRules {
    /// Limits office presence to `seats` people per day.
    pub fn with_seats(mut self, seats: u32) -> Self {
        self.seats = Some(seats);
        self
    }

    /// Office seats to fill for a shift of the given headcount.
    ///
    /// `ceil(headcount * shift_ratio)`, capped at `shift_cap`.
    pub fn shift_target(&self, headcount: u32) -> u32 {
        let wanted = (headcount as f64 * self.shift_ratio).ceil() as u32;
        wanted.min(self.shift_cap).min(headcount)
    }
}

/// Treatment of an idle weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeekdayPresence {
    /// Weekday OFF is a hard violation (outside leave and rest blocks).
    #[default]
    Required,
    /// Weekday OFF is reported as a warning only.
    Preferred,
}

/// Shift-lead presence rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadPresence {
    /// At least one shift lead in every running shift.
    pub every_shift: bool,
    /// Every shift lead works every day they are not on leave.
    pub every_day: bool,
}

impl Default for LeadPresence {
    fn default() -> Self {
        Self {
            every_shift: true,
            every_day: false,
        }
    }
}

/// What the workload average is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BalanceBasis {
    /// Total required headcount over the month.
    #[default]
    Demand,
    /// Days × shift codes.
    ShiftCodes,
}

/// Per-employee monthly workload band: average ± tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceRule {
    /// Source of the average.
    pub basis: BalanceBasis,
    /// Allowed deviation from the average.
    pub tolerance: u32,
}

impl Default for BalanceRule {
    fn default() -> Self {
        Self {
            basis: BalanceBasis::Demand,
            tolerance: 1,
        }
    }
}

/// Tie-breaking among otherwise equivalent rosters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TieBreak {
    /// Deterministic by (employee order, day, shift order).
    #[default]
    Lexicographic,
    /// Seeded jitter for varied but reproducible rosters.
    Seeded(u64),
}

/// Complete rule set for a rostering run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Shift definitions, in priority order.
    pub shifts: Vec<Shift>,
    /// Headcount table entries.
    pub requirements: Vec<Requirement>,
    /// Rest and fatigue limits.
    #[serde(default)]
    pub rest: RestRules,
    /// Office-presence quota.
    #[serde(default)]
    pub office: OfficeRules,
    /// Weekday presence rule.
    #[serde(default)]
    pub weekday_presence: WeekdayPresence,
    /// Shift-lead presence rules.
    #[serde(default)]
    pub lead_presence: LeadPresence,
    /// Workload band. `None` disables balancing.
    #[serde(default = "default_balance")]
    pub balance: Option<BalanceRule>,
    /// Tie-breaking policy for the optimizing path.
    #[serde(default)]
    pub tie_break: TieBreak,
}

fn default_balance() -> Option<BalanceRule> {
    Some(BalanceRule::default())
}

impl RuleConfig {
    /// Creates a rule set with no requirements and default limits.
    pub fn new(shifts: Vec<Shift>) -> Self {
        Self {
            shifts,
            requirements: Vec::new(),
            rest: RestRules::default(),
            office: OfficeRules::default(),
            weekday_presence: WeekdayPresence::default(),
            lead_presence: LeadPresence::default(),
            balance: default_balance(),
            tie_break: TieBreak::default(),
        }
    }

    /// Adds a headcount entry.
    pub fn with_requirement(
        mut self,
        day_type: DayType,
        shift_code: impl Into<String>,
        headcount: u32,
    ) -> Self {
        self.requirements
            .push(Requirement::new(day_type, shift_code, headcount));
        self
    }

    /// Adds a full headcount table for one day type.
    pub fn with_requirements(mut self, day_type: DayType, table: &[(&str, u32)]) -> Self {
        for &(code, headcount) in table {
            self.requirements
                .push(Requirement::new(day_type, code, headcount));
        }
        self
    }

    /// Sets rest rules.
    pub fn with_rest(mut self, rest: RestRules) -> Self {
        self.rest = rest;
        self
    }

    /// Forbids working `to` on the day after `from`.
    pub fn with_forbidden_succession(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.rest.forbidden_successions.push(Succession {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// Sets office rules.
    pub fn with_office(mut self, office: OfficeRules) -> Self {
        self.office = office;
        self
    }

    /// Sets the weekday presence rule.
    pub fn with_weekday_presence(mut self, presence: WeekdayPresence) -> Self {
        self.weekday_presence = presence;
        self
    }

    /// Sets shift-lead presence rules.
    pub fn with_lead_presence(mut self, lead_presence: LeadPresence) -> Self {
        self.lead_presence = lead_presence;
        self
    }

    /// Sets (or disables) workload balancing.
    pub fn with_balance(mut self, balance: Option<BalanceRule>) -> Self {
        self.balance = balance;
        self
    }

    /// Sets the tie-break policy.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Required headcount for a shift on a day type (0 if absent).
    pub fn required(&self, day_type: DayType, shift_code: &str) -> u32 {
        self.requirements
            .iter()
            .find(|r| r.day_type == day_type && r.shift_code == shift_code)
            .map(|r| r.headcount)
            .unwrap_or(0)
    }

    /// Required headcount for a shift on a specific day.
    #[inline]
    pub fn required_on(&self, day: &Day, shift_code: &str) -> u32 {
        self.required(day.day_type(), shift_code)
    }

    /// Total headcount required on a day type.
    pub fn day_demand(&self, day_type: DayType) -> u32 {
        self.shifts
            .iter()
            .map(|s| self.required(day_type, &s.code))
            .sum()
    }

    /// Shifts that run on a day type, with their position and headcount.
    pub fn running_shifts(&self, day_type: DayType) -> Vec<(usize, &Shift, u32)> {
        self.shifts
            .iter()
            .enumerate()
            .filter_map(|(i, s)| {
                let n = self.required(day_type, &s.code);
                (n > 0).then_some((i, s, n))
            })
            .collect()
    }

    /// Position of a shift code in the priority order.
    pub fn shift_index(&self, code: &str) -> Option<usize> {
        self.shifts.iter().position(|s| s.code == code)
    }

    /// Whether a shift code is defined.
    #[inline]
    pub fn has_shift(&self, code: &str) -> bool {
        self.shift_index(code).is_some()
    }
}
