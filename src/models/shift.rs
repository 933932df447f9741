//! Shift and headcount requirement models.

use serde::{Deserialize, Serialize};

use super::DayType;

/// A recurring shift.
///
/// The label carries the display time window ("06:00 AM - 04:00 PM");
/// the engine treats it as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Shift code (e.g., "S1").
    pub code: String,
    /// Display time window.
    #[serde(default)]
    pub label: String,
}

impl Shift {
    /// Creates a shift with an empty label.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: String::new(),
        }
    }

    /// Sets the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Required headcount of one shift on one day type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Day type this entry applies to.
    pub day_type: DayType,
    /// Shift code.
    pub shift_code: String,
    /// Exact number of employees required. Zero = shift does not run.
    pub headcount: u32,
}

impl Requirement {
    /// Creates a requirement entry.
    pub fn new(day_type: DayType, shift_code: impl Into<String>, headcount: u32) -> Self {
        Self {
            day_type,
            shift_code: shift_code.into(),
            headcount,
        }
    }
}
