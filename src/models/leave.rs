//! Leave requests.
//!
//! Leaves come from an external leave-management store. The engine only
//! reads them: an approved leave removes the employee from every shift on
//! that date and shows up as `LEAVE` in the roster.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Approval state of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LeaveStatus {
    /// Awaiting approval. Ignored by the engine.
    #[default]
    Pending,
    /// Approved. Blocks every shift on the date.
    Approved,
    /// Rejected. Ignored by the engine.
    Rejected,
}

/// A single-day leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Employee ID.
    pub employee_id: String,
    /// Date of absence.
    pub date: NaiveDate,
    /// Approval state.
    pub status: LeaveStatus,
}

impl LeaveRequest {
    /// Creates a request with the given status.
    pub fn new(employee_id: impl Into<String>, date: NaiveDate, status: LeaveStatus) -> Self {
        Self {
            employee_id: employee_id.into(),
            date,
            status,
        }
    }

    /// Creates an approved request.
    pub fn approved(employee_id: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(employee_id, date, LeaveStatus::Approved)
    }

    /// Whether this request affects scheduling.
    #[inline]
    pub fn is_approved(&self) -> bool {
        self.status == LeaveStatus::Approved
    }
}

/// Lookup of approved leaves.
#[derive(Debug, Clone, Default)]
pub struct LeaveBook {
    approved: HashSet<(String, NaiveDate)>,
}

impl LeaveBook {
    /// Indexes the approved requests; others are dropped.
    pub fn new(requests: &[LeaveRequest]) -> Self {
        Self {
            approved: requests
                .iter()
                .filter(|r| r.is_approved())
                .map(|r| (r.employee_id.clone(), r.date))
                .collect(),
        }
    }

    /// Whether `employee_id` is on approved leave on `date`.
    pub fn is_on_leave(&self, employee_id: &str, date: NaiveDate) -> bool {
        // HashSet<(String, _)> cannot be probed with &str without allocating.
        self.approved.contains(&(employee_id.to_string(), date))
    }

    /// Number of approved leave days.
    pub fn len(&self) -> usize {
        self.approved.len()
    }

    /// Whether no leave is approved.
    pub fn is_empty(&self) -> bool {
        self.approved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    #[test]
    fn test_only_approved_count() {
        let book = LeaveBook::new(&[
            LeaveRequest::approved("A1", date(12)),
            LeaveRequest::new("A2", date(12), LeaveStatus::Pending),
            LeaveRequest::new("A3", date(12), LeaveStatus::Rejected),
        ]);
        assert_eq!(book.len(), 1);
        assert!(book.is_on_leave("A1", date(12)));
        assert!(!book.is_on_leave("A1", date(13)));
        assert!(!book.is_on_leave("A2", date(12)));
        assert!(!book.is_on_leave("A3", date(12)));
    }

    #[test]
    fn test_empty_book() {
        let book = LeaveBook::default();
        assert!(book.is_empty());
        assert!(!book.is_on_leave("A1", date(1)));
    }
}
