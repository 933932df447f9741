//! Month calendar model.
//!
//! A rostering run covers exactly one calendar month. The calendar is
//! enumerated once per run and never mutated; every other component
//! addresses days by their zero-based `index` within the month.
//!
//! # Day Types
//! Headcount requirements are keyed by [`DayType`]: Monday–Friday share
//! the `Weekday` table, Saturday and Sunday have their own.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::validation::{ValidationError, ValidationErrorKind};

/// Classification of a calendar day for headcount lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayType {
    /// Monday to Friday.
    Weekday,
    /// Saturday.
    Saturday,
    /// Sunday.
    Sunday,
}

impl DayType {
    /// All day types in table order.
    pub const ALL: [DayType; 3] = [DayType::Weekday, DayType::Saturday, DayType::Sunday];

    /// Day type of a weekday.
    pub fn of(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sat => DayType::Saturday,
            Weekday::Sun => DayType::Sunday,
            _ => DayType::Weekday,
        }
    }

    /// Whether this day type is part of the weekend.
    #[inline]
    pub fn is_weekend(self) -> bool {
        !matches!(self, DayType::Weekday)
    }
}

/// One calendar day of the scheduled month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    /// Calendar date.
    pub date: NaiveDate,
    /// Zero-based position within the month.
    pub index: usize,
    /// Day of the week.
    pub weekday: Weekday,
    /// Saturday or Sunday.
    pub is_weekend: bool,
    /// Sunday only.
    pub is_sunday: bool,
}

impl Day {
    /// Creates a day record for `date` at position `index`.
    pub fn new(date: NaiveDate, index: usize) -> Self {
        let weekday = date.weekday();
        Self {
            date,
            index,
            weekday,
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
            is_sunday: weekday == Weekday::Sun,
        }
    }

    /// Day of month (1-based).
    #[inline]
    pub fn day_of_month(&self) -> u32 {
        self.date.day()
    }

    /// Headcount table this day uses.
    #[inline]
    pub fn day_type(&self) -> DayType {
        DayType::of(self.weekday)
    }

    /// Whether this is the first day of an office-quota week.
    #[inline]
    pub fn is_monday(&self) -> bool {
        self.weekday == Weekday::Mon
    }

    /// English weekday name ("Monday" … "Sunday").
    pub fn weekday_name(&self) -> &'static str {
        match self.weekday {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }
}

/// Ordered days of one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    /// Calendar year.
    pub year: i32,
    /// Month (1–12).
    pub month: u32,
    /// Days in ascending date order.
    pub days: Vec<Day>,
}

impl Calendar {
    /// Enumerates every day of `year`-`month`.
    ///
    /// # Errors
    /// `InvalidPeriod` when the month is outside 1–12 or the year is
    /// outside the representable date range.
    pub fn for_month(year: i32, month: u32) -> Result<Self, ValidationError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            ValidationError::new(
                ValidationErrorKind::InvalidPeriod,
                format!("No such month: {year}-{month:02}"),
            )
        })?;

        let days = first
            .iter_days()
            .take_while(|d| d.month() == month)
            .enumerate()
            .map(|(index, date)| Day::new(date, index))
            .collect();

        Ok(Self { year, month, days })
    }

    /// Number of days in the month.
    #[inline]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Always false for a valid month.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Day by 1-based day of month.
    pub fn day(&self, day_of_month: u32) -> Option<&Day> {
        (day_of_month as usize)
            .checked_sub(1)
            .and_then(|i| self.days.get(i))
    }

    /// Day by date.
    pub fn day_of(&self, date: NaiveDate) -> Option<&Day> {
        self.days.iter().find(|d| d.date == date)
    }

    /// Number of days of the given type.
    pub fn count(&self, day_type: DayType) -> usize {
        self.days.iter().filter(|d| d.day_type() == day_type).count()
    }
}
