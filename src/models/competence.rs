//! The competence (processing month) of a run.

use chrono::{Datelike, Local, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, EngineResult};

/// The calendar month a benefit run is computed for.
///
/// Accepts `YYYY-MM` and `MM.YYYY` and displays as `MM.YYYY`.
///
/// # Example
///
/// ```
/// use voucher_engine::models::Competence;
///
/// let competence: Competence = "2025-05".parse().unwrap();
/// assert_eq!(competence.to_string(), "05.2025");
/// assert_eq!(competence.days_in_month(), 31);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Competence {
    first_day: NaiveDate,
}

impl Competence {
    /// Creates a competence from a year and a month number.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(|| EngineError::InvalidCompetence {
                value: format!("{}-{:02}", year, month),
            })
    }

    /// The competence containing today's local date.
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            first_day: today.with_day(1).unwrap_or(today),
        }
    }

    /// Parses `YYYY-MM` or `MM.YYYY`.
    pub fn parse(value: &str) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidCompetence {
            value: value.to_string(),
        };
        let trimmed = value.trim();

        let (year, month) = if let Some((year, month)) = trimmed.split_once('-') {
            (year, month)
        } else if let Some((month, year)) = trimmed.split_once('.') {
            (year, month)
        } else {
            return Err(invalid());
        };

        let year: i32 = year.trim().parse().map_err(|_| invalid())?;
        let month: u32 = month.trim().parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// The month number (1-12).
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// The first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// The month before this one.
    pub fn previous(&self) -> Option<Competence> {
        self.first_day
            .checked_sub_months(Months::new(1))
            .map(|first_day| Competence { first_day })
    }

    /// Number of calendar days in the month.
    pub fn days_in_month(&self) -> u32 {
        self.first_day
            .checked_add_months(Months::new(1))
            .map(|next| (next - self.first_day).num_days() as u32)
            .unwrap_or(31)
    }

    /// Returns true if `date` falls in this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Monday-to-Friday days of the month, minus holidays that fall on them.
    pub fn business_days(&self, holidays: &[NaiveDate]) -> u32 {
        self.first_day
            .iter_days()
            .take(self.days_in_month() as usize)
            .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
            .filter(|day| !holidays.contains(day))
            .count() as u32
    }
}

impl fmt::Display for Competence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{}", self.month(), self.year())
    }
}

impl FromStr for Competence {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Competence {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Competence> for String {
    fn from(value: Competence) -> Self {
        value.to_string()
    }
}
