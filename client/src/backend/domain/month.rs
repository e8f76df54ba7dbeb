//! Month keys (`YYYY-MM`), the overlay's temporal index.

use chrono::{Datelike, Local, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::backend::domain::error::{LedgerError, LedgerResult};

/// A calendar month. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> LedgerResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(LedgerError::validation(format!("Month must be 1-12, got {}", month)));
        }
        if !(1..=9999).contains(&year) {
            return Err(LedgerError::validation(format!("Year out of range: {}", year)));
        }
        Ok(Self { year, month })
    }

    /// Parse a strict `YYYY-MM` key
    pub fn parse(value: &str) -> LedgerResult<Self> {
        let invalid = || LedgerError::validation(format!("Invalid month key '{}', expected YYYY-MM", value));
        let (year, month) = value.split_once('-').ok_or_else(invalid)?;
        let digits = |part: &str, len: usize| part.len() == len && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(year, 4) || !digits(month, 2) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }

    /// Month containing a `YYYY-MM-DD` date
    pub fn of_date(date: &str) -> LedgerResult<Self> {
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| LedgerError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", date)))?;
        Ok(Self::from_date(parsed))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn days_in_month(&self) -> u32 {
        match self.month {
            2 if is_leap_year(self.year) => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// `YYYY-MM-01`
    pub fn first_day(&self) -> String {
        format!("{}-01", self)
    }

    /// Last day of the month as `YYYY-MM-DD`
    pub fn last_day(&self) -> String {
        format!("{}-{:02}", self, self.days_in_month())
    }

    /// Whether a `YYYY-MM-DD` date string falls inside this month
    pub fn contains_date(&self, date: &str) -> bool {
        date.get(..7) == Some(self.to_string().as_str())
    }

    /// Every month from `start` to `end`, both inclusive
    pub fn range_inclusive(start: MonthKey, end: MonthKey) -> Vec<MonthKey> {
        let mut months = Vec::new();
        let mut cursor = start;
        while cursor <= end {
            months.push(cursor);
            cursor = cursor.next();
        }
        months
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
