//! Temporal primitives.
//!
//! Benefit law works at three precisions: day (birth, onset, death), month
//! (entitlement, cessation, benefit date) and calendar quarter (insured
//! status windows). Day precision uses [`chrono::NaiveDate`] directly;
//! this module adds [`MonthYear`] and [`QuarterYear`] and the conversions
//! between them.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult, ErrorCode};

/// A calendar month.
///
/// Serialized as `"YYYY-MM"`.
///
/// # Example
///
/// ```
/// use pia_engine::models::MonthYear;
///
/// let month = MonthYear::new(2010, 11).unwrap();
/// assert_eq!(month.add_months(3).to_string(), "2011-02");
/// assert_eq!("2011-02".parse::<MonthYear>().unwrap().months_since(month), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthYear {
    year: i32,
    month: u32,
}

impl MonthYear {
    /// Creates a month, failing if `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::out_of_range(
                ErrorCode::MonthOutOfRange,
                "month",
                format!("month {} is outside 1..=12", month),
            ));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// January of `year`.
    pub fn january(year: i32) -> Self {
        Self { year, month: 1 }
    }

    /// December of `year`.
    pub fn december(year: i32) -> Self {
        Self { year, month: 12 }
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month, 1..=12.
    pub fn month(&self) -> u32 {
        self.month
    }

    fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    fn from_ordinal(ordinal: i64) -> Self {
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }

    /// Adds (or with a negative argument subtracts) whole months.
    pub fn add_months(&self, months: i32) -> Self {
        Self::from_ordinal(self.ordinal() + i64::from(months))
    }

    /// Number of months from `earlier` to `self` (negative if `earlier` is later).
    pub fn months_since(&self, earlier: MonthYear) -> i32 {
        (self.ordinal() - earlier.ordinal()) as i32
    }

    /// The calendar quarter containing this month.
    pub fn quarter(&self) -> QuarterYear {
        QuarterYear {
            year: self.year,
            quarter: ((self.month - 1) / 3) as u8,
        }
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthYear {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            EngineError::out_of_range(
                ErrorCode::MonthOutOfRange,
                "month_year",
                format!("'{}' is not a YYYY-MM month", s),
            )
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        MonthYear::new(year, month)
    }
}

impl TryFrom<String> for MonthYear {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthYear> for String {
    fn from(value: MonthYear) -> Self {
        value.to_string()
    }
}

/// A calendar quarter: a year plus a quarter index 0..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuarterYear {
    year: i32,
    quarter: u8,
}

impl QuarterYear {
    /// Creates a quarter, failing if `quarter` is outside 0..=3.
    pub fn new(year: i32, quarter: u8) -> EngineResult<Self> {
        if quarter > 3 {
            return Err(EngineError::out_of_range(
                ErrorCode::QuarterOutOfRange,
                "quarter",
                format!("quarter {} is outside 0..=3", quarter),
            ));
        }
        Ok(Self { year, quarter })
    }

    /// The first quarter of `year`.
    pub fn first_of(year: i32) -> Self {
        Self { year, quarter: 0 }
    }

    /// The last quarter of `year`.
    pub fn last_of(year: i32) -> Self {
        Self { year, quarter: 3 }
    }

    /// The quarter containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        MonthYear::from_date(date).quarter()
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The quarter index, 0..=3.
    pub fn quarter(&self) -> u8 {
        self.quarter
    }

    fn ordinal(&self) -> i64 {
        i64::from(self.year) * 4 + i64::from(self.quarter)
    }

    /// Adds (or subtracts) quarters, carrying across year boundaries.
    pub fn add_quarters(&self, quarters: i32) -> Self {
        let ordinal = self.ordinal() + i64::from(quarters);
        Self {
            year: ordinal.div_euclid(4) as i32,
            quarter: ordinal.rem_euclid(4) as u8,
        }
    }

    /// Number of quarters from `earlier` to `self`.
    pub fn quarters_since(&self, earlier: QuarterYear) -> i32 {
        (self.ordinal() - earlier.ordinal()) as i32
    }

    /// The first month of the quarter.
    pub fn first_month(&self) -> MonthYear {
        MonthYear {
            year: self.year,
            month: u32::from(self.quarter) * 3 + 1,
        }
    }
}

impl fmt::Display for QuarterYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter + 1)
    }
}

/// The month in which a person born on `birth` attains `age`.
///
/// A person attains an age on the day before the anniversary of birth, so
/// someone born on the first of a month attains it in the preceding month.
///
/// ```
/// use chrono::NaiveDate;
/// use pia_engine::models::attainment_month;
///
/// let born = NaiveDate::from_ymd_opt(1962, 1, 1).unwrap();
/// assert_eq!(attainment_month(born, 62).to_string(), "2023-12");
/// ```
pub fn attainment_month(birth: NaiveDate, age: u32) -> MonthYear {
    let anniversary = MonthYear {
        year: birth.year() + age as i32,
        month: birth.month(),
    };
    if birth.day() == 1 {
        anniversary.add_months(-1)
    } else {
        anniversary
    }
}

/// The calendar year in which a person born on `birth` attains `age`.
pub fn attainment_year(birth: NaiveDate, age: u32) -> i32 {
    attainment_month(birth, age).year()
}

/// The birth year used for age-based schedules.
///
/// Someone born on January 1 attains every age in the prior calendar year
/// and is treated as born in that year.
pub fn schedule_birth_year(birth: NaiveDate) -> i32 {
    if birth.month() == 1 && birth.day() == 1 {
        birth.year() - 1
    } else {
        birth.year()
    }
}
