//! Derived quantities computed once per worker.
//!
//! These are the read-only inputs shared by every benefit method: the
//! capped earnings series, quarters of coverage, freeze years, insured
//! status and the two computation periods. Presentation code reads them
//! to explain how a benefit was reached.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dates::{MonthYear, QuarterYear};
use super::insured_status::{DisabilityInsuredStatus, InsuredStatus};
use super::series::{AnnualSeries, QcSeries};

/// An inclusive range of calendar years; empty when `first > last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    /// First year.
    pub first: i32,
    /// Last year.
    pub last: i32,
}

impl YearRange {
    /// Creates a range.
    pub fn new(first: i32, last: i32) -> Self {
        Self { first, last }
    }

    /// Returns true if the range holds no years.
    pub fn is_empty(&self) -> bool {
        self.first > self.last
    }

    /// Returns true if `year` is inside the range.
    pub fn contains(&self, year: i32) -> bool {
        year >= self.first && year <= self.last
    }

    /// Number of years in the range.
    pub fn len(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            (self.last - self.first + 1) as u32
        }
    }
}

/// An inclusive range of calendar quarters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterRange {
    /// First quarter.
    pub start: QuarterYear,
    /// Last quarter.
    pub end: QuarterYear,
}

impl QuarterRange {
    /// Number of quarters in the range.
    pub fn len(&self) -> u32 {
        u32::try_from(self.end.quarters_since(self.start) + 1).unwrap_or(0)
    }

    /// Returns true if the range holds no quarters.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Years within periods of disability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeYears {
    /// Years wholly within a period, one range per period.
    pub wholly: Vec<YearRange>,
    /// Years only partly within a period.
    pub partially: Vec<i32>,
}

impl FreezeYears {
    /// Returns true if `year` is wholly within a period of disability.
    pub fn contains(&self, year: i32) -> bool {
        self.wholly.iter().any(|range| range.contains(year))
    }

    /// Number of freeze years in `first..=last`.
    pub fn count_between(&self, first: i32, last: i32) -> u32 {
        (first..=last).filter(|&year| self.contains(year)).count() as u32
    }

    /// Returns true if no year is frozen.
    pub fn is_empty(&self) -> bool {
        self.wholly.iter().all(YearRange::is_empty)
    }
}

/// The years over which earnings are averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationPeriod {
    /// 1936 for old-start, 1950 for new-start.
    pub base_year: i32,
    /// First elapsed year.
    pub first_elapsed_year: i32,
    /// Last elapsed year.
    pub last_elapsed_year: i32,
    /// Elapsed years, freeze years removed.
    pub elapsed_years: u32,
    /// Freeze years removed from the elapsed years.
    pub freeze_years: u32,
    /// Ordinary dropout years.
    pub dropout_years: u32,
    /// Dropout years for a disabled worker.
    pub disability_dropout_years: u32,
    /// Number of years of earnings averaged.
    pub computation_years: u32,
}

/// Fully and currently insured determination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuredStatusDetermination {
    /// Resulting status.
    pub status: InsuredStatus,
    /// Year of age 62, death or onset the status is determined for.
    pub determination_year: i32,
    /// Elapsed years counted toward the fully insured requirement.
    pub elapsed_years: u32,
    /// Quarters needed to be fully insured.
    pub quarters_required: u32,
    /// Quarters earned through the determination quarter.
    pub quarters_earned: u32,
    /// Totalization quarters available.
    pub foreign_quarters: u32,
    /// The 13-quarter currently insured window.
    pub currently_window: QuarterRange,
    /// Quarters earned in that window.
    pub currently_quarters: u32,
    /// Whether the window holds enough quarters, whatever the status code.
    pub currently_insured: bool,
}

impl InsuredStatusDetermination {
    /// Returns true if the worker is fully insured.
    pub fn is_fully_insured(&self) -> bool {
        self.status.is_fully_insured()
    }

    /// Returns true if the worker is currently insured. A permanently
    /// insured worker may be currently insured as well.
    pub fn is_currently_insured(&self) -> bool {
        self.currently_insured
    }
}

/// Disability insured determination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisabilityInsuredDetermination {
    /// Resulting status.
    pub status: DisabilityInsuredStatus,
    /// Segments of the window examined, prior disability quarters skipped.
    pub window: Vec<QuarterRange>,
    /// Quarters earned in the window.
    pub quarters_earned: u32,
    /// Quarters needed in the window.
    pub quarters_required: u32,
    /// True if the rule for onset before age 31 was used.
    pub special_rule: bool,
}

impl DisabilityInsuredDetermination {
    /// Determination for a case with no disability.
    pub fn not_applicable() -> Self {
        Self {
            status: DisabilityInsuredStatus::NotApplicable,
            window: Vec::new(),
            quarters_earned: 0,
            quarters_required: 0,
            special_rule: false,
        }
    }
}

/// Years of coverage counted for the special minimum and the windfall
/// elimination provision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearsOfCoverage {
    /// Years credited before 1951.
    pub pre_1951: u32,
    /// Years of coverage for the special minimum.
    pub special_minimum: u32,
    /// Years of coverage for the windfall elimination provision.
    pub windfall: u32,
}

/// Everything derived from the worker record before any method runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiaData {
    /// Year of first eligibility.
    pub eligibility_year: i32,
    /// Last year whose earnings may be used.
    pub last_earnings_year: i32,
    /// Month of normal retirement age.
    pub normal_retirement_month: MonthYear,
    /// Earnings by year, capped at the wage base, lump sum spread.
    pub earnings: AnnualSeries<Decimal>,
    /// Quarters of coverage by year, railroad and military merged.
    pub quarters: QcSeries,
    /// Freeze years.
    pub freeze: FreezeYears,
    /// Fully and currently insured status.
    pub insured: InsuredStatusDetermination,
    /// Disability insured status.
    pub disability_insured: DisabilityInsuredDetermination,
    /// Computation period from 1950.
    pub new_start: ComputationPeriod,
    /// Computation period from 1936.
    pub old_start: ComputationPeriod,
    /// Years of coverage.
    pub years_of_coverage: YearsOfCoverage,
}
