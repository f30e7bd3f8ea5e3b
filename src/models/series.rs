//! Year-indexed series containers.
//!
//! Earnings, quarters of coverage and yes/no flags are all dense arrays
//! keyed by calendar year. Reads outside the stored range return the
//! default value; writes outside it fail.

use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult, ErrorCode};

use super::dates::QuarterYear;

/// Maximum quarters of coverage creditable in one year.
pub const MAX_QC_PER_YEAR: u8 = 4;

/// A dense series of values indexed by calendar year.
///
/// # Example
///
/// ```
/// use pia_engine::models::AnnualSeries;
/// use rust_decimal::Decimal;
///
/// let mut earnings = AnnualSeries::new(1990, 1999);
/// earnings.assign(1990, 1994, Decimal::from(1000)).unwrap();
/// assert_eq!(earnings.accumulate(1990, 1999, Decimal::ZERO), Decimal::from(5000));
/// assert_eq!(earnings.get(2020), Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualSeries<T> {
    first_year: i32,
    values: Vec<T>,
}

impl<T: Copy + Default> AnnualSeries<T> {
    /// Creates a series covering `first_year..=last_year`, filled with the default.
    pub fn new(first_year: i32, last_year: i32) -> Self {
        let len = if last_year >= first_year {
            (last_year - first_year + 1) as usize
        } else {
            0
        };
        Self {
            first_year,
            values: vec![T::default(); len],
        }
    }

    /// First year stored.
    pub fn first_year(&self) -> i32 {
        self.first_year
    }

    /// Last year stored (one before `first_year` when empty).
    pub fn last_year(&self) -> i32 {
        self.first_year + self.values.len() as i32 - 1
    }

    /// Returns true if `year` is inside the stored range.
    pub fn contains_year(&self, year: i32) -> bool {
        year >= self.first_year && year <= self.last_year()
    }

    fn index(&self, year: i32) -> Option<usize> {
        self.contains_year(year)
            .then(|| (year - self.first_year) as usize)
    }

    fn range_error(&self, year: i32) -> EngineError {
        EngineError::out_of_range(
            ErrorCode::YearOutOfRange,
            "year",
            format!(
                "year {} is outside the series range {}..={}",
                year,
                self.first_year,
                self.last_year()
            ),
        )
    }

    /// The value for `year`, or the default outside the stored range.
    pub fn get(&self, year: i32) -> T {
        self.index(year)
            .map(|i| self.values[i])
            .unwrap_or_default()
    }

    /// Sets the value for one year.
    pub fn set(&mut self, year: i32, value: T) -> EngineResult<()> {
        let i = self.index(year).ok_or_else(|| self.range_error(year))?;
        self.values[i] = value;
        Ok(())
    }

    /// Sets every year in `first..=last` to `value`.
    pub fn assign(&mut self, first: i32, last: i32, value: T) -> EngineResult<()> {
        for year in first..=last {
            self.set(year, value)?;
        }
        Ok(())
    }

    /// Iterates `(year, value)` pairs in year order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, T)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, v)| (self.first_year + i as i32, *v))
    }
}

impl<T: Copy + Default + Add<Output = T>> AnnualSeries<T> {
    /// Sums `first..=last` onto `init`. Years outside the stored range contribute the default.
    pub fn accumulate(&self, first: i32, last: i32, init: T) -> T {
        (first..=last).fold(init, |acc, year| acc + self.get(year))
    }
}

impl AnnualSeries<bool> {
    /// Number of flagged years in `first..=last`.
    pub fn count_set(&self, first: i32, last: i32) -> u32 {
        (first..=last).filter(|&year| self.get(year)).count() as u32
    }
}

/// A yes/no flag per year.
pub type YearFlags = AnnualSeries<bool>;

/// Quarters of coverage per year, each value in 0..=4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QcSeries {
    counts: AnnualSeries<u8>,
}

impl QcSeries {
    /// Creates an empty series for `first_year..=last_year`.
    pub fn new(first_year: i32, last_year: i32) -> Self {
        Self {
            counts: AnnualSeries::new(first_year, last_year),
        }
    }

    /// First year stored.
    pub fn first_year(&self) -> i32 {
        self.counts.first_year()
    }

    /// Last year stored.
    pub fn last_year(&self) -> i32 {
        self.counts.last_year()
    }

    /// Quarters credited for `year`.
    pub fn get(&self, year: i32) -> u8 {
        self.counts.get(year)
    }

    /// Sets the quarters for `year`, rejecting values above 4.
    pub fn set(&mut self, year: i32, quarters: u8) -> EngineResult<()> {
        check_quarters(year, quarters)?;
        self.counts.set(year, quarters)
    }

    /// Sets every year in `first..=last` to `quarters`.
    pub fn assign(&mut self, first: i32, last: i32, quarters: u8) -> EngineResult<()> {
        check_quarters(first, quarters)?;
        self.counts.assign(first, last, quarters)
    }

    /// Adds quarters to `year`, saturating at 4.
    pub fn credit(&mut self, year: i32, quarters: u8) -> EngineResult<()> {
        let total = self.get(year).saturating_add(quarters).min(MAX_QC_PER_YEAR);
        self.counts.set(year, total)
    }

    /// Sums quarters over `first..=last` onto `init`.
    pub fn accumulate(&self, first: i32, last: i32, init: u32) -> u32 {
        (first..=last).fold(init, |acc, year| acc + u32::from(self.get(year)))
    }

    /// Sums quarters over an inclusive range of calendar quarters.
    ///
    /// Quarters are credited per year, not per quarter, so a year only
    /// partly inside the range contributes at most the number of its
    /// quarters that fall inside.
    pub fn accumulate_quarters(&self, start: QuarterYear, end: QuarterYear) -> u32 {
        if end < start {
            return 0;
        }
        (start.year()..=end.year())
            .map(|year| {
                let low = if year == start.year() { start.quarter() } else { 0 };
                let high = if year == end.year() { end.quarter() } else { 3 };
                let in_range = high - low + 1;
                u32::from(self.get(year).min(in_range))
            })
            .sum()
    }

    /// Total quarters over the stored range.
    pub fn total(&self) -> u32 {
        self.accumulate(self.first_year(), self.last_year(), 0)
    }

    /// Iterates `(year, quarters)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (i32, u8)> + '_ {
        self.counts.iter()
    }
}

fn check_quarters(year: i32, quarters: u8) -> EngineResult<()> {
    if quarters > MAX_QC_PER_YEAR {
        return Err(EngineError::out_of_range(
            ErrorCode::QuartersOutOfRange,
            "quarters_of_coverage",
            format!("{} quarters for {} exceeds {}", quarters, year, MAX_QC_PER_YEAR),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_get_outside_range_is_default() {
        let series: AnnualSeries<Decimal> = AnnualSeries::new(1951, 1960);
        assert_eq!(series.get(1950), Decimal::ZERO);
        assert_eq!(series.get(1961), Decimal::ZERO);
    }

    #[test]
    fn test_set_outside_range_fails() {
        let mut series: AnnualSeries<u32> = AnnualSeries::new(1951, 1960);
        let err = series.set(1970, 1).unwrap_err();
        assert_eq!(err.code(), ErrorCode::YearOutOfRange);
    }

    #[test]
    fn test_empty_series_when_last_before_first() {
        let series: AnnualSeries<u32> = AnnualSeries::new(2000, 1999);
        assert_eq!(series.iter().count(), 0);
        assert_eq!(series.last_year(), 1999);
    }

    #[test]
    fn test_year_flags_count() {
        let mut flags: YearFlags = AnnualSeries::new(2000, 2010);
        flags.assign(2003, 2005, true).unwrap();
        assert_eq!(flags.count_set(2000, 2010), 3);
        assert_eq!(flags.count_set(2004, 2004), 1);
    }

    #[test]
    fn test_qc_set_rejects_five() {
        let mut qcs = QcSeries::new(1978, 2000);
        let err = qcs.set(1990, 5).unwrap_err();
        assert_eq!(err.code(), ErrorCode::QuartersOutOfRange);
    }

    #[test]
    fn test_qc_credit_saturates_at_four() {
        let mut qcs = QcSeries::new(1978, 2000);
        qcs.set(1990, 3).unwrap();
        qcs.credit(1990, 3).unwrap();
        assert_eq!(qcs.get(1990), 4);
    }

    #[test]
    fn test_accumulate_quarters_partial_years() {
        let mut qcs = QcSeries::new(2000, 2005);
        qcs.assign(2000, 2005, 4).unwrap();
        qcs.set(2002, 1).unwrap();
        let start = QuarterYear::new(2000, 2).unwrap();
        let end = QuarterYear::new(2002, 1).unwrap();
        // 2000: 2 quarters in range, 2001: 4, 2002: min(1, 2)
        assert_eq!(qcs.accumulate_quarters(start, end), 7);
    }

    #[test]
    fn test_accumulate_quarters_empty_when_reversed() {
        let mut qcs = QcSeries::new(2000, 2005);
        qcs.assign(2000, 2005, 4).unwrap();
        let start = QuarterYear::new(2003, 0).unwrap();
        let end = QuarterYear::new(2002, 3).unwrap();
        assert_eq!(qcs.accumulate_quarters(start, end), 0);
    }

    proptest! {
        #[test]
        fn accumulate_equals_sum_of_gets_and_is_bounded(
            values in prop::collection::vec(0u8..=4, 1..60),
            offset in 0usize..30,
            span in 0usize..40,
        ) {
            let first = 1950;
            let last = first + values.len() as i32 - 1;
            let mut qcs = QcSeries::new(first, last);
            for (i, v) in values.iter().enumerate() {
                qcs.set(first + i as i32, *v).unwrap();
            }
            let lo = first + offset as i32;
            let hi = lo + span as i32;
            let sum: u32 = (lo..=hi).map(|y| u32::from(qcs.get(y))).sum();
            prop_assert_eq!(qcs.accumulate(lo, hi, 0), sum);
            prop_assert!(qcs.accumulate(lo, hi, 0) <= 4 * (hi - lo + 1) as u32);
        }
    }
}
