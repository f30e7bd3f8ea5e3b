//! Normal retirement age, actuarial reduction and delayed retirement credit.
//!
//! All factors are returned as fractions (0.20 for a 20% reduction) and
//! are exact decimal ratios, so callers can round once at the end.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{MonthYear, attainment_month, schedule_birth_year};

/// Months of reduction charged at the higher rate.
pub const FIRST_REDUCTION_MONTHS: u32 = 36;

/// Age after which no further delayed retirement credit accrues.
pub const DRC_END_AGE: u32 = 70;

/// Maximum widow(er) reduction at age 60, in percent.
pub const WIDOW_MAX_REDUCTION_PERCENT: Decimal = Decimal::from_parts(285, 0, 0, false, 1);

/// Earliest age at which a widow(er) benefit is payable without disability.
pub const WIDOW_EARLIEST_AGE: u32 = 60;

/// Normal retirement age in months for a worker born in `birth_year`.
///
/// `birth_year` is the schedule year from [`schedule_birth_year`].
///
/// ```
/// use pia_engine::calculation::normal_retirement_age_months;
///
/// assert_eq!(normal_retirement_age_months(1937), 65 * 12);
/// assert_eq!(normal_retirement_age_months(1940), 65 * 12 + 6);
/// assert_eq!(normal_retirement_age_months(1950), 66 * 12);
/// assert_eq!(normal_retirement_age_months(1958), 66 * 12 + 8);
/// assert_eq!(normal_retirement_age_months(1975), 67 * 12);
/// ```
pub fn normal_retirement_age_months(birth_year: i32) -> u32 {
    match birth_year {
        ..=1937 => 65 * 12,
        1938..=1942 => 65 * 12 + 2 * (birth_year - 1937) as u32,
        1943..=1954 => 66 * 12,
        1955..=1959 => 66 * 12 + 2 * (birth_year - 1954) as u32,
        _ => 67 * 12,
    }
}

/// The month a worker born on `birth` attains normal retirement age.
pub fn normal_retirement_month(birth: NaiveDate) -> MonthYear {
    let months = normal_retirement_age_months(schedule_birth_year(birth));
    attainment_month(birth, 0).add_months(months as i32)
}

/// The month a widow(er) born on `birth` attains normal retirement age.
///
/// The survivor schedule runs two years behind the worker schedule: a
/// widow(er) born in 1940 has the normal retirement age of a worker born
/// in 1938.
pub fn widow_normal_retirement_month(birth: NaiveDate) -> MonthYear {
    let months = normal_retirement_age_months(schedule_birth_year(birth) - 2);
    attainment_month(birth, 0).add_months(months as i32)
}

/// Rates are given as (numerator, denominator) of a fraction, so that
/// whole-year reductions come out exact.
fn tiered(months: u32, first_rate: (u32, u32), second_rate: (u32, u32)) -> Decimal {
    let first = months.min(FIRST_REDUCTION_MONTHS);
    let rest = months.saturating_sub(FIRST_REDUCTION_MONTHS);
    Decimal::from(first * first_rate.0) / Decimal::from(first_rate.1)
        + Decimal::from(rest * second_rate.0) / Decimal::from(second_rate.1)
}

/// Reduction of a worker's own benefit for `months` before normal
/// retirement age: 5/9 of 1% for each of the first 36 months and 5/12 of
/// 1% for each further month.
///
/// ```
/// use pia_engine::calculation::worker_reduction;
/// use rust_decimal::Decimal;
///
/// assert_eq!(worker_reduction(36), Decimal::new(20, 2));
/// assert_eq!(worker_reduction(60), Decimal::new(30, 2));
/// ```
pub fn worker_reduction(months: u32) -> Decimal {
    tiered(months, (5, 900), (5, 1200))
}

/// Reduction of a spouse's benefit: 25/36 of 1% for each of the first 36
/// months and 5/12 of 1% for each further month.
pub fn spouse_reduction(months: u32) -> Decimal {
    tiered(months, (25, 3600), (5, 1200))
}

/// Reduction of a widow(er)'s benefit: 28.5% spread evenly over the months
/// from age 60 to normal retirement age.
///
/// Entitlement before age 60 (disabled widow(er)s) is charged as if at 60.
pub fn widow_reduction(months_early: u32, months_from_60_to_nra: u32) -> Decimal {
    if months_from_60_to_nra == 0 {
        return Decimal::ZERO;
    }
    let months = months_early.min(months_from_60_to_nra);
    WIDOW_MAX_REDUCTION_PERCENT / Decimal::ONE_HUNDRED * Decimal::from(months)
        / Decimal::from(months_from_60_to_nra)
}

/// Annual delayed retirement credit, in percent, by schedule birth year.
///
/// ```
/// use pia_engine::calculation::delayed_credit_annual_percent;
/// use rust_decimal::Decimal;
///
/// assert_eq!(delayed_credit_annual_percent(1920), Decimal::from(3));
/// assert_eq!(delayed_credit_annual_percent(1943), Decimal::from(8));
/// ```
pub fn delayed_credit_annual_percent(birth_year: i32) -> Decimal {
    match birth_year {
        ..=1916 => Decimal::ONE,
        1917..=1924 => Decimal::from(3),
        // half a point for every two years of birth from 1925 through 1942
        1925..=1942 => Decimal::from(3) + Decimal::new(5, 1) * Decimal::from((birth_year - 1923) / 2),
        _ => Decimal::from(8),
    }
}

/// Delayed retirement credit for `months` after normal retirement age.
pub fn delayed_credit(birth_year: i32, months: u32) -> Decimal {
    delayed_credit_annual_percent(birth_year) * Decimal::from(months) / Decimal::from(1200)
}

/// Months from normal retirement age to `entitlement`: negative when early,
/// and positive up to the month of age 70 when late.
pub fn adjustment_months(birth: NaiveDate, entitlement: MonthYear) -> i32 {
    let nra = normal_retirement_month(birth);
    if entitlement < nra {
        entitlement.months_since(nra)
    } else {
        let age_70 = attainment_month(birth, DRC_END_AGE);
        entitlement.min(age_70).months_since(nra).max(0)
    }
}

/// Multiplier for a worker's own benefit given [`adjustment_months`].
pub fn worker_adjustment_factor(birth: NaiveDate, months: i32) -> Decimal {
    if months < 0 {
        Decimal::ONE - worker_reduction(months.unsigned_abs())
    } else {
        Decimal::ONE + delayed_credit(schedule_birth_year(birth), months as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(y: i32, m: u32) -> MonthYear {
        MonthYear::new(y, m).unwrap()
    }

    #[test]
    fn test_normal_retirement_month_for_1960_birth() {
        assert_eq!(normal_retirement_month(date(1960, 6, 15)), month(2027, 6));
    }

    #[test]
    fn test_normal_retirement_month_for_january_first_birth() {
        // treated as born in 1954, so NRA is 66, attained in December 2019
        assert_eq!(normal_retirement_month(date(1955, 1, 1)), month(2020, 12));
    }

    #[test]
    fn test_widow_schedule_runs_two_years_behind() {
        assert_eq!(widow_normal_retirement_month(date(1939, 5, 10)), month(2004, 5));
        assert_eq!(widow_normal_retirement_month(date(1940, 5, 10)), month(2005, 7));
        assert_eq!(widow_normal_retirement_month(date(1962, 5, 10)), month(2029, 5));
    }

    #[test]
    fn test_worker_reduction_at_62_with_nra_67() {
        assert_eq!(worker_reduction(60), dec("0.30"));
        assert_eq!(worker_reduction(0), Decimal::ZERO);
    }

    #[test]
    fn test_spouse_reduction_at_62_with_nra_67() {
        assert_eq!(spouse_reduction(36), dec("0.25"));
        assert_eq!(spouse_reduction(60), dec("0.35"));
    }

    #[test]
    fn test_widow_reduction_is_prorated() {
        assert_eq!(widow_reduction(84, 84), dec("0.285"));
        assert_eq!(widow_reduction(42, 84), dec("0.1425"));
        assert_eq!(widow_reduction(100, 84), dec("0.285"));
        assert_eq!(widow_reduction(5, 0), Decimal::ZERO);
    }

    #[test]
    fn test_delayed_credit_schedule() {
        assert_eq!(delayed_credit_annual_percent(1916), dec("1"));
        assert_eq!(delayed_credit_annual_percent(1925), dec("3.5"));
        assert_eq!(delayed_credit_annual_percent(1926), dec("3.5"));
        assert_eq!(delayed_credit_annual_percent(1927), dec("4"));
        assert_eq!(delayed_credit_annual_percent(1935), dec("6"));
        assert_eq!(delayed_credit_annual_percent(1941), dec("7.5"));
        assert_eq!(delayed_credit_annual_percent(1942), dec("7.5"));
        assert_eq!(delayed_credit(1950, 36), dec("0.24"));
    }

    #[test]
    fn test_adjustment_months_caps_at_age_70() {
        let birth = date(1950, 3, 15);
        // NRA 66 in March 2016; age 70 in March 2020
        assert_eq!(adjustment_months(birth, month(2012, 3)), -48);
        assert_eq!(adjustment_months(birth, month(2016, 3)), 0);
        assert_eq!(adjustment_months(birth, month(2018, 3)), 24);
        assert_eq!(adjustment_months(birth, month(2022, 3)), 48);
    }

    #[test]
    fn test_worker_adjustment_factor() {
        let birth = date(1950, 3, 15);
        assert_eq!(worker_adjustment_factor(birth, -48), dec("0.75"));
        assert_eq!(worker_adjustment_factor(birth, 24), dec("1.16"));
        assert_eq!(worker_adjustment_factor(birth, 0), Decimal::ONE);
    }
}
