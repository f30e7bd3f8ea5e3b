//! Computation periods and selection of the highest earnings years.
//!
//! Elapsed years run from the year after the base year (or after the year
//! of age 21, if later) through the year before eligibility, with freeze
//! years removed. Five years drop out (fewer for a disabled worker), and
//! never fewer than two years are averaged.

use rust_decimal::Decimal;

use crate::models::{AnnualSeries, AuditStep, ComputationPeriod, FreezeYears, WorkerRecord};

/// Base year of the new-start computation.
pub const NEW_START_BASE_YEAR: i32 = 1950;

/// Base year of the old-start computation.
pub const OLD_START_BASE_YEAR: i32 = 1936;

/// Dropout years for old-age and survivor computations.
pub const DROPOUT_YEARS: u32 = 5;

/// Fewest computation years.
pub const MIN_COMPUTATION_YEARS: u32 = 2;

/// The result of deriving both computation periods, including the audit step.
#[derive(Debug, Clone)]
pub struct ComputationPeriodsResult {
    /// Period from 1950.
    pub new_start: ComputationPeriod,
    /// Period from 1936.
    pub old_start: ComputationPeriod,
    /// The audit step recording the derivation.
    pub audit_step: AuditStep,
}

/// Derives one computation period for `base_year`.
///
/// ```
/// use chrono::NaiveDate;
/// use pia_engine::calculation::computation_period;
/// use pia_engine::models::{BenefitType, FreezeYears, MonthYear, WorkerRecord};
///
/// let worker = WorkerRecord::new(
///     "w",
///     NaiveDate::from_ymd_opt(1960, 6, 15).unwrap(),
///     BenefitType::OldAge,
///     MonthYear::new(2022, 6).unwrap(),
/// );
/// let period = computation_period(&worker, &FreezeYears::default(), 1950, 2022);
/// assert_eq!(period.elapsed_years, 40);
/// assert_eq!(period.computation_years, 35);
/// ```
pub fn computation_period(
    worker: &WorkerRecord,
    freeze: &FreezeYears,
    base_year: i32,
    eligibility_year: i32,
) -> ComputationPeriod {
    let first = base_year.max(worker.attainment_year(21)) + 1;
    let last = eligibility_year - 1;

    let (span, frozen) = if last >= first {
        ((last - first + 1) as u32, freeze.count_between(first, last))
    } else {
        (0, 0)
    };
    let elapsed = span.saturating_sub(frozen);

    let disability_dropout = if worker.is_disability() {
        (elapsed / 5).min(DROPOUT_YEARS)
    } else {
        0
    };
    let dropout = if worker.is_disability() {
        disability_dropout
    } else {
        DROPOUT_YEARS
    };

    ComputationPeriod {
        base_year,
        first_elapsed_year: first,
        last_elapsed_year: last,
        elapsed_years: elapsed,
        freeze_years: frozen,
        dropout_years: DROPOUT_YEARS,
        disability_dropout_years: disability_dropout,
        computation_years: elapsed.saturating_sub(dropout).max(MIN_COMPUTATION_YEARS),
    }
}

/// Derives the new-start and old-start periods.
pub fn derive_computation_periods(
    worker: &WorkerRecord,
    freeze: &FreezeYears,
    eligibility_year: i32,
    step_number: u32,
) -> ComputationPeriodsResult {
    let new_start = computation_period(worker, freeze, NEW_START_BASE_YEAR, eligibility_year);
    let old_start = computation_period(worker, freeze, OLD_START_BASE_YEAR, eligibility_year);

    let audit_step = AuditStep {
        step_number,
        rule_id: "computation_period".to_string(),
        rule_name: "Computation Period".to_string(),
        clause_ref: "215(b)".to_string(),
        input: serde_json::json!({
            "eligibility_year": eligibility_year,
            "age_21_year": worker.attainment_year(21),
            "disability": worker.is_disability(),
        }),
        output: serde_json::json!({
            "new_start": new_start,
            "old_start": old_start,
        }),
        reasoning: format!(
            "{} elapsed years after 1950 give {} computation years; {} after 1936 give {}",
            new_start.elapsed_years,
            new_start.computation_years,
            old_start.elapsed_years,
            old_start.computation_years
        ),
    };

    ComputationPeriodsResult {
        new_start,
        old_start,
        audit_step,
    }
}

/// Years whose earnings may be averaged: after the base year through
/// `last_year`, freeze years excluded.
pub fn candidate_years(
    period: &ComputationPeriod,
    freeze: &FreezeYears,
    last_year: i32,
) -> Vec<i32> {
    (period.base_year + 1..=last_year)
        .filter(|&year| !freeze.contains(year))
        .collect()
}

/// The `n` highest amounts among `years`, earlier years winning ties.
///
/// Returns the chosen years in ascending order and their sum.
pub fn highest_years(
    series: &AnnualSeries<Decimal>,
    years: &[i32],
    n: u32,
) -> (Vec<i32>, Decimal) {
    let mut ranked: Vec<(i32, Decimal)> = years.iter().map(|&y| (y, series.get(y))).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(n as usize);

    let total = ranked.iter().map(|(_, amount)| *amount).sum();
    let mut chosen: Vec<i32> = ranked.into_iter().map(|(year, _)| year).collect();
    chosen.sort_unstable();
    (chosen, total)
}
