//! Disability freeze years.
//!
//! A year is wholly within a period of disability when every month of it
//! is covered: the onset year counts only for an onset on January 1, and
//! the year of cessation counts only when cessation falls in December. An
//! open period runs through the benefit date. Years touched by a period
//! but not wholly within it are reported as partial. Nothing before 1937
//! is frozen.

use chrono::Datelike;

use crate::config::FIRST_COVERED_YEAR;
use crate::models::{AuditStep, DisabilityPeriod, FreezeYears, MonthYear, WorkerRecord, YearRange};

/// The result of deriving freeze years, including the audit step.
#[derive(Debug, Clone)]
pub struct FreezeYearsResult {
    /// The derived freeze years.
    pub freeze: FreezeYears,
    /// The audit step recording the derivation.
    pub audit_step: AuditStep,
}

/// Years wholly within `period`, and the partial years at either end.
///
/// `open_end` stands in for the cessation month of an open period.
///
/// ```
/// use chrono::NaiveDate;
/// use pia_engine::calculation::period_freeze_years;
/// use pia_engine::models::{DisabilityPeriod, MonthYear, YearRange};
/// use rust_decimal::Decimal;
///
/// let period = DisabilityPeriod::closed(
///     NaiveDate::from_ymd_opt(2010, 3, 15).unwrap(),
///     MonthYear::new(2012, 12).unwrap(),
///     Decimal::ZERO,
///     Decimal::ZERO,
/// );
/// let (wholly, partial) = period_freeze_years(&period, MonthYear::new(2020, 1).unwrap());
/// assert_eq!(wholly, YearRange::new(2011, 2012));
/// assert_eq!(partial, vec![2010]);
/// ```
pub fn period_freeze_years(period: &DisabilityPeriod, open_end: MonthYear) -> (YearRange, Vec<i32>) {
    let onset = period.onset;
    let end = period.cessation.unwrap_or(open_end);

    let first = if onset.month() == 1 && onset.day() == 1 {
        onset.year()
    } else {
        onset.year() + 1
    }
    .max(FIRST_COVERED_YEAR);
    let last = if end.month() == 12 {
        end.year()
    } else {
        end.year() - 1
    };
    let wholly = YearRange::new(first, last);

    let mut partial = Vec::new();
    for year in [onset.year(), end.year()] {
        if year >= FIRST_COVERED_YEAR
            && !wholly.contains(year)
            && year <= end.year()
            && !partial.contains(&year)
        {
            partial.push(year);
        }
    }
    (wholly, partial)
}

/// Derives the freeze years for every disability period on the record.
pub fn derive_freeze_years(worker: &WorkerRecord, step_number: u32) -> FreezeYearsResult {
    let open_end = worker.benefit_date();
    let mut freeze = FreezeYears::default();

    for period in &worker.disability_periods {
        let (wholly, partial) = period_freeze_years(period, open_end);
        freeze.wholly.push(wholly);
        for year in partial {
            if !freeze.partially.contains(&year) {
                freeze.partially.push(year);
            }
        }
    }
    freeze.partially.sort_unstable();

    let wholly_json: Vec<_> = freeze
        .wholly
        .iter()
        .filter(|range| !range.is_empty())
        .map(|range| serde_json::json!([range.first, range.last]))
        .collect();

    let reasoning = if worker.disability_periods.is_empty() {
        "No periods of disability; no years are frozen".to_string()
    } else {
        format!(
            "{} period(s) of disability freeze {} whole year(s); {} year(s) are only partly covered",
            worker.disability_periods.len(),
            freeze.wholly.iter().map(YearRange::len).sum::<u32>(),
            freeze.partially.len()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "freeze_years".to_string(),
        rule_name: "Disability Freeze Years".to_string(),
        clause_ref: "216(i)".to_string(),
        input: serde_json::json!({
            "periods": worker.disability_periods.iter().map(|p| serde_json::json!({
                "onset": p.onset.to_string(),
                "cessation": p.cessation.map(|c| c.to_string()),
            })).collect::<Vec<_>>(),
            "open_period_end": open_end.to_string(),
        }),
        output: serde_json::json!({
            "wholly": wholly_json,
            "partially": freeze.partially,
        }),
        reasoning,
    };

    FreezeYearsResult { freeze, audit_step }
}
