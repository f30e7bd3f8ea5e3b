//! The derived-data aggregator.
//!
//! Builds [`PiaData`] once per worker: everything the benefit methods
//! read, plus the audit steps explaining how each piece was reached.

use chrono::Datelike;

use crate::config::{EngineConfig, LawParameters};
use crate::error::EngineResult;
use crate::models::{AuditStep, PiaData, WorkerRecord};

use super::actuarial::normal_retirement_month;
use super::computation_period::derive_computation_periods;
use super::earnings::{build_earnings_series, years_of_coverage};
use super::freeze::derive_freeze_years;
use super::insured_status::{
    determination_year, determine_disability_insured_status, determine_insured_status,
};
use super::quarters::derive_quarters;

/// The result of building the derived data, including its audit steps.
#[derive(Debug, Clone)]
pub struct PiaDataResult {
    /// The derived data.
    pub data: PiaData,
    /// One audit step per derivation, numbered from the first step given.
    pub audit_steps: Vec<AuditStep>,
}

/// Year of first eligibility: the year of age 62, or of death or
/// disability onset if earlier.
pub fn eligibility_year(worker: &WorkerRecord) -> EngineResult<i32> {
    determination_year(worker)
}

/// Last year whose earnings enter the computation: the year of death for
/// a survivor case, the year before entitlement otherwise.
pub fn last_earnings_year(worker: &WorkerRecord) -> i32 {
    match worker.death_date {
        Some(death) if worker.is_survivor() => death.year(),
        _ => worker.entitlement_date.year() - 1,
    }
}

/// Last year quarters of coverage are tracked for.
fn last_quarter_year(worker: &WorkerRecord, last_earnings: i32) -> i32 {
    let reported = [
        &worker.quarters_of_coverage,
        &worker.railroad_quarters,
        &worker.military_quarters,
    ]
    .into_iter()
    .filter_map(|quarters| quarters.keys().next_back().copied())
    .max()
    .unwrap_or(last_earnings);
    worker
        .benefit_date()
        .year()
        .max(reported)
        .max(last_earnings)
}

/// Builds the derived data for `worker`.
///
/// The worker must already have passed validation.
pub fn build_pia_data(
    worker: &WorkerRecord,
    law: &LawParameters,
    config: &EngineConfig,
    first_step: u32,
) -> EngineResult<PiaDataResult> {
    let mut step = first_step;
    let mut audit_steps = Vec::new();
    let mut next = || {
        let current = step;
        step += 1;
        current
    };

    let eligibility = eligibility_year(worker)?;
    let last_earnings = last_earnings_year(worker);

    let freeze = derive_freeze_years(worker, next());
    audit_steps.push(freeze.audit_step);

    let earnings = build_earnings_series(worker, law, config, last_earnings, next())?;
    audit_steps.push(earnings.audit_step);

    let quarters = derive_quarters(
        worker,
        law,
        config,
        last_quarter_year(worker, last_earnings),
        next(),
    )?;
    audit_steps.push(quarters.audit_step);

    let insured = determine_insured_status(worker, &quarters.quarters, &freeze.freeze, next())?;
    audit_steps.push(insured.audit_step);

    let disability_insured = determine_disability_insured_status(
        worker,
        &quarters.quarters,
        &insured.determination,
        next(),
    )?;
    audit_steps.push(disability_insured.audit_step);

    let periods = derive_computation_periods(worker, &freeze.freeze, eligibility, next());
    audit_steps.push(periods.audit_step);

    let yoc = years_of_coverage(worker, law, config, last_earnings)?;
    audit_steps.push(AuditStep {
        step_number: next(),
        rule_id: "years_of_coverage".to_string(),
        rule_name: "Years of Coverage".to_string(),
        clause_ref: "215(a)(1)(C)".to_string(),
        input: serde_json::json!({
            "last_year": last_earnings,
        }),
        output: serde_json::json!(yoc),
        reasoning: format!(
            "{} years of coverage for the special minimum ({} before 1951); {} for the windfall elimination provision",
            yoc.special_minimum, yoc.pre_1951, yoc.windfall
        ),
    });

    let data = PiaData {
        eligibility_year: eligibility,
        last_earnings_year: last_earnings,
        normal_retirement_month: normal_retirement_month(worker.birth_date),
        earnings: earnings.earnings,
        quarters: quarters.quarters,
        freeze: freeze.freeze,
        insured: insured.determination,
        disability_insured: disability_insured.determination,
        new_start: periods.new_start,
        old_start: periods.old_start,
        years_of_coverage: yoc,
    };

    Ok(PiaDataResult { data, audit_steps })
}
