//! Orchestration of one benefit computation.
//!
//! A computation validates the worker, builds the derived data, runs every
//! governing method plus one reindexed widow(er) method per widow(er),
//! selects the governing PIA and distributes family benefits under the
//! family maximum. Each stage appends its audit steps in order.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use chrono::Utc;
use rayon::prelude::*;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::{EngineConfig, LawParameters};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, BenefitType, CalculationResult, DisabilityInsuredStatus,
    FamilyMember, MethodResult, WorkerRecord,
};

use super::family::family_benefits;
use super::methods::{MethodContext, PiaMethod};
use super::pia_data::build_pia_data;
use super::selection::select_governing;
use super::validation::validate_worker;

fn warning(code: &str, message: String) -> AuditWarning {
    AuditWarning {
        code: code.to_string(),
        message,
        severity: "high".to_string(),
    }
}

/// Whether benefits are payable on the record, with a warning when not.
///
/// Retirement benefits, and the spouse and child benefits paid with
/// them, need the worker to be fully insured. Survivor claims are checked
/// member by member in [`survivor_warning`].
fn entitlement_warning(worker: &WorkerRecord, ctx: &MethodContext<'_>) -> Option<AuditWarning> {
    let insured = &ctx.data.insured;
    if !insured.status.is_insured() {
        return Some(warning(
            "WORKER_NOT_INSURED",
            format!(
                "Worker '{}' is not insured; no benefits are payable on the record",
                worker.id
            ),
        ));
    }
    if worker.benefit_type == BenefitType::OldAge && !insured.is_fully_insured() {
        return Some(warning(
            "WORKER_NOT_FULLY_INSURED",
            format!(
                "Worker '{}' is {:?} but not fully insured; no retirement benefits are payable",
                worker.id, insured.status
            ),
        ));
    }
    let disability = ctx.data.disability_insured.status;
    if worker.is_disability() && !disability.is_disability_insured() {
        return Some(warning(
            "WORKER_NOT_DISABILITY_INSURED",
            format!(
                "Worker '{}' is not disability insured ({:?}); no disability benefits are payable",
                worker.id, disability
            ),
        ));
    }
    None
}

/// A warning when `member`'s survivor claim needs more than the worker's
/// insured status provides.
fn survivor_warning(member: &FamilyMember, ctx: &MethodContext<'_>) -> Option<AuditWarning> {
    let insured = &ctx.data.insured;
    if member.beneficiary.survivor_requires_fully_insured() && !insured.is_fully_insured() {
        return Some(warning(
            "MEMBER_REQUIRES_FULLY_INSURED",
            format!(
                "Member '{}' ({:?}) needs the worker to have died fully insured; worker was {:?}",
                member.id, member.beneficiary, insured.status
            ),
        ));
    }
    None
}

/// The methods evaluated for `worker`, in evaluation order.
fn methods_for(worker: &WorkerRecord) -> Vec<PiaMethod> {
    let mut methods = PiaMethod::governing().to_vec();
    methods.extend(
        worker
            .family
            .iter()
            .filter(|m| m.beneficiary.is_widow())
            .map(|m| PiaMethod::ReindexedWidow(m.id.clone())),
    );
    methods
}

/// Computes the PIA, MFB and all monthly benefits for one worker.
///
/// # Example
///
/// ```no_run
/// use pia_engine::calculation::calculate;
/// use pia_engine::config::ConfigLoader;
/// use pia_engine::models::WorkerRecord;
///
/// let loader = ConfigLoader::load("./config/law").unwrap();
/// let worker: WorkerRecord = serde_json::from_str(r#"{
///     "id": "w-001",
///     "birth_date": "1958-04-10",
///     "benefit_type": "old_age",
///     "entitlement_date": "2024-04",
///     "earnings": { "2020": "50000", "2021": "52000", "2022": "54000" }
/// }"#).unwrap();
/// let result = calculate(&worker, loader.law(), loader.engine()).unwrap();
/// println!("PIA {}", result.governing_pia);
/// ```
pub fn calculate(
    worker: &WorkerRecord,
    law: &LawParameters,
    config: &EngineConfig,
) -> EngineResult<CalculationResult> {
    let start_time = Instant::now();
    info!(worker_id = %worker.id, benefit_type = ?worker.benefit_type, "Starting computation");

    validate_worker(worker, config)?;

    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<AuditWarning> = Vec::new();

    let derived = build_pia_data(worker, law, config, 1)?;
    let mut step_number = derived.audit_steps.len() as u32 + 1;
    steps.extend(derived.audit_steps);
    let data = derived.data;
    let ctx = MethodContext::new(worker, &data, law);

    let mut candidates: Vec<MethodResult> = Vec::new();
    for method in methods_for(worker) {
        let outcome = method.calculate(&ctx, step_number)?;
        debug!(
            worker_id = %worker.id,
            method = ?outcome.result.method,
            applicable = outcome.result.applicable,
            pia = %outcome.result.pia,
            mfb = %outcome.result.mfb,
            "Method evaluated"
        );
        candidates.push(outcome.result);
        steps.push(outcome.audit_step);
        step_number += 1;
    }

    let selected = select_governing(&ctx, &candidates, step_number)?;
    steps.push(selected.audit_step);
    step_number += 1;
    let selection = selected.selection;

    let (worker_benefit, family) = match entitlement_warning(worker, &ctx) {
        Some(warning) => {
            warnings.push(warning);
            (None, Vec::new())
        }
        None => {
            let mut members = Vec::with_capacity(worker.family.len());
            for member in &worker.family {
                match worker.is_survivor().then(|| survivor_warning(member, &ctx)).flatten() {
                    Some(warning) => warnings.push(warning),
                    None => members.push(member.clone()),
                }
            }
            let family = family_benefits(&ctx, &members, &selection, &candidates, step_number);
            if !worker.family.is_empty() {
                steps.push(family.audit_step);
            }
            (selected.worker_benefit, family.chains)
        }
    };

    let duration_us = start_time.elapsed().as_micros() as u64;
    info!(
        worker_id = %worker.id,
        governing_method = ?selection.method,
        pia = %selection.pia,
        mfb = %selection.mfb,
        family_members = family.len(),
        duration_us,
        "Computation completed"
    );

    Ok(CalculationResult {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        worker_id: worker.id.clone(),
        benefit_date: worker.benefit_date(),
        insured_status: data.insured.status,
        disability_insured_status: if worker.is_disability() {
            data.disability_insured.status
        } else {
            DisabilityInsuredStatus::NotApplicable
        },
        governing_method: selection.method,
        governing_pia: selection.pia,
        governing_mfb: selection.mfb,
        selection_rule: selection.rule,
        worker_benefit,
        methods: candidates,
        family,
        pia_data: data,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us,
        },
    })
}

/// Computes every worker independently and in parallel. Results are in
/// input order; one worker's failure does not affect the others.
pub fn calculate_batch(
    workers: &[WorkerRecord],
    law: &LawParameters,
    config: &EngineConfig,
) -> Vec<EngineResult<CalculationResult>> {
    info!(workers = workers.len(), "Starting batch computation");
    run_isolated(workers, |worker| calculate(worker, law, config))
}

/// Runs `compute` over `workers` in parallel. A panic while computing one
/// worker becomes that worker's error.
fn run_isolated<F>(workers: &[WorkerRecord], compute: F) -> Vec<EngineResult<CalculationResult>>
where
    F: Fn(&WorkerRecord) -> EngineResult<CalculationResult> + Sync,
{
    workers
        .par_iter()
        .map(|worker| {
            panic::catch_unwind(AssertUnwindSafe(|| compute(worker))).unwrap_or_else(|payload| {
                let message = if let Some(s) = payload.downcast_ref::<&str>() {
                    (*s).to_string()
                } else if let Some(s) = payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic payload".to_string()
                };
                error!(worker_id = %worker.id, %message, "Computation panicked");
                Err(EngineError::CalculationError {
                    message: format!("computation for worker '{}' panicked: {}", worker.id, message),
                })
            })
        })
        .collect()
}
