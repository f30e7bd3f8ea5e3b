//! The guarantee of a recent disability PIA.
//!
//! When a disability period ended no more than twelve months before the
//! current entitlement, the PIA and MFB payable in the month before it
//! ceased carry forward with later increases. In a disability case the
//! guaranteed period is the prior one; otherwise it is the most recent.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AuditStep, DisabilityPeriod, MethodKind, MethodResult, MonthYear, Provenance};

use super::super::rounding::{round, unapply_cola};
use super::{MethodContext, MethodOutcome, clause_ref, cola_start, raise_by_increases};

/// Months after cessation within which the guarantee holds.
pub const GUARANTEE_WINDOW_MONTHS: i32 = 12;

/// The closed period being guaranteed, with its snapshot month.
fn guaranteed_period<'a>(ctx: &MethodContext<'a>) -> Option<(&'a DisabilityPeriod, MonthYear)> {
    let period = if ctx.worker.is_disability() {
        ctx.worker.prior_disability()
    } else {
        ctx.worker.current_disability()
    }?;
    let snapshot = period.snapshot_month()?;
    (period.pia > Decimal::ZERO).then_some((period, snapshot))
}

/// Month the current benefit starts from: death for a survivor case,
/// entitlement otherwise.
fn event_month(ctx: &MethodContext<'_>) -> MonthYear {
    match ctx.worker.death_month() {
        Some(death) if ctx.worker.is_survivor() => death,
        _ => ctx.worker.entitlement_date,
    }
}

/// Removes the increases in `(after, through]`, newest first.
fn deflate(ctx: &MethodContext<'_>, amount: Decimal, after: MonthYear, through: MonthYear) -> Decimal {
    let increases: Vec<_> = ctx.law.increases_between(after, through).collect();
    increases.iter().rev().fold(amount, |value, increase| {
        unapply_cola(value, increase.percent, increase.effective.year())
    })
}

pub(super) fn is_applicable(ctx: &MethodContext<'_>) -> bool {
    guaranteed_period(ctx).is_some_and(|(period, _)| {
        period.cessation.is_some_and(|cessation| {
            let gap = event_month(ctx).months_since(cessation);
            (0..=GUARANTEE_WINDOW_MONTHS).contains(&gap)
        })
    })
}

pub(super) fn calculate(ctx: &MethodContext<'_>, step_number: u32) -> EngineResult<MethodOutcome> {
    let Some((period, snapshot)) = guaranteed_period(ctx) else {
        return Ok(super::not_applicable(MethodKind::DisabilityGuarantee, step_number));
    };
    let ey = ctx.eligibility_year();

    let pia = raise_by_increases(ctx.law, period.pia, snapshot, ctx.benefit_date());
    let mfb = raise_by_increases(ctx.law, period.mfb, snapshot, ctx.benefit_date());

    let eligibility_level = cola_start(ey);
    let pia_at_eligibility = round(deflate(ctx, period.pia, eligibility_level, snapshot), ey);
    let mfb_at_eligibility = round(deflate(ctx, period.mfb, eligibility_level, snapshot), ey);

    let result = MethodResult {
        method: MethodKind::DisabilityGuarantee,
        applicable: true,
        pia: pia.amount,
        mfb: mfb.amount,
        pia_at_eligibility,
        mfb_at_eligibility,
        member_id: None,
        provenance: Provenance {
            increases_applied: pia.applied,
            ..Provenance::default()
        },
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "disability_guarantee".to_string(),
        rule_name: "Disability Guarantee PIA".to_string(),
        clause_ref: clause_ref(MethodKind::DisabilityGuarantee).to_string(),
        input: serde_json::json!({
            "onset": period.onset.to_string(),
            "cessation": period.cessation.map(|c| c.to_string()),
            "snapshot_pia": period.pia.to_string(),
            "snapshot_mfb": period.mfb.to_string(),
        }),
        output: serde_json::json!({
            "pia_at_eligibility": pia_at_eligibility.to_string(),
            "pia": result.pia.to_string(),
            "mfb": result.mfb.to_string(),
        }),
        reasoning: format!(
            "PIA ${} payable in {} carried forward by {} increase(s) to ${}",
            period.pia,
            snapshot,
            result.provenance.increases_applied.len(),
            result.pia
        ),
    };

    Ok(MethodOutcome { result, audit_step })
}
