//! The frozen minimum PIA for eligibility in 1979 through 1981.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AuditStep, MethodKind, MethodResult, Provenance};

use super::mfb::{family_maximum, mfb_bend_points};
use super::{MethodContext, MethodOutcome, clause_ref, cola_start, raise_by_increases};

/// Minimum PIA at the December 1978 level.
pub const FROZEN_MINIMUM_PIA: Decimal = Decimal::from_parts(12200, 0, 0, false, 2);

const FIRST_YEAR: i32 = 1979;
const LAST_YEAR: i32 = 1981;

pub(super) fn is_applicable(ctx: &MethodContext<'_>) -> bool {
    (FIRST_YEAR..=LAST_YEAR).contains(&ctx.eligibility_year())
}

pub(super) fn calculate(ctx: &MethodContext<'_>, step_number: u32) -> EngineResult<MethodOutcome> {
    let entitlement_year = ctx.worker.entitlement_date.year();
    let ey = ctx.eligibility_year();
    let bend_points = mfb_bend_points(ctx.law, ey - 2)?;
    let base_mfb = family_maximum(FROZEN_MINIMUM_PIA, &bend_points, ey);

    let after = cola_start(entitlement_year);
    let pia = raise_by_increases(ctx.law, FROZEN_MINIMUM_PIA, after, ctx.benefit_date());
    let mfb = raise_by_increases(ctx.law, base_mfb, after, ctx.benefit_date());

    let result = MethodResult {
        method: MethodKind::FrozenMinimum,
        applicable: true,
        pia: pia.amount,
        mfb: mfb.amount,
        pia_at_eligibility: FROZEN_MINIMUM_PIA,
        mfb_at_eligibility: base_mfb,
        member_id: None,
        provenance: Provenance {
            increases_applied: pia.applied,
            ..Provenance::default()
        },
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "frozen_minimum".to_string(),
        rule_name: "Frozen Minimum PIA".to_string(),
        clause_ref: clause_ref(MethodKind::FrozenMinimum).to_string(),
        input: serde_json::json!({
            "eligibility_year": ctx.eligibility_year(),
            "entitlement_year": entitlement_year,
        }),
        output: serde_json::json!({
            "mfb_bend_points": bend_points.map(|bp| bp.to_string()),
            "pia": result.pia.to_string(),
            "mfb": result.mfb.to_string(),
        }),
        reasoning: format!(
            "Minimum of ${} frozen until {}, ${} after {} increase(s)",
            FROZEN_MINIMUM_PIA,
            entitlement_year,
            result.pia,
            result.provenance.increases_applied.len()
        ),
    };

    Ok(MethodOutcome { result, audit_step })
}
