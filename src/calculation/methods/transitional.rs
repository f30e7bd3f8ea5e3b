//! The transitional guarantee for eligibility in 1979 through 1983.
//!
//! The PIA the December 1978 benefit table would have given, on earnings
//! before the eligibility year, with increases from the eligibility year.

use crate::config::apply_brackets;
use crate::error::EngineResult;
use crate::models::{AuditStep, MethodKind, MethodResult, Provenance};

use super::pia_table::{average_monthly_wage, table_amounts, table_months};
use super::{MethodContext, MethodOutcome, clause_ref};

/// First eligibility year covered.
pub const FIRST_GUARANTEE_YEAR: i32 = 1979;

/// Last eligibility year covered.
pub const LAST_GUARANTEE_YEAR: i32 = 1983;

pub(super) fn is_applicable(ctx: &MethodContext<'_>) -> bool {
    (FIRST_GUARANTEE_YEAR..=LAST_GUARANTEE_YEAR).contains(&ctx.eligibility_year())
        && !ctx.worker.is_disability()
}

pub(super) fn calculate(ctx: &MethodContext<'_>, step_number: u32) -> EngineResult<MethodOutcome> {
    let data = ctx.data;
    let ey = ctx.eligibility_year();
    let last_year = data.last_earnings_year.min(ey - 1);
    let n = data.new_start.computation_years;
    let (amw, years) = average_monthly_wage(&data.earnings, &data.new_start, &data.freeze, last_year, n);

    let (table_month, cola_after) = table_months(ctx);
    let amounts = table_amounts(ctx, table_month, cola_after, None, |v| {
        apply_brackets(&v.amw_brackets, amw)
    })?;

    let result = MethodResult {
        method: MethodKind::TransitionalGuarantee,
        applicable: true,
        pia: amounts.pia,
        mfb: amounts.mfb,
        pia_at_eligibility: amounts.pia_at_eligibility,
        mfb_at_eligibility: amounts.mfb_at_eligibility,
        member_id: None,
        provenance: Provenance {
            average_earnings: Some(amw),
            base_year: Some(data.new_start.base_year),
            computation_years: Some(n),
            table_effective: Some(amounts.table_effective),
            increases_applied: amounts.applied.clone(),
            ..Provenance::default()
        },
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "transitional_guarantee".to_string(),
        rule_name: "Transitional Guarantee PIA".to_string(),
        clause_ref: clause_ref(MethodKind::TransitionalGuarantee).to_string(),
        input: serde_json::json!({
            "eligibility_year": ey,
            "last_earnings_year": last_year,
            "computation_years": years,
        }),
        output: serde_json::json!({
            "amw": amw.to_string(),
            "december_1978_pia": amounts.pia_at_eligibility.to_string(),
            "pia": result.pia.to_string(),
            "mfb": result.mfb.to_string(),
        }),
        reasoning: format!(
            "AMW ${} on earnings through {}; the December 1978 table gives ${}, ${} after increases from {}",
            amw, last_year, amounts.pia_at_eligibility, result.pia, ey
        ),
    };

    Ok(MethodOutcome { result, audit_step })
}
