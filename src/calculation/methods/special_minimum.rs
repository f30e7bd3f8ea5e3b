//! The special minimum PIA for long-service low earners.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AuditStep, MethodKind, MethodResult, MonthYear, Provenance};

use super::super::rounding::round;
use super::mfb::{MFB_BASE_BEND_POINTS, family_maximum};
use super::{MethodContext, MethodOutcome, clause_ref, raise_by_increases};

/// Dollars per year of coverage above ten, as of January 1979.
pub const SPECIAL_MINIMUM_RATE: Decimal = Decimal::from_parts(1150, 0, 0, false, 2);

/// Years of coverage not counted.
const EXCLUDED_YEARS: u32 = 10;

/// Most years of coverage counted.
const MAX_YEARS: u32 = 30;

/// Year the rate took effect.
const RATE_YEAR: i32 = 1979;

/// Special minimum PIA at the January 1979 rate.
///
/// ```
/// use pia_engine::calculation::methods::special_minimum_pia;
/// use rust_decimal::Decimal;
///
/// assert_eq!(special_minimum_pia(10), Decimal::ZERO);
/// assert_eq!(special_minimum_pia(25), Decimal::new(17250, 2));
/// assert_eq!(special_minimum_pia(35), special_minimum_pia(30));
/// ```
pub fn special_minimum_pia(years_of_coverage: u32) -> Decimal {
    let counted = years_of_coverage.min(MAX_YEARS).saturating_sub(EXCLUDED_YEARS);
    SPECIAL_MINIMUM_RATE * Decimal::from(counted)
}

pub(super) fn is_applicable(ctx: &MethodContext<'_>) -> bool {
    ctx.data.years_of_coverage.special_minimum > EXCLUDED_YEARS
        && ctx.benefit_date() >= MonthYear::january(RATE_YEAR)
}

pub(super) fn calculate(ctx: &MethodContext<'_>, step_number: u32) -> EngineResult<MethodOutcome> {
    let years = ctx.data.years_of_coverage.special_minimum;
    let base = round(special_minimum_pia(years), RATE_YEAR);
    // the January 1979 amount is read against the 1979 bend points
    let base_mfb = family_maximum(base, &MFB_BASE_BEND_POINTS, RATE_YEAR);

    let start = MonthYear::january(RATE_YEAR);
    let pia = raise_by_increases(ctx.law, base, start, ctx.benefit_date());
    let mfb = raise_by_increases(ctx.law, base_mfb, start, ctx.benefit_date());

    let result = MethodResult {
        method: MethodKind::SpecialMinimum,
        applicable: true,
        pia: pia.amount,
        mfb: mfb.amount,
        pia_at_eligibility: base,
        mfb_at_eligibility: base_mfb,
        member_id: None,
        provenance: Provenance {
            years_of_coverage: Some(years),
            increases_applied: pia.applied,
            ..Provenance::default()
        },
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "special_minimum".to_string(),
        rule_name: "Special Minimum PIA".to_string(),
        clause_ref: clause_ref(MethodKind::SpecialMinimum).to_string(),
        input: serde_json::json!({
            "years_of_coverage": years,
            "pre_1951_years": ctx.data.years_of_coverage.pre_1951,
        }),
        output: serde_json::json!({
            "january_1979_pia": base.to_string(),
            "pia": result.pia.to_string(),
            "mfb": result.mfb.to_string(),
        }),
        reasoning: format!(
            "{} years of coverage ({} counted) at ${} give ${} in January 1979, ${} after {} increase(s)",
            years,
            years.min(MAX_YEARS) - EXCLUDED_YEARS,
            SPECIAL_MINIMUM_RATE,
            base,
            result.pia,
            result.provenance.increases_applied.len()
        ),
    };

    Ok(MethodOutcome { result, audit_step })
}
