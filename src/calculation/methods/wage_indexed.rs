//! The wage-indexed formula for eligibility after 1978.
//!
//! Earnings before the indexing year (eligibility year − 2) are scaled by
//! the growth of the national average wage. The highest N years are
//! averaged into AIME, and the PIA is 90/32/15% of AIME across two bend
//! points that move with the average wage. A worker with a non-covered
//! pension and fewer than 30 years of coverage gets a lower first
//! percentage under the windfall elimination provision.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::LawParameters;
use crate::error::EngineResult;
use crate::models::{AnnualSeries, AuditStep, MethodKind, MethodResult, MonthYear, Provenance};

use super::super::computation_period::{candidate_years, highest_years};
use super::super::rounding::round;
use super::mfb::{disability_family_maximum, family_maximum, mfb_bend_points};
use super::{MethodContext, MethodOutcome, clause_ref, cola_start, raise_by_increases};

/// Average wage of 1977, the base the bend points are scaled from.
pub const BEND_POINT_BASE_WAGE: Decimal = Decimal::from_parts(977944, 0, 0, false, 2);

/// PIA bend points for 1979 eligibility.
pub const PIA_BASE_BEND_POINTS: [Decimal; 2] = [
    Decimal::from_parts(180, 0, 0, false, 0),
    Decimal::from_parts(1085, 0, 0, false, 0),
];

/// PIA formula percentages.
pub const PIA_PERCENTAGES: [Decimal; 3] = [
    Decimal::from_parts(90, 0, 0, false, 0),
    Decimal::from_parts(32, 0, 0, false, 0),
    Decimal::from_parts(15, 0, 0, false, 0),
];

/// First eligibility year of the wage-indexed formula.
pub const FIRST_ELIGIBILITY_YEAR: i32 = 1979;

/// First eligibility year subject to the windfall elimination provision.
pub const WEP_FIRST_ELIGIBILITY_YEAR: i32 = 1986;

/// Years of coverage at which the windfall elimination provision stops.
pub const WEP_FULL_YEARS: u32 = 30;

/// Last benefit year the windfall elimination provision applies to.
pub const WEP_LAST_BENEFIT_YEAR: i32 = 2023;

/// First percentage under the windfall elimination provision at 20 or
/// fewer years of coverage.
const WEP_FLOOR_PERCENT: u32 = 40;

/// Scales a 1979 bend point to an average wage, to the nearest dollar.
pub(crate) fn scale_bend_point(base: Decimal, wage: Decimal) -> Decimal {
    (base * wage / BEND_POINT_BASE_WAGE).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// PIA bend points for wages indexed to `index_year`.
pub fn bend_points(law: &LawParameters, index_year: i32) -> EngineResult<[Decimal; 2]> {
    let wage = law.average_wage(index_year)?;
    Ok(PIA_BASE_BEND_POINTS.map(|base| scale_bend_point(base, wage)))
}

/// Earnings indexed to `index_year`. Years from the index year on, and
/// years before 1951, are carried at face value.
pub fn indexed_earnings(
    earnings: &AnnualSeries<Decimal>,
    law: &LawParameters,
    index_year: i32,
) -> EngineResult<AnnualSeries<Decimal>> {
    let mut indexed = earnings.clone();
    let index_wage = law.average_wage(index_year)?;
    for (year, amount) in earnings.iter() {
        if amount <= Decimal::ZERO || year >= index_year || year < 1951 {
            continue;
        }
        let factor = index_wage / law.average_wage(year)?;
        indexed.set(
            year,
            (amount * factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )?;
    }
    Ok(indexed)
}

/// Average indexed monthly earnings: the `n` highest of `years`, divided
/// by 12n and truncated to the dollar.
pub fn aime(indexed: &AnnualSeries<Decimal>, years: &[i32], n: u32) -> (Decimal, Vec<i32>) {
    let (chosen, total) = highest_years(indexed, years, n);
    let months = Decimal::from(12 * n.max(1));
    ((total / months).floor(), chosen)
}

/// PIA from AIME, rounded for `year`.
///
/// `first_percent` is 90 except under the windfall elimination provision.
///
/// ```
/// use pia_engine::calculation::methods::pia_from_aime;
/// use rust_decimal::Decimal;
///
/// let bend_points = [Decimal::from(1174), Decimal::from(7078)];
/// // 90% of 1174 + 32% of 826 = 1056.60 + 264.32
/// let pia = pia_from_aime(Decimal::from(2000), &bend_points, Decimal::from(90), 2024);
/// assert_eq!(pia, Decimal::new(13209, 1));
/// ```
pub fn pia_from_aime(
    aime: Decimal,
    bend_points: &[Decimal; 2],
    first_percent: Decimal,
    year: i32,
) -> Decimal {
    let percentages = [first_percent, PIA_PERCENTAGES[1], PIA_PERCENTAGES[2]];
    let mut total = Decimal::ZERO;
    let mut lower = Decimal::ZERO;
    for (i, percent) in percentages.iter().enumerate() {
        let upper = bend_points.get(i).map_or(aime, |bp| (*bp).min(aime));
        if upper > lower {
            total += (upper - lower) * percent / Decimal::ONE_HUNDRED;
        }
        if let Some(bp) = bend_points.get(i) {
            lower = lower.max(*bp);
        }
    }
    round(total, year)
}

/// First percentage under the windfall elimination provision.
///
/// ```
/// use pia_engine::calculation::methods::wep_first_factor;
/// use rust_decimal::Decimal;
///
/// assert_eq!(wep_first_factor(30), Decimal::from(90));
/// assert_eq!(wep_first_factor(25), Decimal::from(65));
/// assert_eq!(wep_first_factor(12), Decimal::from(40));
/// ```
pub fn wep_first_factor(years_of_coverage: u32) -> Decimal {
    let short = WEP_FULL_YEARS.saturating_sub(years_of_coverage);
    Decimal::from(90u32.saturating_sub(5 * short).max(WEP_FLOOR_PERCENT))
}

/// Whether the windfall elimination provision reduces this worker's PIA.
pub fn wep_applies(ctx: &MethodContext<'_>) -> bool {
    ctx.worker.non_covered_pension > Decimal::ZERO
        && ctx.data.years_of_coverage.windfall < WEP_FULL_YEARS
        && ctx.eligibility_year() >= WEP_FIRST_ELIGIBILITY_YEAR
        && !ctx.worker.is_survivor()
        && ctx.benefit_date() <= MonthYear::december(WEP_LAST_BENEFIT_YEAR)
}

/// An indexed computation at eligibility.
#[derive(Debug, Clone)]
pub(crate) struct IndexedPia {
    pub aime: Decimal,
    pub years: Vec<i32>,
    pub index_year: i32,
    pub bend_points: [Decimal; 2],
    pub first_percent: Decimal,
    pub regular_pia: Decimal,
    pub pia: Decimal,
}

/// Indexes the worker's earnings to `index_year`, averages the highest
/// years and applies the formula with the bend points of `bend_point_year`.
pub(crate) fn compute_indexed(
    ctx: &MethodContext<'_>,
    index_year: i32,
    bend_point_year: i32,
    rounding_year: i32,
    with_wep: bool,
) -> EngineResult<IndexedPia> {
    let data = ctx.data;
    let indexed = indexed_earnings(&data.earnings, ctx.law, index_year)?;
    let years = candidate_years(&data.new_start, &data.freeze, data.last_earnings_year);
    let (aime, chosen) = aime(&indexed, &years, data.new_start.computation_years);

    let bend_points = bend_points(ctx.law, bend_point_year)?;
    let regular_pia = pia_from_aime(aime, &bend_points, PIA_PERCENTAGES[0], rounding_year);

    let (first_percent, pia) = if with_wep {
        let first = wep_first_factor(data.years_of_coverage.windfall);
        let reduced = pia_from_aime(aime, &bend_points, first, rounding_year);
        // the reduction never exceeds half the non-covered pension
        let limited = round(
            regular_pia - ctx.worker.non_covered_pension / Decimal::TWO,
            rounding_year,
        );
        (first, reduced.max(limited))
    } else {
        (PIA_PERCENTAGES[0], regular_pia)
    };

    Ok(IndexedPia {
        aime,
        years: chosen,
        index_year,
        bend_points,
        first_percent,
        regular_pia,
        pia,
    })
}

/// The wage-indexed PIA at eligibility when the windfall elimination
/// provision applies; it caps the old-start PIA.
pub(crate) fn wep_cap(ctx: &MethodContext<'_>) -> EngineResult<Option<Decimal>> {
    if !is_applicable(ctx) || !wep_applies(ctx) {
        return Ok(None);
    }
    let ey = ctx.eligibility_year();
    Ok(Some(compute_indexed(ctx, ey - 2, ey - 2, ey, true)?.pia))
}

pub(super) fn is_applicable(ctx: &MethodContext<'_>) -> bool {
    ctx.eligibility_year() >= FIRST_ELIGIBILITY_YEAR
}

pub(super) fn calculate(ctx: &MethodContext<'_>, step_number: u32) -> EngineResult<MethodOutcome> {
    let ey = ctx.eligibility_year();
    let index_year = ey - 2;
    let wep = wep_applies(ctx);
    let computed = compute_indexed(ctx, index_year, index_year, ey, wep)?;

    let mfb_at_eligibility = if ctx.worker.is_disability() {
        disability_family_maximum(computed.aime, computed.pia, ey)
    } else {
        family_maximum(computed.pia, &mfb_bend_points(ctx.law, index_year)?, ey)
    };

    let after = cola_start(ey);
    let pia = raise_by_increases(ctx.law, computed.pia, after, ctx.benefit_date());
    let mfb = raise_by_increases(ctx.law, mfb_at_eligibility, after, ctx.benefit_date());

    let result = MethodResult {
        method: MethodKind::WageIndexed,
        applicable: true,
        pia: pia.amount,
        mfb: mfb.amount,
        pia_at_eligibility: computed.pia,
        mfb_at_eligibility,
        member_id: None,
        provenance: Provenance {
            average_earnings: Some(computed.aime),
            base_year: Some(ctx.data.new_start.base_year),
            computation_years: Some(ctx.data.new_start.computation_years),
            index_year: Some(index_year),
            bend_points: computed.bend_points.to_vec(),
            percentages: vec![computed.first_percent, PIA_PERCENTAGES[1], PIA_PERCENTAGES[2]],
            table_effective: None,
            years_of_coverage: wep.then_some(ctx.data.years_of_coverage.windfall),
            increases_applied: pia.applied,
        },
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "wage_indexed".to_string(),
        rule_name: "Wage-Indexed PIA".to_string(),
        clause_ref: clause_ref(MethodKind::WageIndexed).to_string(),
        input: serde_json::json!({
            "eligibility_year": ey,
            "index_year": index_year,
            "computation_years": computed.years,
            "windfall_elimination": wep,
            "non_covered_pension": ctx.worker.non_covered_pension.to_string(),
        }),
        output: serde_json::json!({
            "aime": computed.aime.to_string(),
            "bend_points": computed.bend_points.iter().map(|bp| bp.to_string()).collect::<Vec<_>>(),
            "regular_pia": computed.regular_pia.to_string(),
            "pia_at_eligibility": computed.pia.to_string(),
            "mfb_at_eligibility": mfb_at_eligibility.to_string(),
            "pia": result.pia.to_string(),
            "mfb": result.mfb.to_string(),
        }),
        reasoning: format!(
            "AIME ${} over {} years indexed to {}; {}/32/15% across ${} and ${} gives PIA ${} at eligibility, ${} after {} increase(s)",
            computed.aime,
            computed.years.len(),
            index_year,
            computed.first_percent,
            computed.bend_points[0],
            computed.bend_points[1],
            computed.pia,
            result.pia,
            result.provenance.increases_applied.len()
        ),
    };

    Ok(MethodOutcome { result, audit_step })
}
