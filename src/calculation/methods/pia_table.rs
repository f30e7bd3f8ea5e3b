//! The benefit table method for eligibility before 1979, and the table
//! machinery shared with the old-start and transitional computations.
//!
//! Historical tables are held as the bracket formulas that generate them.
//! The vintage in force in the table month gives the PIA and MFB, general
//! increases carry it forward to the table month, and later increases to
//! the benefit date.

use rust_decimal::Decimal;

use crate::config::{PiaTableVintage, apply_brackets};
use crate::error::EngineResult;
use crate::models::{
    AnnualSeries, AuditStep, ComputationPeriod, FreezeYears, MethodKind, MethodResult, MonthYear,
    Provenance,
};

use super::super::computation_period::{candidate_years, highest_years};
use super::super::rounding::round;
use super::{MethodContext, MethodOutcome, clause_ref, cola_start, raise_by_increases};

/// Last month a benefit table was in force.
pub const LAST_TABLE_YEAR: i32 = 1978;

/// Average monthly wage: the `n` highest years of `earnings` among the
/// period's candidate years through `last_year`, over 12n, truncated.
pub(crate) fn average_monthly_wage(
    earnings: &AnnualSeries<Decimal>,
    period: &ComputationPeriod,
    freeze: &FreezeYears,
    last_year: i32,
    n: u32,
) -> (Decimal, Vec<i32>) {
    let years = candidate_years(period, freeze, last_year);
    let (chosen, total) = highest_years(earnings, &years, n);
    ((total / Decimal::from(12 * n.max(1))).floor(), chosen)
}

/// Amounts from a benefit table.
#[derive(Debug, Clone)]
pub(crate) struct TableAmounts {
    pub table_effective: MonthYear,
    pub table_pia: Decimal,
    pub pia_at_eligibility: Decimal,
    pub mfb_at_eligibility: Decimal,
    pub pia: Decimal,
    pub mfb: Decimal,
    pub applied: Vec<MonthYear>,
}

/// The month whose table governs, and the month after which later
/// increases apply.
pub(crate) fn table_months(ctx: &MethodContext<'_>) -> (MonthYear, MonthYear) {
    let table_month = ctx
        .worker
        .entitlement_date
        .min(MonthYear::december(LAST_TABLE_YEAR));
    let cola_after = if ctx.eligibility_year() > LAST_TABLE_YEAR {
        cola_start(ctx.eligibility_year())
    } else {
        table_month
    };
    (table_month, cola_after)
}

/// Runs a table computation: `raw` reads the vintage, `cap` limits the PIA
/// before the family maximum and later increases.
pub(crate) fn table_amounts(
    ctx: &MethodContext<'_>,
    table_month: MonthYear,
    cola_after: MonthYear,
    cap: Option<Decimal>,
    raw: impl Fn(&PiaTableVintage) -> Decimal,
) -> EngineResult<TableAmounts> {
    let vintage = ctx.law.pia_table(table_month)?;
    let table_pia = round(vintage.minimum_pia.max(raw(vintage)), vintage.effective.year());

    let to_table = raise_by_increases(ctx.law, table_pia, vintage.effective, table_month);
    let pia_at_eligibility = cap.map_or(to_table.amount, |c| to_table.amount.min(c));
    let mfb_at_eligibility = round(
        apply_brackets(&vintage.mfb_brackets, pia_at_eligibility),
        table_month.year(),
    )
    .max(pia_at_eligibility);

    let pia = raise_by_increases(ctx.law, pia_at_eligibility, cola_after, ctx.benefit_date());
    let mfb = raise_by_increases(ctx.law, mfb_at_eligibility, cola_after, ctx.benefit_date());

    let mut applied = to_table.applied;
    applied.extend(pia.applied);

    Ok(TableAmounts {
        table_effective: vintage.effective,
        table_pia,
        pia_at_eligibility,
        mfb_at_eligibility,
        pia: pia.amount,
        mfb: mfb.amount,
        applied,
    })
}

pub(super) fn is_applicable(ctx: &MethodContext<'_>) -> bool {
    ctx.eligibility_year() <= LAST_TABLE_YEAR
}

pub(super) fn calculate(ctx: &MethodContext<'_>, step_number: u32) -> EngineResult<MethodOutcome> {
    let data = ctx.data;
    let n = data.new_start.computation_years;
    let (amw, years) = average_monthly_wage(
        &data.earnings,
        &data.new_start,
        &data.freeze,
        data.last_earnings_year,
        n,
    );

    let (table_month, cola_after) = table_months(ctx);
    let amounts = table_amounts(ctx, table_month, cola_after, None, |v| {
        apply_brackets(&v.amw_brackets, amw)
    })?;

    let result = MethodResult {
        method: MethodKind::PiaTable,
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
        rule_id: "pia_table".to_string(),
        rule_name: "Benefit Table PIA".to_string(),
        clause_ref: clause_ref(MethodKind::PiaTable).to_string(),
        input: serde_json::json!({
            "computation_years": years,
            "table_month": table_month.to_string(),
        }),
        output: serde_json::json!({
            "amw": amw.to_string(),
            "table_effective": amounts.table_effective.to_string(),
            "table_pia": amounts.table_pia.to_string(),
            "pia": result.pia.to_string(),
            "mfb": result.mfb.to_string(),
        }),
        reasoning: format!(
            "AMW ${} over {} years; table of {} gives ${}, ${} after {} increase(s)",
            amw,
            n,
            amounts.table_effective,
            amounts.table_pia,
            result.pia,
            amounts.applied.len()
        ),
    };

    Ok(MethodOutcome { result, audit_step })
}
