//! The old-start computation for workers with earnings before 1951.
//!
//! Earnings from 1937 are averaged over the 1936-based period into an
//! average monthly wage, converted to a 1939-act primary insurance benefit
//! and read through the benefit table's conversion brackets.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::apply_brackets;
use crate::error::EngineResult;
use crate::models::{AuditStep, MethodKind, MethodResult, Provenance};

use super::pia_table::{average_monthly_wage, table_amounts, table_months};
use super::wage_indexed::wep_cap;
use super::{MethodContext, MethodOutcome, clause_ref};

/// Earnings in a year before 1951 that earn a 1% increment.
pub const INCREMENT_YEAR_EARNINGS: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

const FIRST_BRACKET: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
const SECOND_BRACKET: Decimal = Decimal::from_parts(200, 0, 0, false, 0);
const FIRST_RATE: Decimal = Decimal::from_parts(40, 0, 0, false, 2);
const SECOND_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);
const INCREMENT_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Last year whose earnings count toward increment years.
const LAST_INCREMENT_YEAR: i32 = 1950;

/// 1939-act primary insurance benefit: 40% of the first $50 of AMW plus
/// 10% of the next $200, raised 1% for each increment year.
///
/// ```
/// use pia_engine::calculation::methods::primary_insurance_benefit;
/// use rust_decimal::Decimal;
///
/// // (20 + 10) * 1.05
/// let pib = primary_insurance_benefit(Decimal::from(150), 5);
/// assert_eq!(pib, Decimal::new(3150, 2));
/// ```
pub fn primary_insurance_benefit(amw: Decimal, increment_years: u32) -> Decimal {
    let first = amw.min(FIRST_BRACKET) * FIRST_RATE;
    let second = (amw - FIRST_BRACKET).clamp(Decimal::ZERO, SECOND_BRACKET) * SECOND_RATE;
    let increment = Decimal::ONE + INCREMENT_RATE * Decimal::from(increment_years);
    ((first + second) * increment).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub(super) fn is_applicable(ctx: &MethodContext<'_>) -> bool {
    ctx.worker.has_pre_1951_earnings()
}

pub(super) fn calculate(ctx: &MethodContext<'_>, step_number: u32) -> EngineResult<MethodOutcome> {
    let data = ctx.data;
    let n = data.old_start.computation_years;
    let (amw, years) = average_monthly_wage(
        &data.earnings,
        &data.old_start,
        &data.freeze,
        data.last_earnings_year,
        n,
    );

    let increment_years = data
        .earnings
        .iter()
        .filter(|(year, amount)| *year <= LAST_INCREMENT_YEAR && *amount >= INCREMENT_YEAR_EARNINGS)
        .count() as u32;
    let pib = primary_insurance_benefit(amw, increment_years);

    let cap = wep_cap(ctx)?;
    let (table_month, cola_after) = table_months(ctx);
    let amounts = table_amounts(ctx, table_month, cola_after, cap, |v| {
        apply_brackets(&v.pib_brackets, pib)
    })?;

    let result = MethodResult {
        method: MethodKind::OldStart,
        applicable: true,
        pia: amounts.pia,
        mfb: amounts.mfb,
        pia_at_eligibility: amounts.pia_at_eligibility,
        mfb_at_eligibility: amounts.mfb_at_eligibility,
        member_id: None,
        provenance: Provenance {
            average_earnings: Some(amw),
            base_year: Some(data.old_start.base_year),
            computation_years: Some(n),
            table_effective: Some(amounts.table_effective),
            increases_applied: amounts.applied.clone(),
            ..Provenance::default()
        },
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "old_start".to_string(),
        rule_name: "Old-Start PIA".to_string(),
        clause_ref: clause_ref(MethodKind::OldStart).to_string(),
        input: serde_json::json!({
            "computation_years": years,
            "increment_years": increment_years,
            "table_month": table_month.to_string(),
            "windfall_cap": cap.map(|c| c.to_string()),
        }),
        output: serde_json::json!({
            "amw": amw.to_string(),
            "pib": pib.to_string(),
            "table_effective": amounts.table_effective.to_string(),
            "table_pia": amounts.table_pia.to_string(),
            "pia": result.pia.to_string(),
            "mfb": result.mfb.to_string(),
        }),
        reasoning: format!(
            "AMW ${} since 1937 over {} years; primary benefit ${} with {} increment year(s) converts to ${} under the table of {}",
            amw, n, pib, increment_years, amounts.table_pia, amounts.table_effective
        ),
    };

    Ok(MethodOutcome { result, audit_step })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::pia_data::build_pia_data;
    use crate::config::{EngineConfig, fixtures};
    use crate::models::{BenefitType, MonthYear, WorkerRecord};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn worker() -> WorkerRecord {
        let mut worker = WorkerRecord::new(
            "w",
            NaiveDate::from_ymd_opt(1912, 5, 10).unwrap(),
            BenefitType::OldAge,
            MonthYear::new(1974, 6).unwrap(),
        );
        for year in 1937..=1973 {
            worker.earnings.insert(year, dec("3000"));
        }
        worker
    }

    #[test]
    fn test_primary_insurance_benefit_caps_at_250() {
        // 20 + 20, no increments
        assert_eq!(primary_insurance_benefit(dec("400"), 0), dec("40.00"));
        assert_eq!(primary_insurance_benefit(dec("30"), 0), dec("12.00"));
    }

    /// OS-001: earnings since 1937 through the 1972 table
    #[test]
    fn test_os_001_old_start_computation() {
        let worker = worker();
        let data = build_pia_data(&worker, fixtures::law(), &EngineConfig::default(), 1)
            .unwrap()
            .data;
        let ctx = MethodContext::new(&worker, &data, fixtures::law());
        assert!(is_applicable(&ctx));

        let outcome = calculate(&ctx, 4).unwrap();
        // 1937..=1973 is 37 elapsed years, 32 computation years
        assert_eq!(outcome.result.provenance.computation_years, Some(32));
        assert_eq!(outcome.result.provenance.average_earnings, Some(dec("250")));
        // 40 * 1.14
        assert_eq!(outcome.audit_step.output["pib"], "45.60");
        // 626.85% of 13.48 + 400% of 32.12 = 212.979...
        assert_eq!(outcome.audit_step.output["table_pia"], "213.0");
        assert_eq!(outcome.audit_step.input["windfall_cap"], serde_json::Value::Null);
    }

    #[test]
    fn test_not_applicable_without_early_earnings() {
        let mut worker = worker();
        worker.earnings.retain(|&year, _| year >= 1951);
        let data = build_pia_data(&worker, fixtures::law(), &EngineConfig::default(), 1)
            .unwrap()
            .data;
        assert!(!is_applicable(&MethodContext::new(&worker, &data, fixtures::law())));
    }
}
