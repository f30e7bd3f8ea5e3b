//! Quarters of coverage.
//!
//! Reported quarters are used as given. Otherwise quarters are derived
//! from earnings by era:
//!
//! | Years            | Rule                                                   |
//! |------------------|--------------------------------------------------------|
//! | through cutoff   | total earnings / $400, credited from 1937 onward        |
//! | cutoff+1 - 1977  | $50 per quarter; 4 when earnings reach the wage base    |
//! | 1978 onward      | earnings / annual quarter-of-coverage amount           |
//!
//! Railroad and military quarters are then merged in, at most 4 per year.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::config::{EngineConfig, FIRST_COVERED_YEAR, LawParameters};
use crate::error::EngineResult;
use crate::models::{AuditStep, MAX_QC_PER_YEAR, QcSeries, WorkerRecord};

use super::earnings::raw_earnings;

/// Earnings per quarter of coverage for years through the lump-sum cutoff.
pub const LUMP_SUM_QC_AMOUNT: Decimal = Decimal::from_parts(400, 0, 0, false, 0);

/// Earnings per quarter of coverage before annual amounts were set.
pub const QUARTERLY_WAGE_QC_AMOUNT: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// First year quarters are earned by annual earnings amount.
pub const ANNUAL_QC_FIRST_YEAR: i32 = 1978;

/// The result of deriving quarters of coverage, including the audit step.
#[derive(Debug, Clone)]
pub struct QuartersResult {
    /// Quarters of coverage by year.
    pub quarters: QcSeries,
    /// Total quarters over the series.
    pub total: u32,
    /// The audit step recording the derivation.
    pub audit_step: AuditStep,
}

fn whole_quarters(amount: Decimal, per_quarter: Decimal) -> u32 {
    if per_quarter <= Decimal::ZERO {
        return 0;
    }
    (amount / per_quarter).floor().to_u32().unwrap_or(u32::MAX)
}

fn capped(quarters: u32) -> u8 {
    quarters.min(u32::from(MAX_QC_PER_YEAR)) as u8
}

/// Quarters derived from earnings for one year after the cutoff.
pub fn quarters_from_earnings(
    law: &LawParameters,
    year: i32,
    amount: Decimal,
) -> EngineResult<u8> {
    if amount <= Decimal::ZERO {
        return Ok(0);
    }
    if year < ANNUAL_QC_FIRST_YEAR {
        if amount >= law.wage_base(year)? {
            return Ok(MAX_QC_PER_YEAR);
        }
        return Ok(capped(whole_quarters(amount, QUARTERLY_WAGE_QC_AMOUNT)));
    }
    Ok(capped(whole_quarters(amount, law.qc_amount(year)?)))
}

fn merge(series: &mut QcSeries, extra: &BTreeMap<i32, u8>) -> EngineResult<()> {
    for (&year, &quarters) in extra {
        if series.first_year() <= year && year <= series.last_year() {
            series.credit(year, quarters)?;
        }
    }
    Ok(())
}

/// Derives quarters of coverage 1937 through `last_year`.
pub fn derive_quarters(
    worker: &WorkerRecord,
    law: &LawParameters,
    config: &EngineConfig,
    last_year: i32,
    step_number: u32,
) -> EngineResult<QuartersResult> {
    let cutoff = config.qc_lump_sum_cutoff_year;
    let mut quarters = QcSeries::new(FIRST_COVERED_YEAR, last_year);

    let reported = worker
        .quarters_of_coverage
        .range(FIRST_COVERED_YEAR..)
        .take_while(|(year, _)| **year <= last_year);
    for (&year, &count) in reported {
        quarters.set(year, count)?;
    }

    // Through the cutoff year, quarters come from the total, four a year
    // from 1937 onward.
    let lump_years: Vec<i32> = (FIRST_COVERED_YEAR..=cutoff.min(last_year))
        .filter(|year| !worker.quarters_of_coverage.contains_key(year))
        .collect();
    let lump_total: Decimal = lump_years
        .iter()
        .map(|&year| raw_earnings(worker, config, year))
        .sum();
    let mut lump_quarters = whole_quarters(lump_total, LUMP_SUM_QC_AMOUNT);
    for &year in &lump_years {
        if lump_quarters == 0 {
            break;
        }
        let count = capped(lump_quarters);
        quarters.set(year, count)?;
        lump_quarters -= u32::from(count);
    }

    for year in (cutoff + 1).max(FIRST_COVERED_YEAR)..=last_year {
        if worker.quarters_of_coverage.contains_key(&year) {
            continue;
        }
        let count = quarters_from_earnings(law, year, worker.earnings_for(year))?;
        if count > 0 {
            quarters.set(year, count)?;
        }
    }

    merge(&mut quarters, &worker.railroad_quarters)?;
    merge(&mut quarters, &worker.military_quarters)?;

    let total = quarters.total();
    let audit_step = AuditStep {
        step_number,
        rule_id: "quarters_of_coverage".to_string(),
        rule_name: "Quarters of Coverage".to_string(),
        clause_ref: "213".to_string(),
        input: serde_json::json!({
            "reported_years": worker.quarters_of_coverage.len(),
            "railroad_years": worker.railroad_quarters.len(),
            "military_years": worker.military_quarters.len(),
            "lump_sum_cutoff_year": cutoff,
            "last_year": last_year,
        }),
        output: serde_json::json!({
            "total": total,
        }),
        reasoning: format!(
            "{} quarters of coverage 1937-{} ({} year(s) reported, the rest derived from earnings)",
            total,
            last_year,
            worker.quarters_of_coverage.len()
        ),
    };

    Ok(QuartersResult {
        quarters,
        total,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures;
    use crate::error::ErrorCode;
    use crate::models::{BenefitType, MonthYear};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn worker() -> WorkerRecord {
        WorkerRecord::new(
            "w",
            NaiveDate::from_ymd_opt(1930, 6, 15).unwrap(),
            BenefitType::OldAge,
            MonthYear::new(1995, 6).unwrap(),
        )
    }

    fn derive(worker: &WorkerRecord) -> QuartersResult {
        derive_quarters(worker, fixtures::law(), &EngineConfig::default(), 2000, 1).unwrap()
    }

    /// QC-001: annual amounts from 1978
    #[test]
    fn test_qc_001_annual_amount_division() {
        // 1978 amount is $250
        assert_eq!(quarters_from_earnings(fixtures::law(), 1978, dec("760")).unwrap(), 3);
        assert_eq!(quarters_from_earnings(fixtures::law(), 1978, dec("5000")).unwrap(), 4);
        assert_eq!(quarters_from_earnings(fixtures::law(), 1978, dec("249.99")).unwrap(), 0);
    }

    /// QC-002: $50 per quarter before 1978, 4 at the wage base
    #[test]
    fn test_qc_002_quarterly_wage_era() {
        assert_eq!(quarters_from_earnings(fixtures::law(), 1960, dec("120")).unwrap(), 2);
        assert_eq!(quarters_from_earnings(fixtures::law(), 1960, dec("4800")).unwrap(), 4);
        assert_eq!(quarters_from_earnings(fixtures::law(), 1960, Decimal::ZERO).unwrap(), 0);
    }

    /// QC-003: lump-sum quarters fill from 1937
    #[test]
    fn test_qc_003_lump_sum_quarters() {
        let mut worker = worker();
        worker.lump_sum_earnings = dec("4000");
        let result = derive(&worker);
        // $4,000 / $400 = 10 quarters: 4 in 1937, 4 in 1938, 2 in 1939
        assert_eq!(result.quarters.get(1937), 4);
        assert_eq!(result.quarters.get(1938), 4);
        assert_eq!(result.quarters.get(1939), 2);
        assert_eq!(result.quarters.get(1940), 0);
        assert_eq!(result.total, 10);
    }

    /// QC-004: reported quarters override derivation
    #[test]
    fn test_qc_004_reported_quarters_win() {
        let mut worker = worker();
        worker.earnings.insert(1990, dec("50000"));
        worker.quarters_of_coverage.insert(1990, 2);
        let result = derive(&worker);
        assert_eq!(result.quarters.get(1990), 2);
    }

    /// QC-005: railroad and military quarters merge up to 4
    #[test]
    fn test_qc_005_merge_caps_at_four() {
        let mut worker = worker();
        worker.quarters_of_coverage.insert(1985, 3);
        worker.railroad_quarters.insert(1985, 2);
        worker.military_quarters.insert(1986, 1);
        let result = derive(&worker);
        assert_eq!(result.quarters.get(1985), 4);
        assert_eq!(result.quarters.get(1986), 1);
    }

    #[test]
    fn test_reported_five_quarters_rejected() {
        let mut worker = worker();
        worker.quarters_of_coverage.insert(1985, 5);
        let err = derive_quarters(&worker, fixtures::law(), &EngineConfig::default(), 2000, 1)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::QuartersOutOfRange);
    }

    #[test]
    fn test_reported_quarters_before_last_year_only() {
        let mut worker = worker();
        worker.quarters_of_coverage.insert(1940, 4);
        worker.quarters_of_coverage.insert(1960, 4);
        let result =
            derive_quarters(&worker, fixtures::law(), &EngineConfig::default(), 1945, 1).unwrap();
        assert_eq!(result.quarters.get(1940), 4);
        assert_eq!(result.quarters.get(1960), 0);
        assert_eq!(result.total, 4);
    }
}
