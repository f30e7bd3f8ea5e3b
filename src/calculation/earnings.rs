//! Earnings series and years of coverage.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::config::{EngineConfig, FIRST_COVERED_YEAR, LawParameters};
use crate::error::EngineResult;
use crate::models::{AnnualSeries, AuditStep, WorkerRecord, YearsOfCoverage};

/// Earnings for one pre-1951 year of coverage in the special minimum count.
pub const PRE_1951_YOC_DIVISOR: Decimal = Decimal::from_parts(900, 0, 0, false, 0);

/// Maximum years of coverage creditable for 1937-1950.
pub const MAX_PRE_1951_YOC: u32 = 14;

/// Last year the special minimum uses the 25% wage-base test.
pub const SPECIAL_MINIMUM_WAGE_BASE_TEST_LAST_YEAR: i32 = 1978;

/// Last year the special minimum uses 25% of the old-law base.
pub const SPECIAL_MINIMUM_OLD_LAW_25_LAST_YEAR: i32 = 1990;

/// Lump-sum earnings divided evenly over 1937 through the cutoff year.
pub fn lump_sum_share(worker: &WorkerRecord, config: &EngineConfig) -> Decimal {
    let years = config.qc_lump_sum_cutoff_year - FIRST_COVERED_YEAR + 1;
    if worker.lump_sum_earnings <= Decimal::ZERO || years <= 0 {
        return Decimal::ZERO;
    }
    worker.lump_sum_earnings / Decimal::from(years)
}

/// Reported earnings for `year` plus its share of any lump sum.
pub fn raw_earnings(worker: &WorkerRecord, config: &EngineConfig, year: i32) -> Decimal {
    let mut amount = worker.earnings_for(year);
    if (FIRST_COVERED_YEAR..=config.qc_lump_sum_cutoff_year).contains(&year) {
        amount += lump_sum_share(worker, config);
    }
    amount
}

/// The result of building the earnings series, including the audit step.
#[derive(Debug, Clone)]
pub struct EarningsSeriesResult {
    /// Earnings by year, 1937 through the last usable year.
    pub earnings: AnnualSeries<Decimal>,
    /// The audit step recording the capping.
    pub audit_step: AuditStep,
}

/// Builds the earnings series used by every method: 1937 through
/// `last_year`, each year capped at that year's contribution and benefit
/// base, lump-sum earnings spread over 1937 through the cutoff year.
///
/// Freeze years are not removed here; the computation period does that.
pub fn build_earnings_series(
    worker: &WorkerRecord,
    law: &LawParameters,
    config: &EngineConfig,
    last_year: i32,
    step_number: u32,
) -> EngineResult<EarningsSeriesResult> {
    let mut earnings = AnnualSeries::new(FIRST_COVERED_YEAR, last_year);
    let mut capped_years = Vec::new();

    for year in FIRST_COVERED_YEAR..=last_year {
        let amount = raw_earnings(worker, config, year);
        if amount <= Decimal::ZERO {
            continue;
        }
        let base = law.wage_base(year)?;
        if amount > base {
            capped_years.push(year);
        }
        earnings.set(year, amount.min(base))?;
    }

    let total = earnings.accumulate(FIRST_COVERED_YEAR, last_year, Decimal::ZERO);
    let audit_step = AuditStep {
        step_number,
        rule_id: "earnings_series".to_string(),
        rule_name: "Creditable Earnings".to_string(),
        clause_ref: "215(e)".to_string(),
        input: serde_json::json!({
            "reported_years": worker.earnings.len(),
            "lump_sum_earnings": worker.lump_sum_earnings.to_string(),
            "last_year": last_year,
        }),
        output: serde_json::json!({
            "total": total.to_string(),
            "capped_years": capped_years,
        }),
        reasoning: format!(
            "Earnings 1937-{} total ${}; {} year(s) limited to the contribution and benefit base",
            last_year,
            total,
            capped_years.len()
        ),
    };

    Ok(EarningsSeriesResult {
        earnings,
        audit_step,
    })
}

/// Earnings needed in `year` for a special minimum year of coverage.
pub fn special_minimum_threshold(law: &LawParameters, year: i32) -> EngineResult<Decimal> {
    if year <= SPECIAL_MINIMUM_WAGE_BASE_TEST_LAST_YEAR {
        Ok(law.wage_base(year)? / Decimal::from(4))
    } else if year <= SPECIAL_MINIMUM_OLD_LAW_25_LAST_YEAR {
        law.substantial_earnings(year)
    } else {
        // 15% rather than 25% of the old-law base
        Ok(law.substantial_earnings(year)? * Decimal::from(3) / Decimal::from(5))
    }
}

/// Counts years of coverage for the special minimum and the windfall
/// elimination provision through `last_year`.
///
/// Years before 1951 are credited as total earnings divided by $900, at
/// most 14.
pub fn years_of_coverage(
    worker: &WorkerRecord,
    law: &LawParameters,
    config: &EngineConfig,
    last_year: i32,
) -> EngineResult<YearsOfCoverage> {
    let pre_1951_total: Decimal = (FIRST_COVERED_YEAR..=1950)
        .map(|year| raw_earnings(worker, config, year))
        .sum();
    let pre_1951 = (pre_1951_total / PRE_1951_YOC_DIVISOR)
        .floor()
        .to_u32()
        .unwrap_or(0)
        .min(MAX_PRE_1951_YOC);

    let mut special_minimum = pre_1951;
    let mut windfall = pre_1951;
    let later = worker
        .earnings
        .range(1951..)
        .take_while(|(year, _)| **year <= last_year);
    for (&year, &amount) in later {
        if amount <= Decimal::ZERO {
            continue;
        }
        if amount >= special_minimum_threshold(law, year)? {
            special_minimum += 1;
        }
        if amount >= law.substantial_earnings(year)? {
            windfall += 1;
        }
    }

    Ok(YearsOfCoverage {
        pre_1951,
        special_minimum,
        windfall,
    })
}
