//! Input validation.
//!
//! One pass over the worker record before any calculation. Range checks
//! run only at [`ValidationLevel::Strict`]; sequencing checks always run,
//! since every later step assumes the dates are in order.

use chrono::Datelike;
use rust_decimal::Decimal;

use crate::config::{EngineConfig, FIRST_COVERED_YEAR, ValidationLevel};
use crate::error::{EngineError, EngineResult, ErrorCode};
use crate::models::{
    BenefitType, MAX_DISABILITY_PERIODS, MAX_QC_PER_YEAR, MonthYear, WorkerRecord,
};

/// Earliest supported birth year.
pub const MIN_BIRTH_YEAR: i32 = 1800;

/// Earliest supported entitlement or benefit year.
pub const MIN_ENTITLEMENT_YEAR: i32 = 1940;

/// Validates `worker` at the level set in `config`.
///
/// # Errors
///
/// Returns the first range or sequencing error found.
pub fn validate_worker(worker: &WorkerRecord, config: &EngineConfig) -> EngineResult<()> {
    if config.validation == ValidationLevel::Strict {
        check_ranges(worker, config)?;
    }
    check_sequence(worker)?;
    check_family(worker)
}

fn out_of_range(code: ErrorCode, field: &str, message: String) -> EngineError {
    EngineError::out_of_range(code, field, message)
}

fn check_year(
    year: i32,
    min: i32,
    config: &EngineConfig,
    code: ErrorCode,
    field: &str,
) -> EngineResult<()> {
    if !(min..=config.max_year).contains(&year) {
        return Err(out_of_range(
            code,
            field,
            format!("year {} is outside {}..={}", year, min, config.max_year),
        ));
    }
    Ok(())
}

fn check_amount(amount: Decimal, code: ErrorCode, field: &str) -> EngineResult<()> {
    if amount < Decimal::ZERO {
        return Err(out_of_range(code, field, format!("{} is negative", amount)));
    }
    Ok(())
}

fn check_ranges(worker: &WorkerRecord, config: &EngineConfig) -> EngineResult<()> {
    check_year(
        worker.birth_date.year(),
        MIN_BIRTH_YEAR,
        config,
        ErrorCode::BirthDateOutOfRange,
        "birth_date",
    )?;
    check_year(
        worker.entitlement_date.year(),
        MIN_ENTITLEMENT_YEAR,
        config,
        ErrorCode::EntitlementYearOutOfRange,
        "entitlement_date",
    )?;
    check_year(
        worker.benefit_date().year(),
        MIN_ENTITLEMENT_YEAR,
        config,
        ErrorCode::BenefitYearOutOfRange,
        "benefit_date",
    )?;

    for (&year, &amount) in &worker.earnings {
        check_year(
            year,
            FIRST_COVERED_YEAR,
            config,
            ErrorCode::EarningsYearOutOfRange,
            "earnings",
        )?;
        check_amount(amount, ErrorCode::NegativeEarnings, "earnings")?;
    }
    check_amount(
        worker.lump_sum_earnings,
        ErrorCode::NegativeEarnings,
        "lump_sum_earnings",
    )?;

    for (field, quarters) in [
        ("quarters_of_coverage", &worker.quarters_of_coverage),
        ("railroad_quarters", &worker.railroad_quarters),
        ("military_quarters", &worker.military_quarters),
    ] {
        for (&year, &count) in quarters {
            check_year(year, FIRST_COVERED_YEAR, config, ErrorCode::YearOutOfRange, field)?;
            if count > MAX_QC_PER_YEAR {
                return Err(out_of_range(
                    ErrorCode::QuartersOutOfRange,
                    field,
                    format!("{} quarters for {} exceeds {}", count, year, MAX_QC_PER_YEAR),
                ));
            }
        }
    }

    let periods = worker.disability_periods.len();
    let min_periods = usize::from(worker.is_disability());
    if !(min_periods..=MAX_DISABILITY_PERIODS).contains(&periods) {
        return Err(out_of_range(
            ErrorCode::DisabilityPeriodCountOutOfRange,
            "disability_periods",
            format!(
                "{} period(s) given; {}..={} allowed",
                periods, min_periods, MAX_DISABILITY_PERIODS
            ),
        ));
    }

    check_amount(
        worker.non_covered_pension,
        ErrorCode::NegativeAmount,
        "non_covered_pension",
    )?;
    for period in &worker.disability_periods {
        check_amount(period.pia, ErrorCode::NegativeAmount, "disability_periods.pia")?;
        check_amount(period.mfb, ErrorCode::NegativeAmount, "disability_periods.mfb")?;
    }

    if worker.benefit_type == BenefitType::OldAge {
        let age_62 = worker.attainment_month(62);
        if worker.entitlement_date < age_62 {
            return Err(out_of_range(
                ErrorCode::EntitlementYearOutOfRange,
                "entitlement_date",
                format!(
                    "old-age entitlement {} precedes age 62 in {}",
                    worker.entitlement_date, age_62
                ),
            ));
        }
    }
    Ok(())
}

fn sequencing(code: ErrorCode, field: &str, message: String) -> EngineError {
    EngineError::sequencing(code, field, message)
}

fn check_sequence(worker: &WorkerRecord) -> EngineResult<()> {
    let birth_month = MonthYear::from_date(worker.birth_date);

    if worker.is_survivor() && worker.death_date.is_none() {
        return Err(sequencing(
            ErrorCode::MissingRequiredDate,
            "death_date",
            "a survivor case needs a date of death".to_string(),
        ));
    }
    if worker.is_disability() && worker.current_disability().is_none() {
        return Err(sequencing(
            ErrorCode::MissingRequiredDate,
            "disability_periods",
            "a disability case needs a current disability period".to_string(),
        ));
    }

    if let Some(death) = worker.death_date {
        if death < worker.birth_date {
            return Err(sequencing(
                ErrorCode::DeathOutOfSequence,
                "death_date",
                format!("death {} precedes birth {}", death, worker.birth_date),
            ));
        }
        let death_month = MonthYear::from_date(death);
        if worker.is_survivor() && worker.entitlement_date < death_month {
            return Err(sequencing(
                ErrorCode::DeathOutOfSequence,
                "entitlement_date",
                format!(
                    "survivor entitlement {} precedes death in {}",
                    worker.entitlement_date, death_month
                ),
            ));
        }
        if !worker.is_survivor() && death_month <= worker.benefit_date() {
            return Err(sequencing(
                ErrorCode::DeathOutOfSequence,
                "death_date",
                format!(
                    "death in {} is not after the benefit date {} of a life case",
                    death_month,
                    worker.benefit_date()
                ),
            ));
        }
    }

    if worker.benefit_date() < worker.entitlement_date {
        return Err(sequencing(
            ErrorCode::BenefitDateBeforeEntitlement,
            "benefit_date",
            format!(
                "benefit date {} precedes entitlement {}",
                worker.benefit_date(),
                worker.entitlement_date
            ),
        ));
    }
    if worker.entitlement_date < birth_month {
        return Err(sequencing(
            ErrorCode::BenefitDateBeforeEntitlement,
            "entitlement_date",
            format!("entitlement {} precedes birth", worker.entitlement_date),
        ));
    }

    check_disability_periods(worker)
}

fn check_disability_periods(worker: &WorkerRecord) -> EngineResult<()> {
    // The latest month onset may fall in.
    let onset_limit = if worker.is_survivor() {
        worker.benefit_date()
    } else {
        worker.entitlement_date
    };

    for (i, period) in worker.disability_periods.iter().enumerate() {
        let field = format!("disability_periods[{}]", i);
        if period.onset < worker.birth_date {
            return Err(sequencing(
                ErrorCode::OnsetBeforeBirth,
                &field,
                format!("onset {} precedes birth {}", period.onset, worker.birth_date),
            ));
        }
        if period.onset_month() > onset_limit {
            return Err(sequencing(
                ErrorCode::OnsetAfterEntitlement,
                &field,
                format!("onset {} follows {}", period.onset, onset_limit),
            ));
        }
        if let Some(cessation) = period.cessation {
            if cessation < period.onset_month() {
                return Err(sequencing(
                    ErrorCode::CessationBeforeOnset,
                    &field,
                    format!("cessation {} precedes onset {}", cessation, period.onset),
                ));
            }
            // A current period only ends before entitlement when the
            // benefit is not the disability benefit itself.
            let must_precede_entitlement = i > 0 || !worker.is_disability();
            if must_precede_entitlement && worker.entitlement_date < cessation {
                return Err(sequencing(
                    ErrorCode::EntitlementBeforeCessation,
                    &field,
                    format!(
                        "entitlement {} precedes cessation {}",
                        worker.entitlement_date, cessation
                    ),
                ));
            }
        }
    }

    if let (Some(current), Some(prior)) = (worker.current_disability(), worker.prior_disability()) {
        let Some(prior_cessation) = prior.cessation else {
            return Err(sequencing(
                ErrorCode::PriorPeriodOutOfOrder,
                "disability_periods[1]",
                "a prior period of disability must have ended".to_string(),
            ));
        };
        if prior_cessation > current.onset_month() {
            return Err(sequencing(
                ErrorCode::PriorPeriodOutOfOrder,
                "disability_periods[1]",
                format!(
                    "prior cessation {} follows current onset {}",
                    prior_cessation, current.onset
                ),
            ));
        }
    }
    Ok(())
}

fn check_family(worker: &WorkerRecord) -> EngineResult<()> {
    let earliest = match worker.death_month() {
        Some(death) if worker.is_survivor() => death,
        _ => worker.entitlement_date,
    };

    for member in &worker.family {
        let field = format!("family[{}]", member.id);
        let allowed = if worker.is_survivor() {
            member.beneficiary.is_survivor_benefit()
        } else {
            member.beneficiary.is_life_benefit()
        };
        if !allowed {
            return Err(sequencing(
                ErrorCode::BeneficiaryNotAllowed,
                &field,
                format!(
                    "{:?} benefits are not payable in a {:?} case",
                    member.beneficiary, worker.benefit_type
                ),
            ));
        }
        if member.entitlement_date < earliest || member.entitlement_date > worker.benefit_date() {
            return Err(sequencing(
                ErrorCode::FamilyMemberOutOfSequence,
                &field,
                format!(
                    "entitlement {} is outside {}..={}",
                    member.entitlement_date,
                    earliest,
                    worker.benefit_date()
                ),
            ));
        }
        if MonthYear::from_date(member.birth_date) > member.entitlement_date {
            return Err(sequencing(
                ErrorCode::FamilyMemberOutOfSequence,
                &field,
                format!("entitlement {} precedes birth", member.entitlement_date),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BeneficiaryType, DisabilityPeriod, FamilyMember};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(y: i32, m: u32) -> MonthYear {
        MonthYear::new(y, m).unwrap()
    }

    fn old_age() -> WorkerRecord {
        WorkerRecord::new("w", date(1958, 4, 10), BenefitType::OldAge, month(2024, 4))
    }

    fn lenient() -> EngineConfig {
        EngineConfig {
            validation: ValidationLevel::Lenient,
            ..EngineConfig::default()
        }
    }

    fn code(worker: &WorkerRecord, config: &EngineConfig) -> ErrorCode {
        validate_worker(worker, config).unwrap_err().code()
    }

    #[test]
    fn test_valid_record_passes() {
        let mut worker = old_age();
        worker.earnings.insert(1990, Decimal::from(30000));
        assert!(validate_worker(&worker, &EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_entitlement_before_1940_rejected_in_strict_mode() {
        let worker = WorkerRecord::new("w", date(1870, 4, 10), BenefitType::OldAge, month(1939, 6));
        assert_eq!(
            code(&worker, &EngineConfig::default()),
            ErrorCode::EntitlementYearOutOfRange
        );
        assert!(validate_worker(&worker, &lenient()).is_ok());
    }

    #[test]
    fn test_negative_earnings_rejected() {
        let mut worker = old_age();
        worker.earnings.insert(1990, Decimal::from_str("-1").unwrap());
        assert_eq!(code(&worker, &EngineConfig::default()), ErrorCode::NegativeEarnings);
    }

    #[test]
    fn test_earnings_year_before_1937_rejected() {
        let mut worker = old_age();
        worker.earnings.insert(1936, Decimal::from(100));
        assert_eq!(
            code(&worker, &EngineConfig::default()),
            ErrorCode::EarningsYearOutOfRange
        );
    }

    #[test]
    fn test_three_periods_rejected() {
        let mut worker = old_age();
        for year in [2000, 2005, 2010] {
            worker.disability_periods.push(DisabilityPeriod::closed(
                date(year, 3, 1),
                month(year + 1, 6),
                Decimal::ZERO,
                Decimal::ZERO,
            ));
        }
        assert_eq!(
            code(&worker, &EngineConfig::default()),
            ErrorCode::DisabilityPeriodCountOutOfRange
        );
    }

    #[test]
    fn test_old_age_before_62_rejected() {
        let worker = WorkerRecord::new("w", date(1958, 4, 10), BenefitType::OldAge, month(2019, 4));
        assert_eq!(
            code(&worker, &EngineConfig::default()),
            ErrorCode::EntitlementYearOutOfRange
        );
    }

    #[test]
    fn test_survivor_without_death_rejected_even_when_lenient() {
        let worker = WorkerRecord::new("w", date(1958, 4, 10), BenefitType::Survivor, month(2010, 4));
        assert_eq!(code(&worker, &lenient()), ErrorCode::MissingRequiredDate);
    }

    #[test]
    fn test_disability_without_period_rejected_when_lenient() {
        let worker =
            WorkerRecord::new("w", date(1958, 4, 10), BenefitType::Disability, month(2010, 4));
        assert_eq!(code(&worker, &lenient()), ErrorCode::MissingRequiredDate);
        assert_eq!(
            code(&worker, &EngineConfig::default()),
            ErrorCode::DisabilityPeriodCountOutOfRange
        );
    }

    #[test]
    fn test_benefit_date_before_entitlement_rejected() {
        let mut worker = old_age();
        worker.benefit_date = Some(month(2024, 1));
        assert_eq!(
            code(&worker, &lenient()),
            ErrorCode::BenefitDateBeforeEntitlement
        );
    }

    #[test]
    fn test_cessation_before_onset_rejected() {
        let mut worker = old_age();
        worker.disability_periods.push(DisabilityPeriod::closed(
            date(2010, 3, 15),
            month(2009, 12),
            Decimal::ZERO,
            Decimal::ZERO,
        ));
        assert_eq!(code(&worker, &lenient()), ErrorCode::CessationBeforeOnset);
    }

    #[test]
    fn test_onset_before_birth_rejected() {
        let mut worker = old_age();
        worker.disability_periods.push(DisabilityPeriod::closed(
            date(1950, 3, 15),
            month(1952, 12),
            Decimal::ZERO,
            Decimal::ZERO,
        ));
        assert_eq!(code(&worker, &lenient()), ErrorCode::OnsetBeforeBirth);
    }

    #[test]
    fn test_onset_after_entitlement_rejected() {
        let mut worker =
            WorkerRecord::new("w", date(1970, 4, 10), BenefitType::Disability, month(2015, 1));
        worker.disability_periods.push(DisabilityPeriod::open(date(2015, 6, 1)));
        assert_eq!(code(&worker, &lenient()), ErrorCode::OnsetAfterEntitlement);
    }

    #[test]
    fn test_open_prior_period_rejected() {
        let mut worker =
            WorkerRecord::new("w", date(1970, 4, 10), BenefitType::Disability, month(2015, 9));
        worker.disability_periods.push(DisabilityPeriod::open(date(2015, 3, 1)));
        worker.disability_periods.push(DisabilityPeriod::open(date(2008, 3, 1)));
        assert_eq!(code(&worker, &lenient()), ErrorCode::PriorPeriodOutOfOrder);
    }

    #[test]
    fn test_prior_cessation_after_current_onset_rejected() {
        let mut worker =
            WorkerRecord::new("w", date(1970, 4, 10), BenefitType::Disability, month(2015, 9));
        worker.disability_periods.push(DisabilityPeriod::open(date(2015, 3, 1)));
        worker.disability_periods.push(DisabilityPeriod::closed(
            date(2008, 3, 1),
            month(2015, 5),
            Decimal::ZERO,
            Decimal::ZERO,
        ));
        assert_eq!(code(&worker, &lenient()), ErrorCode::PriorPeriodOutOfOrder);
    }

    #[test]
    fn test_spouse_not_allowed_in_survivor_case() {
        let mut worker =
            WorkerRecord::new("w", date(1960, 4, 10), BenefitType::Survivor, month(2015, 9));
        worker.death_date = Some(date(2015, 8, 2));
        worker.family.push(FamilyMember {
            id: "s".to_string(),
            beneficiary: BeneficiaryType::Spouse,
            birth_date: date(1962, 1, 5),
            entitlement_date: month(2015, 9),
        });
        assert_eq!(code(&worker, &lenient()), ErrorCode::BeneficiaryNotAllowed);
    }

    #[test]
    fn test_family_member_before_worker_entitlement_rejected() {
        let mut worker = old_age();
        worker.family.push(FamilyMember {
            id: "c".to_string(),
            beneficiary: BeneficiaryType::Child,
            birth_date: date(2010, 1, 5),
            entitlement_date: month(2023, 9),
        });
        assert_eq!(code(&worker, &lenient()), ErrorCode::FamilyMemberOutOfSequence);
    }

    #[test]
    fn test_survivor_entitlement_before_death_rejected() {
        let mut worker =
            WorkerRecord::new("w", date(1960, 4, 10), BenefitType::Survivor, month(2015, 7));
        worker.death_date = Some(date(2015, 8, 2));
        assert_eq!(code(&worker, &lenient()), ErrorCode::DeathOutOfSequence);
    }
}
