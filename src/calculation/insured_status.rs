//! Insured status determination.
//!
//! Fully insured status needs one quarter of coverage for each elapsed
//! year after 1950 (or the year of age 21, if later) and before the year of
//! age 62, death or onset, with freeze years left out; never fewer than 6
//! or more than 40. Currently insured status needs 6 quarters in the 13
//! ending with the quarter of death, entitlement or onset. Disability
//! insured status adds a recent-work test over a 40-quarter window, or the
//! shorter window for onset before age 31.

use chrono::Datelike;

use crate::error::{EngineError, EngineResult, ErrorCode};
use crate::models::{
    AuditStep, BenefitType, DisabilityInsuredDetermination, DisabilityInsuredStatus, FreezeYears,
    InsuredStatus, InsuredStatusDetermination, QcSeries, QuarterRange, QuarterYear, WorkerRecord,
};

/// Fewest quarters that can satisfy fully insured status.
pub const MIN_FULLY_INSURED_QUARTERS: u32 = 6;

/// Quarters that always satisfy fully insured status.
pub const PERMANENT_INSURED_QUARTERS: u32 = 40;

/// Length of the currently insured window.
pub const CURRENTLY_INSURED_WINDOW: u32 = 13;

/// Quarters needed in the currently insured window.
pub const CURRENTLY_INSURED_QUARTERS: u32 = 6;

/// Length of the disability insured window.
pub const DISABILITY_WINDOW: u32 = 40;

/// Quarters needed in the disability insured window.
pub const DISABILITY_QUARTERS: u32 = 20;

/// Window for onset within 12 quarters of age 21.
pub const YOUNG_WORKER_WINDOW: u32 = 12;

/// Age before which the shorter disability window may apply.
pub const SPECIAL_INSURED_AGE: u32 = 31;

/// First year after which elapsed years are counted.
pub const ELAPSED_YEARS_BASE: i32 = 1950;

/// The result of an insured status determination, including the audit step.
#[derive(Debug, Clone)]
pub struct InsuredStatusResult {
    /// The determination.
    pub determination: InsuredStatusDetermination,
    /// The audit step recording it.
    pub audit_step: AuditStep,
}

/// The result of a disability insured status determination.
#[derive(Debug, Clone)]
pub struct DisabilityInsuredResult {
    /// The determination.
    pub determination: DisabilityInsuredDetermination,
    /// The audit step recording it.
    pub audit_step: AuditStep,
}

fn first_quarter() -> QuarterYear {
    QuarterYear::first_of(crate::config::FIRST_COVERED_YEAR)
}

fn missing_onset() -> EngineError {
    EngineError::sequencing(
        ErrorCode::MissingRequiredDate,
        "disability_periods",
        "a disability case needs a current disability period",
    )
}

fn missing_death() -> EngineError {
    EngineError::sequencing(
        ErrorCode::MissingRequiredDate,
        "death_date",
        "a survivor case needs a date of death",
    )
}

/// The year insured status is determined for: age 62, or death or onset if earlier.
pub fn determination_year(worker: &WorkerRecord) -> EngineResult<i32> {
    let age_62 = worker.attainment_year(62);
    Ok(match worker.benefit_type {
        BenefitType::OldAge => age_62,
        BenefitType::Survivor => {
            let death = worker.death_date.ok_or_else(missing_death)?;
            age_62.min(death.year())
        }
        BenefitType::Disability => {
            let onset = worker.current_disability().ok_or_else(missing_onset)?.onset;
            age_62.min(onset.year())
        }
    })
}

/// The quarter of entitlement, death or onset: the last quarter counted.
pub fn determination_quarter(worker: &WorkerRecord) -> EngineResult<QuarterYear> {
    Ok(match worker.benefit_type {
        BenefitType::OldAge => worker.entitlement_date.quarter(),
        BenefitType::Survivor => QuarterYear::from_date(worker.death_date.ok_or_else(missing_death)?),
        BenefitType::Disability => {
            QuarterYear::from_date(worker.current_disability().ok_or_else(missing_onset)?.onset)
        }
    })
}

/// Elapsed years for fully insured status, freeze years removed.
pub fn elapsed_years(worker: &WorkerRecord, freeze: &FreezeYears, det_year: i32) -> u32 {
    let start = ELAPSED_YEARS_BASE.max(worker.attainment_year(21));
    let first = start + 1;
    let last = det_year - 1;
    if last < first {
        return 0;
    }
    ((last - first + 1) as u32).saturating_sub(freeze.count_between(first, last))
}

/// Quarters needed to be fully insured for `elapsed` elapsed years.
pub fn fully_insured_required(elapsed: u32) -> u32 {
    elapsed.clamp(MIN_FULLY_INSURED_QUARTERS, PERMANENT_INSURED_QUARTERS)
}

/// The 13 quarters ending with `end`, clipped at 1937.
pub fn currently_insured_window(end: QuarterYear) -> QuarterRange {
    let start = end
        .add_quarters(-(CURRENTLY_INSURED_WINDOW as i32 - 1))
        .max(first_quarter());
    QuarterRange { start, end }
}

fn count(quarters: &QcSeries, range: &QuarterRange) -> u32 {
    quarters.accumulate_quarters(range.start, range.end)
}

/// Determines fully, currently and permanently insured status.
pub fn determine_insured_status(
    worker: &WorkerRecord,
    quarters: &QcSeries,
    freeze: &FreezeYears,
    step_number: u32,
) -> EngineResult<InsuredStatusResult> {
    let det_year = determination_year(worker)?;
    let det_quarter = determination_quarter(worker)?;

    let elapsed = elapsed_years(worker, freeze, det_year);
    let required = fully_insured_required(elapsed);
    let earned = quarters.accumulate_quarters(first_quarter(), det_quarter);
    let window = currently_insured_window(det_quarter);
    let recent = count(quarters, &window);

    let fully = earned >= required;
    let currently = recent >= CURRENTLY_INSURED_QUARTERS;
    let totalized = !fully
        && earned >= MIN_FULLY_INSURED_QUARTERS
        && earned + worker.foreign_quarters >= required;

    let status = if fully && earned >= PERMANENT_INSURED_QUARTERS {
        InsuredStatus::Permanent
    } else if fully && currently {
        InsuredStatus::FullyAndCurrently
    } else if fully {
        InsuredStatus::Fully
    } else if totalized {
        InsuredStatus::Totalized
    } else if worker.deemed_insured {
        InsuredStatus::Deemed
    } else if currently {
        InsuredStatus::Currently
    } else {
        InsuredStatus::Uninsured
    };

    let determination = InsuredStatusDetermination {
        status,
        determination_year: det_year,
        elapsed_years: elapsed,
        quarters_required: required,
        quarters_earned: earned,
        foreign_quarters: worker.foreign_quarters,
        currently_window: window,
        currently_quarters: recent,
        currently_insured: currently,
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "insured_status".to_string(),
        rule_name: "Insured Status".to_string(),
        clause_ref: "214".to_string(),
        input: serde_json::json!({
            "determination_year": det_year,
            "determination_quarter": det_quarter.to_string(),
            "elapsed_years": elapsed,
            "foreign_quarters": worker.foreign_quarters,
            "deemed_insured": worker.deemed_insured,
        }),
        output: serde_json::json!({
            "status": status,
            "quarters_required": required,
            "quarters_earned": earned,
            "currently_window": [window.start.to_string(), window.end.to_string()],
            "currently_quarters": recent,
            "currently_insured": currently,
        }),
        reasoning: format!(
            "{} of {} quarters needed for fully insured status; {} of {} in the 13-quarter window ending {}",
            earned, required, recent, CURRENTLY_INSURED_QUARTERS, det_quarter
        ),
    };

    Ok(InsuredStatusResult {
        determination,
        audit_step,
    })
}

/// Walks back `length` quarters from `end`, skipping the quarters of a
/// prior period of disability and stopping at 1937.
pub fn disability_window(
    end: QuarterYear,
    length: u32,
    prior: Option<QuarterRange>,
) -> Vec<QuarterRange> {
    let mut segments = Vec::new();
    let mut end = end;
    let mut remaining = length as i32;
    let mut prior = prior;

    while remaining > 0 && end >= first_quarter() {
        let start = end.add_quarters(-(remaining - 1));
        match prior.take() {
            Some(skip) if skip.end >= start && skip.start <= end => {
                if skip.end < end {
                    let segment = QuarterRange {
                        start: skip.end.add_quarters(1),
                        end,
                    };
                    remaining -= segment.len() as i32;
                    segments.push(segment);
                }
                end = skip.start.add_quarters(-1);
            }
            _ => {
                segments.push(QuarterRange {
                    start: start.max(first_quarter()),
                    end,
                });
                break;
            }
        }
    }
    segments
}

/// Determines disability insured status for the current period.
pub fn determine_disability_insured_status(
    worker: &WorkerRecord,
    quarters: &QcSeries,
    insured: &InsuredStatusDetermination,
    step_number: u32,
) -> EngineResult<DisabilityInsuredResult> {
    if !worker.is_disability() {
        let determination = DisabilityInsuredDetermination::not_applicable();
        let audit_step = disability_audit_step(worker, &determination, step_number);
        return Ok(DisabilityInsuredResult {
            determination,
            audit_step,
        });
    }

    let current = worker.current_disability().ok_or_else(missing_onset)?;
    let onset_quarter = QuarterYear::from_date(current.onset);
    let fully = insured.status.is_fully_insured();

    let determination = if worker.statutorily_blind {
        DisabilityInsuredDetermination {
            status: if fully {
                DisabilityInsuredStatus::Blind
            } else {
                DisabilityInsuredStatus::NotInsured
            },
            window: Vec::new(),
            quarters_earned: insured.quarters_earned,
            quarters_required: insured.quarters_required,
            special_rule: false,
        }
    } else {
        let prior = worker.prior_disability().and_then(|p| {
            p.cessation.map(|c| QuarterRange {
                start: QuarterYear::from_date(p.onset),
                end: c.quarter(),
            })
        });

        let special_rule = current.onset_month() < worker.attainment_month(SPECIAL_INSURED_AGE);
        let (window, required) = if special_rule {
            let after_21 = worker.attainment_month(21).quarter().add_quarters(1);
            let available = onset_quarter.quarters_since(after_21) + 1;
            if available < YOUNG_WORKER_WINDOW as i32 {
                (
                    disability_window(onset_quarter, YOUNG_WORKER_WINDOW, prior),
                    YOUNG_WORKER_WINDOW / 2,
                )
            } else {
                (
                    disability_window(onset_quarter, available as u32, prior),
                    (available as u32 / 2).max(YOUNG_WORKER_WINDOW / 2),
                )
            }
        } else {
            (
                disability_window(onset_quarter, DISABILITY_WINDOW, prior),
                DISABILITY_QUARTERS,
            )
        };

        let earned: u32 = window.iter().map(|range| count(quarters, range)).sum();
        let status = if fully && earned >= required {
            if special_rule {
                DisabilityInsuredStatus::SpecialInsured
            } else {
                DisabilityInsuredStatus::Insured
            }
        } else if insured.status.is_fully_insured() && earned + worker.foreign_quarters >= required
        {
            DisabilityInsuredStatus::Totalized
        } else {
            DisabilityInsuredStatus::NotInsured
        };

        DisabilityInsuredDetermination {
            status,
            window,
            quarters_earned: earned,
            quarters_required: required,
            special_rule,
        }
    };

    let audit_step = disability_audit_step(worker, &determination, step_number);
    Ok(DisabilityInsuredResult {
        determination,
        audit_step,
    })
}

fn disability_audit_step(
    worker: &WorkerRecord,
    determination: &DisabilityInsuredDetermination,
    step_number: u32,
) -> AuditStep {
    let reasoning = match determination.status {
        DisabilityInsuredStatus::NotApplicable => {
            "Not a disability case; disability insured status not evaluated".to_string()
        }
        DisabilityInsuredStatus::Blind | DisabilityInsuredStatus::NotInsured
            if worker.statutorily_blind =>
        {
            "Statutorily blind: only fully insured status is required".to_string()
        }
        _ => format!(
            "{} of {} quarters needed in the {}window",
            determination.quarters_earned,
            determination.quarters_required,
            if determination.special_rule {
                "before-age-31 "
            } else {
                "40-quarter "
            }
        ),
    };

    AuditStep {
        step_number,
        rule_id: "disability_insured_status".to_string(),
        rule_name: "Disability Insured Status".to_string(),
        clause_ref: "223(c)".to_string(),
        input: serde_json::json!({
            "statutorily_blind": worker.statutorily_blind,
            "periods": worker.disability_periods.len(),
        }),
        output: serde_json::json!({
            "status": determination.status,
            "window": determination
                .window
                .iter()
                .map(|r| [r.start.to_string(), r.end.to_string()])
                .collect::<Vec<_>>(),
            "quarters_earned": determination.quarters_earned,
            "quarters_required": determination.quarters_required,
            "special_rule": determination.special_rule,
        }),
        reasoning,
    }
}
