//! Calculation logic for the PIA engine.
//!
//! This module contains every stage of a benefit computation: input
//! validation, the derived quantities (freeze years, earnings, quarters of
//! coverage, insured status, computation periods), the benefit methods,
//! selection of the governing PIA, actuarial adjustment, and distribution
//! of family benefits under the family maximum. [`calculate`] runs them
//! all for one worker and [`calculate_batch`] for many.

mod actuarial;
mod computation_period;
mod earnings;
mod engine;
mod family;
mod freeze;
mod insured_status;
pub mod methods;
mod pia_data;
mod quarters;
mod rounding;
mod selection;
mod validation;

pub use actuarial::{
    DRC_END_AGE, FIRST_REDUCTION_MONTHS, WIDOW_EARLIEST_AGE, WIDOW_MAX_REDUCTION_PERCENT,
    adjustment_months, delayed_credit, delayed_credit_annual_percent, normal_retirement_age_months,
    normal_retirement_month, spouse_reduction, widow_normal_retirement_month, widow_reduction,
    worker_adjustment_factor, worker_reduction,
};
pub use computation_period::{
    ComputationPeriodsResult, DROPOUT_YEARS, MIN_COMPUTATION_YEARS, NEW_START_BASE_YEAR,
    OLD_START_BASE_YEAR, computation_period, derive_computation_periods,
};
pub use earnings::{EarningsSeriesResult, build_earnings_series, years_of_coverage};
pub use engine::{calculate, calculate_batch};
pub use family::{FamilyResult, family_benefits, family_maximum_shares, member_reduction, pia_factor};
pub use freeze::{FreezeYearsResult, derive_freeze_years, period_freeze_years};
pub use insured_status::{
    DisabilityInsuredResult, InsuredStatusResult, determination_year,
    determine_disability_insured_status, determine_insured_status,
};
pub use pia_data::{PiaDataResult, build_pia_data, eligibility_year, last_earnings_year};
pub use quarters::{QuartersResult, derive_quarters, quarters_from_earnings};
pub use rounding::{
    apply_cola, round, round_down_dollar, round_statement, unapply_cola, unround,
};
pub use selection::{Selection, SelectionResult, select, select_governing};
pub use validation::{MIN_BIRTH_YEAR, MIN_ENTITLEMENT_YEAR, validate_worker};
