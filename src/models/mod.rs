//! Core data models for the PIA engine.
//!
//! This module contains all the domain models used throughout the engine:
//! temporal primitives, year-indexed series, the worker record, family
//! members, derived quantities and calculation results.

mod calculation_result;
mod dates;
mod derived;
mod disability;
mod insured_status;
mod secondary;
mod series;
mod worker;

pub use calculation_result::{
    AuditStep, AuditTrace, AuditWarning, CalculationResult, MethodKind, MethodResult, Provenance,
    SelectionRule, WorkerBenefit,
};
pub use dates::{MonthYear, QuarterYear, attainment_month, attainment_year, schedule_birth_year};
pub use derived::{
    ComputationPeriod, DisabilityInsuredDetermination, FreezeYears, InsuredStatusDetermination,
    PiaData, QuarterRange, YearRange, YearsOfCoverage,
};
pub use disability::{DisabilityPeriod, MAX_DISABILITY_PERIODS};
pub use insured_status::{DisabilityInsuredStatus, InsuredStatus};
pub use secondary::{BenefitChain, BeneficiaryType, FamilyMember};
pub use series::{AnnualSeries, MAX_QC_PER_YEAR, QcSeries, YearFlags};
pub use worker::{BenefitType, WorkerRecord};
