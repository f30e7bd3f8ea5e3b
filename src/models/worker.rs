//! Worker record model.
//!
//! The worker record holds everything the engine needs about one insured
//! worker: dates, earnings by year, reported quarters of coverage, up to
//! two disability periods and the family members claiming on the record.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dates::{MonthYear, attainment_month, attainment_year};
use super::disability::DisabilityPeriod;
use super::secondary::FamilyMember;

/// The kind of benefit being computed on the worker's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitType {
    /// Retirement benefit for a living worker.
    OldAge,
    /// Disability benefit for a living worker.
    Disability,
    /// Benefits to survivors of a deceased worker.
    Survivor,
}

/// One worker's earnings and status record.
///
/// # Example
///
/// ```
/// use pia_engine::models::{BenefitType, MonthYear, WorkerRecord};
/// use chrono::NaiveDate;
///
/// let json = r#"{
///     "id": "w-001",
///     "birth_date": "1958-04-10",
///     "benefit_type": "old_age",
///     "entitlement_date": "2024-04",
///     "earnings": { "1990": "30000", "1991": "31000" }
/// }"#;
/// let worker: WorkerRecord = serde_json::from_str(json).unwrap();
/// assert_eq!(worker.benefit_type, BenefitType::OldAge);
/// assert_eq!(worker.benefit_date(), MonthYear::new(2024, 4).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRecord {
    /// Identifier for the worker.
    pub id: String,
    /// Date of birth.
    pub birth_date: NaiveDate,
    /// Benefit being computed.
    pub benefit_type: BenefitType,
    /// First month of entitlement (the survivors' first month for a survivor case).
    pub entitlement_date: MonthYear,
    /// Month the benefit is computed for; defaults to the entitlement month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefit_date: Option<MonthYear>,
    /// Date of death, required for a survivor case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<NaiveDate>,
    /// Covered earnings by year.
    #[serde(default)]
    pub earnings: BTreeMap<i32, Decimal>,
    /// Total earnings 1937 through the lump-sum cutoff year, when not reported by year.
    #[serde(default)]
    pub lump_sum_earnings: Decimal,
    /// Reported quarters of coverage by year; overrides derivation from earnings.
    #[serde(default)]
    pub quarters_of_coverage: BTreeMap<i32, u8>,
    /// Railroad service quarters by year.
    #[serde(default)]
    pub railroad_quarters: BTreeMap<i32, u8>,
    /// Military service quarters by year.
    #[serde(default)]
    pub military_quarters: BTreeMap<i32, u8>,
    /// Quarters credited under a totalization agreement.
    #[serde(default)]
    pub foreign_quarters: u32,
    /// Deemed fully insured by special provision.
    #[serde(default)]
    pub deemed_insured: bool,
    /// Statutorily blind.
    #[serde(default)]
    pub statutorily_blind: bool,
    /// Monthly pension from non-covered employment.
    #[serde(default)]
    pub non_covered_pension: Decimal,
    /// Disability periods, most recent first.
    #[serde(default)]
    pub disability_periods: Vec<DisabilityPeriod>,
    /// Family members claiming on the record.
    #[serde(default)]
    pub family: Vec<FamilyMember>,
}

impl WorkerRecord {
    /// Creates a record with no earnings, periods or family.
    pub fn new(
        id: impl Into<String>,
        birth_date: NaiveDate,
        benefit_type: BenefitType,
        entitlement_date: MonthYear,
    ) -> Self {
        Self {
            id: id.into(),
            birth_date,
            benefit_type,
            entitlement_date,
            benefit_date: None,
            death_date: None,
            earnings: BTreeMap::new(),
            lump_sum_earnings: Decimal::ZERO,
            quarters_of_coverage: BTreeMap::new(),
            railroad_quarters: BTreeMap::new(),
            military_quarters: BTreeMap::new(),
            foreign_quarters: 0,
            deemed_insured: false,
            statutorily_blind: false,
            non_covered_pension: Decimal::ZERO,
            disability_periods: Vec::new(),
            family: Vec::new(),
        }
    }

    /// Month the benefit is computed for.
    pub fn benefit_date(&self) -> MonthYear {
        self.benefit_date.unwrap_or(self.entitlement_date)
    }

    /// Returns true for a survivor case.
    pub fn is_survivor(&self) -> bool {
        self.benefit_type == BenefitType::Survivor
    }

    /// Returns true for a disability case.
    pub fn is_disability(&self) -> bool {
        self.benefit_type == BenefitType::Disability
    }

    /// The most recent disability period.
    pub fn current_disability(&self) -> Option<&DisabilityPeriod> {
        self.disability_periods.first()
    }

    /// The prior disability period, if two are held.
    pub fn prior_disability(&self) -> Option<&DisabilityPeriod> {
        self.disability_periods.get(1)
    }

    /// Month the worker attains `age`.
    pub fn attainment_month(&self, age: u32) -> MonthYear {
        attainment_month(self.birth_date, age)
    }

    /// Year the worker attains `age`.
    pub fn attainment_year(&self, age: u32) -> i32 {
        attainment_year(self.birth_date, age)
    }

    /// Month of death.
    pub fn death_month(&self) -> Option<MonthYear> {
        self.death_date.map(MonthYear::from_date)
    }

    /// Reported earnings for `year`, zero if none.
    pub fn earnings_for(&self, year: i32) -> Decimal {
        self.earnings.get(&year).copied().unwrap_or_default()
    }

    /// Returns true if any earnings are reported before 1951.
    pub fn has_pre_1951_earnings(&self) -> bool {
        self.lump_sum_earnings > Decimal::ZERO
            || self
                .earnings
                .range(..1951)
                .any(|(_, amount)| *amount > Decimal::ZERO)
    }
}
