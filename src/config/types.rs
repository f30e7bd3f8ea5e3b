//! Configuration types for benefit computation.
//!
//! This module contains the strongly-typed law-parameter structures that
//! are deserialized from the YAML files of a law directory, plus the
//! engine settings that every computation receives explicitly.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::MonthYear;

/// Default upper bound on any year the engine accepts.
pub const DEFAULT_MAX_YEAR: i32 = 2100;

/// Default last year whose earnings may be reported as one lump sum.
pub const DEFAULT_QC_LUMP_SUM_CUTOFF_YEAR: i32 = 1950;

/// Earliest year of covered employment.
pub const FIRST_COVERED_YEAR: i32 = 1937;

/// How thoroughly worker input is range-checked before calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLevel {
    /// Range and sequencing checks both run.
    #[default]
    Strict,
    /// Only sequencing checks run.
    Lenient,
}

/// Engine settings, read-only for the duration of any computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Largest year accepted anywhere in the input.
    #[serde(default = "default_max_year")]
    pub max_year: i32,
    /// Last year whose earnings may be reported as a lump sum.
    #[serde(default = "default_cutoff_year")]
    pub qc_lump_sum_cutoff_year: i32,
    /// Input validation level.
    #[serde(default)]
    pub validation: ValidationLevel,
}

fn default_max_year() -> i32 {
    DEFAULT_MAX_YEAR
}

fn default_cutoff_year() -> i32 {
    DEFAULT_QC_LUMP_SUM_CUTOFF_YEAR
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_year: DEFAULT_MAX_YEAR,
            qc_lump_sum_cutoff_year: DEFAULT_QC_LUMP_SUM_CUTOFF_YEAR,
            validation: ValidationLevel::Strict,
        }
    }
}

/// Metadata about the law parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LawMetadata {
    /// Human-readable name of the parameter set.
    pub name: String,
    /// Version or effective month of the parameter set.
    pub version: String,
    /// Where the published values come from.
    pub source_url: String,
}

/// Structure of `law.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct LawFile {
    /// Metadata section.
    pub law: LawMetadata,
    /// Engine settings section.
    #[serde(default)]
    pub engine: EngineConfig,
}

/// A table of amounts keyed by calendar year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearTable {
    /// Name used in error messages.
    pub table: String,
    /// Values by year.
    pub values: BTreeMap<i32, Decimal>,
}

impl YearTable {
    /// Looks up `year`, failing with a configuration error if absent.
    pub fn get(&self, year: i32) -> EngineResult<Decimal> {
        self.values
            .get(&year)
            .copied()
            .ok_or_else(|| EngineError::MissingLawParameter {
                table: self.table.clone(),
                year,
            })
    }

    /// First year present.
    pub fn first_year(&self) -> Option<i32> {
        self.values.keys().next().copied()
    }

    /// Last year present.
    pub fn last_year(&self) -> Option<i32> {
        self.values.keys().next_back().copied()
    }
}

/// A general benefit increase or cost-of-living adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitIncrease {
    /// The first month the increase is effective.
    pub effective: MonthYear,
    /// The increase in percent.
    pub percent: Decimal,
}

/// Structure of `benefit_increases.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct BenefitIncreasesFile {
    /// Name used in error messages.
    pub table: String,
    /// Increases in any order.
    pub increases: Vec<BenefitIncrease>,
}

/// One segment of a bracket formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    /// Upper end of the segment; `None` for the last, unbounded segment.
    #[serde(default)]
    pub up_to: Option<Decimal>,
    /// Percentage applied to the part of the amount inside the segment.
    pub percent: Decimal,
}

/// Applies a bracket formula to `amount`.
///
/// ```
/// use pia_engine::config::{apply_brackets, Bracket};
/// use rust_decimal::Decimal;
///
/// let brackets = [
///     Bracket { up_to: Some(Decimal::from(100)), percent: Decimal::from(90) },
///     Bracket { up_to: None, percent: Decimal::from(10) },
/// ];
/// assert_eq!(apply_brackets(&brackets, Decimal::from(300)), Decimal::from(110));
/// ```
pub fn apply_brackets(brackets: &[Bracket], amount: Decimal) -> Decimal {
    let mut lower = Decimal::ZERO;
    let mut total = Decimal::ZERO;
    for bracket in brackets {
        if amount <= lower {
            break;
        }
        let upper = bracket.up_to.map_or(amount, |up| up.min(amount));
        total += (upper - lower) * bracket.percent / Decimal::ONE_HUNDRED;
        match bracket.up_to {
            Some(up) => lower = up,
            None => break,
        }
    }
    total
}

/// A pre-1979 benefit table, represented by its generating formulas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiaTableVintage {
    /// First month the table is in force.
    pub effective: MonthYear,
    /// Minimum PIA under the table.
    pub minimum_pia: Decimal,
    /// PIA from average monthly wage.
    pub amw_brackets: Vec<Bracket>,
    /// PIA from the 1939-act primary insurance benefit.
    pub pib_brackets: Vec<Bracket>,
    /// Maximum family benefit from PIA.
    pub mfb_brackets: Vec<Bracket>,
}

/// Structure of `pia_tables.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PiaTablesFile {
    /// Name used in error messages.
    pub table: String,
    /// Vintages in any order.
    pub vintages: Vec<PiaTableVintage>,
}

/// The complete law-parameter set loaded from a law directory.
///
/// All lookups fail with [`EngineError::MissingLawParameter`] instead of
/// defaulting when a needed year is absent.
#[derive(Debug, Clone)]
pub struct LawParameters {
    metadata: LawMetadata,
    average_wages: YearTable,
    wage_bases: YearTable,
    qc_amounts: YearTable,
    substantial_earnings: YearTable,
    increases: Vec<BenefitIncrease>,
    pia_tables: Vec<PiaTableVintage>,
}

impl LawParameters {
    /// Creates a parameter set from its component tables.
    pub fn new(
        metadata: LawMetadata,
        average_wages: YearTable,
        wage_bases: YearTable,
        qc_amounts: YearTable,
        substantial_earnings: YearTable,
        increases: Vec<BenefitIncrease>,
        pia_tables: Vec<PiaTableVintage>,
    ) -> Self {
        let mut increases = increases;
        increases.sort_by_key(|i| i.effective);
        let mut pia_tables = pia_tables;
        pia_tables.sort_by_key(|v| v.effective);
        Self {
            metadata,
            average_wages,
            wage_bases,
            qc_amounts,
            substantial_earnings,
            increases,
            pia_tables,
        }
    }

    /// Returns the metadata.
    pub fn metadata(&self) -> &LawMetadata {
        &self.metadata
    }

    /// National average wage index for `year`.
    pub fn average_wage(&self, year: i32) -> EngineResult<Decimal> {
        self.average_wages.get(year)
    }

    /// The average wage table.
    pub fn average_wages(&self) -> &YearTable {
        &self.average_wages
    }

    /// Contribution and benefit base for `year`.
    pub fn wage_base(&self, year: i32) -> EngineResult<Decimal> {
        self.wage_bases.get(year)
    }

    /// Earnings needed for one quarter of coverage in `year` (1978 onward).
    pub fn qc_amount(&self, year: i32) -> EngineResult<Decimal> {
        self.qc_amounts.get(year)
    }

    /// Earnings that make `year` a year of coverage for the windfall
    /// elimination provision: the table from 1979, 25% of the
    /// contribution and benefit base before.
    pub fn substantial_earnings(&self, year: i32) -> EngineResult<Decimal> {
        if year >= 1979 {
            self.substantial_earnings.get(year)
        } else {
            Ok(self.wage_base(year)? / Decimal::from(4))
        }
    }

    /// All benefit increases, oldest first.
    pub fn increases(&self) -> &[BenefitIncrease] {
        &self.increases
    }

    /// Increases effective after `after` and no later than `through`.
    pub fn increases_between(
        &self,
        after: MonthYear,
        through: MonthYear,
    ) -> impl Iterator<Item = &BenefitIncrease> + '_ {
        self.increases
            .iter()
            .filter(move |i| i.effective > after && i.effective <= through)
    }

    /// The benefit table in force in `month`.
    pub fn pia_table(&self, month: MonthYear) -> EngineResult<&PiaTableVintage> {
        self.pia_tables
            .iter()
            .rfind(|v| v.effective <= month)
            .ok_or_else(|| EngineError::MissingLawParameter {
                table: "pia_tables".to_string(),
                year: month.year(),
            })
    }

    /// Checks every table value against its statutory domain.
    pub fn validate(&self, config: &EngineConfig) -> EngineResult<()> {
        for table in [
            &self.average_wages,
            &self.wage_bases,
            &self.qc_amounts,
            &self.substantial_earnings,
        ] {
            for (&year, &value) in &table.values {
                if !(FIRST_COVERED_YEAR..=config.max_year).contains(&year) {
                    return Err(invalid(
                        &table.table,
                        format!("year {} outside {}..={}", year, FIRST_COVERED_YEAR, config.max_year),
                    ));
                }
                if value < Decimal::ZERO {
                    return Err(invalid(&table.table, format!("negative value for {}", year)));
                }
            }
        }
        for increase in &self.increases {
            if increase.percent < Decimal::ZERO || increase.percent > Decimal::ONE_HUNDRED {
                return Err(invalid(
                    "benefit_increases",
                    format!(
                        "{}% effective {} outside 0..=100",
                        increase.percent, increase.effective
                    ),
                ));
            }
        }
        for vintage in &self.pia_tables {
            if vintage.amw_brackets.is_empty()
                || vintage.pib_brackets.is_empty()
                || vintage.mfb_brackets.is_empty()
            {
                return Err(invalid(
                    "pia_tables",
                    format!("vintage {} has an empty bracket list", vintage.effective),
                ));
            }
        }
        Ok(())
    }
}

fn invalid(table: &str, message: String) -> EngineError {
    EngineError::InvalidLawParameter {
        table: table.to_string(),
        message,
    }
}
