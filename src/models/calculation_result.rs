//! Calculation result models for the PIA engine.
//!
//! This module contains the [`CalculationResult`] type and its associated
//! structures that capture all outputs from a benefit computation: every
//! method's candidate PIA and MFB, the governing choice, the worker's own
//! benefit, the family benefit chains, and an audit trace.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dates::MonthYear;
use super::derived::PiaData;
use super::insured_status::{DisabilityInsuredStatus, InsuredStatus};
use super::secondary::BenefitChain;

/// Identifies a benefit computation method.
///
/// # Example
///
/// ```
/// use pia_engine::models::MethodKind;
///
/// let kind = MethodKind::WageIndexed;
/// assert_eq!(serde_json::to_string(&kind).unwrap(), "\"wage_indexed\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// Post-1978 wage-indexed formula.
    WageIndexed,
    /// 1937-based computation through the 1939-act primary benefit.
    OldStart,
    /// Pre-1979 benefit table on average monthly wage.
    PiaTable,
    /// 1977-act transitional guarantee.
    TransitionalGuarantee,
    /// Years-of-coverage special minimum.
    SpecialMinimum,
    /// Minimum frozen at the December 1978 level.
    FrozenMinimum,
    /// Guarantee of a prior disability PIA.
    DisabilityGuarantee,
    /// Survivor PIA with earnings reindexed to the widow(er)'s eligibility.
    ReindexedWidow,
}

/// How the worker's own benefit was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRule {
    /// The highest PIA governs; special minimum and delayed credit do not interact.
    NoSpecialMinimumDrc,
    /// The special minimum is paid without delayed credit.
    SpecialMinimumIsBenefit,
    /// The next highest PIA plus delayed credit is paid instead of the special minimum.
    SupportPiaPlusIncrement,
}

/// Enough detail to reproduce a method's computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Average indexed monthly earnings or average monthly wage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_earnings: Option<Decimal>,
    /// Computation period base year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_year: Option<i32>,
    /// Number of computation years.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computation_years: Option<u32>,
    /// Wage indexing year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_year: Option<i32>,
    /// PIA formula bend points.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bend_points: Vec<Decimal>,
    /// PIA formula percentages, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub percentages: Vec<Decimal>,
    /// Effective month of the benefit table used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_effective: Option<MonthYear>,
    /// Years of coverage used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_of_coverage: Option<u32>,
    /// Benefit increases applied, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub increases_applied: Vec<MonthYear>,
}

/// A candidate PIA and MFB from one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodResult {
    /// The method.
    pub method: MethodKind,
    /// Whether the method applies to this worker.
    pub applicable: bool,
    /// PIA at the benefit date.
    pub pia: Decimal,
    /// MFB at the benefit date.
    pub mfb: Decimal,
    /// PIA before any increase after eligibility.
    pub pia_at_eligibility: Decimal,
    /// MFB before any increase after eligibility.
    pub mfb_at_eligibility: Decimal,
    /// Family member the result belongs to (reindexed widow only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    /// Computation detail.
    pub provenance: Provenance,
}

impl MethodResult {
    /// A result for a method that does not apply.
    pub fn not_applicable(method: MethodKind) -> Self {
        Self {
            method,
            applicable: false,
            pia: Decimal::ZERO,
            mfb: Decimal::ZERO,
            pia_at_eligibility: Decimal::ZERO,
            mfb_at_eligibility: Decimal::ZERO,
            member_id: None,
            provenance: Provenance::default(),
        }
    }
}

/// The worker's own monthly benefit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerBenefit {
    /// PIA the benefit is figured from.
    pub pia: Decimal,
    /// Months before (negative) or after (positive) normal retirement age.
    pub adjustment_months: i32,
    /// Multiplier applied to the PIA.
    pub adjustment_factor: Decimal,
    /// Benefit after adjustment, before dollar rounding.
    pub monthly_benefit: Decimal,
    /// Payable benefit, rounded down to the dollar.
    pub payable: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the statute section for this rule.
    pub clause_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate conditions that don't prevent calculation but may
/// require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
///
/// # Example
///
/// ```
/// use pia_engine::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
///     duration_us: 1234,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The complete result of a benefit computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The worker the calculation is for.
    pub worker_id: String,
    /// Month the amounts are stated for.
    pub benefit_date: MonthYear,
    /// Insured status.
    pub insured_status: InsuredStatus,
    /// Disability insured status.
    pub disability_insured_status: DisabilityInsuredStatus,
    /// Method that produced the governing PIA.
    pub governing_method: MethodKind,
    /// Governing PIA.
    pub governing_pia: Decimal,
    /// Governing MFB.
    pub governing_mfb: Decimal,
    /// How the worker's own benefit was settled.
    pub selection_rule: SelectionRule,
    /// The worker's own benefit; absent in a survivor case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_benefit: Option<WorkerBenefit>,
    /// Every method's candidate result, in evaluation order.
    pub methods: Vec<MethodResult>,
    /// Benefit chain per family member.
    pub family: Vec<BenefitChain>,
    /// Derived quantities.
    pub pia_data: PiaData,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

impl CalculationResult {
    /// The candidate result for `method`, if evaluated.
    pub fn method(&self, method: MethodKind) -> Option<&MethodResult> {
        self.methods.iter().find(|m| m.method == method)
    }

    /// Total payable to family members.
    pub fn family_total(&self) -> Decimal {
        self.family.iter().map(|chain| chain.rounded).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_method_kind_deserialization() {
        let kind: MethodKind = serde_json::from_str("\"transitional_guarantee\"").unwrap();
        assert_eq!(kind, MethodKind::TransitionalGuarantee);
        let kind: MethodKind = serde_json::from_str("\"reindexed_widow\"").unwrap();
        assert_eq!(kind, MethodKind::ReindexedWidow);
    }

    #[test]
    fn test_selection_rule_serialization() {
        assert_eq!(
            serde_json::to_string(&SelectionRule::SupportPiaPlusIncrement).unwrap(),
            "\"support_pia_plus_increment\""
        );
    }

    #[test]
    fn test_not_applicable_result_is_zero() {
        let result = MethodResult::not_applicable(MethodKind::FrozenMinimum);
        assert!(!result.applicable);
        assert_eq!(result.pia, Decimal::ZERO);
        assert_eq!(result.mfb, Decimal::ZERO);
    }

    #[test]
    fn test_provenance_skips_empty_fields() {
        let provenance = Provenance {
            average_earnings: Some(dec("4512")),
            ..Provenance::default()
        };
        let json = serde_json::to_string(&provenance).unwrap();
        assert!(json.contains("\"average_earnings\":\"4512\""));
        assert!(!json.contains("bend_points"));
        assert!(!json.contains("table_effective"));
    }

    #[test]
    fn test_audit_step_serialization() {
        let step = AuditStep {
            step_number: 3,
            rule_id: "freeze_years".to_string(),
            rule_name: "Freeze Years".to_string(),
            clause_ref: "216(i)".to_string(),
            input: serde_json::json!({ "periods": 1 }),
            output: serde_json::json!({ "wholly": [[2011, 2012]] }),
            reasoning: "Onset not on January 1".to_string(),
        };
        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("\"rule_id\":\"freeze_years\""));
        assert!(json.contains("\"clause_ref\":\"216(i)\""));
    }
}
