//! Benefit computation methods.
//!
//! Each method is a pair of free functions, `is_applicable` and
//! `calculate`, over a shared [`MethodContext`]. [`PiaMethod`] dispatches
//! to them by variant, so selection code matches over every method
//! exhaustively.

mod disability_guarantee;
mod frozen_minimum;
mod mfb;
mod old_start;
mod pia_table;
mod reindexed_widow;
mod special_minimum;
mod transitional;
mod wage_indexed;

use rust_decimal::Decimal;

use crate::config::LawParameters;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, FamilyMember, MethodKind, MethodResult, MonthYear, PiaData, WorkerRecord,
};

use super::rounding::apply_cola;

pub use disability_guarantee::GUARANTEE_WINDOW_MONTHS;
pub use frozen_minimum::FROZEN_MINIMUM_PIA;
pub use mfb::{
    MFB_BASE_BEND_POINTS, MFB_PERCENTAGES, disability_family_maximum, family_maximum,
    mfb_bend_points,
};
pub use old_start::{INCREMENT_YEAR_EARNINGS, primary_insurance_benefit};
pub use special_minimum::{SPECIAL_MINIMUM_RATE, special_minimum_pia};
pub use wage_indexed::{
    BEND_POINT_BASE_WAGE, PIA_BASE_BEND_POINTS, PIA_PERCENTAGES, aime, bend_points,
    indexed_earnings, pia_from_aime, wep_first_factor,
};

/// Everything a method reads. Shared by reference across all methods for
/// one worker.
#[derive(Debug, Clone, Copy)]
pub struct MethodContext<'a> {
    /// The validated worker record.
    pub worker: &'a WorkerRecord,
    /// Derived data for the worker.
    pub data: &'a PiaData,
    /// Law parameters.
    pub law: &'a LawParameters,
}

impl<'a> MethodContext<'a> {
    /// Creates a context.
    pub fn new(worker: &'a WorkerRecord, data: &'a PiaData, law: &'a LawParameters) -> Self {
        Self { worker, data, law }
    }

    /// Month the benefit is computed for.
    pub fn benefit_date(&self) -> MonthYear {
        self.worker.benefit_date()
    }

    /// Year of first eligibility.
    pub fn eligibility_year(&self) -> i32 {
        self.data.eligibility_year
    }
}

/// A method's result and the audit step explaining it.
#[derive(Debug, Clone)]
pub struct MethodOutcome {
    /// The candidate result.
    pub result: MethodResult,
    /// The audit step.
    pub audit_step: AuditStep,
}

/// A benefit computation method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PiaMethod {
    /// Post-1978 wage-indexed formula.
    WageIndexed,
    /// 1937-based computation through the 1939-act primary benefit.
    OldStart,
    /// Pre-1979 benefit table.
    PiaTable,
    /// 1977-act transitional guarantee.
    TransitionalGuarantee,
    /// Special minimum.
    SpecialMinimum,
    /// Frozen minimum.
    FrozenMinimum,
    /// Prior disability PIA guarantee.
    DisabilityGuarantee,
    /// Reindexed widow(er) PIA for the family member with this id.
    ReindexedWidow(String),
}

impl PiaMethod {
    /// Methods that compete for the governing PIA, in tie-break order.
    pub fn governing() -> [PiaMethod; 7] {
        [
            PiaMethod::WageIndexed,
            PiaMethod::OldStart,
            PiaMethod::PiaTable,
            PiaMethod::TransitionalGuarantee,
            PiaMethod::SpecialMinimum,
            PiaMethod::FrozenMinimum,
            PiaMethod::DisabilityGuarantee,
        ]
    }

    /// The kind reported in results.
    pub fn kind(&self) -> MethodKind {
        match self {
            PiaMethod::WageIndexed => MethodKind::WageIndexed,
            PiaMethod::OldStart => MethodKind::OldStart,
            PiaMethod::PiaTable => MethodKind::PiaTable,
            PiaMethod::TransitionalGuarantee => MethodKind::TransitionalGuarantee,
            PiaMethod::SpecialMinimum => MethodKind::SpecialMinimum,
            PiaMethod::FrozenMinimum => MethodKind::FrozenMinimum,
            PiaMethod::DisabilityGuarantee => MethodKind::DisabilityGuarantee,
            PiaMethod::ReindexedWidow(_) => MethodKind::ReindexedWidow,
        }
    }

    fn member<'a>(ctx: &MethodContext<'a>, id: &str) -> EngineResult<&'a FamilyMember> {
        ctx.worker
            .family
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("no family member with id '{}'", id),
            })
    }

    /// Whether the method applies to this worker.
    pub fn is_applicable(&self, ctx: &MethodContext<'_>) -> bool {
        match self {
            PiaMethod::WageIndexed => wage_indexed::is_applicable(ctx),
            PiaMethod::OldStart => old_start::is_applicable(ctx),
            PiaMethod::PiaTable => pia_table::is_applicable(ctx),
            PiaMethod::TransitionalGuarantee => transitional::is_applicable(ctx),
            PiaMethod::SpecialMinimum => special_minimum::is_applicable(ctx),
            PiaMethod::FrozenMinimum => frozen_minimum::is_applicable(ctx),
            PiaMethod::DisabilityGuarantee => disability_guarantee::is_applicable(ctx),
            PiaMethod::ReindexedWidow(id) => Self::member(ctx, id)
                .map(|member| reindexed_widow::is_applicable(ctx, member))
                .unwrap_or(false),
        }
    }

    /// Runs the method. A method that does not apply yields a
    /// not-applicable result rather than an error.
    pub fn calculate(&self, ctx: &MethodContext<'_>, step_number: u32) -> EngineResult<MethodOutcome> {
        if !self.is_applicable(ctx) {
            return Ok(not_applicable(self.kind(), step_number));
        }
        match self {
            PiaMethod::WageIndexed => wage_indexed::calculate(ctx, step_number),
            PiaMethod::OldStart => old_start::calculate(ctx, step_number),
            PiaMethod::PiaTable => pia_table::calculate(ctx, step_number),
            PiaMethod::TransitionalGuarantee => transitional::calculate(ctx, step_number),
            PiaMethod::SpecialMinimum => special_minimum::calculate(ctx, step_number),
            PiaMethod::FrozenMinimum => frozen_minimum::calculate(ctx, step_number),
            PiaMethod::DisabilityGuarantee => disability_guarantee::calculate(ctx, step_number),
            PiaMethod::ReindexedWidow(id) => {
                reindexed_widow::calculate(ctx, Self::member(ctx, id)?, step_number)
            }
        }
    }
}

fn rule_id(kind: MethodKind) -> String {
    serde_json::to_value(kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{:?}", kind))
}

fn not_applicable(kind: MethodKind, step_number: u32) -> MethodOutcome {
    MethodOutcome {
        result: MethodResult::not_applicable(kind),
        audit_step: AuditStep {
            step_number,
            rule_id: rule_id(kind),
            rule_name: format!("{:?}", kind),
            clause_ref: clause_ref(kind).to_string(),
            input: serde_json::Value::Null,
            output: serde_json::json!({ "applicable": false }),
            reasoning: format!("{:?} does not apply to this worker", kind),
        },
    }
}

/// Statute section for each method.
pub fn clause_ref(kind: MethodKind) -> &'static str {
    match kind {
        MethodKind::WageIndexed => "215(a)(1)",
        MethodKind::OldStart => "215(a)(4)",
        MethodKind::PiaTable => "215(a)(4)",
        MethodKind::TransitionalGuarantee => "215(a)(5)",
        MethodKind::SpecialMinimum => "215(a)(1)(C)",
        MethodKind::FrozenMinimum => "215(a)(1)(C)(ii)",
        MethodKind::DisabilityGuarantee => "215(a)(6)",
        MethodKind::ReindexedWidow => "215(f)(5)",
    }
}

/// An amount raised by a series of benefit increases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raised {
    /// The amount after every increase.
    pub amount: Decimal,
    /// Effective months of the increases applied.
    pub applied: Vec<MonthYear>,
}

/// Raises `amount` by every increase effective after `after` through
/// `through`, rounding after each under the rule for its effective year.
///
/// ```
/// use pia_engine::calculation::methods::raise_by_increases;
/// use pia_engine::config::{BenefitIncrease, LawMetadata, LawParameters, YearTable};
/// use pia_engine::models::MonthYear;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let table = |name: &str| YearTable { table: name.to_string(), values: Default::default() };
/// let law = LawParameters::new(
///     LawMetadata::default(),
///     table("average_wages"),
///     table("wage_bases"),
///     table("qc_amounts"),
///     table("substantial_earnings"),
///     vec![BenefitIncrease {
///         effective: MonthYear::new(2021, 12).unwrap(),
///         percent: Decimal::from_str("5.9").unwrap(),
///     }],
///     vec![],
/// );
/// let raised = raise_by_increases(
///     &law,
///     Decimal::from(1000),
///     MonthYear::new(2020, 12).unwrap(),
///     MonthYear::new(2022, 1).unwrap(),
/// );
/// assert_eq!(raised.amount, Decimal::from_str("1059.0").unwrap());
/// assert_eq!(raised.applied.len(), 1);
/// ```
pub fn raise_by_increases(
    law: &LawParameters,
    amount: Decimal,
    after: MonthYear,
    through: MonthYear,
) -> Raised {
    let mut raised = Raised {
        amount,
        applied: Vec::new(),
    };
    for increase in law.increases_between(after, through) {
        raised.amount = apply_cola(raised.amount, increase.percent, increase.effective.year());
        raised.applied.push(increase.effective);
    }
    raised
}

/// The month after which increases raise a PIA first computed for
/// eligibility in `eligibility_year`.
pub fn cola_start(eligibility_year: i32) -> MonthYear {
    MonthYear::december(eligibility_year - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures;

    #[test]
    fn test_governing_order_is_fixed() {
        let kinds: Vec<MethodKind> = PiaMethod::governing().iter().map(PiaMethod::kind).collect();
        assert_eq!(kinds[0], MethodKind::WageIndexed);
        assert_eq!(kinds[6], MethodKind::DisabilityGuarantee);
        assert!(!kinds.contains(&MethodKind::ReindexedWidow));
    }

    #[test]
    fn test_rule_id_is_snake_case() {
        assert_eq!(rule_id(MethodKind::TransitionalGuarantee), "transitional_guarantee");
    }

    #[test]
    fn test_raise_by_increases_skips_start_month() {
        let law = fixtures::law();
        let raised = raise_by_increases(
            law,
            Decimal::from(100),
            MonthYear::new(1982, 6).unwrap(),
            MonthYear::new(1983, 12).unwrap(),
        );
        // only the December 1983 increase of 3.5%
        assert_eq!(raised.applied, vec![MonthYear::new(1983, 12).unwrap()]);
        assert_eq!(raised.amount, Decimal::new(1035, 1));
    }
}
