//! Selection of the governing PIA among the method candidates.
//!
//! The highest PIA governs, compared with a strict "greater than" so that
//! an earlier method keeps a tie. When that PIA is the special minimum and
//! the worker earns delayed retirement credit, the credit is figured on
//! the next highest PIA instead, unless the credited amount would fall
//! below the special minimum.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, MethodKind, MethodResult, SelectionRule, WorkerBenefit};

use super::actuarial::{adjustment_months, worker_adjustment_factor};
use super::methods::MethodContext;
use super::rounding::{round, round_down_dollar};

/// The governing choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Method whose PIA governs.
    pub method: MethodKind,
    /// Governing PIA.
    pub pia: Decimal,
    /// Governing MFB.
    pub mfb: Decimal,
    /// How the worker's own benefit is settled.
    pub rule: SelectionRule,
    /// Multiplier for the worker's own benefit.
    pub benefit_factor: Decimal,
}

/// The result of selection, including the worker's own benefit and the audit step.
#[derive(Debug, Clone)]
pub struct SelectionResult {
    /// The governing choice.
    pub selection: Selection,
    /// The worker's own benefit; `None` in a survivor case.
    pub worker_benefit: Option<WorkerBenefit>,
    /// The audit step recording the decision.
    pub audit_step: AuditStep,
}

fn highest<'a>(candidates: impl Iterator<Item = &'a MethodResult>) -> Option<&'a MethodResult> {
    candidates.fold(None, |best, candidate| match best {
        Some(current) if candidate.pia > current.pia => Some(candidate),
        Some(current) => Some(current),
        None => Some(candidate),
    })
}

/// Chooses the governing PIA.
///
/// `adjustment_factor` is the worker's own reduction or credit multiplier;
/// above one it carries delayed retirement credit. Candidates that do not
/// apply, and reindexed widow(er) results, are ignored.
///
/// ```
/// use pia_engine::calculation::select;
/// use pia_engine::models::{MethodKind, MethodResult, SelectionRule};
/// use rust_decimal::Decimal;
///
/// let mut wage_indexed = MethodResult::not_applicable(MethodKind::WageIndexed);
/// wage_indexed.applicable = true;
/// wage_indexed.pia = Decimal::from(1000);
///
/// let selection = select(&[wage_indexed], Decimal::ONE).unwrap();
/// assert_eq!(selection.method, MethodKind::WageIndexed);
/// assert_eq!(selection.rule, SelectionRule::NoSpecialMinimumDrc);
/// ```
pub fn select(candidates: &[MethodResult], adjustment_factor: Decimal) -> Option<Selection> {
    let governing = || {
        candidates
            .iter()
            .filter(|c| c.applicable && c.method != MethodKind::ReindexedWidow)
    };
    let best = highest(governing())?;

    let plain = |result: &MethodResult, rule, factor| Selection {
        method: result.method,
        pia: result.pia,
        mfb: result.mfb,
        rule,
        benefit_factor: factor,
    };

    if best.method != MethodKind::SpecialMinimum || adjustment_factor <= Decimal::ONE {
        return Some(plain(best, SelectionRule::NoSpecialMinimumDrc, adjustment_factor));
    }

    let support = highest(governing().filter(|c| c.method != MethodKind::SpecialMinimum));
    Some(match support {
        Some(support) if support.pia * adjustment_factor >= best.pia => {
            plain(support, SelectionRule::SupportPiaPlusIncrement, adjustment_factor)
        }
        _ => plain(best, SelectionRule::SpecialMinimumIsBenefit, Decimal::ONE),
    })
}

/// Selects the governing PIA for the worker and figures the worker's own
/// benefit from it.
pub fn select_governing(
    ctx: &MethodContext<'_>,
    candidates: &[MethodResult],
    step_number: u32,
) -> EngineResult<SelectionResult> {
    let worker = ctx.worker;
    let months = if worker.is_survivor() || worker.is_disability() {
        0
    } else {
        adjustment_months(worker.birth_date, worker.entitlement_date)
    };
    let factor = worker_adjustment_factor(worker.birth_date, months);

    let selection = select(candidates, factor).ok_or_else(|| EngineError::CalculationError {
        message: format!("no benefit method applies to worker '{}'", worker.id),
    })?;

    let worker_benefit = (!worker.is_survivor()).then(|| {
        let monthly = round(selection.pia * selection.benefit_factor, ctx.benefit_date().year());
        WorkerBenefit {
            pia: selection.pia,
            adjustment_months: months,
            adjustment_factor: selection.benefit_factor,
            monthly_benefit: monthly,
            payable: round_down_dollar(monthly),
        }
    });

    let audit_step = AuditStep {
        step_number,
        rule_id: "method_selection".to_string(),
        rule_name: "Governing PIA Selection".to_string(),
        clause_ref: "215(a)".to_string(),
        input: serde_json::json!({
            "candidates": candidates
                .iter()
                .filter(|c| c.applicable)
                .map(|c| serde_json::json!({ "method": c.method, "pia": c.pia.to_string() }))
                .collect::<Vec<_>>(),
            "adjustment_months": months,
            "adjustment_factor": factor.to_string(),
        }),
        output: serde_json::json!({
            "method": selection.method,
            "rule": selection.rule,
            "pia": selection.pia.to_string(),
            "mfb": selection.mfb.to_string(),
            "payable": worker_benefit.as_ref().map(|b| b.payable.to_string()),
        }),
        reasoning: match selection.rule {
            SelectionRule::NoSpecialMinimumDrc => {
                format!("{:?} gives the highest PIA, ${}", selection.method, selection.pia)
            }
            SelectionRule::SpecialMinimumIsBenefit => format!(
                "Special minimum ${} exceeds every other PIA with delayed credit; paid without credit",
                selection.pia
            ),
            SelectionRule::SupportPiaPlusIncrement => format!(
                "Special minimum is highest, but {:?} PIA ${} with delayed credit ({}) is at least as much",
                selection.method, selection.pia, selection.benefit_factor
            ),
        },
    };

    Ok(SelectionResult {
        selection,
        worker_benefit,
        audit_step,
    })
}
