//! Family benefits and the family maximum.
//!
//! Each family member's benefit runs through four stages: the full
//! benefit (a share of the PIA), the benefit after the family maximum, the
//! benefit after the member's actuarial reduction, and the payable amount
//! rounded down to the dollar. While the worker is alive the worker's own
//! PIA counts against the family maximum.

use rust_decimal::Decimal;

use crate::models::{
    AuditStep, BeneficiaryType, BenefitChain, FamilyMember, MethodKind, MethodResult, MonthYear,
    attainment_month,
};

use super::actuarial::{
    WIDOW_EARLIEST_AGE, normal_retirement_month, spouse_reduction, widow_normal_retirement_month,
    widow_reduction,
};
use super::methods::MethodContext;
use super::rounding::{round, round_down_dollar};
use super::selection::Selection;

const HALF: Decimal = Decimal::from_parts(50, 0, 0, false, 2);
const THREE_QUARTERS: Decimal = Decimal::from_parts(75, 0, 0, false, 2);
const ONE_PARENT: Decimal = Decimal::from_parts(825, 0, 0, false, 3);

/// Share of the PIA payable to a beneficiary before any reduction.
///
/// ```
/// use pia_engine::calculation::pia_factor;
/// use pia_engine::models::BeneficiaryType;
/// use rust_decimal::Decimal;
///
/// assert_eq!(pia_factor(BeneficiaryType::Child, false, 0), Decimal::new(50, 2));
/// assert_eq!(pia_factor(BeneficiaryType::Child, true, 0), Decimal::new(75, 2));
/// assert_eq!(pia_factor(BeneficiaryType::Parent, true, 1), Decimal::new(825, 3));
/// ```
pub fn pia_factor(beneficiary: BeneficiaryType, survivor_case: bool, parents: usize) -> Decimal {
    match beneficiary {
        BeneficiaryType::Spouse | BeneficiaryType::DivorcedSpouse => HALF,
        BeneficiaryType::Child if survivor_case => THREE_QUARTERS,
        BeneficiaryType::Child => HALF,
        BeneficiaryType::Widow | BeneficiaryType::DisabledWidow | BeneficiaryType::DivorcedWidow => {
            Decimal::ONE
        }
        BeneficiaryType::MotherFather => THREE_QUARTERS,
        BeneficiaryType::Parent if parents > 1 => THREE_QUARTERS,
        BeneficiaryType::Parent => ONE_PARENT,
    }
}

/// Scales the claims subject to the family maximum down pro rata when
/// they exceed `ceiling`. Each claim is `(full benefit, subject to the
/// maximum)`; exempt claims pass through unchanged. Shares are unrounded.
///
/// ```
/// use pia_engine::calculation::family_maximum_shares;
/// use rust_decimal::Decimal;
///
/// let claims = [(Decimal::from(300), true); 4];
/// let shares = family_maximum_shares(&claims, Decimal::from(900));
/// assert!(shares.iter().all(|s| *s == Decimal::from(225)));
/// ```
pub fn family_maximum_shares(claims: &[(Decimal, bool)], ceiling: Decimal) -> Vec<Decimal> {
    let ceiling = ceiling.max(Decimal::ZERO);
    let subject_total: Decimal = claims
        .iter()
        .filter(|(_, subject)| *subject)
        .map(|(full, _)| *full)
        .sum();

    claims
        .iter()
        .map(|&(full, subject)| {
            if subject && subject_total > ceiling {
                ceiling * full / subject_total
            } else {
                full
            }
        })
        .collect()
}

/// Months of entitlement before normal retirement age and the resulting
/// reduction for `member`.
pub fn member_reduction(member: &FamilyMember) -> (u32, Decimal) {
    let months_before = |nra: MonthYear| {
        nra.months_since(member.entitlement_date).max(0) as u32
    };
    match member.beneficiary {
        BeneficiaryType::Spouse | BeneficiaryType::DivorcedSpouse => {
            let months = months_before(normal_retirement_month(member.birth_date));
            (months, spouse_reduction(months))
        }
        BeneficiaryType::Widow | BeneficiaryType::DisabledWidow | BeneficiaryType::DivorcedWidow => {
            let nra = widow_normal_retirement_month(member.birth_date);
            let months = months_before(nra);
            let span = nra
                .months_since(attainment_month(member.birth_date, WIDOW_EARLIEST_AGE))
                .max(0) as u32;
            (months, widow_reduction(months, span))
        }
        _ => (0, Decimal::ZERO),
    }
}

/// Family chains with their audit step.
#[derive(Debug, Clone)]
pub struct FamilyResult {
    /// One chain per family member, in input order.
    pub chains: Vec<BenefitChain>,
    /// The audit step recording the distribution.
    pub audit_step: AuditStep,
}

/// The PIA a member's benefit is figured from: a reindexed widow(er) PIA
/// for that member when it exceeds the governing PIA.
fn member_pia(member: &FamilyMember, governing: Decimal, candidates: &[MethodResult]) -> Decimal {
    candidates
        .iter()
        .filter(|c| c.applicable && c.method == MethodKind::ReindexedWidow)
        .filter(|c| c.member_id.as_deref() == Some(member.id.as_str()))
        .map(|c| c.pia)
        .fold(governing, |best, pia| if pia > best { pia } else { best })
}

/// Figures the benefit chain of every entitled member in `members`.
/// Members left out are neither paid nor counted against the maximum.
pub fn family_benefits(
    ctx: &MethodContext<'_>,
    members: &[FamilyMember],
    selection: &Selection,
    candidates: &[MethodResult],
    step_number: u32,
) -> FamilyResult {
    let worker = ctx.worker;
    let year = ctx.benefit_date().year();
    let survivor = worker.is_survivor();
    let parents = members
        .iter()
        .filter(|m| m.beneficiary == BeneficiaryType::Parent)
        .count();

    let ceiling = if survivor {
        selection.mfb
    } else {
        selection.mfb - selection.pia
    };

    let claims: Vec<(Decimal, Decimal, bool)> = members
        .iter()
        .map(|member| {
            let pia = member_pia(member, selection.pia, candidates);
            let factor = pia_factor(member.beneficiary, survivor, parents);
            let subject = !member.beneficiary.is_exempt_from_family_maximum();
            (pia, factor, subject)
        })
        .collect();

    let fulls: Vec<(Decimal, bool)> = claims
        .iter()
        .map(|&(pia, factor, subject)| (round(pia * factor, year), subject))
        .collect();
    let shares = family_maximum_shares(&fulls, ceiling);

    let chains: Vec<BenefitChain> = members
        .iter()
        .zip(claims.iter().zip(fulls.iter().zip(shares)))
        .map(|(member, (&(pia, factor, _), (&(full, _), share)))| {
            let family_max_reduced = round(share, year);
            let (months, reduction) = member_reduction(member);
            let actuarially_reduced = round(family_max_reduced * (Decimal::ONE - reduction), year);
            BenefitChain {
                member_id: member.id.clone(),
                beneficiary: member.beneficiary,
                pia,
                pia_factor: factor,
                full,
                family_max_reduced,
                actuarially_reduced,
                rounded: round_down_dollar(actuarially_reduced),
                reduction_months: months,
            }
        })
        .collect();

    let subject_total: Decimal = fulls.iter().filter(|(_, s)| *s).map(|(f, _)| *f).sum();
    let audit_step = AuditStep {
        step_number,
        rule_id: "family_maximum".to_string(),
        rule_name: "Family Maximum Distribution".to_string(),
        clause_ref: "203(a)".to_string(),
        input: serde_json::json!({
            "mfb": selection.mfb.to_string(),
            "available": ceiling.max(Decimal::ZERO).to_string(),
            "members": members.len(),
            "excluded": worker.family.len().saturating_sub(members.len()),
        }),
        output: serde_json::json!(chains),
        reasoning: if subject_total > ceiling {
            format!(
                "Benefits of ${} exceed the ${} available under the family maximum; reduced pro rata",
                subject_total,
                ceiling.max(Decimal::ZERO)
            )
        } else {
            format!(
                "Benefits of ${} are within the ${} available under the family maximum",
                subject_total,
                ceiling.max(Decimal::ZERO)
            )
        },
    };

    FamilyResult { chains, audit_step }
}
