//! The reindexed PIA for a widow(er) of a worker who died young.
//!
//! Earnings are indexed to the earlier of the year the worker would have
//! reached 60 and two years before the widow(er) reached 60, and the
//! formula takes the bend points of that later year. The result only
//! counts for that family member, and only when it beats the worker's own.

use crate::error::EngineResult;
use crate::models::{AuditStep, FamilyMember, MethodKind, MethodResult, Provenance, attainment_year};

use super::mfb::{family_maximum, mfb_bend_points};
use super::wage_indexed::{FIRST_ELIGIBILITY_YEAR, PIA_PERCENTAGES, compute_indexed};
use super::{MethodContext, MethodOutcome, clause_ref, cola_start, raise_by_increases};

const REINDEX_AGE: u32 = 60;
const WORKER_ELIGIBILITY_AGE: u32 = 62;

/// Indexing year, bend point year and the year `member` reaches 60.
fn reindex_years(ctx: &MethodContext<'_>, member: &FamilyMember) -> (i32, i32, i32) {
    let widow_60 = attainment_year(member.birth_date, REINDEX_AGE);
    let worker_60 = ctx.worker.attainment_year(REINDEX_AGE);
    let bend_point_year = widow_60 - 2;
    (worker_60.min(bend_point_year), bend_point_year, widow_60)
}

pub(super) fn is_applicable(ctx: &MethodContext<'_>, member: &FamilyMember) -> bool {
    let died_young = ctx
        .worker
        .death_month()
        .is_some_and(|death| death < ctx.worker.attainment_month(WORKER_ELIGIBILITY_AGE));
    let (_, _, widow_60) = reindex_years(ctx, member);

    member.beneficiary.is_widow()
        && ctx.worker.is_survivor()
        && died_young
        && ctx.eligibility_year() >= FIRST_ELIGIBILITY_YEAR
        && widow_60 <= ctx.benefit_date().year()
}

pub(super) fn calculate(
    ctx: &MethodContext<'_>,
    member: &FamilyMember,
    step_number: u32,
) -> EngineResult<MethodOutcome> {
    let (index_year, bend_point_year, widow_60) = reindex_years(ctx, member);
    let computed = compute_indexed(ctx, index_year, bend_point_year, widow_60, false)?;
    let mfb_at_eligibility = family_maximum(
        computed.pia,
        &mfb_bend_points(ctx.law, bend_point_year)?,
        widow_60,
    );

    let after = cola_start(widow_60);
    let pia = raise_by_increases(ctx.law, computed.pia, after, ctx.benefit_date());
    let mfb = raise_by_increases(ctx.law, mfb_at_eligibility, after, ctx.benefit_date());

    let result = MethodResult {
        method: MethodKind::ReindexedWidow,
        applicable: true,
        pia: pia.amount,
        mfb: mfb.amount,
        pia_at_eligibility: computed.pia,
        mfb_at_eligibility,
        member_id: Some(member.id.clone()),
        provenance: Provenance {
            average_earnings: Some(computed.aime),
            base_year: Some(ctx.data.new_start.base_year),
            computation_years: Some(ctx.data.new_start.computation_years),
            index_year: Some(computed.index_year),
            bend_points: computed.bend_points.to_vec(),
            percentages: PIA_PERCENTAGES.to_vec(),
            table_effective: None,
            years_of_coverage: None,
            increases_applied: pia.applied,
        },
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "reindexed_widow".to_string(),
        rule_name: "Reindexed Widow(er) PIA".to_string(),
        clause_ref: clause_ref(MethodKind::ReindexedWidow).to_string(),
        input: serde_json::json!({
            "member_id": member.id,
            "widow_age_60_year": widow_60,
            "index_year": index_year,
            "bend_point_year": bend_point_year,
        }),
        output: serde_json::json!({
            "aime": computed.aime.to_string(),
            "pia_at_eligibility": computed.pia.to_string(),
            "pia": result.pia.to_string(),
            "mfb": result.mfb.to_string(),
        }),
        reasoning: format!(
            "Earnings reindexed to {} for {} with bend points of {}: AIME ${}, PIA ${}",
            index_year, member.id, bend_point_year, computed.aime, result.pia
        ),
    };

    Ok(MethodOutcome { result, audit_step })
}
