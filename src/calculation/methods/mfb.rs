//! Maximum family benefit formulas for wage-indexed computations.

use rust_decimal::Decimal;

use crate::config::LawParameters;
use crate::error::EngineResult;

use super::super::rounding::round;
use super::wage_indexed::scale_bend_point;

/// Family maximum bend points for 1979 eligibility.
pub const MFB_BASE_BEND_POINTS: [Decimal; 3] = [
    Decimal::from_parts(230, 0, 0, false, 0),
    Decimal::from_parts(332, 0, 0, false, 0),
    Decimal::from_parts(433, 0, 0, false, 0),
];

/// Percentages of PIA in each family maximum bracket.
pub const MFB_PERCENTAGES: [Decimal; 4] = [
    Decimal::from_parts(150, 0, 0, false, 0),
    Decimal::from_parts(272, 0, 0, false, 0),
    Decimal::from_parts(134, 0, 0, false, 0),
    Decimal::from_parts(175, 0, 0, false, 0),
];

/// Share of AIME that caps a disabled worker's family maximum.
const DISABILITY_AIME_SHARE: Decimal = Decimal::from_parts(85, 0, 0, false, 2);

/// Share of PIA that caps a disabled worker's family maximum.
const DISABILITY_PIA_SHARE: Decimal = Decimal::from_parts(150, 0, 0, false, 2);

/// Family maximum bend points for wages indexed to `index_year`.
pub fn mfb_bend_points(law: &LawParameters, index_year: i32) -> EngineResult<[Decimal; 3]> {
    let wage = law.average_wage(index_year)?;
    Ok(MFB_BASE_BEND_POINTS.map(|base| scale_bend_point(base, wage)))
}

/// Family maximum from `pia`, rounded for `year`.
///
/// ```
/// use pia_engine::calculation::methods::{family_maximum, MFB_BASE_BEND_POINTS};
/// use rust_decimal::Decimal;
///
/// // 150% of the first $230, 272% of the next $102, 134% of the last $68
/// let mfb = family_maximum(Decimal::from(400), &MFB_BASE_BEND_POINTS, 1979);
/// assert_eq!(mfb, Decimal::new(7136, 1));
/// ```
pub fn family_maximum(pia: Decimal, bend_points: &[Decimal; 3], year: i32) -> Decimal {
    let mut total = Decimal::ZERO;
    let mut lower = Decimal::ZERO;
    for (i, percent) in MFB_PERCENTAGES.iter().enumerate() {
        let upper = bend_points.get(i).map_or(pia, |bp| (*bp).min(pia));
        if upper > lower {
            total += (upper - lower) * percent / Decimal::ONE_HUNDRED;
        }
        if let Some(bp) = bend_points.get(i) {
            lower = lower.max(*bp);
        }
    }
    round(total, year)
}

/// Family maximum of a disabled worker: the smaller of 85% of AIME and
/// 150% of PIA, but never less than the PIA.
pub fn disability_family_maximum(aime: Decimal, pia: Decimal, year: i32) -> Decimal {
    let cap = (aime * DISABILITY_AIME_SHARE).min(pia * DISABILITY_PIA_SHARE);
    round(cap, year).max(pia)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_family_maximum_top_bracket() {
        // 345 + 277.44 + 135.34 + 175% of 67 = 875.03
        let mfb = family_maximum(dec("500"), &MFB_BASE_BEND_POINTS, 1990);
        assert_eq!(mfb, dec("875.0"));
    }

    #[test]
    fn test_family_maximum_first_bracket() {
        let mfb = family_maximum(dec("200"), &MFB_BASE_BEND_POINTS, 1990);
        assert_eq!(mfb, dec("300"));
    }

    #[test]
    fn test_disability_family_maximum_bounds() {
        // 85% of 1000 is 850, below 150% of 700
        assert_eq!(disability_family_maximum(dec("1000"), dec("700"), 2000), dec("850"));
        // 150% of 400 is 600, below 85% of 1000
        assert_eq!(disability_family_maximum(dec("1000"), dec("400"), 2000), dec("600"));
        // never below the PIA
        assert_eq!(disability_family_maximum(dec("100"), dec("150"), 2000), dec("150"));
    }

    #[test]
    fn test_mfb_bend_points_for_2024_eligibility() {
        let bps = mfb_bend_points(fixtures::law(), 2022).unwrap();
        // published: 1500, 2166, 2825
        assert_eq!(bps, [dec("1500"), dec("2166"), dec("2825")]);
    }
}
