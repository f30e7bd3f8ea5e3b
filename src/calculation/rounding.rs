//! Monetary rounding and cost-of-living adjustment.
//!
//! Benefit amounts are kept as [`Decimal`] and rounded to the dime with a
//! rule that depends on the year the amount takes effect:
//!
//! | Effective year | Rule                                               |
//! |----------------|----------------------------------------------------|
//! | before 1973    | up to the next dime unless within half a cent      |
//! | 1973 - 1981    | up to the next dime unless already exact           |
//! | 1982 onward    | down to the dime                                   |
//!
//! Statement estimates use a coarser unit: $5 before 2000, $1 afterwards.
//! All functions here are pure.

use rust_decimal::Decimal;

/// First year in which amounts are rounded up to the next dime without tolerance.
pub const ROUND_UP_FIRST_YEAR: i32 = 1973;

/// First year in which amounts are rounded down to the dime.
pub const ROUND_DOWN_FIRST_YEAR: i32 = 1982;

/// First year in which statement estimates are rounded to whole dollars rather than $5.
pub const STATEMENT_DOLLAR_FIRST_YEAR: i32 = 2000;

/// Tolerance below which pre-1973 amounts are not rounded up.
pub const HALF_CENT: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// The rounding unit for benefit amounts.
pub const DIME: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Largest cents amount lost or gained by one rounding step.
const ROUNDING_SPAN: Decimal = Decimal::from_parts(9, 0, 0, false, 2);

const STATEMENT_UNIT_BEFORE_2000: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

fn floor_to_dime(amount: Decimal) -> Decimal {
    (amount * Decimal::TEN).floor() / Decimal::TEN
}

fn ceil_to_dime(amount: Decimal) -> Decimal {
    (amount * Decimal::TEN).ceil() / Decimal::TEN
}

/// Rounds `amount` to the dime under the rule in effect in `year`.
///
/// # Examples
///
/// ```
/// use pia_engine::calculation::round;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let amount = Decimal::from_str("123.41").unwrap();
/// assert_eq!(round(amount, 1990), Decimal::from_str("123.4").unwrap());
/// assert_eq!(round(amount, 1975), Decimal::from_str("123.5").unwrap());
/// assert_eq!(round(Decimal::from_str("123.404").unwrap(), 1970), Decimal::from_str("123.4").unwrap());
/// ```
pub fn round(amount: Decimal, year: i32) -> Decimal {
    if year >= ROUND_DOWN_FIRST_YEAR {
        floor_to_dime(amount)
    } else if year >= ROUND_UP_FIRST_YEAR {
        ceil_to_dime(amount)
    } else {
        let floor = floor_to_dime(amount);
        if amount - floor >= HALF_CENT {
            floor + DIME
        } else {
            floor
        }
    }
}

/// Widens a rounded amount back toward the value it could have come from.
///
/// Amounts rounded down are widened upward by the largest cents amount a
/// rounding could have dropped; amounts rounded up are widened downward.
/// This is not an inverse of [`round`]: `unround(round(x, y), y)` generally
/// differs from `x`.
pub fn unround(amount: Decimal, year: i32) -> Decimal {
    let widened = if year >= ROUND_DOWN_FIRST_YEAR {
        amount + ROUNDING_SPAN
    } else if year >= ROUND_UP_FIRST_YEAR {
        amount - ROUNDING_SPAN
    } else {
        amount - ROUNDING_SPAN - HALF_CENT
    };
    widened.max(Decimal::ZERO)
}

fn cola_factor(percent: Decimal) -> Decimal {
    Decimal::ONE + percent / Decimal::ONE_HUNDRED
}

/// Increases `amount` by `percent` and rounds under the rule for `year`.
///
/// ```
/// use pia_engine::calculation::apply_cola;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let pia = Decimal::from_str("1000.00").unwrap();
/// let raised = apply_cola(pia, Decimal::from_str("5.9").unwrap(), 2021);
/// assert_eq!(raised, Decimal::from_str("1059.0").unwrap());
/// ```
pub fn apply_cola(amount: Decimal, percent: Decimal, year: i32) -> Decimal {
    round(amount * cola_factor(percent), year)
}

/// Removes a cost-of-living increase: un-round for `year`, then divide.
///
/// The result is not rounded. Reapplying the same increase to it yields
/// the original rounded amount.
pub fn unapply_cola(amount: Decimal, percent: Decimal, year: i32) -> Decimal {
    unround(amount, year) / cola_factor(percent)
}

/// Rounds an estimate for a benefit statement: down to $5 before 2000,
/// down to $1 from 2000 onward.
pub fn round_statement(amount: Decimal, year: i32) -> Decimal {
    if year >= STATEMENT_DOLLAR_FIRST_YEAR {
        amount.floor()
    } else {
        (amount / STATEMENT_UNIT_BEFORE_2000).floor() * STATEMENT_UNIT_BEFORE_2000
    }
}

/// Rounds a payable monthly benefit down to the whole dollar.
pub fn round_down_dollar(amount: Decimal) -> Decimal {
    amount.floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_down_from_1982() {
        assert_eq!(round(dec("100.19"), 1982), dec("100.1"));
        assert_eq!(round(dec("100.10"), 2020), dec("100.1"));
    }

    #[test]
    fn test_round_up_1973_through_1981() {
        assert_eq!(round(dec("100.11"), 1973), dec("100.2"));
        assert_eq!(round(dec("100.101"), 1981), dec("100.2"));
        assert_eq!(round(dec("100.10"), 1981), dec("100.1"));
    }

    #[test]
    fn test_round_before_1973_uses_half_cent_threshold() {
        assert_eq!(round(dec("100.104"), 1972), dec("100.1"));
        assert_eq!(round(dec("100.105"), 1972), dec("100.2"));
        assert_eq!(round(dec("100.15"), 1960), dec("100.2"));
    }

    #[test]
    fn test_unround_is_not_an_inverse() {
        let original = dec("100.04");
        let rounded = round(original, 1990);
        assert_eq!(rounded, dec("100.0"));
        assert_eq!(unround(rounded, 1990), dec("100.09"));
        assert_ne!(unround(rounded, 1990), original);
    }

    #[test]
    fn test_unround_direction_flips_at_1982() {
        assert!(unround(dec("50.0"), 1982) > dec("50.0"));
        assert!(unround(dec("50.0"), 1981) < dec("50.0"));
        assert_eq!(unround(dec("50.0"), 1970), dec("49.905"));
    }

    #[test]
    fn test_unround_never_negative() {
        assert_eq!(unround(Decimal::ZERO, 1975), Decimal::ZERO);
    }

    #[test]
    fn test_apply_cola_rounds_for_year() {
        // 100 * 1.099 = 109.9 exactly
        assert_eq!(apply_cola(dec("100.0"), dec("9.9"), 1979), dec("109.9"));
        // 123.4 * 1.143 = 141.0462
        assert_eq!(apply_cola(dec("123.4"), dec("14.3"), 1980), dec("141.1"));
        assert_eq!(apply_cola(dec("123.4"), dec("7.4"), 1982), dec("132.5"));
    }

    #[test]
    fn test_unapply_then_apply_restores_rounded_amount() {
        let raised = apply_cola(dec("100.0"), dec("5.9"), 1990);
        assert_eq!(raised, dec("105.9"));
        let removed = unapply_cola(raised, dec("5.9"), 1990);
        assert!(removed > dec("100.0") && removed < dec("100.1"));
        assert_eq!(apply_cola(removed, dec("5.9"), 1990), raised);
    }

    #[test]
    fn test_zero_cola_is_identity_on_rounded_amounts() {
        assert_eq!(apply_cola(dec("845.6"), Decimal::ZERO, 2010), dec("845.6"));
    }

    #[test]
    fn test_statement_rounding_unit_changes_in_2000() {
        assert_eq!(round_statement(dec("1234.99"), 1999), dec("1230"));
        assert_eq!(round_statement(dec("1234.99"), 2000), dec("1234"));
    }

    #[test]
    fn test_round_down_dollar() {
        assert_eq!(round_down_dollar(dec("1234.9")), dec("1234"));
    }

    proptest! {
        #[test]
        fn round_is_a_multiple_of_a_dime(cents in 0i64..100_000_000, year in 1937i32..2100) {
            let amount = Decimal::new(cents, 3);
            let rounded = round(amount, year);
            prop_assert_eq!((rounded * Decimal::TEN).fract(), Decimal::ZERO);
        }

        #[test]
        fn round_goes_down_from_1982(cents in 0i64..100_000_000, year in 1982i32..2100) {
            let amount = Decimal::new(cents, 3);
            let rounded = round(amount, year);
            prop_assert!(rounded <= amount);
            prop_assert!(amount - rounded < DIME);
        }

        #[test]
        fn round_goes_up_before_1982_within_tolerance(cents in 0i64..100_000_000, year in 1937i32..1982) {
            let amount = Decimal::new(cents, 3);
            let rounded = round(amount, year);
            prop_assert!(rounded >= amount - HALF_CENT);
            prop_assert!(rounded - amount < DIME);
        }
    }
}
