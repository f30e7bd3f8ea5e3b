//! Insured status codes.

use serde::{Deserialize, Serialize};

/// Insured status for retirement and survivor purposes.
///
/// One code is assigned per worker per computation, the strongest that
/// applies. `Permanent` outranks the currently insured codes, so whether a
/// worker is currently insured is read from
/// [`InsuredStatusDetermination::is_currently_insured`](super::InsuredStatusDetermination::is_currently_insured).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuredStatus {
    /// Fully insured with 40 quarters of coverage.
    Permanent,
    /// Fully and currently insured.
    FullyAndCurrently,
    /// Fully insured only.
    Fully,
    /// Fully insured only when foreign quarters are counted.
    Totalized,
    /// Deemed fully insured by special provision.
    Deemed,
    /// Currently insured only.
    Currently,
    /// Not insured.
    Uninsured,
}

impl InsuredStatus {
    /// Returns true if the status satisfies the fully insured requirement.
    pub fn is_fully_insured(self) -> bool {
        matches!(
            self,
            InsuredStatus::Permanent
                | InsuredStatus::FullyAndCurrently
                | InsuredStatus::Fully
                | InsuredStatus::Totalized
                | InsuredStatus::Deemed
        )
    }

    /// Returns true if the worker is permanently insured.
    pub fn is_permanently_insured(self) -> bool {
        self == InsuredStatus::Permanent
    }

    /// Returns true if any benefit can be paid on the record.
    pub fn is_insured(self) -> bool {
        self != InsuredStatus::Uninsured
    }
}

/// Insured status for disability purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisabilityInsuredStatus {
    /// Fully insured with 20 quarters in the 40-quarter window.
    Insured,
    /// Insured under the rule for onset before age 31.
    SpecialInsured,
    /// Statutorily blind and fully insured.
    Blind,
    /// Insured only when foreign quarters are counted.
    Totalized,
    /// Not disability insured.
    NotInsured,
    /// No disability is being evaluated.
    NotApplicable,
}

impl DisabilityInsuredStatus {
    /// Returns true if the worker is disability insured.
    pub fn is_disability_insured(self) -> bool {
        matches!(
            self,
            DisabilityInsuredStatus::Insured
                | DisabilityInsuredStatus::SpecialInsured
                | DisabilityInsuredStatus::Blind
                | DisabilityInsuredStatus::Totalized
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permanent_is_fully_insured() {
        assert!(InsuredStatus::Permanent.is_fully_insured());
        assert!(InsuredStatus::Permanent.is_permanently_insured());
        assert!(!InsuredStatus::FullyAndCurrently.is_permanently_insured());
    }

    #[test]
    fn test_currently_only_is_not_fully() {
        assert!(!InsuredStatus::Currently.is_fully_insured());
        assert!(InsuredStatus::Currently.is_insured());
        assert!(!InsuredStatus::Uninsured.is_insured());
    }

    #[test]
    fn test_disability_predicates() {
        assert!(DisabilityInsuredStatus::SpecialInsured.is_disability_insured());
        assert!(DisabilityInsuredStatus::Blind.is_disability_insured());
        assert!(!DisabilityInsuredStatus::NotApplicable.is_disability_insured());
        assert_eq!(
            serde_json::to_string(&DisabilityInsuredStatus::SpecialInsured).unwrap(),
            "\"special_insured\""
        );
    }
}
