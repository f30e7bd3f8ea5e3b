//! Family member (secondary beneficiary) models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dates::MonthYear;

/// The kind of benefit a family member receives on the worker's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeneficiaryType {
    /// Spouse of a living worker.
    Spouse,
    /// Divorced spouse of a living worker.
    DivorcedSpouse,
    /// Child, of a living or deceased worker.
    Child,
    /// Widow(er) of a deceased worker.
    Widow,
    /// Disabled widow(er), entitled from age 50.
    DisabledWidow,
    /// Surviving divorced spouse.
    DivorcedWidow,
    /// Widow(er) caring for the worker's child.
    MotherFather,
    /// Dependent parent of a deceased worker.
    Parent,
}

impl BeneficiaryType {
    /// Returns true if the type is payable while the worker is alive.
    pub fn is_life_benefit(self) -> bool {
        matches!(
            self,
            BeneficiaryType::Spouse | BeneficiaryType::DivorcedSpouse | BeneficiaryType::Child
        )
    }

    /// Returns true if the type is payable after the worker's death.
    pub fn is_survivor_benefit(self) -> bool {
        !matches!(
            self,
            BeneficiaryType::Spouse | BeneficiaryType::DivorcedSpouse
        )
    }

    /// Returns true if the benefit is outside the family maximum.
    pub fn is_exempt_from_family_maximum(self) -> bool {
        matches!(
            self,
            BeneficiaryType::DivorcedSpouse | BeneficiaryType::DivorcedWidow
        )
    }

    /// Returns true if a survivor claim of this type needs the worker to
    /// have died fully insured. Child and mother/father claims are also
    /// payable when the worker was only currently insured.
    pub fn survivor_requires_fully_insured(self) -> bool {
        !matches!(
            self,
            BeneficiaryType::Child | BeneficiaryType::MotherFather
        )
    }

    /// Returns true for widow(er) types that may use a reindexed PIA.
    pub fn is_widow(self) -> bool {
        matches!(
            self,
            BeneficiaryType::Widow | BeneficiaryType::DisabledWidow | BeneficiaryType::DivorcedWidow
        )
    }
}

/// A family member claiming on the worker's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    /// Identifier, unique within the worker record.
    pub id: String,
    /// Benefit type.
    pub beneficiary: BeneficiaryType,
    /// Date of birth.
    pub birth_date: NaiveDate,
    /// First month of entitlement.
    pub entitlement_date: MonthYear,
}

/// The four-stage value chain of a secondary benefit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitChain {
    /// Family member identifier.
    pub member_id: String,
    /// Benefit type.
    pub beneficiary: BeneficiaryType,
    /// PIA the benefit is figured from.
    pub pia: Decimal,
    /// Percentage of the PIA payable before any reduction.
    pub pia_factor: Decimal,
    /// Unreduced benefit.
    pub full: Decimal,
    /// Benefit after the family maximum.
    pub family_max_reduced: Decimal,
    /// Benefit after the actuarial reduction.
    pub actuarially_reduced: Decimal,
    /// Payable benefit, rounded down to the dollar.
    pub rounded: Decimal,
    /// Months of entitlement before normal retirement age.
    pub reduction_months: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beneficiary_type_serialization() {
        assert_eq!(
            serde_json::to_string(&BeneficiaryType::DivorcedSpouse).unwrap(),
            "\"divorced_spouse\""
        );
        let parsed: BeneficiaryType = serde_json::from_str("\"mother_father\"").unwrap();
        assert_eq!(parsed, BeneficiaryType::MotherFather);
    }

    #[test]
    fn test_divorced_types_are_exempt() {
        assert!(BeneficiaryType::DivorcedSpouse.is_exempt_from_family_maximum());
        assert!(BeneficiaryType::DivorcedWidow.is_exempt_from_family_maximum());
        assert!(!BeneficiaryType::Child.is_exempt_from_family_maximum());
    }

    #[test]
    fn test_spouse_is_not_a_survivor_benefit() {
        assert!(!BeneficiaryType::Spouse.is_survivor_benefit());
        assert!(BeneficiaryType::Child.is_survivor_benefit());
        assert!(BeneficiaryType::Child.is_life_benefit());
        assert!(!BeneficiaryType::Parent.is_life_benefit());
    }

    #[test]
    fn test_survivor_insured_requirement() {
        assert!(!BeneficiaryType::Child.survivor_requires_fully_insured());
        assert!(!BeneficiaryType::MotherFather.survivor_requires_fully_insured());
        assert!(BeneficiaryType::Widow.survivor_requires_fully_insured());
        assert!(BeneficiaryType::DivorcedWidow.survivor_requires_fully_insured());
        assert!(BeneficiaryType::Parent.survivor_requires_fully_insured());
    }
}
