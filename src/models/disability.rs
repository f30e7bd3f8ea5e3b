//! Disability period model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dates::MonthYear;

/// Maximum number of disability periods held for one worker.
pub const MAX_DISABILITY_PERIODS: usize = 2;

/// A period of disability.
///
/// A worker holds up to two periods, most recent first. The most recent
/// period may still be open; a prior period must have ceased. The PIA and
/// MFB snapshot is the amount payable in the month before cessation, and
/// is zero while the period is open.
///
/// # Example
///
/// ```
/// use pia_engine::models::{DisabilityPeriod, MonthYear};
/// use chrono::NaiveDate;
///
/// let period = DisabilityPeriod::open(NaiveDate::from_ymd_opt(2010, 3, 15).unwrap());
/// assert!(period.is_open());
/// assert_eq!(period.onset_month(), MonthYear::new(2010, 3).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisabilityPeriod {
    /// Date the disability began.
    pub onset: NaiveDate,
    /// First month of the waiting period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_period_start: Option<MonthYear>,
    /// First month of entitlement to disability benefits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entitlement: Option<MonthYear>,
    /// Month the disability ceased; `None` while the period is open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cessation: Option<MonthYear>,
    /// PIA payable in the month before cessation.
    #[serde(default)]
    pub pia: Decimal,
    /// MFB payable in the month before cessation.
    #[serde(default)]
    pub mfb: Decimal,
}

impl DisabilityPeriod {
    /// Creates an open period with no snapshot.
    pub fn open(onset: NaiveDate) -> Self {
        Self {
            onset,
            waiting_period_start: None,
            entitlement: None,
            cessation: None,
            pia: Decimal::ZERO,
            mfb: Decimal::ZERO,
        }
    }

    /// Creates a closed period with its PIA/MFB snapshot.
    pub fn closed(onset: NaiveDate, cessation: MonthYear, pia: Decimal, mfb: Decimal) -> Self {
        Self {
            cessation: Some(cessation),
            pia,
            mfb,
            ..Self::open(onset)
        }
    }

    /// Returns true if the period has not ceased.
    pub fn is_open(&self) -> bool {
        self.cessation.is_none()
    }

    /// The month of onset.
    pub fn onset_month(&self) -> MonthYear {
        MonthYear::from_date(self.onset)
    }

    /// The month the snapshot was taken, one before cessation.
    pub fn snapshot_month(&self) -> Option<MonthYear> {
        self.cessation.map(|c| c.add_months(-1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_deserialize_closed_period() {
        let json = r#"{
            "onset": "2001-06-10",
            "entitlement": "2001-12",
            "cessation": "2004-03",
            "pia": "812.40",
            "mfb": "1218.60"
        }"#;

        let period: DisabilityPeriod = serde_json::from_str(json).unwrap();
        assert!(!period.is_open());
        assert_eq!(period.pia, Decimal::from_str("812.40").unwrap());
        assert_eq!(period.snapshot_month(), Some(MonthYear::new(2004, 2).unwrap()));
    }

    #[test]
    fn test_deserialize_open_period_defaults_snapshot_to_zero() {
        let json = r#"{ "onset": "2015-02-01" }"#;

        let period: DisabilityPeriod = serde_json::from_str(json).unwrap();
        assert!(period.is_open());
        assert_eq!(period.pia, Decimal::ZERO);
        assert_eq!(period.snapshot_month(), None);
    }
}
