//! Error types for the PIA engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition that aborts a computation: range validation,
//! chronological sequencing, and missing or malformed law parameters.
//! Each error carries a stable numeric [`ErrorCode`] so presentation code can
//! look up its own message text.

use std::fmt;

use thiserror::Error;

/// Stable numeric codes for engine failures.
///
/// Codes are grouped by hundreds: 1xx range validation, 2xx sequencing,
/// 3xx configuration, 4xx internal calculation failures. Numbers are never
/// reused once published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    /// Birth date outside the supported year range.
    BirthDateOutOfRange = 101,
    /// Entitlement year before 1940 or after the maximum year.
    EntitlementYearOutOfRange = 102,
    /// Benefit year outside the supported range.
    BenefitYearOutOfRange = 103,
    /// Earnings reported for a year outside 1937..=max year.
    EarningsYearOutOfRange = 104,
    /// Negative earnings amount.
    NegativeEarnings = 105,
    /// Quarters of coverage outside 0..=4 for a year.
    QuartersOutOfRange = 106,
    /// Disability period count outside its allowed range.
    DisabilityPeriodCountOutOfRange = 107,
    /// Month outside 1..=12.
    MonthOutOfRange = 108,
    /// Quarter outside 0..=3.
    QuarterOutOfRange = 109,
    /// Any other year outside its statutory range.
    YearOutOfRange = 110,
    /// Percentage outside its statutory range.
    PercentageOutOfRange = 111,
    /// Negative monetary amount.
    NegativeAmount = 112,
    /// Disability onset before birth.
    OnsetBeforeBirth = 201,
    /// Disability onset after entitlement or benefit date.
    OnsetAfterEntitlement = 202,
    /// Disability cessation before onset.
    CessationBeforeOnset = 203,
    /// Current entitlement before the prior cessation.
    EntitlementBeforeCessation = 204,
    /// Prior disability period not wholly before the current one.
    PriorPeriodOutOfOrder = 205,
    /// Benefit date before entitlement.
    BenefitDateBeforeEntitlement = 206,
    /// Death before birth, or death after the benefit date.
    DeathOutOfSequence = 207,
    /// A date required by the benefit type is missing.
    MissingRequiredDate = 208,
    /// Family member entitlement out of sequence with the worker.
    FamilyMemberOutOfSequence = 209,
    /// Family member type not payable in this case (e.g. a spouse of a deceased worker).
    BeneficiaryNotAllowed = 210,
    /// A law-parameter table has no value for a needed year.
    MissingLawParameter = 301,
    /// Configuration file or directory not found.
    ConfigNotFound = 302,
    /// Configuration file could not be parsed.
    ConfigParseError = 303,
    /// A law-parameter value is outside its domain.
    InvalidLawParameter = 304,
    /// Internal calculation failure.
    CalculationError = 401,
}

impl ErrorCode {
    /// Returns the numeric value of the code.
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// The main error type for the PIA engine.
///
/// All operations in the engine return this error type. None of these
/// failures is recovered locally: the computation for the worker is
/// abandoned and the error is surfaced to the caller.
///
/// # Example
///
/// ```
/// use pia_engine::error::{EngineError, ErrorCode};
///
/// let error = EngineError::MissingLawParameter {
///     table: "average_wages".to_string(),
///     year: 2030,
/// };
/// assert_eq!(error.code(), ErrorCode::MissingLawParameter);
/// assert_eq!(error.to_string(), "Law parameter 'average_wages' has no value for 2030");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A date, year, percentage, amount or count is outside its domain.
    #[error("Invalid {field} [{code}]: {message}")]
    OutOfRange {
        /// The stable error code.
        code: ErrorCode,
        /// The offending field.
        field: String,
        /// A description of the violated range.
        message: String,
    },

    /// Dates are chronologically inconsistent.
    #[error("Out of sequence {field} [{code}]: {message}")]
    Sequencing {
        /// The stable error code.
        code: ErrorCode,
        /// The field found out of sequence.
        field: String,
        /// A description of the violated ordering.
        message: String,
    },

    /// A law-parameter table is missing a needed year.
    #[error("Law parameter '{table}' has no value for {year}")]
    MissingLawParameter {
        /// The table name.
        table: String,
        /// The year that was requested.
        year: i32,
    },

    /// A law-parameter value is outside its domain.
    #[error("Invalid law parameter '{table}': {message}")]
    InvalidLawParameter {
        /// The table name.
        table: String,
        /// A description of the problem.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Builds a range validation error.
    pub fn out_of_range(code: ErrorCode, field: &str, message: impl Into<String>) -> Self {
        EngineError::OutOfRange {
            code,
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Builds a sequencing error.
    pub fn sequencing(code: ErrorCode, field: &str, message: impl Into<String>) -> Self {
        EngineError::Sequencing {
            code,
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Returns the stable numeric code of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::OutOfRange { code, .. } | EngineError::Sequencing { code, .. } => *code,
            EngineError::MissingLawParameter { .. } => ErrorCode::MissingLawParameter,
            EngineError::InvalidLawParameter { .. } => ErrorCode::InvalidLawParameter,
            EngineError::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            EngineError::ConfigParseError { .. } => ErrorCode::ConfigParseError,
            EngineError::CalculationError { .. } => ErrorCode::CalculationError,
        }
    }

    /// Returns true for errors caused by the worker's input data rather
    /// than by configuration.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            EngineError::OutOfRange { .. } | EngineError::Sequencing { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/law.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/law.yaml"
        );
        assert_eq!(error.code().as_u16(), 302);
    }

    #[test]
    fn test_out_of_range_displays_field_code_and_message() {
        let error = EngineError::out_of_range(
            ErrorCode::EntitlementYearOutOfRange,
            "entitlement_date",
            "year 1939 is before 1940",
        );
        assert_eq!(
            error.to_string(),
            "Invalid entitlement_date [102]: year 1939 is before 1940"
        );
        assert!(error.is_input_error());
    }

    #[test]
    fn test_sequencing_displays_field_code_and_message() {
        let error = EngineError::sequencing(
            ErrorCode::CessationBeforeOnset,
            "disability_periods[0].cessation",
            "cessation 2009-12 precedes onset 2010-03-15",
        );
        assert_eq!(error.code(), ErrorCode::CessationBeforeOnset);
        assert!(error.to_string().starts_with("Out of sequence"));
    }

    #[test]
    fn test_missing_law_parameter_is_configuration_error() {
        let error = EngineError::MissingLawParameter {
            table: "benefit_increases".to_string(),
            year: 2099,
        };
        assert_eq!(error.code().as_u16(), 301);
        assert!(!error.is_input_error());
    }

    #[test]
    fn test_codes_are_grouped_by_hundreds() {
        assert_eq!(ErrorCode::BirthDateOutOfRange.as_u16() / 100, 1);
        assert_eq!(ErrorCode::PriorPeriodOutOfOrder.as_u16() / 100, 2);
        assert_eq!(ErrorCode::InvalidLawParameter.as_u16() / 100, 3);
        assert_eq!(ErrorCode::CalculationError.as_u16() / 100, 4);
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_missing() -> EngineResult<()> {
            Err(EngineError::MissingLawParameter {
                table: "wage_bases".to_string(),
                year: 1936,
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_missing()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
