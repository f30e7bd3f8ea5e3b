//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading law
//! parameters and engine settings from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{
    BenefitIncreasesFile, EngineConfig, LawFile, LawMetadata, LawParameters, PiaTablesFile,
    YearTable,
};

/// Loads and provides access to a law-parameter directory.
///
/// # Directory Structure
///
/// ```text
/// config/law/
/// ├── law.yaml                  # Metadata and engine settings
/// ├── average_wages.yaml        # National average wage index
/// ├── wage_bases.yaml           # Contribution and benefit bases
/// ├── qc_amounts.yaml           # Earnings per quarter of coverage
/// ├── substantial_earnings.yaml # Years-of-coverage thresholds
/// ├── benefit_increases.yaml    # Benefit increases and COLAs
/// └── pia_tables.yaml           # Pre-1979 benefit table formulas
/// ```
///
/// # Example
///
/// ```no_run
/// use pia_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/law").unwrap();
/// println!("Loaded law: {}", loader.metadata().name);
/// let awi = loader.law().average_wage(2020).unwrap();
/// println!("AWI 2020: {}", awi);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    law: LawParameters,
    engine: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Fails if any file is missing or malformed, or if any law-parameter
    /// value is outside its domain.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let law_file = Self::load_yaml::<LawFile>(&path.join("law.yaml"))?;
        let average_wages = Self::load_yaml::<YearTable>(&path.join("average_wages.yaml"))?;
        let wage_bases = Self::load_yaml::<YearTable>(&path.join("wage_bases.yaml"))?;
        let qc_amounts = Self::load_yaml::<YearTable>(&path.join("qc_amounts.yaml"))?;
        let substantial_earnings =
            Self::load_yaml::<YearTable>(&path.join("substantial_earnings.yaml"))?;
        let increases =
            Self::load_yaml::<BenefitIncreasesFile>(&path.join("benefit_increases.yaml"))?;
        let pia_tables = Self::load_yaml::<PiaTablesFile>(&path.join("pia_tables.yaml"))?;

        let law = LawParameters::new(
            law_file.law,
            average_wages,
            wage_bases,
            qc_amounts,
            substantial_earnings,
            increases.increases,
            pia_tables.vintages,
        );
        law.validate(&law_file.engine)?;

        debug!(
            path = %path.display(),
            version = %law.metadata().version,
            "Loaded law parameters"
        );

        Ok(Self {
            law,
            engine: law_file.engine,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the law parameters.
    pub fn law(&self) -> &LawParameters {
        &self.law
    }

    /// Returns the engine settings read from `law.yaml`.
    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Returns the law metadata.
    pub fn metadata(&self) -> &LawMetadata {
        self.law.metadata()
    }

    /// Replaces the engine settings.
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ValidationLevel, apply_brackets};
    use crate::models::MonthYear;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/law"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.metadata().version, "2025-01");
        assert_eq!(loader.engine().max_year, 2100);
        assert_eq!(loader.engine().qc_lump_sum_cutoff_year, 1950);
        assert_eq!(loader.engine().validation, ValidationLevel::Strict);
    }

    #[test]
    fn test_year_tables_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let law = loader.law();

        assert_eq!(law.average_wage(1951).unwrap(), dec("2799.16"));
        assert_eq!(law.average_wage(2023).unwrap(), dec("66621.80"));
        assert_eq!(law.wage_base(1937).unwrap(), dec("3000"));
        assert_eq!(law.wage_base(2025).unwrap(), dec("176100"));
        assert_eq!(law.qc_amount(1978).unwrap(), dec("250"));
        assert_eq!(law.substantial_earnings(1979).unwrap(), dec("4725"));
    }

    #[test]
    fn test_benefit_increases_loaded_in_order() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let increases = loader.law().increases();

        assert_eq!(increases.first().unwrap().effective.to_string(), "1952-09");
        assert_eq!(increases.last().unwrap().effective.to_string(), "2024-12");
        assert!(increases.windows(2).all(|w| w[0].effective < w[1].effective));
    }

    #[test]
    fn test_pia_table_vintage_lookup() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let law = loader.law();

        let december_1978 = MonthYear::new(1978, 12).unwrap();
        let vintage = law.pia_table(december_1978).unwrap();
        assert_eq!(vintage.effective.to_string(), "1972-09");
        assert_eq!(vintage.minimum_pia, dec("84.50"));

        let early = MonthYear::new(1968, 1).unwrap();
        assert_eq!(law.pia_table(early).unwrap().effective.to_string(), "1965-01");

        let june_1958 = MonthYear::new(1958, 6).unwrap();
        assert_eq!(law.pia_table(june_1958).unwrap().effective.to_string(), "1954-09");
        let june_1945 = MonthYear::new(1945, 6).unwrap();
        let first = law.pia_table(june_1945).unwrap();
        assert_eq!(first.effective.to_string(), "1940-01");
        assert_eq!(first.minimum_pia, dec("10.00"));
        assert!(law.pia_table(MonthYear::new(1939, 12).unwrap()).is_err());
    }

    #[test]
    fn test_early_tables_cap_the_family_maximum() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let vintage = loader.law().pia_table(MonthYear::new(1958, 6).unwrap()).unwrap();
        // 150% of the first $100 plus 200% of the next $25
        assert_eq!(apply_brackets(&vintage.mfb_brackets, dec("400")), dec("200"));
        // 55% of $110 plus 20% of $240; nothing above the wage base
        assert_eq!(apply_brackets(&vintage.amw_brackets, dec("500")), dec("108.5"));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");
        assert!(result.is_err());

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("law.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_with_engine_overrides_settings() {
        let loader = ConfigLoader::load(config_path()).unwrap().with_engine(EngineConfig {
            validation: ValidationLevel::Lenient,
            ..EngineConfig::default()
        });
        assert_eq!(loader.engine().validation, ValidationLevel::Lenient);
    }
}
