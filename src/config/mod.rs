//! Configuration loading and management for the PIA engine.
//!
//! This module loads the year-indexed law-parameter tables (average wages,
//! wage bases, quarter-of-coverage amounts, benefit increases, historical
//! benefit tables) and the immutable engine settings from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use pia_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/law").unwrap();
//! println!("Loaded law: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    apply_brackets, BenefitIncrease, Bracket, EngineConfig, LawMetadata, LawParameters,
    PiaTableVintage, ValidationLevel, YearTable, DEFAULT_MAX_YEAR,
    DEFAULT_QC_LUMP_SUM_CUTOFF_YEAR, FIRST_COVERED_YEAR,
};

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::OnceLock;

    use super::{ConfigLoader, LawParameters};

    /// The shipped law directory, loaded once per test binary.
    pub fn law() -> &'static LawParameters {
        static LOADER: OnceLock<ConfigLoader> = OnceLock::new();
        LOADER
            .get_or_init(|| ConfigLoader::load("./config/law").unwrap())
            .law()
    }
}
