//! Configuration loading and management for the fiscal computation engine.
//!
//! This module provides functionality to load yearly rule sets from YAML
//! files. Each file carries every rate, threshold and table the engines need
//! for one fiscal year; nothing fiscal is hard-coded in the engines.
//!
//! # Example
//!
//! ```no_run
//! use fiscal_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap();
//! println!("Loaded years: {:?}", config.years());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CarTaxRules, DEDUCTION_COLUMNS, DeductionBracket, EInvoiceRules, FlightRules,
    MedicalLeaveRules, PenaltyGrid, PenaltyRange, PersonalDeductionRules, PfaRules, RuleSet,
    RuleSetDocument, SalaryRules, SickCodeRule, SrlRules,
};
