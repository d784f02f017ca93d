//! Error types for the fiscal computation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition an engine call or a rule-set load can fail on.
//! Solver non-convergence is deliberately absent: it is reported as a
//! warning inside the calculation result.

use thiserror::Error;

/// The main error type for the fiscal computation engine.
///
/// # Example
///
/// ```
/// use fiscal_engine::error::EngineError;
///
/// let error = EngineError::RuleNotFound { year: 2019 };
/// assert_eq!(error.to_string(), "No rule set found for fiscal year 2019");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A scenario value failed basic validation before any calculation.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The offending input field.
        field: String,
        /// A description of what made the value invalid.
        message: String,
    },

    /// No rule set exists for the requested fiscal year.
    #[error("No rule set found for fiscal year {year}")]
    RuleNotFound {
        /// The requested fiscal year.
        year: i32,
    },

    /// A rule set document failed validation.
    #[error("Invalid rule set: {message}")]
    InvalidRuleSet {
        /// A description of the failed check.
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

    /// An airport code is missing from the reference data.
    #[error("Airport not found: {code}")]
    AirportNotFound {
        /// The IATA code that was not found.
        code: String,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for an [`EngineError::InvalidRuleSet`].
    pub fn invalid_rules(message: impl Into<String>) -> Self {
        EngineError::InvalidRuleSet {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
