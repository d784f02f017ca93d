//! Fiscal computation engine for Romanian taxes and contributions
//!
//! This crate computes payroll, self-employment and micro-company taxes,
//! break-even points between regimes, medical leave indemnities, local
//! vehicle tax, e-invoice reporting deadlines and penalties, and EU261
//! flight compensation from versioned yearly rule sets.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;

/// Version of the engine stamped on every calculation result.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
