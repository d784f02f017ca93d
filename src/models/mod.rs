//! Core data models for the fiscal computation engine.
//!
//! This module contains the result records and classification types shared
//! by the engines and the rule tables.

mod calculation_result;
mod contributor;
mod flight;
mod holiday;
mod vehicle;

pub use calculation_result::{
    AuditStep, AuditTrace, AuditWarning, CalculationResult, Component, Regime, SolverStatus,
};
pub use contributor::ContributorSize;
pub use flight::{Airport, DistanceBracket, GeoPoint};
pub use holiday::{HolidayEntry, HolidayKind};
pub use vehicle::{DisplacementBracket, EmissionClass, MotorcycleBracket, VehicleType};
