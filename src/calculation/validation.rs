//! Scenario input checks applied before any calculation.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Largest amount accepted as an input (10^15 RON).
///
/// Products of two inputs stay far inside the `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Rejects negative monetary inputs and amounts above [`MAX_AMOUNT`].
pub(crate) fn ensure_non_negative(field: &str, value: Decimal) -> EngineResult<Decimal> {
    if value < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            field,
            format!("must not be negative, got {}", value),
        ));
    }
    if value > MAX_AMOUNT {
        return Err(EngineError::invalid_input(
            field,
            format!("must not exceed {}, got {}", MAX_AMOUNT, value),
        ));
    }
    Ok(value)
}

/// Rejects NaN, infinite or negative floating-point inputs.
pub(crate) fn ensure_finite_non_negative(field: &str, value: f64) -> EngineResult<f64> {
    if !value.is_finite() {
        return Err(EngineError::invalid_input(
            field,
            format!("must be finite, got {}", value),
        ));
    }
    if value < 0.0 {
        return Err(EngineError::invalid_input(
            field,
            format!("must not be negative, got {}", value),
        ));
    }
    Ok(value)
}

/// Rejects fractions outside `[0, 1]`.
pub(crate) fn ensure_fraction(field: &str, value: Decimal) -> EngineResult<Decimal> {
    ensure_non_negative(field, value)?;
    if value > Decimal::ONE {
        return Err(EngineError::invalid_input(
            field,
            format!("must be between 0 and 1, got {}", value),
        ));
    }
    Ok(value)
}
