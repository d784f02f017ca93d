//! Monetary rounding shared by every engine.
//!
//! Amounts are rounded half away from zero: to bani (2 decimals) for
//! payroll, self-employment and indemnity figures, and to whole lei for
//! local taxes.

use rust_decimal::{Decimal, RoundingStrategy};

/// One hundred, used for percentage conversions.
pub const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Rounds an amount to 2 decimal places, half away from zero.
///
/// # Examples
///
/// ```
/// use fiscal_engine::calculation::round_money;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_money(dec!(112.505)), dec!(112.51));
/// assert_eq!(round_money(dec!(-0.125)), dec!(-0.13));
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds an amount to whole lei, half away from zero.
///
/// # Examples
///
/// ```
/// use fiscal_engine::calculation::round_lei;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_lei(dec!(180.96)), dec!(181));
/// assert_eq!(round_lei(dec!(180.5)), dec!(181));
/// ```
pub fn round_lei(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Expresses `part` as a percentage of `whole`, rounded to 2 decimals.
///
/// Returns zero when `whole` is zero.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    round_money(part / whole * HUNDRED)
}
