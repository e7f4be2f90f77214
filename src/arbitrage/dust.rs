//! Exchange quantity precision ("dust") rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Fractional digits kept before truncating to an instrument's precision.
pub const FIXED_POINT_DIGITS: u32 = 12;

/// Truncate `amount` to `dust_decimals` fractional digits.
///
/// The amount is first fixed to [`FIXED_POINT_DIGITS`] so noise left over
/// from earlier divisions cannot leak into the truncated quantity. Truncation
/// never rounds up: exchanges reject orders above their quantity precision.
pub fn calculate_dustless(amount: Decimal, dust_decimals: u32) -> Decimal {
    if amount.fract().is_zero() {
        return amount.normalize();
    }

    amount
        .round_dp_with_strategy(FIXED_POINT_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .round_dp_with_strategy(dust_decimals, RoundingStrategy::ToZero)
        .normalize()
}
