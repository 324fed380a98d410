// 7.0: liquidation math. pure functions, no engine state.
//
// a position is force-closed when adverse price movement consumes 90% of its
// initial margin: the maintenance buffer is the remaining 10%. as a fraction
// of entry price that buffer is 0.9 / leverage, so higher leverage puts the
// liquidation price closer to entry. the threshold is fixed at open time and
// never recomputed.

use crate::types::{Leverage, Price, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fraction of initial margin that may be lost before forced close.
pub const MAINTENANCE_BUFFER: Decimal = dec!(0.9);

/// Price at which a position gets liquidated.
/// Long: entry * (1 - 0.9/leverage). Short: entry * (1 + 0.9/leverage).
pub fn liquidation_price(entry_price: Price, side: Side, leverage: Leverage) -> Price {
    let buffer_fraction = MAINTENANCE_BUFFER / leverage.value();

    let liq = match side {
        Side::Long => entry_price.value() * (Decimal::ONE - buffer_fraction),
        Side::Short => entry_price.value() * (Decimal::ONE + buffer_fraction),
    };

    Price::new_unchecked(liq.max(dec!(0.0001)))
}

/// Longs liquidate when price falls to or through the threshold, shorts when
/// it rises to or through it.
pub fn should_liquidate(current_price: Price, liq_price: Price, side: Side) -> bool {
    match side {
        Side::Long => current_price <= liq_price,
        Side::Short => current_price >= liq_price,
    }
}
