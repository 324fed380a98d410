// 9.0: funding math. pure per-hour pro-rata of an annualized rate.
// settlement cadence (every 8h, daily, whatever) is a caller concern; the
// formula itself is cadence-free. engine-level accrual reporting lives in
// engine/funding.rs.

use crate::types::{PositionId, Quote, Side, Ticker, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const HOURS_PER_YEAR: Decimal = dec!(8760); // 365 * 24

/// Funding owed for holding `position_size` notional at `annual_rate` for
/// `hours_elapsed`: size * (rate / 8760) * hours.
pub fn funding_payment(position_size: Quote, annual_rate: Decimal, hours_elapsed: Decimal) -> Quote {
    Quote::new(position_size.value() * (annual_rate / HOURS_PER_YEAR) * hours_elapsed)
}

/// One position's computed funding accrual. Reported by the engine; applying
/// it to a balance is the external ledger's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingPayment {
    pub position_id: PositionId,
    pub user_id: UserId,
    pub ticker: Ticker,
    pub side: Side,
    pub amount: Quote,
    pub annual_rate: Decimal,
    pub hours: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn eight_hours_at_one_percent() {
        let payment = funding_payment(Quote::new(dec!(1000)), dec!(0.01), dec!(8));
        // 1000 * 0.01 / 8760 * 8 = 0.00913...
        assert_eq!(payment.value().round_dp(3), dec!(0.009));
    }

    #[test]
    fn one_day_at_five_percent() {
        let payment = funding_payment(Quote::new(dec!(10000)), dec!(0.05), dec!(24));
        // 10000 * 0.05 / 8760 * 24 = 1.369...
        assert_eq!(payment.value().round_dp(2), dec!(1.37));
    }

    #[test]
    fn zero_hours_zero_payment() {
        let payment = funding_payment(Quote::new(dec!(5000)), dec!(0.05), Decimal::ZERO);
        assert_eq!(payment.value(), Decimal::ZERO);
    }

    #[test]
    fn payment_scales_linearly_in_time() {
        let one = funding_payment(Quote::new(dec!(1000)), dec!(0.02), dec!(1));
        let four = funding_payment(Quote::new(dec!(1000)), dec!(0.02), dec!(4));
        assert_eq!(four.value(), one.value() * dec!(4));
    }
}
