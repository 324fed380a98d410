// 8.0: position record and pnl math. pnl = notional * price-change fraction,
// flipped for shorts.
//
// unrealized pnl is always recomputed from (entry, current, side, size) and
// never accumulated tick-over-tick, so long-running simulations cannot drift.
// the liquidation price is the one field that is fixed at open time.

use crate::types::{Leverage, Price, PositionId, Quote, Side, Ticker, Timestamp, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    Open,
    Closed,
    Liquidated,
}

/// Unrealized profit/loss with the return-on-notional percentage.
/// pnl_percent always carries the same sign as pnl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pnl {
    pub pnl: Quote,
    pub pnl_percent: Decimal,
}

impl Pnl {
    pub fn zero() -> Self {
        Self {
            pnl: Quote::zero(),
            pnl_percent: Decimal::ZERO,
        }
    }
}

// 8.1: the pnl formula. frac = (current - entry) / entry; long earns
// size * frac, short earns size * -frac. percent is pnl over notional.
pub fn unrealized_pnl(entry_price: Price, current_price: Price, side: Side, size: Quote) -> Pnl {
    let price_change_frac =
        (current_price.value() - entry_price.value()) / entry_price.value();
    let pnl = size.value() * price_change_frac * side.sign();

    Pnl {
        pnl: Quote::new(pnl),
        pnl_percent: pnl / size.value() * dec!(100),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub user_id: UserId,
    pub ticker: Ticker,
    pub side: Side,
    /// Notional exposure in quote currency, always positive. Leverage scales
    /// margin and liquidation distance, not pnl-per-dollar-of-move.
    pub size: Quote,
    pub leverage: Leverage,
    pub entry_price: Price,
    /// Fixed at open time, never recomputed.
    pub liquidation_price: Price,
    pub current_price: Price,
    pub unrealized_pnl: Quote,
    pub pnl_percent: Decimal,
    pub opened_at: Timestamp,
    pub status: PositionStatus,
    pub realized_pnl: Option<Quote>,
    pub closed_at: Option<Timestamp>,
}

impl Position {
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    /// Margin the external ledger is expected to have reserved: size / leverage.
    pub fn initial_margin(&self) -> Quote {
        Quote::new(self.size.value() * self.leverage.initial_margin_fraction())
    }

    /// Re-mark against a new price: recompute unrealized pnl from source
    /// fields.
    pub fn mark(&mut self, price: Price) {
        let pnl = unrealized_pnl(self.entry_price, price, self.side, self.size);
        self.current_price = price;
        self.unrealized_pnl = pnl.pnl;
        self.pnl_percent = pnl.pnl_percent;
    }

    /// Terminal transition. Freezes realized pnl at `exit_price` and zeroes
    /// the unrealized figures.
    pub fn settle(&mut self, exit_price: Price, status: PositionStatus, at: Timestamp) -> Quote {
        debug_assert!(status != PositionStatus::Open);

        let pnl = unrealized_pnl(self.entry_price, exit_price, self.side, self.size);
        self.current_price = exit_price;
        self.unrealized_pnl = Quote::zero();
        self.pnl_percent = Decimal::ZERO;
        self.status = status;
        self.realized_pnl = Some(pnl.pnl);
        self.closed_at = Some(at);
        pnl.pnl
    }
}
