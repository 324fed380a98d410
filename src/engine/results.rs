// 11.2: result types and errors for engine operations.

use crate::types::{PositionId, Price, Quote, Side, Ticker, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of a voluntary close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseResult {
    pub position_id: PositionId,
    pub exit_price: Price,
    pub realized_pnl: Quote,
}

/// One forced liquidation performed during a tick. Reported back to the
/// driver; also visible in the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidationRecord {
    pub position_id: PositionId,
    pub user_id: UserId,
    pub ticker: Ticker,
    pub side: Side,
    pub size: Quote,
    /// Threshold fixed at open time; realized pnl settles here.
    pub liquidation_price: Price,
    /// The tick price that tripped the threshold.
    pub trigger_price: Price,
    pub realized_pnl: Quote,
}

// domain-invalid operations fail loudly with these. not-found probes on the
// price engine side stay Option/empty by contract.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("Unknown market {0}")]
    UnknownMarket(Ticker),

    #[error("Position {0} not found or not open")]
    PositionNotFound(PositionId),

    #[error("Invalid position size {0}: must be positive")]
    InvalidSize(Decimal),

    #[error("Invalid leverage {0}: must be at least 1")]
    InvalidLeverage(Decimal),
}
