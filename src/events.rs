// 12.0: every perps-engine state change produces an audit event. used for
// audit trails and for notifying external systems (reporting read-models,
// the reward pipeline). the EventPayload enum lists all event types.

use crate::types::{Leverage, Price, PositionId, Quote, Side, Ticker, Timestamp, UserId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    PositionOpened(PositionOpenedEvent),
    PositionClosed(PositionClosedEvent),
    PositionLiquidated(PositionLiquidatedEvent),
    SnapshotRecorded(SnapshotRecordedEvent),
    FundingAccrued(FundingAccruedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionOpenedEvent {
    pub position_id: PositionId,
    pub user_id: UserId,
    pub ticker: Ticker,
    pub side: Side,
    pub size: Quote,
    pub leverage: Leverage,
    pub entry_price: Price,
    pub liquidation_price: Price,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionClosedEvent {
    pub position_id: PositionId,
    pub user_id: UserId,
    pub ticker: Ticker,
    pub exit_price: Price,
    pub realized_pnl: Quote,
}

// liquidation is a normal terminal transition, not an error. the event is
// the only loud part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionLiquidatedEvent {
    pub position_id: PositionId,
    pub user_id: UserId,
    pub ticker: Ticker,
    pub liquidation_price: Price,
    pub trigger_price: Price,
    pub realized_pnl: Quote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecordedEvent {
    pub date: NaiveDate,
    pub markets: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingAccruedEvent {
    pub hours: Decimal,
    pub positions: usize,
    pub net_amount: Quote,
}
