// 11.0: the perpetuals engine. owns markets, open positions, and daily
// snapshots; marks and liquidates against whatever price map the driver
// hands it. deterministic and event-driven with no external I/O.

mod config;
mod core;
mod funding;
mod positions;
mod results;
mod snapshots;

pub use config::EngineConfig;
pub use core::PerpetualsEngine;
pub use positions::{OpenPositionRequest, OrderType};
pub use results::{CloseResult, EngineError, LiquidationRecord};
