//! Engine configuration options.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of audit events to retain in memory.
    pub max_events: usize,
    /// Print events as they are emitted.
    pub verbose: bool,
    /// Annualized funding rate assigned to newly created markets.
    pub default_funding_rate: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_events: 100_000,
            verbose: false,
            default_funding_rate: dec!(0.01), // 1% annualized
        }
    }
}
