// 11.5: daily snapshots. append-only per ticker, insertion order is
// chronological. the engine does not dedupe: idempotence per (date, ticker)
// is the caller's responsibility.

use super::core::PerpetualsEngine;
use crate::events::{EventPayload, SnapshotRecordedEvent};
use crate::market::DailySnapshot;
use crate::types::Ticker;
use chrono::NaiveDate;

impl PerpetualsEngine {
    /// Capture one snapshot per market: current price plus the
    /// engine-tracked volume and open-interest aggregates at this instant.
    pub fn record_daily_snapshot(&mut self, date: NaiveDate) {
        let market_count = self.markets.len();

        for market in self.markets.values() {
            let snapshot = DailySnapshot {
                date,
                ticker: market.ticker.clone(),
                price: market.current_price,
                volume: market.volume,
                open_interest: market.open_interest,
            };
            self.snapshots
                .entry(market.ticker.clone())
                .or_default()
                .push(snapshot);
        }

        self.emit_event(EventPayload::SnapshotRecorded(SnapshotRecordedEvent {
            date,
            markets: market_count,
        }));
    }

    /// Chronological snapshot history for a ticker. Empty for unknown tickers.
    pub fn get_daily_snapshots(&self, ticker: &Ticker) -> &[DailySnapshot] {
        self.snapshots
            .get(ticker)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
