// 10.0: perp market runtime state, one per tradable company. created once at
// initialization and never deleted; the price moves with every tick, the
// volume/open-interest aggregates feed the daily snapshots.
// 10.1 has ticker derivation, 10.2 the snapshot record.

use crate::types::{OrgId, Price, Quote, Ticker};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerpMarket {
    pub ticker: Ticker,
    pub organization_id: OrgId,
    pub name: String,
    pub current_price: Price,
    /// Annualized funding rate applied to open notional.
    pub funding_rate: Decimal,
    /// Cumulative filled notional (opens and closes both count).
    pub volume: Quote,
    /// Open notional across all live positions on this market.
    pub open_interest: Quote,
}

impl PerpMarket {
    pub fn new(
        ticker: Ticker,
        organization_id: OrgId,
        name: String,
        initial_price: Price,
        funding_rate: Decimal,
    ) -> Self {
        Self {
            ticker,
            organization_id,
            name,
            current_price: initial_price,
            funding_rate,
            volume: Quote::zero(),
            open_interest: Quote::zero(),
        }
    }

    pub fn record_open(&mut self, notional: Quote) {
        self.volume = self.volume.add(notional);
        self.open_interest = self.open_interest.add(notional);
    }

    pub fn record_close(&mut self, notional: Quote) {
        self.volume = self.volume.add(notional);
        let remaining = self.open_interest.sub(notional);
        // sanity clamp
        self.open_interest = if remaining.is_negative() {
            Quote::zero()
        } else {
            remaining
        };
    }
}

// 10.1: ticker derivation. deterministic in (name, org id, already-taken set):
// uppercase alphanumeric prefix of the name, disambiguated with org-id
// characters on collision. no randomness, so the same org list always yields
// the same symbols.
pub fn derive_ticker(name: &str, org_id: &OrgId, taken: &HashSet<Ticker>) -> Ticker {
    let mut base: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(4)
        .collect::<String>()
        .to_ascii_uppercase();

    if base.is_empty() {
        base.push('X');
    }

    let candidate = Ticker::new(base.clone());
    if !taken.contains(&candidate) {
        return candidate;
    }

    for c in org_id.as_str().chars().filter(|c| c.is_ascii_alphanumeric()) {
        base.push(c.to_ascii_uppercase());
        let candidate = Ticker::new(base.clone());
        if !taken.contains(&candidate) {
            return candidate;
        }
    }

    // exhausted the id: number the symbol
    let mut n = 2u32;
    loop {
        let candidate = Ticker::new(format!("{base}{n}"));
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

// 10.2: append-only daily capture per ticker. insertion order = chronological.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    pub ticker: Ticker,
    pub price: Price,
    pub volume: Quote,
    pub open_interest: Quote,
}
