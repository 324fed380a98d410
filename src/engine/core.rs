// 11.1 engine/core.rs: main engine struct. holds markets, positions,
// snapshots, and the audit log. prices arrive as plain values from the
// driver; this engine never holds a reference into the price engine's state,
// keeping the two independently testable and serializable.

use super::config::EngineConfig;
use crate::events::{Event, EventId, EventPayload};
use crate::market::{derive_ticker, DailySnapshot, PerpMarket};
use crate::org::Organization;
use crate::position::Position;
use crate::types::{OrgId, PositionId, Price, Ticker, Timestamp, UserId};
use std::collections::{HashMap, HashSet};

#[derive(Debug)]
pub struct PerpetualsEngine {
    pub(super) config: EngineConfig,
    pub(super) markets: HashMap<Ticker, PerpMarket>,
    /// org id -> ticker, so price maps may be keyed either way.
    pub(super) org_index: HashMap<OrgId, Ticker>,
    /// Every position ever opened. Closed/liquidated ones are retained with
    /// terminal status; only the open indexes below shrink.
    pub(super) positions: HashMap<PositionId, Position>,
    pub(super) open_by_user: HashMap<UserId, Vec<PositionId>>,
    pub(super) open_by_ticker: HashMap<Ticker, Vec<PositionId>>,
    pub(super) snapshots: HashMap<Ticker, Vec<DailySnapshot>>,
    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) next_position_id: u64,
    pub(super) current_time: Timestamp,
}

impl PerpetualsEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            markets: HashMap::new(),
            org_index: HashMap::new(),
            positions: HashMap::new(),
            open_by_user: HashMap::new(),
            open_by_ticker: HashMap::new(),
            snapshots: HashMap::new(),
            events: Vec::new(),
            next_event_id: 1,
            next_position_id: 1,
            current_time: Timestamp::from_millis(0),
        }
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, millis: i64) {
        self.current_time = Timestamp::from_millis(self.current_time.as_millis() + millis);
    }

    /// Create one market per tradable organization. Same filter as the price
    /// engine: companies with a positive starting price. Tickers are derived
    /// deterministically from the name, disambiguated with the org id.
    /// Already-initialized orgs are left untouched.
    pub fn initialize_markets(&mut self, orgs: &[Organization]) {
        let mut taken: HashSet<Ticker> = self.markets.keys().cloned().collect();

        for org in orgs.iter().filter(|o| o.tradable()) {
            if self.org_index.contains_key(&org.id) {
                continue;
            }
            let Some(initial) = org.initial_price.and_then(Price::new) else {
                continue;
            };

            let ticker = derive_ticker(&org.name, &org.id, &taken);
            taken.insert(ticker.clone());

            let market = PerpMarket::new(
                ticker.clone(),
                org.id.clone(),
                org.name.clone(),
                initial,
                self.config.default_funding_rate,
            );

            self.org_index.insert(org.id.clone(), ticker.clone());
            self.markets.insert(ticker, market);
        }
    }

    pub fn get_markets(&self) -> Vec<&PerpMarket> {
        self.markets.values().collect()
    }

    pub fn get_market(&self, ticker: &Ticker) -> Option<&PerpMarket> {
        self.markets.get(ticker)
    }

    pub fn market_for_org(&self, org_id: &OrgId) -> Option<&PerpMarket> {
        self.org_index.get(org_id).and_then(|t| self.markets.get(t))
    }

    /// Any-status lookup.
    pub fn get_position(&self, position_id: PositionId) -> Option<&Position> {
        self.positions.get(&position_id)
    }

    /// Open positions only, order not significant.
    pub fn get_user_positions(&self, user_id: &UserId) -> Vec<&Position> {
        self.open_by_user
            .get(user_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.positions.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn open_position_count(&self) -> usize {
        self.open_by_ticker.values().map(Vec::len).sum()
    }

    /// Resolve a price-map key that may be a ticker or an org id.
    pub(super) fn resolve_ticker(&self, key: &str) -> Option<Ticker> {
        let as_ticker = Ticker::new(key);
        if self.markets.contains_key(&as_ticker) {
            return Some(as_ticker);
        }
        self.org_index.get(&OrgId::new(key)).cloned()
    }

    pub(super) fn remove_from_open_indexes(
        &mut self,
        position_id: PositionId,
        user_id: &UserId,
        ticker: &Ticker,
    ) {
        if let Some(ids) = self.open_by_user.get_mut(user_id) {
            ids.retain(|id| *id != position_id);
        }
        if let Some(ids) = self.open_by_ticker.get_mut(ticker) {
            ids.retain(|id| *id != position_id);
        }
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        if self.config.verbose {
            println!("[Event {}] {:?}", event.id.0, event.payload);
        }

        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }
}
