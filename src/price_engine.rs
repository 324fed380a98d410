// 6.0: the price engine. one PriceState per tradable company, advanced
// minute-by-minute through a regime-switching random walk and knocked around
// by world-event shocks. all randomness comes from per-company substreams of
// the master seed, so any company's trajectory is reproducible regardless of
// what else is generated in the same run.
//
// unknown-company probes are non-fatal by contract: the driver may query ids
// before initialization completes, or ids that were deliberately excluded
// (media orgs). those return None / empty, never an error.

use crate::impact::{EventDirection, EventMagnitude, PriceShock, WorldEvent};
use crate::org::Organization;
use crate::regime::{draw_return, transition_regime, RegimeParams, VolatilityRegime};
use crate::rng::SimRng;
use crate::types::{OrgId, Price, Timestamp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Price-path calibration. Defaults satisfy the bounded-volatility contract:
/// no single-minute move ever reaches 2%.
#[derive(Debug, Clone)]
pub struct PriceConfig {
    pub regime: RegimeParams,
    /// Hard ceiling on one minute's |return|, applied after the regime draw.
    /// Kept strictly under 0.02.
    pub max_minute_move: f64,
    /// Prices clamp here instead of crossing zero.
    pub min_price: Decimal,
    /// Retained minute points per company. Oldest drop first.
    pub max_history: usize,
    /// Major shocks flip the company's regime to Volatile.
    pub shocks_escalate_regime: bool,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            regime: RegimeParams::default(),
            max_minute_move: 0.019,
            min_price: dec!(0.0001),
            max_history: 10_080, // one simulated week of minutes
            shocks_escalate_regime: true,
        }
    }
}

/// One generated minute point. Returned to the caller; a bounded copy is
/// retained per company for history queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinutePricePoint {
    pub timestamp: Timestamp,
    pub price: Price,
    /// Absolute change vs the previous price.
    pub change: Decimal,
    pub change_percent: Decimal,
}

// 6.1: per-company price state. created at initialization, never destroyed
// within a run. only generate_minute_prices and apply_event_impact mutate it.
#[derive(Debug, Clone)]
pub struct PriceState {
    pub company_id: OrgId,
    pub current_price: Price,
    pub regime: VolatilityRegime,
    rng: SimRng,
    history: Vec<MinutePricePoint>,
}

#[derive(Debug)]
pub struct PriceEngine {
    config: PriceConfig,
    master: SimRng,
    states: HashMap<OrgId, PriceState>,
}

impl PriceEngine {
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, PriceConfig::default())
    }

    pub fn with_config(seed: u64, config: PriceConfig) -> Self {
        Self {
            config,
            master: SimRng::from_seed(seed),
            states: HashMap::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.master.seed()
    }

    /// Create one price state per tradable company. Non-companies and
    /// companies without a starting price are silently excluded. Re-passing
    /// an already-tracked id leaves its state untouched. Empty input is a
    /// no-op.
    pub fn initialize_companies(&mut self, orgs: &[Organization]) {
        for org in orgs.iter().filter(|o| o.tradable()) {
            // filter guarantees the price is present and positive
            let Some(initial) = org.initial_price.and_then(Price::new) else {
                continue;
            };

            self.states.entry(org.id.clone()).or_insert_with(|| PriceState {
                company_id: org.id.clone(),
                current_price: initial,
                regime: VolatilityRegime::Normal,
                rng: self.master.substream(org.id.as_str()),
                history: Vec::new(),
            });
        }
    }

    /// None = unknown id or non-tradable org. This is how callers detect
    /// "not tradable".
    pub fn current_price(&self, company_id: &OrgId) -> Option<Price> {
        self.states.get(company_id).map(|s| s.current_price)
    }

    pub fn regime(&self, company_id: &OrgId) -> Option<VolatilityRegime> {
        self.states.get(company_id).map(|s| s.regime)
    }

    pub fn tracked_companies(&self) -> impl Iterator<Item = &OrgId> {
        self.states.keys()
    }

    /// Snapshot of every tracked price keyed by org id string, in the shape
    /// PerpetualsEngine::update_positions consumes.
    pub fn current_prices(&self) -> HashMap<String, Price> {
        self.states
            .iter()
            .map(|(id, state)| (id.0.clone(), state.current_price))
            .collect()
    }

    /// Retained minute history for a company, oldest first. Empty for
    /// unknown ids.
    pub fn price_history(&self, company_id: &OrgId) -> &[MinutePricePoint] {
        self.states
            .get(company_id)
            .map(|s| s.history.as_slice())
            .unwrap_or(&[])
    }

    // 6.2: the minute walk. one point per whole minute in [start, end]
    // inclusive. per step: regime transition draw, regime-scaled return draw,
    // multiplicative price update under the hard move ceiling and price floor.
    pub fn generate_minute_prices(
        &mut self,
        company_id: &OrgId,
        start: Timestamp,
        end: Timestamp,
    ) -> Vec<MinutePricePoint> {
        let regime_params = self.config.regime.clone();
        let max_move = self.config.max_minute_move;
        let min_price = self.config.min_price;
        let max_history = self.config.max_history;

        let Some(state) = self.states.get_mut(company_id) else {
            return Vec::new();
        };
        let Some(minutes) = start.whole_minutes_until(&end) else {
            return Vec::new();
        };

        let mut points = Vec::with_capacity(minutes as usize + 1);

        for i in 0..=minutes {
            state.regime = transition_regime(state.regime, &regime_params, &mut state.rng);

            let raw = draw_return(state.regime, &regime_params, &mut state.rng);
            let clamped = raw.clamp(-max_move, max_move);
            let step = Decimal::from_f64_retain(clamped)
                .unwrap_or(Decimal::ZERO)
                .round_dp(12);

            let prev = state.current_price;
            let next = (prev.value() * (Decimal::ONE + step))
                .round_dp(8)
                .max(min_price);
            state.current_price = Price::new_unchecked(next);

            let change = next - prev.value();
            points.push(MinutePricePoint {
                timestamp: start.plus_minutes(i),
                price: state.current_price,
                change,
                change_percent: change / prev.value() * dec!(100),
            });
        }

        state.history.extend(points.iter().cloned());
        if state.history.len() > max_history {
            let drain_count = state.history.len() - max_history;
            state.history.drain(0..drain_count);
        }

        points
    }

    // 6.3: instantaneous event shock. sized by the magnitude table, signed by
    // direction. consumes no randomness, so the company's minute stream is
    // unaffected. None for unknown ids: events may reference orgs that were
    // never tradable.
    pub fn apply_event_impact(
        &mut self,
        company_id: &OrgId,
        event: &WorldEvent,
        direction: EventDirection,
        magnitude: EventMagnitude,
    ) -> Option<PriceShock> {
        let escalate = self.config.shocks_escalate_regime;
        let min_price = self.config.min_price;

        let state = self.states.get_mut(company_id)?;

        let old_price = state.current_price;
        let factor = Decimal::ONE + direction.sign() * magnitude.shock_fraction();
        let next = (old_price.value() * factor).round_dp(8).max(min_price);
        state.current_price = Price::new_unchecked(next);

        if escalate && magnitude == EventMagnitude::Major {
            state.regime = VolatilityRegime::Volatile;
        }

        let change = next - old_price.value();
        Some(PriceShock {
            company_id: company_id.clone(),
            event_id: event.id.clone(),
            old_price,
            new_price: state.current_price,
            change_percent: change / old_price.value() * dec!(100),
            direction,
            magnitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::org::OrgType;

    fn test_orgs() -> Vec<Organization> {
        vec![
            Organization::company("org-acme", "Acme Corp", dec!(100)),
            Organization::company("org-glob", "Globex", dec!(50)),
            Organization::new("org-news", "Daily Bugle", OrgType::Media, Some(dec!(10))),
            Organization::new("org-priceless", "Stealth Co", OrgType::Company, None),
        ]
    }

    #[test]
    fn initialization_filters_non_tradable() {
        let mut engine = PriceEngine::new(42);
        engine.initialize_companies(&test_orgs());

        assert_eq!(
            engine.current_price(&OrgId::new("org-acme")),
            Some(Price::new_unchecked(dec!(100)))
        );
        assert_eq!(engine.current_price(&OrgId::new("org-news")), None);
        assert_eq!(engine.current_price(&OrgId::new("org-priceless")), None);
        assert_eq!(engine.current_price(&OrgId::new("org-nope")), None);
        assert_eq!(engine.tracked_companies().count(), 2);
    }

    #[test]
    fn empty_initialization_is_noop() {
        let mut engine = PriceEngine::new(42);
        engine.initialize_companies(&[]);
        assert_eq!(engine.tracked_companies().count(), 0);
    }

    #[test]
    fn minute_window_is_inclusive() {
        let mut engine = PriceEngine::new(42);
        engine.initialize_companies(&test_orgs());

        let start = Timestamp::from_millis(0);
        let end = start.plus_minutes(5);
        let points = engine.generate_minute_prices(&OrgId::new("org-acme"), start, end);

        assert_eq!(points.len(), 6);
        assert_eq!(points[0].timestamp, start);
        assert_eq!(points[5].timestamp, end);
    }

    #[test]
    fn single_instant_yields_one_point() {
        let mut engine = PriceEngine::new(42);
        engine.initialize_companies(&test_orgs());

        let t = Timestamp::from_millis(0);
        let points = engine.generate_minute_prices(&OrgId::new("org-acme"), t, t);
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn unknown_company_yields_empty_series() {
        let mut engine = PriceEngine::new(42);
        engine.initialize_companies(&test_orgs());

        let start = Timestamp::from_millis(0);
        let points =
            engine.generate_minute_prices(&OrgId::new("org-news"), start, start.plus_minutes(10));
        assert!(points.is_empty());
    }

    #[test]
    fn inverted_window_yields_empty_series() {
        let mut engine = PriceEngine::new(42);
        engine.initialize_companies(&test_orgs());

        let start = Timestamp::from_millis(600_000);
        let points =
            engine.generate_minute_prices(&OrgId::new("org-acme"), start, Timestamp::from_millis(0));
        assert!(points.is_empty());
    }

    #[test]
    fn moves_stay_under_two_percent() {
        let mut engine = PriceEngine::new(1234);
        engine.initialize_companies(&test_orgs());

        let start = Timestamp::from_millis(0);
        let points = engine.generate_minute_prices(
            &OrgId::new("org-acme"),
            start,
            start.plus_minutes(5000),
        );

        for point in &points {
            assert!(
                point.change_percent.abs() < dec!(2.0),
                "move {} at {:?}",
                point.change_percent,
                point.timestamp
            );
        }
    }

    #[test]
    fn change_fields_are_consistent() {
        let mut engine = PriceEngine::new(42);
        engine.initialize_companies(&test_orgs());

        let id = OrgId::new("org-acme");
        let start = Timestamp::from_millis(0);
        let points = engine.generate_minute_prices(&id, start, start.plus_minutes(20));

        let mut prev = dec!(100);
        for point in &points {
            assert_eq!(point.change, point.price.value() - prev);
            prev = point.price.value();
        }
        assert_eq!(engine.current_price(&id).unwrap(), points.last().unwrap().price);
    }

    #[test]
    fn event_shock_moves_price_by_table() {
        let mut engine = PriceEngine::new(42);
        engine.initialize_companies(&test_orgs());

        let id = OrgId::new("org-acme");
        let event = WorldEvent::new("ev-1", "scandal", "CEO resigns");

        let shock = engine
            .apply_event_impact(&id, &event, EventDirection::Negative, EventMagnitude::Moderate)
            .unwrap();

        assert_eq!(shock.old_price.value(), dec!(100));
        assert_eq!(shock.new_price.value(), dec!(97.5));
        assert_eq!(shock.change_percent, dec!(-2.5));
        assert_eq!(engine.current_price(&id).unwrap().value(), dec!(97.5));
    }

    #[test]
    fn major_shock_escalates_regime() {
        let mut engine = PriceEngine::new(42);
        engine.initialize_companies(&test_orgs());

        let id = OrgId::new("org-acme");
        assert_eq!(engine.regime(&id), Some(VolatilityRegime::Normal));

        let event = WorldEvent::new("ev-2", "fraud", "Accounting fraud exposed");
        engine
            .apply_event_impact(&id, &event, EventDirection::Negative, EventMagnitude::Major)
            .unwrap();

        assert_eq!(engine.regime(&id), Some(VolatilityRegime::Volatile));
    }

    #[test]
    fn event_on_unknown_company_returns_none() {
        let mut engine = PriceEngine::new(42);
        engine.initialize_companies(&test_orgs());

        let event = WorldEvent::new("ev-3", "rumor", "Unfounded rumor");
        let shock = engine.apply_event_impact(
            &OrgId::new("org-news"),
            &event,
            EventDirection::Positive,
            EventMagnitude::Minor,
        );
        assert!(shock.is_none());
    }

    #[test]
    fn history_is_retained_and_bounded() {
        let mut config = PriceConfig::default();
        config.max_history = 100;
        let mut engine = PriceEngine::with_config(42, config);
        engine.initialize_companies(&test_orgs());

        let id = OrgId::new("org-acme");
        let start = Timestamp::from_millis(0);
        let points = engine.generate_minute_prices(&id, start, start.plus_minutes(249));

        assert_eq!(points.len(), 250);
        let history = engine.price_history(&id);
        assert_eq!(history.len(), 100);
        // bounded buffer keeps the newest points
        assert_eq!(history.last(), points.last());
    }

    #[test]
    fn reinitialization_preserves_existing_state() {
        let mut engine = PriceEngine::new(42);
        engine.initialize_companies(&test_orgs());

        let id = OrgId::new("org-acme");
        let start = Timestamp::from_millis(0);
        engine.generate_minute_prices(&id, start, start.plus_minutes(10));
        let moved = engine.current_price(&id).unwrap();

        engine.initialize_companies(&test_orgs());
        assert_eq!(engine.current_price(&id), Some(moved));
    }
}
