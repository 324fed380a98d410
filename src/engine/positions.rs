// 11.3: position lifecycle. open at the market price, re-mark on every tick,
// force-liquidate when the fixed threshold is crossed, close on demand.
//
// no margin or balance check happens here: the external ledger reserves
// size/leverage before calling open_position. the engine's contract is the
// math, not the accounting.

use super::core::PerpetualsEngine;
use super::results::{CloseResult, EngineError, LiquidationRecord};
use crate::events::{
    EventPayload, PositionClosedEvent, PositionLiquidatedEvent, PositionOpenedEvent,
};
use crate::liquidation::{liquidation_price, should_liquidate};
use crate::position::{Position, PositionStatus};
use crate::types::{Leverage, PositionId, Price, Quote, Side, Ticker, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Market,
    /// Extension point. Limit matching is out of scope for this core, so a
    /// limit request passes through and fills like a market order.
    Limit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenPositionRequest {
    pub ticker: Ticker,
    pub side: Side,
    /// Notional size in quote currency.
    pub size: Decimal,
    pub leverage: Decimal,
    #[serde(default)]
    pub order_type: OrderType,
}

impl PerpetualsEngine {
    /// Open a position for `user_id` at the market's current price. The
    /// liquidation threshold is computed once here and never recomputed.
    pub fn open_position(
        &mut self,
        user_id: UserId,
        request: OpenPositionRequest,
    ) -> Result<Position, EngineError> {
        if request.size <= Decimal::ZERO {
            return Err(EngineError::InvalidSize(request.size));
        }
        let leverage =
            Leverage::new(request.leverage).ok_or(EngineError::InvalidLeverage(request.leverage))?;

        let market = self
            .markets
            .get_mut(&request.ticker)
            .ok_or_else(|| EngineError::UnknownMarket(request.ticker.clone()))?;

        // market and limit both fill at the current price (see OrderType)
        let entry_price = market.current_price;
        let size = Quote::new(request.size);
        let liq_price = liquidation_price(entry_price, request.side, leverage);

        market.record_open(size);

        let id = PositionId(self.next_position_id);
        self.next_position_id += 1;

        let position = Position {
            id,
            user_id: user_id.clone(),
            ticker: request.ticker.clone(),
            side: request.side,
            size,
            leverage,
            entry_price,
            liquidation_price: liq_price,
            current_price: entry_price,
            unrealized_pnl: Quote::zero(),
            pnl_percent: Decimal::ZERO,
            opened_at: self.current_time,
            status: PositionStatus::Open,
            realized_pnl: None,
            closed_at: None,
        };

        self.positions.insert(id, position.clone());
        self.open_by_user.entry(user_id.clone()).or_default().push(id);
        self.open_by_ticker
            .entry(request.ticker.clone())
            .or_default()
            .push(id);

        self.emit_event(EventPayload::PositionOpened(PositionOpenedEvent {
            position_id: id,
            user_id,
            ticker: request.ticker,
            side: request.side,
            size,
            leverage,
            entry_price,
            liquidation_price: liq_price,
        }));

        Ok(position)
    }

    // 11.4: the mark-to-market pass. one call per tick. map keys may be
    // tickers or org ids; positions whose market has no entry are left
    // untouched, so sparse ticks are fine.
    pub fn update_positions(
        &mut self,
        prices: &HashMap<String, Price>,
    ) -> Vec<LiquidationRecord> {
        let mut liquidations: Vec<LiquidationRecord> = Vec::new();
        let mut events_to_emit: Vec<EventPayload> = Vec::new();

        for (key, price) in prices {
            let Some(ticker) = self.resolve_ticker(key) else {
                continue;
            };

            if let Some(market) = self.markets.get_mut(&ticker) {
                market.current_price = *price;
            }

            let open_ids: Vec<PositionId> = self
                .open_by_ticker
                .get(&ticker)
                .cloned()
                .unwrap_or_default();

            for position_id in open_ids {
                let Some(position) = self.positions.get_mut(&position_id) else {
                    continue;
                };

                position.mark(*price);

                if !should_liquidate(*price, position.liquidation_price, position.side) {
                    continue;
                }

                // forced close. realized pnl settles at the threshold, a
                // full or near-full loss of margin by construction.
                let liq_price = position.liquidation_price;
                let realized =
                    position.settle(liq_price, PositionStatus::Liquidated, self.current_time);

                let user_id = position.user_id.clone();
                let side = position.side;
                let size = position.size;

                self.remove_from_open_indexes(position_id, &user_id, &ticker);
                if let Some(market) = self.markets.get_mut(&ticker) {
                    market.record_close(size);
                }

                events_to_emit.push(EventPayload::PositionLiquidated(PositionLiquidatedEvent {
                    position_id,
                    user_id: user_id.clone(),
                    ticker: ticker.clone(),
                    liquidation_price: liq_price,
                    trigger_price: *price,
                    realized_pnl: realized,
                }));

                liquidations.push(LiquidationRecord {
                    position_id,
                    user_id,
                    ticker: ticker.clone(),
                    side,
                    size,
                    liquidation_price: liq_price,
                    trigger_price: *price,
                    realized_pnl: realized,
                });
            }
        }

        for event in events_to_emit {
            self.emit_event(event);
        }

        liquidations
    }

    /// Voluntary close at the position's current marked price. Fails for
    /// unknown ids and for positions already closed or liquidated.
    pub fn close_position(&mut self, position_id: PositionId) -> Result<CloseResult, EngineError> {
        let position = self
            .positions
            .get_mut(&position_id)
            .ok_or(EngineError::PositionNotFound(position_id))?;

        if !position.is_open() {
            return Err(EngineError::PositionNotFound(position_id));
        }

        let exit_price = position.current_price;
        let realized = position.settle(exit_price, PositionStatus::Closed, self.current_time);

        let user_id = position.user_id.clone();
        let ticker = position.ticker.clone();
        let size = position.size;

        self.remove_from_open_indexes(position_id, &user_id, &ticker);
        if let Some(market) = self.markets.get_mut(&ticker) {
            market.record_close(size);
        }

        self.emit_event(EventPayload::PositionClosed(PositionClosedEvent {
            position_id,
            user_id,
            ticker,
            exit_price,
            realized_pnl: realized,
        }));

        Ok(CloseResult {
            position_id,
            exit_price,
            realized_pnl: realized,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::org::Organization;
    use rust_decimal_macros::dec;

    fn setup_engine() -> PerpetualsEngine {
        let mut engine = PerpetualsEngine::new(EngineConfig::default());
        engine.initialize_markets(&[
            Organization::company("org-acme", "Acme Corp", dec!(100)),
            Organization::company("org-glob", "Globex", dec!(50)),
        ]);
        engine
    }

    fn long_request(size: Decimal, leverage: Decimal) -> OpenPositionRequest {
        OpenPositionRequest {
            ticker: Ticker::new("ACME"),
            side: Side::Long,
            size,
            leverage,
            order_type: OrderType::Market,
        }
    }

    fn price_map(entries: &[(&str, Decimal)]) -> HashMap<String, Price> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Price::new_unchecked(*v)))
            .collect()
    }

    #[test]
    fn open_fills_at_market_price() {
        let mut engine = setup_engine();

        let pos = engine
            .open_position(UserId::new("alice"), long_request(dec!(1000), dec!(10)))
            .unwrap();

        assert_eq!(pos.entry_price.value(), dec!(100));
        assert_eq!(pos.liquidation_price.value(), dec!(91));
        assert_eq!(pos.status, PositionStatus::Open);
        assert_eq!(engine.get_user_positions(&UserId::new("alice")).len(), 1);

        let market = engine.get_market(&Ticker::new("ACME")).unwrap();
        assert_eq!(market.open_interest.value(), dec!(1000));
        assert_eq!(market.volume.value(), dec!(1000));
    }

    #[test]
    fn open_unknown_market_fails() {
        let mut engine = setup_engine();
        let result = engine.open_position(
            UserId::new("alice"),
            OpenPositionRequest {
                ticker: Ticker::new("NOPE"),
                side: Side::Long,
                size: dec!(1000),
                leverage: dec!(10),
                order_type: OrderType::Market,
            },
        );
        assert!(matches!(result, Err(EngineError::UnknownMarket(_))));
    }

    #[test]
    fn open_rejects_bad_size_and_leverage() {
        let mut engine = setup_engine();

        let bad_size = engine.open_position(UserId::new("a"), long_request(dec!(0), dec!(10)));
        assert!(matches!(bad_size, Err(EngineError::InvalidSize(_))));

        let bad_lev = engine.open_position(UserId::new("a"), long_request(dec!(1000), dec!(0.5)));
        assert!(matches!(bad_lev, Err(EngineError::InvalidLeverage(_))));
    }

    #[test]
    fn limit_order_passes_through() {
        let mut engine = setup_engine();
        let pos = engine
            .open_position(
                UserId::new("alice"),
                OpenPositionRequest {
                    ticker: Ticker::new("ACME"),
                    side: Side::Short,
                    size: dec!(500),
                    leverage: dec!(5),
                    order_type: OrderType::Limit,
                },
            )
            .unwrap();
        assert_eq!(pos.entry_price.value(), dec!(100));
    }

    #[test]
    fn update_marks_open_positions() {
        let mut engine = setup_engine();
        let pos = engine
            .open_position(UserId::new("alice"), long_request(dec!(1000), dec!(10)))
            .unwrap();

        let liqs = engine.update_positions(&price_map(&[("ACME", dec!(105))]));
        assert!(liqs.is_empty());

        let marked = engine.get_position(pos.id).unwrap();
        assert_eq!(marked.current_price.value(), dec!(105));
        assert_eq!(marked.unrealized_pnl.value(), dec!(50));
        assert_eq!(marked.pnl_percent, dec!(5));
    }

    #[test]
    fn update_accepts_org_id_keys() {
        let mut engine = setup_engine();
        let pos = engine
            .open_position(UserId::new("alice"), long_request(dec!(1000), dec!(10)))
            .unwrap();

        engine.update_positions(&price_map(&[("org-acme", dec!(110))]));

        let marked = engine.get_position(pos.id).unwrap();
        assert_eq!(marked.current_price.value(), dec!(110));
        assert_eq!(
            engine.get_market(&Ticker::new("ACME")).unwrap().current_price.value(),
            dec!(110)
        );
    }

    #[test]
    fn sparse_tick_leaves_other_positions_untouched() {
        let mut engine = setup_engine();
        let acme = engine
            .open_position(UserId::new("alice"), long_request(dec!(1000), dec!(10)))
            .unwrap();
        let glob = engine
            .open_position(
                UserId::new("alice"),
                OpenPositionRequest {
                    ticker: Ticker::new("GLOB"),
                    side: Side::Long,
                    size: dec!(500),
                    leverage: dec!(2),
                    order_type: OrderType::Market,
                },
            )
            .unwrap();

        engine.update_positions(&price_map(&[("ACME", dec!(101))]));

        assert_eq!(
            engine.get_position(acme.id).unwrap().current_price.value(),
            dec!(101)
        );
        assert_eq!(
            engine.get_position(glob.id).unwrap().current_price.value(),
            dec!(50)
        );
    }

    #[test]
    fn breach_forces_liquidation() {
        let mut engine = setup_engine();
        let pos = engine
            .open_position(UserId::new("alice"), long_request(dec!(1000), dec!(10)))
            .unwrap();

        // liquidation threshold for 10x long at 100 is 91
        let liqs = engine.update_positions(&price_map(&[("ACME", dec!(90))]));

        assert_eq!(liqs.len(), 1);
        assert_eq!(liqs[0].position_id, pos.id);
        assert_eq!(liqs[0].liquidation_price.value(), dec!(91));
        assert_eq!(liqs[0].trigger_price.value(), dec!(90));
        // settled at the threshold: -9% of 1000 notional
        assert_eq!(liqs[0].realized_pnl.value(), dec!(-90));

        let settled = engine.get_position(pos.id).unwrap();
        assert_eq!(settled.status, PositionStatus::Liquidated);
        assert_eq!(settled.realized_pnl, Some(Quote::new(dec!(-90))));
        assert!(engine.get_user_positions(&UserId::new("alice")).is_empty());

        let market = engine.get_market(&Ticker::new("ACME")).unwrap();
        assert_eq!(market.open_interest.value(), dec!(0));
    }

    #[test]
    fn short_liquidates_on_rally() {
        let mut engine = setup_engine();
        engine
            .open_position(
                UserId::new("bob"),
                OpenPositionRequest {
                    ticker: Ticker::new("ACME"),
                    side: Side::Short,
                    size: dec!(1000),
                    leverage: dec!(10),
                    order_type: OrderType::Market,
                },
            )
            .unwrap();

        let no_liqs = engine.update_positions(&price_map(&[("ACME", dec!(108))]));
        assert!(no_liqs.is_empty());

        let liqs = engine.update_positions(&price_map(&[("ACME", dec!(109))]));
        assert_eq!(liqs.len(), 1);
        assert_eq!(liqs[0].side, Side::Short);
    }

    #[test]
    fn close_realizes_pnl_and_clears_indexes() {
        let mut engine = setup_engine();
        let pos = engine
            .open_position(UserId::new("alice"), long_request(dec!(1000), dec!(10)))
            .unwrap();

        engine.update_positions(&price_map(&[("ACME", dec!(105))]));
        let result = engine.close_position(pos.id).unwrap();

        assert_eq!(result.realized_pnl.value(), dec!(50));
        assert_eq!(result.exit_price.value(), dec!(105));
        assert!(engine.get_user_positions(&UserId::new("alice")).is_empty());

        let retained = engine.get_position(pos.id).unwrap();
        assert_eq!(retained.status, PositionStatus::Closed);
    }

    #[test]
    fn double_close_fails() {
        let mut engine = setup_engine();
        let pos = engine
            .open_position(UserId::new("alice"), long_request(dec!(1000), dec!(10)))
            .unwrap();

        engine.close_position(pos.id).unwrap();
        let second = engine.close_position(pos.id);
        assert!(matches!(second, Err(EngineError::PositionNotFound(_))));
    }

    #[test]
    fn close_unknown_position_fails() {
        let mut engine = setup_engine();
        let result = engine.close_position(PositionId(999));
        assert!(matches!(result, Err(EngineError::PositionNotFound(_))));
    }

    #[test]
    fn closed_position_is_not_re_marked() {
        let mut engine = setup_engine();
        let pos = engine
            .open_position(UserId::new("alice"), long_request(dec!(1000), dec!(10)))
            .unwrap();
        engine.close_position(pos.id).unwrap();

        engine.update_positions(&price_map(&[("ACME", dec!(120))]));

        let retained = engine.get_position(pos.id).unwrap();
        assert_eq!(retained.current_price.value(), dec!(100));
        assert_eq!(retained.status, PositionStatus::Closed);
    }
}
