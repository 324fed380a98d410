// sim-core: deterministic market-simulation core.
// seeded price paths + a leveraged perpetuals engine, reproducible end to end.
// all computation is deterministic with no external I/O.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: OrgId, UserId, Ticker, Side, Price, Quote, Leverage
//   2.x  rng.rs: seeded RNG with per-entity substreams
//   3.x  org.rs: organization inputs and the tradability filter
//   4.x  regime.rs: volatility regimes, Markov transitions, return draws
//   5.x  impact.rs: world-event shocks, magnitude table
//   6.x  price_engine.rs: minute-by-minute price walk per company
//   7.x  liquidation.rs: liquidation price and trigger test
//   8.x  position.rs: position record, pnl math
//   9.x  funding.rs: funding payment math
//   10.x market.rs: perp markets, ticker derivation, daily snapshots
//   11.x engine/: perpetuals engine: open, mark, liquidate, close, snapshot
//   12.x events.rs: state transition events for audit

// market simulation
pub mod impact;
pub mod org;
pub mod price_engine;
pub mod regime;
pub mod rng;

// perpetuals math and engine
pub mod engine;
pub mod funding;
pub mod liquidation;
pub mod market;
pub mod position;

// shared
pub mod events;
pub mod types;

// re exports for convenience
pub use engine::*;
pub use events::*;
pub use funding::*;
pub use impact::*;
pub use liquidation::*;
pub use market::*;
pub use org::*;
pub use position::*;
pub use price_engine::*;
pub use regime::*;
pub use rng::*;
pub use types::*;
