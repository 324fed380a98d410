//! Market Simulation Core Demo.
//!
//! Walks both engines through their lifecycle: deterministic price replay,
//! regime-switching minute walks, event shocks, position marking,
//! liquidations, and daily snapshots.

use rust_decimal_macros::dec;
use sim_core::*;

fn main() {
    println!("Deterministic Market Simulation Core");
    println!("Seeded Price Paths, Perpetual Futures, Full Lifecycle\n");

    scenario_1_deterministic_replay();
    scenario_2_regime_walk();
    scenario_3_event_shock();
    scenario_4_position_lifecycle();
    scenario_5_liquidation();
    scenario_6_snapshots_and_funding();

    println!("\nAll scenarios completed.");
}

fn demo_orgs() -> Vec<Organization> {
    vec![
        Organization::company("org-acme", "Acme Corp", dec!(100)),
        Organization::company("org-glob", "Globex", dec!(50)),
        Organization::company("org-init", "Initech", dec!(25)),
        Organization::new("org-bugle", "Daily Bugle", OrgType::Media, None),
    ]
}

/// Two engines, same seed, identical output.
fn scenario_1_deterministic_replay() {
    println!("Scenario 1: Deterministic Replay\n");

    let orgs = demo_orgs();
    let mut first = PriceEngine::new(42);
    let mut second = PriceEngine::new(42);
    first.initialize_companies(&orgs);
    second.initialize_companies(&orgs);

    let acme = OrgId::new("org-acme");
    let start = Timestamp::from_millis(0);
    let end = start.plus_minutes(30);

    let path_a = first.generate_minute_prices(&acme, start, end);
    let path_b = second.generate_minute_prices(&acme, start, end);

    println!("  Seed 42, 31 minute points for ACME");
    println!("  Engine A final: ${}", path_a.last().unwrap().price);
    println!("  Engine B final: ${}", path_b.last().unwrap().price);
    println!("  Bit-identical: {}\n", path_a == path_b);
}

/// A trading day of minute prices under regime switching.
fn scenario_2_regime_walk() {
    println!("Scenario 2: Regime-Switching Walk\n");

    let mut engine = PriceEngine::new(7);
    engine.initialize_companies(&demo_orgs());

    let start = Timestamp::from_millis(0);
    let end = start.plus_minutes(389); // 390-minute session

    for key in ["org-acme", "org-glob", "org-init"] {
        let id = OrgId::new(key);
        let points = engine.generate_minute_prices(&id, start, end);

        let max_move = points
            .iter()
            .map(|p| p.change_percent.abs())
            .max()
            .unwrap_or_default();

        println!(
            "  {}: {} points, close ${}, largest minute move {:.4}%, regime {:?}",
            key,
            points.len(),
            points.last().unwrap().price,
            max_move,
            engine.regime(&id).unwrap()
        );
    }
    println!();
}

/// Instantaneous event shocks by magnitude.
fn scenario_3_event_shock() {
    println!("Scenario 3: Event Shocks\n");

    let mut engine = PriceEngine::new(7);
    engine.initialize_companies(&demo_orgs());

    let acme = OrgId::new("org-acme");
    let event = WorldEvent::new("ev-1", "scandal", "Regulator opens investigation");

    for magnitude in [EventMagnitude::Minor, EventMagnitude::Moderate, EventMagnitude::Major] {
        let shock = engine
            .apply_event_impact(&acme, &event, EventDirection::Negative, magnitude)
            .unwrap();
        println!(
            "  {:?}: ${} -> ${} ({}%)",
            magnitude, shock.old_price, shock.new_price, shock.change_percent
        );
    }

    println!("  Regime after major shock: {:?}", engine.regime(&acme).unwrap());

    // excluded org: shock is a no-op, not an error
    let miss = engine.apply_event_impact(
        &OrgId::new("org-bugle"),
        &event,
        EventDirection::Negative,
        EventMagnitude::Major,
    );
    println!("  Shock on media org: {:?}\n", miss.is_none());
}

/// Open, mark against live prices, close.
fn scenario_4_position_lifecycle() {
    println!("Scenario 4: Position Lifecycle\n");

    let orgs = demo_orgs();
    let mut prices = PriceEngine::new(99);
    let mut perps = PerpetualsEngine::new(EngineConfig::default());
    prices.initialize_companies(&orgs);
    perps.initialize_markets(&orgs);

    let alice = UserId::new("alice");
    let position = perps
        .open_position(
            alice.clone(),
            OpenPositionRequest {
                ticker: Ticker::new("ACME"),
                side: Side::Long,
                size: dec!(1000),
                leverage: dec!(10),
                order_type: OrderType::Market,
            },
        )
        .unwrap();

    println!(
        "  Opened 10x long: $1000 notional @ ${}, liquidation at ${}",
        position.entry_price, position.liquidation_price
    );

    let start = Timestamp::from_millis(0);
    for tick in 0..5 {
        let window_start = start.plus_minutes(tick * 5);
        let window_end = window_start.plus_minutes(4);
        for id in ["org-acme", "org-glob", "org-init"] {
            prices.generate_minute_prices(&OrgId::new(id), window_start, window_end);
        }
        perps.update_positions(&prices.current_prices());
    }

    let marked = perps.get_position(position.id).unwrap();
    println!(
        "  After 25 minutes: price ${}, unrealized ${} ({:.4}%)",
        marked.current_price, marked.unrealized_pnl, marked.pnl_percent
    );

    let close = perps.close_position(position.id).unwrap();
    println!(
        "  Closed @ ${}, realized ${}",
        close.exit_price, close.realized_pnl
    );
    println!("  Open positions: {}\n", perps.get_user_positions(&alice).len());
}

/// A crash tick liquidates the over-leveraged long.
fn scenario_5_liquidation() {
    println!("Scenario 5: Forced Liquidation\n");

    let orgs = demo_orgs();
    let mut perps = PerpetualsEngine::new(EngineConfig::default());
    perps.initialize_markets(&orgs);

    for (user, leverage) in [("conservative", dec!(2)), ("aggressive", dec!(20))] {
        perps
            .open_position(
                UserId::new(user),
                OpenPositionRequest {
                    ticker: Ticker::new("ACME"),
                    side: Side::Long,
                    size: dec!(1000),
                    leverage,
                    order_type: OrderType::Market,
                },
            )
            .unwrap();
    }

    println!("  Two longs at $100: 2x and 20x");

    let crash: std::collections::HashMap<String, Price> =
        [("ACME".to_string(), Price::new_unchecked(dec!(94)))].into();
    let liquidations = perps.update_positions(&crash);

    println!("  Price drops to $94");
    for liq in &liquidations {
        println!(
            "  Liquidated {} ({}): settled at ${}, realized ${}",
            liq.user_id,
            perps.get_position(liq.position_id).unwrap().leverage,
            liq.liquidation_price,
            liq.realized_pnl
        );
    }

    let survivor = perps.get_user_positions(&UserId::new("conservative"));
    println!("  Survivors: {} position(s)\n", survivor.len());
}

/// Daily snapshots and funding accrual reporting.
fn scenario_6_snapshots_and_funding() {
    println!("Scenario 6: Snapshots and Funding\n");

    let orgs = demo_orgs();
    let mut perps = PerpetualsEngine::new(EngineConfig::default());
    perps.initialize_markets(&orgs);

    perps
        .open_position(
            UserId::new("alice"),
            OpenPositionRequest {
                ticker: Ticker::new("ACME"),
                side: Side::Long,
                size: dec!(10000),
                leverage: dec!(5),
                order_type: OrderType::Market,
            },
        )
        .unwrap();

    for date in ["2025-10-28", "2025-10-29", "2025-10-30"] {
        perps.record_daily_snapshot(date.parse().unwrap());
    }

    let snapshots = perps.get_daily_snapshots(&Ticker::new("ACME"));
    println!("  Recorded {} snapshots for ACME", snapshots.len());
    for snap in snapshots {
        println!(
            "    {}: price ${}, volume ${}, open interest ${}",
            snap.date, snap.price, snap.volume, snap.open_interest
        );
    }

    let payments = perps.accrue_funding(dec!(8));
    for payment in &payments {
        println!(
            "  Funding over 8h on {} ({}): ${}",
            payment.ticker,
            payment.side,
            payment.amount.value().round_dp(6)
        );
    }

    println!("  Audit events recorded: {}", perps.events().len());
}
