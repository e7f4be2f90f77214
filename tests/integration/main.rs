//! Integration tests for the triangular arbitrage engine.
//!
//! These drive the public API end to end: a cache of depth snapshots and a
//! list of relationships go into the cycle driver, results and errors come
//! out through the callbacks.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use triangle_arb::arbitrage::{
    calculate, order_book_conversion, order_book_reverse_conversion, ConversionLeg, Method, Phase,
    Relationship, Symbols, TradeLeg,
};
use triangle_arb::config::{Config, ExecutionStrategy};
use triangle_arb::cycle::CycleDriver;
use triangle_arb::error::CalcError;
use triangle_arb::orderbook::{DepthCache, DepthSnapshot, DepthView, PriceLevel};

fn book(bids: &[(Decimal, Decimal)], asks: &[(Decimal, Decimal)]) -> DepthSnapshot {
    DepthSnapshot::new(
        bids.iter().map(|&(p, s)| PriceLevel::new(p, s)).collect(),
        asks.iter().map(|&(p, s)| PriceLevel::new(p, s)).collect(),
    )
}

fn sells(a: &str, b: &str, c: &str) -> Arc<Relationship> {
    Arc::new(Relationship {
        symbol: Symbols::new(a, b, c),
        ab: TradeLeg::new(format!("{a}{b}"), Method::Sell, 8),
        bc: TradeLeg::new(format!("{b}{c}"), Method::Sell, 8),
        ca: TradeLeg::new(format!("{c}{a}"), Method::Sell, 8),
    })
}

fn single_investment(amount: Decimal) -> Config {
    Config {
        investment_min: Some(amount),
        investment_max: amount,
        investment_step: amount,
        taker_fee: dec!(0.1),
        ..Config::default()
    }
}

/// Fixed-point regression: three sells, 0.1% fee per leg, one unit invested.
#[test]
fn three_sell_triangle_regression() {
    let relationship = sells("AAA", "BBB", "CCC");
    let mut cache = DepthCache::new();
    cache.insert(
        "AAABBB".to_string(),
        book(&[(dec!(100), dec!(10))], &[(dec!(101), dec!(10))]),
    );
    cache.insert(
        "BBBCCC".to_string(),
        book(&[(dec!(50), dec!(1000))], &[(dec!(51), dec!(1000))]),
    );
    cache.insert(
        "CCCAAA".to_string(),
        book(&[(dec!(0.0002), dec!(100000000))], &[(dec!(0.0003), dec!(100000000))]),
    );

    let mut driver = CycleDriver::new(single_investment(dec!(1)));
    let mut delivered = Vec::new();
    let stats = driver.cycle(&[relationship], &cache, |_| {}, |r| delivered.push(r));

    assert_eq!(stats.success_count, 1);
    let result = &delivered[0];
    assert_eq!(result.id, "AAA-BBB-CCC");
    assert_eq!(result.a.spent, dec!(1));
    assert_eq!(result.b.earned, dec!(100));
    assert_eq!(result.c.earned, dec!(5000));
    assert_eq!(result.a.earned, dec!(1));
    assert_eq!(result.a.delta, dec!(0));
    // Break-even before fees, three 0.1% deductions after
    assert_eq!(result.percent, dec!(-0.3));
    assert_eq!(result.ab_limit_buy_price, None);
}

/// The second relationship cannot fill; the others still evaluate.
#[test]
fn failing_relationship_is_isolated() {
    let relationships = vec![
        sells("AAA", "BBB", "CCC"),
        sells("AAA", "BBB", "DDD"),
        sells("AAA", "BBB", "EEE"),
    ];

    let mut cache = DepthCache::new();
    cache.insert(
        "AAABBB".to_string(),
        book(&[(dec!(100), dec!(10))], &[(dec!(101), dec!(10))]),
    );
    for c in ["CCC", "DDD", "EEE"] {
        // DDD only absorbs a tenth of what the BBB leg delivers
        let size = if c == "DDD" { dec!(10) } else { dec!(1000) };
        cache.insert(
            format!("BBB{c}"),
            book(&[(dec!(50), size)], &[(dec!(51), size)]),
        );
        cache.insert(
            format!("{c}AAA"),
            book(&[(dec!(0.0002), dec!(100000000))], &[(dec!(0.0003), dec!(100000000))]),
        );
    }

    let mut driver = CycleDriver::new(single_investment(dec!(1)));
    let mut messages = Vec::new();
    let mut ids = Vec::new();
    let stats = driver.cycle(
        &relationships,
        &cache,
        |err| messages.push(err.to_string()),
        |r| ids.push(r.id),
    );

    assert_eq!(stats.success_count, 2);
    assert_eq!(stats.error_count, 1);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("BBBDDD"), "{}", messages[0]);
    assert_eq!(ids, vec!["AAA-BBB-CCC".to_string(), "AAA-BBB-EEE".to_string()]);
    assert_eq!(driver.cycle_count(), 1);
}

/// A crossed book anywhere in a triangle fails that triangle only.
#[test]
fn crossed_book_is_reported() {
    let relationship = sells("AAA", "BBB", "CCC");
    let mut cache = DepthCache::new();
    cache.insert(
        "AAABBB".to_string(),
        book(&[(dec!(100), dec!(10))], &[(dec!(101), dec!(10))]),
    );
    cache.insert(
        "BBBCCC".to_string(),
        book(&[(dec!(51), dec!(1000))], &[(dec!(51), dec!(1000))]),
    );
    cache.insert(
        "CCCAAA".to_string(),
        book(&[(dec!(0.0002), dec!(100000000))], &[(dec!(0.0003), dec!(100000000))]),
    );

    let mut driver = CycleDriver::new(single_investment(dec!(1)));
    let mut errors = Vec::new();
    let stats = driver.cycle(&[relationship], &cache, |e| errors.push(e.clone()), |_| {});

    assert_eq!(stats.error_count, 1);
    assert_eq!(
        errors,
        vec![CalcError::CrossedBook {
            ticker: "BBBCCC".to_string(),
            best_bid: dec!(51),
            best_ask: dec!(51),
        }]
    );
}

/// BTC → ETH → BNB → BTC where the first two legs buy.
#[test]
fn buy_legs_respect_dust_precision() {
    let relationship = Arc::new(Relationship {
        symbol: Symbols::new("BTC", "ETH", "BNB"),
        ab: TradeLeg::new("ETHBTC", Method::Buy, 3),
        bc: TradeLeg::new("BNBETH", Method::Buy, 2),
        ca: TradeLeg::new("BNBBTC", Method::Sell, 2),
    });

    let ethbtc = book(
        &[(dec!(0.049), dec!(100))],
        &[(dec!(0.05), dec!(1)), (dec!(0.051), dec!(100))],
    );
    let bnbeth = book(&[(dec!(0.19), dec!(1000))], &[(dec!(0.2), dec!(1000))]);
    let bnbbtc = book(&[(dec!(0.0105), dec!(1000))], &[(dec!(0.011), dec!(1000))]);
    let view = DepthView {
        ab: &ethbtc,
        bc: &bnbeth,
        ca: &bnbbtc,
    };

    let result = calculate(dec!(0.1), &relationship, &view, &single_investment(dec!(0.1))).unwrap();

    // 0.05 BTC buys 1 ETH at 0.05, the other 0.05 buys 0.98039... at 0.051
    assert_eq!(result.ab, dec!(1.98));
    assert_eq!(result.b.earned, dec!(1.98));
    // Repricing 1.98 ETH: 1 @ 0.05 + 0.98 @ 0.051
    assert_eq!(result.a.spent, dec!(0.09998));
    // 1.98 ETH / 0.2 = 9.9 BNB
    assert_eq!(result.bc, dec!(9.9));
    assert_eq!(result.b.spent, dec!(1.98));
    assert_eq!(result.c.spent, dec!(9.9));
    assert_eq!(result.a.earned, dec!(0.10395));
    assert_eq!(result.a.delta, dec!(0.00397));
    for volume in [result.ab, result.bc, result.ca] {
        assert!(volume.scale() <= 3);
    }
}

/// Converting and then reverse converting never creates value.
#[test]
fn round_trip_never_gains() {
    let depth = book(
        &[(dec!(0.75), dec!(40)), (dec!(0.5), dec!(400))],
        &[(dec!(1.25), dec!(8)), (dec!(2), dec!(50))],
    );

    for amount in [dec!(1), dec!(8), dec!(20), dec!(30)] {
        for strategy in [ExecutionStrategy::Sweep, ExecutionStrategy::Trigger] {
            for (ticker, natural) in [("XY", true), ("YX", false)] {
                let forward = ConversionLeg {
                    ticker,
                    from: "X",
                    to: "Y",
                    depth: &depth,
                    phase: Phase::Ab,
                };
                let backward = ConversionLeg {
                    from: "Y",
                    to: "X",
                    ..forward
                };

                let there = order_book_conversion(amount, &forward, strategy).unwrap();
                let back = order_book_reverse_conversion(there.amount, &backward, strategy).unwrap();

                assert!(
                    back.amount <= amount,
                    "natural={natural} {strategy}: {amount} -> {} -> {}",
                    there.amount,
                    back.amount
                );
            }
        }
    }
}

/// The optimizer's choice beats every candidate and is repeatable.
#[test]
fn optimizer_choice_is_best_and_repeatable() {
    let relationship = sells("AAA", "BBB", "CCC");
    let mut cache = DepthCache::new();
    cache.insert(
        "AAABBB".to_string(),
        book(
            &[(dec!(100), dec!(2)), (dec!(99), dec!(2)), (dec!(95), dec!(20))],
            &[(dec!(101), dec!(10))],
        ),
    );
    cache.insert(
        "BBBCCC".to_string(),
        book(&[(dec!(50), dec!(100000))], &[(dec!(51), dec!(100000))]),
    );
    cache.insert(
        "CCCAAA".to_string(),
        book(&[(dec!(0.000201), dec!(1000000000))], &[(dec!(0.0003), dec!(1000000000))]),
    );

    let config = Config {
        investment_min: None,
        investment_max: dec!(10),
        investment_step: dec!(0.5),
        diagnostics_enabled: true,
        ..Config::default()
    };

    let mut driver = CycleDriver::new(config.clone());
    let first = driver
        .cycle(&[Arc::clone(&relationship)], &cache, |_| {}, |_| {})
        .results
        .unwrap();
    let second = driver
        .cycle(&[Arc::clone(&relationship)], &cache, |_| {}, |_| {})
        .results
        .unwrap();

    let best = &first["AAA-BBB-CCC"];
    assert_eq!(best, &second["AAA-BBB-CCC"]);
    assert_eq!(best.investment, dec!(0.5));

    let view = DepthView::assemble(&relationship, &cache).unwrap();
    let mut investment = config.first_investment();
    while investment <= config.investment_max {
        let candidate = calculate(investment, &relationship, &view, &config).unwrap();
        assert!(best.percent >= candidate.percent);
        investment += config.investment_step;
    }
    assert_eq!(driver.timings().count(), 2);
}
