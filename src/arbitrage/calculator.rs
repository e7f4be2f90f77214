//! Leg and triangle profit calculations.

use std::sync::Arc;

use rust_decimal::Decimal;

use super::conversion::{order_book_conversion, order_book_reverse_conversion, ConversionLeg};
use super::dust::calculate_dustless;
use super::types::{CalculatedResult, Method, Phase, Relationship, TradeLeg};
use crate::config::{Config, ExecutionStrategy};
use crate::error::CalcError;
use crate::orderbook::{DepthSnapshot, DepthView};

/// Amounts moved by a single leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegOutcome {
    /// Quantity of the instrument's base currency that would be ordered.
    pub volume: Decimal,
    /// Amount of the source currency paid away.
    pub spent: Decimal,
    /// Amount of the destination currency received.
    pub earned: Decimal,
    /// Limit price, when the trigger strategy priced this leg.
    pub limit_price: Option<Decimal>,
}

/// Trade `amount` of the leg's source currency into its destination currency.
///
/// A Buy leg converts forward, dust-rounds the acquired quantity, then
/// reprices that exact quantity. A Sell leg dust-rounds the amount it sells
/// before converting. Either way the traded volume respects the instrument's
/// quantity precision before the next leg uses it.
pub fn calculate_leg(
    trade: &TradeLeg,
    conversion: &ConversionLeg<'_>,
    amount: Decimal,
    strategy: ExecutionStrategy,
) -> Result<LegOutcome, CalcError> {
    match trade.method {
        Method::Buy => {
            let converted = order_book_conversion(amount, conversion, strategy)?;
            let volume = calculate_dustless(converted.amount, trade.dust_decimals);
            let back = ConversionLeg {
                from: conversion.to,
                to: conversion.from,
                ..*conversion
            };
            let spent = order_book_reverse_conversion(volume, &back, strategy)?.amount;

            Ok(LegOutcome {
                volume,
                spent,
                earned: volume,
                limit_price: converted.trigger_price,
            })
        }
        Method::Sell => {
            let volume = calculate_dustless(amount, trade.dust_decimals);
            let converted = order_book_conversion(volume, conversion, strategy)?;

            Ok(LegOutcome {
                volume,
                spent: volume,
                earned: converted.amount,
                limit_price: converted.trigger_price,
            })
        }
    }
}

/// Evaluate the full A→B→C→A triangle for an investment of `investment_a`.
pub fn calculate(
    investment_a: Decimal,
    relationship: &Arc<Relationship>,
    depth: &DepthView<'_>,
    config: &Config,
) -> Result<CalculatedResult, CalcError> {
    let strategy = config.strategy();
    let mut calculated = CalculatedResult::new(relationship, investment_a);

    let ab = run_leg(relationship, Phase::Ab, depth.ab, investment_a, strategy)?;
    calculated.ab = ab.volume;
    calculated.a.spent = ab.spent;
    calculated.b.earned = ab.earned;
    calculated.ab_limit_buy_price = ab.limit_price;

    let bc = run_leg(relationship, Phase::Bc, depth.bc, calculated.b.earned, strategy)?;
    calculated.bc = bc.volume;
    calculated.b.spent = bc.spent;
    calculated.c.earned = bc.earned;

    let ca = run_leg(relationship, Phase::Ca, depth.ca, calculated.c.earned, strategy)?;
    calculated.ca = ca.volume;
    calculated.c.spent = ca.spent;
    calculated.a.earned = ca.earned;

    calculated.settle();
    calculated.percent = net_percent(calculated.a.delta, calculated.a.spent, config.round_trip_fee());

    Ok(calculated)
}

fn run_leg(
    relationship: &Relationship,
    phase: Phase,
    depth: &DepthSnapshot,
    amount: Decimal,
    strategy: ExecutionStrategy,
) -> Result<LegOutcome, CalcError> {
    let (trade, from, to) = relationship.leg(phase);
    let conversion = ConversionLeg {
        ticker: &trade.ticker,
        from,
        to,
        depth,
        phase,
    };
    calculate_leg(trade, &conversion, amount, strategy)
}

/// Return on `spent` in percent, less fees. Zero when nothing was spent.
fn net_percent(delta: Decimal, spent: Decimal, fees: Decimal) -> Decimal {
    delta
        .checked_div(spent)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|percent| percent - fees)
        .unwrap_or(Decimal::ZERO)
}

/// Orderable quantity for a leg after an earlier leg actually returned
/// `quantity_earned` of its source currency.
///
/// Buy legs convert the quote amount into base first; both methods then
/// truncate to the instrument's precision.
pub fn recalculate_trade_leg(
    trade: &TradeLeg,
    base: &str,
    quote: &str,
    quantity_earned: Decimal,
    depth: &DepthSnapshot,
    phase: Phase,
    strategy: ExecutionStrategy,
) -> Result<Decimal, CalcError> {
    match trade.method {
        Method::Buy => {
            let conversion = ConversionLeg {
                ticker: &trade.ticker,
                from: quote,
                to: base,
                depth,
                phase,
            };
            let converted = order_book_conversion(quantity_earned, &conversion, strategy)?;
            Ok(calculate_dustless(converted.amount, trade.dust_decimals))
        }
        Method::Sell => Ok(calculate_dustless(quantity_earned, trade.dust_decimals)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrage::Symbols;
    use crate::orderbook::PriceLevel;
    use rust_decimal_macros::dec;

    fn book(bid: Decimal, ask: Decimal, size: Decimal) -> DepthSnapshot {
        DepthSnapshot::new(vec![PriceLevel::new(bid, size)], vec![PriceLevel::new(ask, size)])
    }

    fn all_sells() -> Arc<Relationship> {
        Arc::new(Relationship {
            symbol: Symbols::new("AAA", "BBB", "CCC"),
            ab: TradeLeg::new("AAABBB", Method::Sell, 8),
            bc: TradeLeg::new("BBBCCC", Method::Sell, 8),
            ca: TradeLeg::new("CCCAAA", Method::Sell, 8),
        })
    }

    #[test]
    fn buy_leg_reprices_dusted_quantity() {
        let depth = book(dec!(3), dec!(4), dec!(100));
        let trade = TradeLeg::new("BBBAAA", Method::Buy, 0);
        let conversion = ConversionLeg {
            ticker: &trade.ticker,
            from: "AAA",
            to: "BBB",
            depth: &depth,
            phase: Phase::Bc,
        };

        let outcome = calculate_leg(&trade, &conversion, dec!(30), ExecutionStrategy::Sweep).unwrap();

        // 30 / 4 = 7.5, truncated to 7, which costs 28
        assert_eq!(outcome.volume, dec!(7));
        assert_eq!(outcome.earned, dec!(7));
        assert_eq!(outcome.spent, dec!(28));
        assert_eq!(outcome.limit_price, None);
    }

    #[test]
    fn sell_leg_dusts_before_converting() {
        let depth = book(dec!(2), dec!(3), dec!(100));
        let trade = TradeLeg::new("AAABBB", Method::Sell, 1);
        let conversion = ConversionLeg {
            ticker: &trade.ticker,
            from: "AAA",
            to: "BBB",
            depth: &depth,
            phase: Phase::Ab,
        };

        let outcome = calculate_leg(&trade, &conversion, dec!(1.99), ExecutionStrategy::Sweep).unwrap();

        assert_eq!(outcome.volume, dec!(1.9));
        assert_eq!(outcome.spent, dec!(1.9));
        assert_eq!(outcome.earned, dec!(3.8));
    }

    #[test]
    fn triangle_of_sells_matches_hand_computation() {
        let relationship = all_sells();
        let ab = book(dec!(100), dec!(101), dec!(10));
        let bc = book(dec!(50), dec!(51), dec!(1000));
        let ca = DepthSnapshot::new(
            vec![PriceLevel::new(dec!(0.00021), dec!(1000000))],
            vec![PriceLevel::new(dec!(0.00022), dec!(1000000))],
        );
        let view = DepthView {
            ab: &ab,
            bc: &bc,
            ca: &ca,
        };

        let result = calculate(dec!(1), &relationship, &view, &Config::default()).unwrap();

        assert_eq!(result.id, "AAA-BBB-CCC");
        assert_eq!(result.a.spent, dec!(1));
        assert_eq!(result.b.earned, dec!(100));
        assert_eq!(result.c.earned, dec!(5000));
        assert_eq!(result.a.earned, dec!(1.05));
        assert_eq!(result.a.delta, dec!(0.05));
        assert_eq!(result.b.delta, dec!(0));
        assert_eq!(result.c.delta, dec!(0));
        // 5% gross less three 0.1% fees
        assert_eq!(result.percent, dec!(4.7));
        assert!(result.is_profitable());
    }

    #[test]
    fn trigger_records_limit_price_on_ab_buy() {
        let relationship = Arc::new(Relationship {
            symbol: Symbols::new("AAA", "BBB", "CCC"),
            ab: TradeLeg::new("BBBAAA", Method::Buy, 8),
            bc: TradeLeg::new("BBBCCC", Method::Sell, 8),
            ca: TradeLeg::new("CCCAAA", Method::Sell, 8),
        });
        let ab = book(dec!(3), dec!(4), dec!(100));
        let bc = book(dec!(2), dec!(3), dec!(100));
        let ca = book(dec!(1.6), dec!(1.7), dec!(100));
        let view = DepthView {
            ab: &ab,
            bc: &bc,
            ca: &ca,
        };
        let config = Config {
            execution_strategy: ExecutionStrategy::Trigger,
            ..Config::default()
        };

        let result = calculate(dec!(31), &relationship, &view, &config).unwrap();

        assert_eq!(result.ab_limit_buy_price, Some(dec!(3.1)));
        assert_eq!(result.b.earned, dec!(10));
        assert_eq!(result.a.spent, dec!(31));
        assert_eq!(result.c.earned, dec!(20));
        assert_eq!(result.a.earned, dec!(32));
    }

    #[test]
    fn zero_spend_yields_zero_percent() {
        assert_eq!(net_percent(dec!(0), dec!(0), dec!(0.3)), Decimal::ZERO);
        assert_eq!(net_percent(dec!(1), dec!(0), dec!(0.3)), Decimal::ZERO);
        assert_eq!(net_percent(dec!(0), dec!(1), dec!(0.3)), dec!(-0.3));
    }

    #[test]
    fn insufficient_depth_propagates_from_any_leg() {
        let relationship = all_sells();
        let ab = book(dec!(100), dec!(101), dec!(10));
        let bc = book(dec!(50), dec!(51), dec!(10));
        let ca = book(dec!(0.0002), dec!(0.0003), dec!(1000000));
        let view = DepthView {
            ab: &ab,
            bc: &bc,
            ca: &ca,
        };

        let err = calculate(dec!(1), &relationship, &view, &Config::default()).unwrap_err();

        assert_eq!(err.ticker(), "BBBCCC");
    }

    #[test]
    fn recalculate_buy_leg_converts_then_dusts() {
        let depth = book(dec!(3), dec!(4), dec!(100));
        let trade = TradeLeg::new("BBBAAA", Method::Buy, 1);

        let quantity =
            recalculate_trade_leg(&trade, "BBB", "AAA", dec!(31), &depth, Phase::Bc, ExecutionStrategy::Sweep)
                .unwrap();

        // 31 / 4 = 7.75
        assert_eq!(quantity, dec!(7.7));
    }

    #[test]
    fn recalculate_sell_leg_only_dusts() {
        let depth = book(dec!(3), dec!(4), dec!(100));
        let trade = TradeLeg::new("AAABBB", Method::Sell, 2);

        let quantity =
            recalculate_trade_leg(&trade, "AAA", "BBB", dec!(1.23456), &depth, Phase::Ca, ExecutionStrategy::Sweep)
                .unwrap();

        assert_eq!(quantity, dec!(1.23));
    }
}
