//! Integration tests for gear simulation plus selection.
//!
//! Covers the end-to-end scenarios:
//! 1. Flat feed — no kinematics signal, no trades, zero everything
//! 2. Accelerating feed — earliest gear rides the trend, never sells
//! 3. Scripted single-gear replay equals the gear's standalone trace
//! 4. Greedy with one candidate equals the scripted replay of it

use chrono::TimeZone;
use hullgear_core::domain::Bar;
use hullgear_core::gear::{Gear, GearConfig, GearParams, TrendTrace};
use hullgear_core::selector::{GearScript, GearSelector, SelectionMode, SelectorConfig};

fn bars_from(prices: &[f64]) -> Vec<Bar> {
    let base = chrono::Utc.with_ymd_and_hms(2022, 9, 9, 9, 30, 0).unwrap();
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| Bar {
            time: base + chrono::Duration::minutes(i as i64),
            open: p,
            high: p,
            low: p,
            close: p,
        })
        .collect()
}

fn build_gears(bars: &[Bar]) -> Vec<Gear> {
    let config = GearConfig::default();
    [
        GearParams { h1: 3, h2: 11 },
        GearParams { h1: 4, h2: 8 },
        GearParams { h1: 11, h2: 19 },
    ]
    .iter()
    .map(|&p| Gear::new(p, config, bars))
    .collect()
}

#[test]
fn flat_feed_ends_flat_with_zero_profit() {
    let bars = bars_from(&[250.0; 20]);
    let gears = build_gears(&bars);
    let run = GearSelector::new(&bars, &gears, SelectorConfig::greedy(5, 42))
        .unwrap()
        .run()
        .unwrap();

    let last = run.ledger.last().unwrap();
    assert_eq!(last.open_size, 0);
    assert_eq!(last.gross_profit, 0.0);
    assert_eq!(run.score(), 0.0);
}

#[test]
fn accelerating_feed_holds_a_winner() {
    let prices: Vec<f64> = (0..80).map(|i| 100.0 + 0.05 * (i * i) as f64).collect();
    let bars = bars_from(&prices);
    let gears = build_gears(&bars);
    let run = GearSelector::new(&bars, &gears, SelectorConfig::greedy(10, 42))
        .unwrap()
        .run()
        .unwrap();

    let last = run.ledger.last().unwrap();
    assert_eq!(last.open_size, 300);
    assert!(last.position_value > 0.0);
    assert!(run.score() > 0.0);
}

#[test]
fn scripted_single_gear_equals_standalone_trace() {
    let prices: Vec<f64> = (0..60).map(|i| 100.0 + 0.05 * (i * i) as f64).collect();
    let bars = bars_from(&prices);
    let gear = Gear::new(GearParams { h1: 4, h2: 8 }, GearConfig::default(), &bars);
    let standalone_profit = gear.trace().last().unwrap().gross_profit;
    let standalone_value = gear.trace().last().unwrap().position_value;

    let gears = vec![gear];
    let run = GearSelector::new(
        &bars,
        &gears,
        SelectorConfig::scripted(10, GearScript::constant(0)),
    )
    .unwrap()
    .run()
    .unwrap();

    for (i, row) in run.ledger.iter().enumerate() {
        assert_eq!(row.open_size, gears[0].open_size(i), "bar {i}");
    }
    let last = run.ledger.last().unwrap();
    assert_eq!(last.gross_profit, standalone_profit);
    assert_eq!(last.position_value, standalone_value);
}

#[test]
fn greedy_with_one_candidate_equals_scripted() {
    let prices: Vec<f64> = (0..60)
        .map(|i| 100.0 + (i as f64 * 0.3).sin() * 4.0 + 0.02 * (i * i) as f64)
        .collect();
    let bars = bars_from(&prices);
    let gear = Gear::new(GearParams { h1: 4, h2: 8 }, GearConfig::default(), &bars);
    let gears = vec![gear];

    let greedy = GearSelector::new(&bars, &gears, SelectorConfig::greedy(6, 1))
        .unwrap()
        .run()
        .unwrap();
    let scripted = GearSelector::new(
        &bars,
        &gears,
        SelectorConfig::scripted(6, GearScript::constant(0)),
    )
    .unwrap()
    .run()
    .unwrap();

    assert_eq!(greedy.ledger.len(), scripted.ledger.len());
    for (a, b) in greedy.ledger.iter().zip(scripted.ledger.iter()) {
        assert_eq!(a.open_size, b.open_size);
        assert!(a.gross_profit == b.gross_profit);
        assert!(a.position_value == b.position_value);
    }
}

#[test]
fn partial_run_scores_a_prefix() {
    let prices: Vec<f64> = (0..60).map(|i| 100.0 + 0.05 * (i * i) as f64).collect();
    let bars = bars_from(&prices);
    let gears = build_gears(&bars);

    let full = GearSelector::new(
        &bars,
        &gears,
        SelectorConfig::scripted(10, GearScript::constant(1)),
    )
    .unwrap()
    .run()
    .unwrap();

    let prefix = GearSelector::new(
        &bars,
        &gears,
        SelectorConfig {
            period: 10,
            mode: SelectionMode::Scripted(GearScript::constant(1)),
            partial_run: Some(3),
            seed: 0,
        },
    )
    .unwrap()
    .run()
    .unwrap();

    assert_eq!(prefix.ledger.len(), 30);
    // the prefix ledger is literally the head of the full ledger
    for (a, b) in prefix.ledger.iter().zip(full.ledger.iter()) {
        assert_eq!(a.open_size, b.open_size);
        assert!(a.gross_profit == b.gross_profit);
    }
    let row = &full.ledger[29];
    assert_eq!(prefix.score(), row.gross_profit + row.position_value);
}
