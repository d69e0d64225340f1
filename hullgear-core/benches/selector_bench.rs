//! Criterion benchmarks for the hot paths.
//!
//! Benchmarks:
//! 1. Gear precompute (three HMA lines + full trace) over a long feed
//! 2. Greedy selector run over the same feed
//! 3. Scripted prefix scoring — the unit of work the path search
//!    dispatches thousands of times per level

use chrono::TimeZone;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use hullgear_core::domain::Bar;
use hullgear_core::gear::{Gear, GearConfig, GearParams};
use hullgear_core::selector::{GearScript, GearSelector, SelectorConfig};

fn make_bars(n: usize) -> Vec<Bar> {
    let base = chrono::Utc.with_ymd_and_hms(2022, 9, 9, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.01;
            Bar {
                time: base + chrono::Duration::seconds(i as i64 * 15),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
            }
        })
        .collect()
}

fn make_gears(bars: &[Bar]) -> Vec<Gear> {
    let config = GearConfig::default();
    let grid = [3usize, 11, 19, 27, 35];
    let mut gears = Vec::new();
    for &h1 in &grid {
        for &h2 in &grid {
            gears.push(Gear::new(GearParams { h1, h2 }, config, bars));
        }
    }
    gears
}

fn bench_gear_precompute(c: &mut Criterion) {
    let bars = make_bars(1000);
    c.bench_function("gear_precompute_1000_bars", |b| {
        b.iter(|| {
            Gear::new(
                black_box(GearParams { h1: 19, h2: 35 }),
                GearConfig::default(),
                &bars,
            )
        })
    });
}

fn bench_greedy_selection(c: &mut Criterion) {
    let bars = make_bars(1000);
    let gears = make_gears(&bars);
    c.bench_function("greedy_selector_1000_bars_25_gears", |b| {
        b.iter(|| {
            GearSelector::new(&bars, &gears, SelectorConfig::greedy(20, 42))
                .unwrap()
                .run()
                .unwrap()
                .score()
        })
    });
}

fn bench_prefix_scoring(c: &mut Criterion) {
    let bars = make_bars(1000);
    let gears = make_gears(&bars);
    let script = GearScript::with_fallback(vec![3, 7, 12, 0, 24], 0);
    c.bench_function("scripted_prefix_score", |b| {
        b.iter(|| {
            let config =
                SelectorConfig::scripted(20, script.clone()).with_partial_run(black_box(5));
            GearSelector::new(&bars, &gears, config)
                .unwrap()
                .run()
                .unwrap()
                .score()
        })
    });
}

criterion_group!(
    benches,
    bench_gear_precompute,
    bench_greedy_selection,
    bench_prefix_scoring
);
criterion_main!(benches);
