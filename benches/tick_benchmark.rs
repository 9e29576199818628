//! Benchmarks for the tick evaluator.
//!
//! This benchmarks the per-tick occupancy scan and contest update - the
//! hot path that runs inside the host's simulation loop.

#![allow(missing_docs)]

use std::collections::{HashMap, HashSet};
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use koth::config::RulesConfig;
use koth::rules::{Alliance, HillMachine, Region, Roster};
use koth::sim::{random_scenario, run_scenario};
use koth::MapSize;

const COMMANDER: u32 = 7;

/// A machine with `units` tracked capture units spread across four
/// alliances, half of them standing on the hill.
fn machine_with_units(units: u32) -> (HillMachine, HashMap<u32, (f32, f32)>) {
    let mut config = RulesConfig::defaults(MapSize::new(2000.0, 2000.0));
    config.enabled = true;
    config.eval_interval = 1;
    let region = Region::Rect {
        left: 0.0,
        top: 0.0,
        right: 200.0,
        bottom: 200.0,
    };
    let roster = Roster::new(
        (0..4)
            .map(|id| Alliance::new(id, vec![id], region))
            .collect(),
    );
    let mut machine = HillMachine::new(config, roster, HashSet::from([COMMANDER]));

    let mut positions = HashMap::new();
    for unit in 0..units {
        let alliance = u8::try_from(unit % 4).unwrap_or(0);
        machine.on_unit_finished(unit, COMMANDER, alliance);
        let position = if unit % 2 == 0 {
            // On the hill (map center).
            (1000.0, 1000.0)
        } else {
            (100.0, 100.0)
        };
        positions.insert(unit, position);
    }
    (machine, positions)
}

fn bench_evaluate(c: &mut Criterion) {
    for units in [16u32, 256, 4096] {
        let (mut machine, positions) = machine_with_units(units);
        c.bench_function(&format!("evaluate_{units}_units"), |b| {
            let mut tick = 0u32;
            b.iter(|| {
                tick += 1;
                let effects = machine.evaluate(black_box(tick), black_box(&positions));
                black_box(effects)
            });
        });
    }
}

fn bench_full_match(c: &mut Criterion) {
    let scenario = random_scenario(42);
    c.bench_function("full_random_match", |b| {
        b.iter(|| {
            let outcome = run_scenario(black_box(&scenario));
            black_box(outcome)
        });
    });
}

criterion_group!(benches, bench_evaluate, bench_full_match);
criterion_main!(benches);
