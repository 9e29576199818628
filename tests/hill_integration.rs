//! Multi-tick integration tests for the hill ownership rules.
//!
//! These drive whole contests through the public machine API and the
//! scenario runner, pinning the capture, decay, win, and elimination
//! timelines tick by tick.
//!
//! Run with: cargo test --release hill_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, HashMap, HashSet};

use koth::config::RulesConfig;
use koth::rules::{
    Alliance, Effect, HillMachine, Region, Roster, SyncUpdate, DISQUALIFIED,
};
use koth::sim::{run_scenario, AllianceDef, Scenario, ScenarioEvent, TimedEvent};
use koth::MapSize;

/// Load a shipped scenario from the scenarios directory.
fn load_scenario(name: &str) -> Scenario {
    let path = format!("{}/scenarios/{}.json", env!("CARGO_MANIFEST_DIR"), name);
    Scenario::load(std::path::Path::new(&path))
        .unwrap_or_else(|e| panic!("Failed to load {path}: {e}"))
}

const COMMANDER: u32 = 7;
const IN_HILL: (f32, f32) = (500.0, 500.0);
const OUTSIDE: (f32, f32) = (50.0, 50.0);

/// Capture delay 1200 ticks, win duration 6000 ticks, hill covering the
/// map center, evaluated every tick.
fn machine(num_alliances: u8) -> HillMachine {
    let config = RulesConfig {
        enabled: true,
        hill: Region::Rect {
            left: 400.0,
            top: 400.0,
            right: 600.0,
            bottom: 600.0,
        },
        build_outside_boxes: true,
        win_ticks: 6000,
        capture_ticks: 1200,
        health_multiplier: 1.0,
        king_vision: true,
        eval_interval: 1,
        ticks_per_second: 60,
    };
    let roster = Roster::new(
        (0..num_alliances)
            .map(|id| {
                Alliance::new(
                    id,
                    vec![id],
                    Region::Rect {
                        left: 0.0,
                        top: 0.0,
                        right: 100.0,
                        bottom: 100.0,
                    },
                )
            })
            .collect(),
    );
    HillMachine::new(config, roster, HashSet::from([COMMANDER]))
}

#[test]
fn test_uncontested_capture_timeline() {
    // Alliance 0 alone occupies an unclaimed hill at tick 0 with a
    // 1200-tick delay: contest starts progressing with deadline 1200,
    // and at tick 1200 the sole occupant is crowned.
    let mut m = machine(2);
    m.on_unit_finished(1, COMMANDER, 0);
    let positions = HashMap::from([(1u32, IN_HILL)]);

    m.evaluate(0, &positions);
    assert!(m.state().contest_direction);
    assert_eq!(m.state().contest_deadline, 1200);
    assert_eq!(m.state().king, None);

    for tick in 1..1200 {
        assert!(m.evaluate(tick, &positions).is_empty());
        assert_eq!(m.state().king, None);
    }

    let effects = m.evaluate(1200, &positions);
    assert_eq!(effects, vec![Effect::GrantVision(0)]);
    assert_eq!(m.state().king, Some(0));
    assert_eq!(m.state().king_start_tick, 1200);
}

#[test]
fn test_decay_and_symmetric_return_timeline() {
    // Crowned king leaves at tick 1200: decay deadline 2400. Returning
    // at tick 1800 (50% decayed) recomputes the capture deadline
    // symmetrically back to 2400.
    let mut m = machine(2);
    m.on_unit_finished(1, COMMANDER, 0);
    let inside = HashMap::from([(1u32, IN_HILL)]);
    let outside = HashMap::from([(1u32, OUTSIDE)]);

    m.evaluate(0, &inside);
    m.evaluate(1200, &inside);
    assert_eq!(m.state().king, Some(0));

    m.evaluate(1200, &outside);
    assert!(!m.state().contest_direction);
    assert_eq!(m.state().contest_deadline, 2400);

    m.evaluate(1800, &inside);
    assert!(m.state().contest_direction);
    assert_eq!(m.state().contest_deadline, 2400);
    // Still king throughout the dip.
    assert_eq!(m.state().king, Some(0));
}

#[test]
fn test_win_tick_discounts_prior_possession() {
    // Crowning with prior possession P sets win tick to
    // king_start + win_duration - P, and reaching it ends the match.
    let mut m = machine(2);
    let inside = HashMap::from([(1u32, IN_HILL)]);
    let outside = HashMap::from([(1u32, OUTSIDE)]);
    m.on_unit_finished(1, COMMANDER, 0);

    // First reign: crowned at 1200, leaves immediately, dethroned at
    // 2400 having banked 1200 ticks.
    m.evaluate(0, &inside);
    m.evaluate(1200, &inside);
    m.evaluate(1206, &outside);
    let effects = m.evaluate(2406, &outside);
    assert!(effects.contains(&Effect::RevokeVision(0)));
    assert_eq!(m.state().possession_ticks(0), 1206);

    // Second reign: the banked possession shortens the path to the win.
    m.evaluate(2406, &inside);
    assert!(m.state().contest_direction);
    let second_crown = m.state().contest_deadline;
    let mut crowned_at = None;
    for tick in 2407..=second_crown {
        let effects = m.evaluate(tick, &inside);
        if effects.contains(&Effect::GrantVision(0)) {
            crowned_at = Some(tick);
        }
    }
    let crowned_at = crowned_at.unwrap();
    let banked = 1206;
    assert_eq!(m.state().win_tick, Some(crowned_at + 6000 - banked));

    let win_tick = m.state().win_tick.unwrap();
    assert!(m.evaluate(win_tick - 1, &inside).is_empty());
    assert_eq!(m.evaluate(win_tick, &inside), vec![Effect::MatchWon(0)]);
}

#[test]
fn test_elimination_of_reigning_king() {
    // An eliminated king is dethroned at the elimination tick, not
    // after the capture delay; possession becomes the sentinel and its
    // hill buildings are demolished.
    let mut m = machine(2);
    m.on_unit_finished(1, COMMANDER, 1);
    let inside = HashMap::from([(1u32, IN_HILL)]);
    m.evaluate(0, &inside);
    m.evaluate(1200, &inside);
    assert_eq!(m.state().king, Some(1));

    m.on_building_finished(70, 1, 500.0, 500.0);

    let effects = m.on_team_died(1, 1500);
    assert_eq!(
        effects,
        vec![Effect::RevokeVision(1), Effect::Demolish(70)]
    );
    assert_eq!(m.state().king, None);
    assert_eq!(m.state().king_start_tick, 1500);
    assert_eq!(m.state().possession_ticks(1), DISQUALIFIED);
    assert_eq!(m.state().win_tick, None);

    // Alliance 0 can contest a now-open hill immediately.
    m.on_unit_destroyed(1);
    m.on_unit_finished(2, COMMANDER, 0);
    let challenger = HashMap::from([(2u32, IN_HILL)]);
    m.evaluate(1500, &challenger);
    assert_eq!(m.state().contesting, Some(0));
    assert!(m.state().contest_direction);
}

#[test]
fn test_multi_alliance_contention_blocks_capture() {
    // Three alliances trading sole occupancy never crown anyone while a
    // rival is always present within each countdown.
    let mut m = machine(3);
    m.on_unit_finished(1, COMMANDER, 0);
    m.on_unit_finished(2, COMMANDER, 1);
    m.on_unit_finished(3, COMMANDER, 2);

    let all_in = HashMap::from([(1u32, IN_HILL), (2u32, IN_HILL), (3u32, IN_HILL)]);
    for tick in 0..3000 {
        assert!(m.evaluate(tick, &all_in).is_empty());
    }
    assert_eq!(m.state().king, None);
    assert_eq!(m.state().contesting, None);
}

/// End-to-end scenario-runner version of the uncontested capture, with
/// the default 6-tick evaluation cadence.
#[test]
fn test_scenario_runner_full_match() {
    let options = BTreeMap::from([
        ("koth".to_string(), "1".to_string()),
        ("kothregion".to_string(), "rect 80 80 120 120".to_string()),
        // 40 seconds at 30 ticks/second = 1200 ticks.
        ("kothdelay".to_string(), "40".to_string()),
        // 2 minutes = 3600 ticks.
        ("kothduration".to_string(), "2".to_string()),
    ]);
    let scenario = Scenario {
        name: "uncontested".to_string(),
        map: MapSize::new(1000.0, 1000.0),
        options,
        eligible_kinds: vec![COMMANDER],
        alliances: vec![
            AllianceDef {
                teams: vec![0],
                start_region: "rect 0 0 40 40".to_string(),
            },
            AllianceDef {
                teams: vec![1],
                start_region: "rect 160 160 200 200".to_string(),
            },
        ],
        max_ticks: 10_000,
        events: vec![TimedEvent {
            tick: 0,
            event: ScenarioEvent::Spawn {
                unit: 1,
                kind: COMMANDER,
                alliance: 0,
                x: 500.0,
                z: 500.0,
            },
        }],
    };

    let outcome = run_scenario(&scenario).unwrap();
    assert_eq!(outcome.winner, Some(0));
    assert!(outcome.violations.is_empty());
    // Crowned at the capture deadline, won a full win-duration later.
    assert!(outcome
        .effects
        .contains(&(1200, Effect::GrantVision(0))));
    assert_eq!(outcome.ticks_run, 1200 + 3600);
}

#[test]
fn test_scenario_with_contention_and_recovery() {
    // Alliance 1 interrupts alliance 0 mid-capture, then withdraws;
    // alliance 0 still wins, later than the uncontested timeline.
    let options = BTreeMap::from([
        ("koth".to_string(), "1".to_string()),
        ("kothregion".to_string(), "rect 80 80 120 120".to_string()),
        ("kothdelay".to_string(), "40".to_string()),
        ("kothduration".to_string(), "2".to_string()),
    ]);
    let hill = (500.0, 500.0);
    let events = vec![
        TimedEvent {
            tick: 0,
            event: ScenarioEvent::Spawn {
                unit: 1,
                kind: COMMANDER,
                alliance: 0,
                x: hill.0,
                z: hill.1,
            },
        },
        TimedEvent {
            tick: 0,
            event: ScenarioEvent::Spawn {
                unit: 2,
                kind: COMMANDER,
                alliance: 1,
                x: 900.0,
                z: 900.0,
            },
        },
        // Walk into the contest at tick 600, leave at 1200.
        TimedEvent {
            tick: 600,
            event: ScenarioEvent::MoveTo {
                unit: 2,
                x: hill.0,
                z: hill.1,
            },
        },
        TimedEvent {
            tick: 1200,
            event: ScenarioEvent::MoveTo {
                unit: 2,
                x: 900.0,
                z: 900.0,
            },
        },
    ];
    let scenario = Scenario {
        name: "contested".to_string(),
        map: MapSize::new(1000.0, 1000.0),
        options,
        eligible_kinds: vec![COMMANDER],
        alliances: vec![
            AllianceDef {
                teams: vec![0],
                start_region: "rect 0 0 40 40".to_string(),
            },
            AllianceDef {
                teams: vec![1],
                start_region: "rect 160 160 200 200".to_string(),
            },
        ],
        max_ticks: 10_000,
        events,
    };

    let outcome = run_scenario(&scenario).unwrap();
    assert_eq!(outcome.winner, Some(0));
    assert!(outcome.violations.is_empty());

    let crown_tick = outcome
        .effects
        .iter()
        .find_map(|(tick, e)| matches!(e, Effect::GrantVision(0)).then_some(*tick))
        .unwrap();
    assert!(
        crown_tick > 1200,
        "interrupted capture must crown later than the uncontested deadline, got {crown_tick}"
    );
}

#[test]
fn test_shipped_uncontested_scenario() {
    let outcome = run_scenario(&load_scenario("uncontested")).unwrap();
    assert_eq!(outcome.winner, Some(0));
    assert!(outcome.violations.is_empty());
}

#[test]
fn test_shipped_elimination_scenario() {
    let outcome = run_scenario(&load_scenario("contested_elimination")).unwrap();
    assert_eq!(outcome.winner, Some(0));
    assert!(outcome.violations.is_empty());
    // The eliminated alliance shows up disqualified in the published
    // stream.
    assert!(outcome.updates.iter().any(|(_, u)| matches!(
        u,
        SyncUpdate::Possession { alliance: 1, ticks } if *ticks < 0
    )));
}
