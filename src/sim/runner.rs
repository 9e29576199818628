//! Deterministic scenario runner.
//!
//! Drives a [`HillMachine`] tick by tick from a scripted [`Scenario`]:
//! applies due events, evaluates the machine, records every effect and
//! published update, and cross-checks invariants each tick. Because the
//! rules are deterministic, `(scenario) -> MatchOutcome` is a pure
//! function.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::RulesConfig;
use crate::rules::{
    check_invariants, Alliance, AllianceId, Effect, HillMachine, HillSync, Region, Roster,
    SyncUpdate, UnitId,
};
use crate::sim::{Scenario, ScenarioError, ScenarioEvent, TimedEvent};

/// Everything observed while running one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutcome {
    /// Scenario name, echoed for reports.
    pub scenario: String,
    /// The winning alliance, if the match ended.
    pub winner: Option<AllianceId>,
    /// Ticks simulated (the winning tick when a winner exists).
    pub ticks_run: u32,
    /// Every effect the machine requested, with its tick.
    pub effects: Vec<(u32, Effect)>,
    /// Every change-gated update published, with its tick.
    pub updates: Vec<(u32, SyncUpdate)>,
    /// Invariant violations observed (always empty for a correct
    /// machine).
    pub violations: Vec<String>,
}

/// Runs one scenario to completion.
#[derive(Debug)]
pub struct MatchRunner {
    name: String,
    machine: HillMachine,
    sync: HillSync,
    positions: HashMap<UnitId, (f32, f32)>,
    events: Vec<TimedEvent>,
    max_ticks: u32,
    prev_possession: Vec<i64>,
}

impl MatchRunner {
    /// Build a runner from a scenario.
    ///
    /// # Errors
    ///
    /// Returns a [`ScenarioError`] when the scenario fails validation.
    pub fn new(scenario: &Scenario) -> Result<Self, ScenarioError> {
        scenario.validate()?;
        let options = scenario.mod_options();
        let config = RulesConfig::from_options(&options, scenario.map);

        let mut alliances = Vec::with_capacity(scenario.alliances.len());
        for (idx, def) in scenario.alliances.iter().enumerate() {
            let start_region = Region::parse(&def.start_region, scenario.map).map_err(|error| {
                ScenarioError::BadStartRegion {
                    alliance: idx,
                    error,
                }
            })?;
            #[allow(clippy::cast_possible_truncation)]
            let id = idx as AllianceId;
            alliances.push(Alliance::new(id, def.teams.clone(), start_region));
        }
        let num_alliances = alliances.len();
        let roster = Roster::new(alliances);
        let machine = HillMachine::new(
            config,
            roster,
            scenario.eligible_kinds.iter().copied().collect(),
        );

        Ok(Self {
            name: scenario.name.clone(),
            machine,
            sync: HillSync::new(num_alliances),
            positions: HashMap::new(),
            events: scenario.events.clone(),
            max_ticks: scenario.max_ticks,
            prev_possession: vec![0; num_alliances],
        })
    }

    /// Run the scenario to its winner or tick limit.
    pub fn run(&mut self) -> MatchOutcome {
        let mut outcome = MatchOutcome {
            scenario: self.name.clone(),
            winner: None,
            ticks_run: 0,
            effects: Vec::new(),
            updates: Vec::new(),
            violations: Vec::new(),
        };

        let mut next_event = 0usize;
        for tick in 0..=self.max_ticks {
            outcome.ticks_run = tick;

            while let Some(timed) = self.events.get(next_event) {
                if timed.tick > tick {
                    break;
                }
                let event = timed.event;
                next_event += 1;
                for effect in self.apply_event(event, tick) {
                    outcome.effects.push((tick, effect));
                }
            }

            for effect in self.machine.evaluate(tick, &self.positions) {
                outcome.effects.push((tick, effect));
                if let Effect::MatchWon(alliance) = effect {
                    outcome.winner = Some(alliance);
                }
            }

            for update in self.sync.collect(self.machine.state()) {
                outcome.updates.push((tick, update));
            }

            self.check_tick(tick, &mut outcome.violations);

            if outcome.winner.is_some() {
                break;
            }
        }

        outcome
    }

    /// Apply one scripted event, returning any effects it produced.
    fn apply_event(&mut self, event: ScenarioEvent, tick: u32) -> Vec<Effect> {
        match event {
            ScenarioEvent::Spawn {
                unit,
                kind,
                alliance,
                x,
                z,
            } => {
                self.positions.insert(unit, (x, z));
                self.machine.on_unit_finished(unit, kind, alliance)
            }
            ScenarioEvent::MoveTo { unit, x, z } => {
                if let Some(position) = self.positions.get_mut(&unit) {
                    *position = (x, z);
                }
                Vec::new()
            }
            ScenarioEvent::Destroy { unit } => {
                self.positions.remove(&unit);
                self.machine.on_unit_destroyed(unit);
                Vec::new()
            }
            ScenarioEvent::Transfer { unit, alliance } => {
                self.machine.on_unit_given(unit, alliance);
                Vec::new()
            }
            ScenarioEvent::FinishBuilding {
                building,
                alliance,
                x,
                z,
            } => {
                self.machine.on_building_finished(building, alliance, x, z);
                Vec::new()
            }
            ScenarioEvent::DestroyBuilding { building } => {
                self.machine.on_building_destroyed(building);
                Vec::new()
            }
            ScenarioEvent::TeamDied { team } => self.machine.on_team_died(team, tick),
        }
    }

    /// Record invariant violations and possession regressions.
    fn check_tick(&mut self, tick: u32, violations: &mut Vec<String>) {
        for violation in check_invariants(&self.machine) {
            violations.push(format!("tick {tick}: {violation}"));
        }
        for (idx, prev) in self.prev_possession.iter_mut().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let alliance = idx as AllianceId;
            let current = self.machine.state().possession_ticks(alliance);
            let regressed = if *prev >= 0 {
                current < *prev && current >= 0
            } else {
                // Once disqualified, the sentinel must never change.
                current != *prev
            };
            if regressed {
                violations.push(format!(
                    "tick {tick}: alliance {alliance} possession regressed from {prev} to {current}"
                ));
            }
            *prev = current;
        }
    }
}

/// Run a scenario from scratch - the simulator's pure-function entry
/// point.
///
/// # Errors
///
/// Returns a [`ScenarioError`] when the scenario fails validation.
pub fn run_scenario(scenario: &Scenario) -> Result<MatchOutcome, ScenarioError> {
    Ok(MatchRunner::new(scenario)?.run())
}
