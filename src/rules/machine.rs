//! The hill ownership state machine.
//!
//! A periodic tick-driven evaluator: it scans tracked capture units,
//! derives the contest direction and deadline, and transitions ownership
//! when deadlines elapse. Side effects never touch the host directly;
//! they are returned as [`Effect`] values for the adapter to apply.

use crate::config::RulesConfig;
use crate::host::PositionSource;
use crate::rules::{
    AllianceId, MatchState, Roster, TeamId, UnitId, UnitKind, UnitTracker, MAX_ALLIANCES,
};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A side effect requested by the state machine, applied by the host
/// adapter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Grant the alliance full map visibility.
    GrantVision(AllianceId),
    /// Revoke a previously granted visibility grant.
    RevokeVision(AllianceId),
    /// Destroy a building left on the hill by a dethroned king.
    Demolish(UnitId),
    /// Scale a capture-eligible unit's health on completion.
    ScaleHealth {
        /// The unit to rescale.
        unit: UnitId,
        /// Multiplier relative to base health.
        factor: f32,
    },
    /// End the match in favor of the alliance.
    MatchWon(AllianceId),
}

/// The hill ownership state machine for one match.
#[derive(Debug, Clone)]
pub struct HillMachine {
    config: RulesConfig,
    roster: Roster,
    tracker: UnitTracker,
    state: MatchState,
}

impl HillMachine {
    /// Create a machine for a match.
    #[must_use]
    pub fn new(config: RulesConfig, roster: Roster, eligible_kinds: HashSet<UnitKind>) -> Self {
        let num_alliances = roster.len();
        Self {
            config,
            roster,
            tracker: UnitTracker::new(eligible_kinds),
            state: MatchState::new(num_alliances),
        }
    }

    /// The resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &RulesConfig {
        &self.config
    }

    /// The alliance roster.
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The live capture-unit tracker.
    #[must_use]
    pub const fn tracker(&self) -> &UnitTracker {
        &self.tracker
    }

    /// The authoritative state, for publication and inspection.
    #[must_use]
    pub const fn state(&self) -> &MatchState {
        &self.state
    }

    /// Evaluate the contest at `tick`.
    ///
    /// Runs only on the configured cadence (every
    /// [`eval_interval`](RulesConfig::eval_interval) ticks); off-cadence
    /// calls return no effects. Unit positions are read fresh from
    /// `positions`.
    ///
    /// While a king occupies the hill its presence alone counts as
    /// holding, co-occupants notwithstanding; a rival contest never
    /// starts or advances while a king exists. Only one contest track is
    /// kept at a time.
    pub fn evaluate(&mut self, tick: u32, positions: &impl PositionSource) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.config.enabled {
            return effects;
        }
        if self.config.eval_interval > 1 && tick % self.config.eval_interval != 0 {
            return effects;
        }

        let occupancy = self.scan_occupancy(positions);
        self.update_direction(tick, &occupancy);

        // Win check precedes deadline resolution: a reign that reaches
        // its win tick ends the match even if a decay deadline lands on
        // the same evaluation.
        if let Some(king) = self.state.king
            && let Some(win_tick) = self.state.win_tick
            && tick >= win_tick
        {
            effects.push(Effect::MatchWon(king));
            return effects;
        }

        if tick >= self.state.contest_deadline {
            match self.state.king {
                Some(_) if !self.state.contest_direction => self.dethrone(tick, &mut effects),
                None if self.state.contest_direction => self.crown(tick, &mut effects),
                _ => {}
            }
        }

        effects
    }

    /// Which alliances currently have at least one tracked unit inside
    /// the hill.
    fn scan_occupancy(&self, positions: &impl PositionSource) -> Occupancy {
        let mut occupancy = Occupancy::default();
        for (unit, alliance) in self.tracker.iter() {
            let Some((x, z)) = positions.position(unit) else {
                continue;
            };
            if self.config.hill.contains_point(x, z) {
                occupancy.mark(alliance);
            }
        }
        occupancy
    }

    /// Decide the contest direction and recompute the deadline on a
    /// direction change.
    fn update_direction(&mut self, tick: u32, occupancy: &Occupancy) {
        let new_direction = match self.state.king {
            Some(king) => occupancy.contains(king),
            None => match occupancy.sole_occupant() {
                Some(challenger)
                    if tick >= self.state.contest_deadline
                        || self.state.contesting == Some(challenger) =>
                {
                    self.state.contesting = Some(challenger);
                    true
                }
                _ => false,
            },
        };

        if new_direction != self.state.contest_direction {
            // Symmetric resumption: reversing at elapsed-fraction f of
            // the delay restarts the opposite phase at the same
            // fraction, never the full delay.
            let remaining = self.state.contest_deadline.saturating_sub(tick);
            self.state.contest_deadline =
                tick + self.config.capture_ticks.saturating_sub(remaining);
            self.state.contest_direction = new_direction;
        }
    }

    /// Crown the contesting alliance at `tick`.
    fn crown(&mut self, tick: u32, effects: &mut Vec<Effect>) {
        let Some(challenger) = self.state.contesting.take() else {
            debug_assert!(false, "progressing contest without a contesting alliance");
            return;
        };
        self.state.king = Some(challenger);
        self.state.king_start_tick = tick;
        self.state.win_tick = Some(win_tick(
            tick,
            self.config.win_ticks,
            self.state.possession_ticks(challenger),
        ));
        if self.config.king_vision {
            effects.push(Effect::GrantVision(challenger));
        }
    }

    /// Dethrone the current king at `tick`: fold the reign into its
    /// possession, revoke vision, demolish its hill buildings, and open
    /// the hill for a fresh contest.
    fn dethrone(&mut self, tick: u32, effects: &mut Vec<Effect>) {
        let Some(king) = self.state.king.take() else {
            return;
        };
        self.state
            .accrue_possession(king, tick.saturating_sub(self.state.king_start_tick));
        self.state.king_start_tick = tick;
        self.state.win_tick = None;
        self.state.contesting = None;
        // Leave the contest fully decayed so the next challenger starts
        // a whole countdown. Matters for elimination dethronements,
        // which can land while the direction still reads as holding.
        self.state.contest_direction = false;
        self.state.contest_deadline = tick;
        if self.config.king_vision {
            effects.push(Effect::RevokeVision(king));
        }
        let buildings = std::mem::take(&mut self.state.hill_buildings);
        effects.extend(buildings.into_iter().map(Effect::Demolish));
    }

    /// A capture-eligible unit finished construction or arrived in the
    /// match. Ineligible kinds are ignored.
    pub fn on_unit_finished(
        &mut self,
        unit: UnitId,
        kind: UnitKind,
        alliance: AllianceId,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.tracker.track(unit, kind, alliance)
            && (self.config.health_multiplier - 1.0).abs() > f32::EPSILON
        {
            effects.push(Effect::ScaleHealth {
                unit,
                factor: self.config.health_multiplier,
            });
        }
        effects
    }

    /// A tracked unit changed hands (capture or gift).
    pub fn on_unit_given(&mut self, unit: UnitId, new_alliance: AllianceId) {
        self.tracker.transfer(unit, new_alliance);
    }

    /// A unit was destroyed.
    pub fn on_unit_destroyed(&mut self, unit: UnitId) {
        self.tracker.remove(unit);
    }

    /// A building finished construction. Buildings the current king
    /// completes inside the hill are demolished when it is dethroned.
    pub fn on_building_finished(&mut self, building: UnitId, alliance: AllianceId, x: f32, z: f32) {
        if self.state.king == Some(alliance) && self.config.hill.contains_point(x, z) {
            self.state.hill_buildings.insert(building);
        }
    }

    /// A building was destroyed by other means.
    pub fn on_building_destroyed(&mut self, building: UnitId) {
        self.state.hill_buildings.remove(&building);
    }

    /// A team died. When this eliminates its alliance, a reigning king
    /// is dethroned immediately (no decay delay) and the alliance is
    /// permanently disqualified.
    pub fn on_team_died(&mut self, team: TeamId, tick: u32) -> Vec<Effect> {
        let mut effects = Vec::new();
        let Some(alliance) = self.roster.record_team_death(team) else {
            return effects;
        };
        if self.state.king == Some(alliance) {
            self.dethrone(tick, &mut effects);
        }
        self.state.disqualify(alliance);
        effects
    }

    /// Direct mutable state access for harnesses and tests.
    #[doc(hidden)]
    pub fn state_mut(&mut self) -> &mut MatchState {
        &mut self.state
    }
}

/// Compute the tick at which a freshly crowned king wins. Prior
/// possession shortens the reign; the result is never before the
/// crowning tick itself.
fn win_tick(crowned_at: u32, win_ticks: u32, prior_possession: i64) -> u32 {
    let target = i64::from(crowned_at) + i64::from(win_ticks) - prior_possession.max(0);
    u32::try_from(target.max(i64::from(crowned_at))).unwrap_or(u32::MAX)
}

/// Set of alliances occupying the hill during one evaluation.
#[derive(Debug, Clone, Copy)]
struct Occupancy {
    present: [bool; MAX_ALLIANCES],
    count: usize,
    last_marked: Option<AllianceId>,
}

impl Default for Occupancy {
    fn default() -> Self {
        Self {
            present: [false; MAX_ALLIANCES],
            count: 0,
            last_marked: None,
        }
    }
}

impl Occupancy {
    fn mark(&mut self, alliance: AllianceId) {
        let Some(slot) = self.present.get_mut(usize::from(alliance)) else {
            return;
        };
        if !*slot {
            *slot = true;
            self.count += 1;
            self.last_marked = Some(alliance);
        }
    }

    fn contains(&self, alliance: AllianceId) -> bool {
        self.present
            .get(usize::from(alliance))
            .copied()
            .unwrap_or(false)
    }

    /// The single occupying alliance, when exactly one is present.
    fn sole_occupant(&self) -> Option<AllianceId> {
        (self.count == 1).then_some(self.last_marked).flatten()
    }
}
