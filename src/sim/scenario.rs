//! Scenario files for the headless simulator.
//!
//! A scenario is everything needed to replay a match deterministically:
//! map dimensions, the raw option table, the alliance roster, and a
//! tick-ordered event script. Scenarios are stored as JSON.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ModOptions;
use crate::rules::{
    AllianceId, MapSize, Region, RegionParseError, TeamId, UnitId, UnitKind, MAX_ALLIANCES,
};

/// One alliance in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllianceDef {
    /// Constituent team ids.
    pub teams: Vec<TeamId>,
    /// Start region descriptor, e.g. `"rect 0 0 40 40"`.
    pub start_region: String,
}

/// A scripted host event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScenarioEvent {
    /// A capture-eligible unit finishes at a position.
    Spawn {
        /// New unit id.
        unit: UnitId,
        /// Unit definition id.
        kind: UnitKind,
        /// Owning alliance.
        alliance: AllianceId,
        /// Map x.
        x: f32,
        /// Map z.
        z: f32,
    },
    /// Teleport a unit to a position.
    MoveTo {
        /// The unit to move.
        unit: UnitId,
        /// Map x.
        x: f32,
        /// Map z.
        z: f32,
    },
    /// Destroy a unit.
    Destroy {
        /// The unit to destroy.
        unit: UnitId,
    },
    /// Transfer a unit to another alliance.
    Transfer {
        /// The unit changing hands.
        unit: UnitId,
        /// The receiving alliance.
        alliance: AllianceId,
    },
    /// A building finishes construction.
    FinishBuilding {
        /// New building id.
        building: UnitId,
        /// Owning alliance.
        alliance: AllianceId,
        /// Map x.
        x: f32,
        /// Map z.
        z: f32,
    },
    /// A building is destroyed by other means.
    DestroyBuilding {
        /// The building to remove.
        building: UnitId,
    },
    /// A team dies (its units are destroyed by separate events).
    TeamDied {
        /// The dead team.
        team: TeamId,
    },
}

/// An event scheduled at a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Tick at which the event fires, before that tick's evaluation.
    pub tick: u32,
    /// The event itself.
    pub event: ScenarioEvent,
}

/// A complete, self-contained match script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Human-readable scenario name.
    pub name: String,
    /// Playable map extents.
    pub map: MapSize,
    /// Raw game-mode option table.
    pub options: BTreeMap<String, String>,
    /// Capture-eligible unit definition ids.
    pub eligible_kinds: Vec<UnitKind>,
    /// The alliances, indexed by id.
    pub alliances: Vec<AllianceDef>,
    /// Ticks to simulate (inclusive of tick 0).
    pub max_ticks: u32,
    /// The event script, ordered by tick.
    pub events: Vec<TimedEvent>,
}

impl Scenario {
    /// The option table as consumed by config resolution.
    #[must_use]
    pub fn mod_options(&self) -> ModOptions {
        self.options
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Validate roster bounds, start regions, team uniqueness, and that
    /// every unit event references a previously spawned unit.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScenarioError`] found.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.alliances.is_empty() {
            return Err(ScenarioError::NoAlliances);
        }
        if self.alliances.len() > MAX_ALLIANCES {
            return Err(ScenarioError::TooManyAlliances(self.alliances.len()));
        }

        let mut seen_teams = Vec::new();
        for (idx, def) in self.alliances.iter().enumerate() {
            Region::parse(&def.start_region, self.map).map_err(|error| {
                ScenarioError::BadStartRegion {
                    alliance: idx,
                    error,
                }
            })?;
            for &team in &def.teams {
                if seen_teams.contains(&team) {
                    return Err(ScenarioError::DuplicateTeam(team));
                }
                seen_teams.push(team);
            }
        }

        let mut spawned: Vec<UnitId> = Vec::new();
        let mut last_tick = 0u32;
        for timed in &self.events {
            if timed.tick < last_tick {
                return Err(ScenarioError::UnorderedEvents { tick: timed.tick });
            }
            last_tick = timed.tick;
            match timed.event {
                ScenarioEvent::Spawn { unit, .. } => spawned.push(unit),
                ScenarioEvent::MoveTo { unit, .. }
                | ScenarioEvent::Destroy { unit }
                | ScenarioEvent::Transfer { unit, .. } => {
                    if !spawned.contains(&unit) {
                        return Err(ScenarioError::UnknownUnit {
                            tick: timed.tick,
                            unit,
                        });
                    }
                }
                ScenarioEvent::FinishBuilding { .. }
                | ScenarioEvent::DestroyBuilding { .. }
                | ScenarioEvent::TeamDied { .. } => {}
            }
        }
        Ok(())
    }

    /// Load a scenario from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or malformed JSON.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let file = File::open(path)?;
        let scenario = serde_json::from_reader(BufReader::new(file))?;
        Ok(scenario)
    }

    /// Save the scenario as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    pub fn save(&self, path: &Path) -> Result<(), ScenarioError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

/// Error type for scenario operations.
#[derive(Debug)]
pub enum ScenarioError {
    /// File could not be read or written.
    Io(io::Error),
    /// The file was not valid scenario JSON.
    Json(serde_json::Error),
    /// A scenario needs at least one alliance.
    NoAlliances,
    /// Too many alliances for one match.
    TooManyAlliances(usize),
    /// A start region descriptor failed to parse.
    BadStartRegion {
        /// Roster index of the offending alliance.
        alliance: usize,
        /// Parse error details.
        error: RegionParseError,
    },
    /// A team id appears in more than one alliance.
    DuplicateTeam(TeamId),
    /// The event script is not tick-ordered.
    UnorderedEvents {
        /// Tick of the out-of-order event.
        tick: u32,
    },
    /// A unit event references a unit that was never spawned.
    UnknownUnit {
        /// Tick of the offending event.
        tick: u32,
        /// The unreferenced unit id.
        unit: UnitId,
    },
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "scenario I/O error: {e}"),
            Self::Json(e) => write!(f, "malformed scenario JSON: {e}"),
            Self::NoAlliances => write!(f, "scenario has no alliances"),
            Self::TooManyAlliances(n) => {
                write!(f, "too many alliances: {n} (maximum {MAX_ALLIANCES})")
            }
            Self::BadStartRegion { alliance, error } => {
                write!(f, "bad start region for alliance {alliance}: {error}")
            }
            Self::DuplicateTeam(team) => {
                write!(f, "team {team} appears in more than one alliance")
            }
            Self::UnorderedEvents { tick } => {
                write!(f, "event at tick {tick} is out of order")
            }
            Self::UnknownUnit { tick, unit } => {
                write!(f, "event at tick {tick} references unspawned unit {unit}")
            }
        }
    }
}

impl From<io::Error> for ScenarioError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ScenarioError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl std::error::Error for ScenarioError {}
