//! Capture-eligible unit tracking.
//!
//! The tracker holds the only persisted per-unit state: a map from unit
//! id to owning alliance, restricted to the configured allow-list of
//! capture-eligible unit kinds. Positions are never cached; they are read
//! fresh from the host on every evaluation.

use std::collections::{HashMap, HashSet};

use crate::rules::AllianceId;

/// Unique identifier for a unit instance.
pub type UnitId = u32;

/// Identifier for a unit definition (kind).
pub type UnitKind = u32;

/// Tracks live capture-eligible units and their owning alliances.
#[derive(Debug, Clone, Default)]
pub struct UnitTracker {
    eligible_kinds: HashSet<UnitKind>,
    units: HashMap<UnitId, AllianceId>,
}

impl UnitTracker {
    /// Create a tracker with the given capture-eligible kind allow-list.
    #[must_use]
    pub fn new(eligible_kinds: HashSet<UnitKind>) -> Self {
        Self {
            eligible_kinds,
            units: HashMap::new(),
        }
    }

    /// Whether a unit kind may contest the hill.
    #[must_use]
    pub fn is_eligible(&self, kind: UnitKind) -> bool {
        self.eligible_kinds.contains(&kind)
    }

    /// Start tracking a finished unit. Ignores kinds outside the
    /// allow-list. Returns `true` if the unit is now tracked.
    pub fn track(&mut self, unit: UnitId, kind: UnitKind, alliance: AllianceId) -> bool {
        if !self.is_eligible(kind) {
            return false;
        }
        self.units.insert(unit, alliance);
        true
    }

    /// Re-attribute a tracked unit after a capture or transfer. Unknown
    /// units are ignored (the unit was not capture-eligible).
    pub fn transfer(&mut self, unit: UnitId, new_alliance: AllianceId) {
        if let Some(owner) = self.units.get_mut(&unit) {
            *owner = new_alliance;
        }
    }

    /// Stop tracking a destroyed unit.
    pub fn remove(&mut self, unit: UnitId) {
        self.units.remove(&unit);
    }

    /// Number of tracked units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether no units are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterate over `(unit, alliance)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (UnitId, AllianceId)> + '_ {
        self.units.iter().map(|(&unit, &alliance)| (unit, alliance))
    }
}
