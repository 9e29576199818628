//! Change-gated state publication.
//!
//! Observers (the presentation layer) receive authoritative state as a
//! one-way, eventually-consistent broadcast: a field is transmitted only
//! when its value differs from the last transmitted one. [`Gated`] is
//! the generic publish-if-changed cell; [`HillSync`] groups one gate per
//! published field and drains changes as [`SyncUpdate`] values.

use serde::{Deserialize, Serialize};

use crate::rules::{AllianceId, MatchState};

/// A publish-if-changed cell. Keeps the last transmitted value and
/// suppresses redundant writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gated<T> {
    last: Option<T>,
}

impl<T: Copy + PartialEq> Gated<T> {
    /// Create a gate that has transmitted nothing yet. The first publish
    /// always passes.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Offer a value; returns `Some` only when it differs from the last
    /// transmitted value.
    pub fn publish(&mut self, value: T) -> Option<T> {
        if self.last == Some(value) {
            return None;
        }
        self.last = Some(value);
        Some(value)
    }

    /// The last transmitted value, if any.
    #[must_use]
    pub const fn last(&self) -> Option<T> {
        self.last
    }
}

/// One on-change update to an authoritative state field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SyncUpdate {
    /// The current king changed (or the hill became unowned).
    King(Option<AllianceId>),
    /// The tick at which the current reign began.
    KingStartTick(u32),
    /// An alliance's accumulated possession changed; negative means
    /// disqualified.
    Possession {
        /// The alliance whose ledger entry changed.
        alliance: AllianceId,
        /// Signed possession ticks.
        ticks: i64,
    },
    /// The contesting alliance changed.
    Contesting(Option<AllianceId>),
    /// The contest deadline moved.
    ContestDeadline(u32),
    /// The contest direction flipped.
    ContestDirection(bool),
}

/// Change-gated relay for the full authoritative field set.
#[derive(Debug, Clone)]
pub struct HillSync {
    king: Gated<Option<AllianceId>>,
    king_start_tick: Gated<u32>,
    possession: Vec<Gated<i64>>,
    contesting: Gated<Option<AllianceId>>,
    contest_deadline: Gated<u32>,
    contest_direction: Gated<bool>,
}

impl HillSync {
    /// Create a relay for a match with `num_alliances` alliances.
    #[must_use]
    pub fn new(num_alliances: usize) -> Self {
        Self {
            king: Gated::new(),
            king_start_tick: Gated::new(),
            possession: vec![Gated::new(); num_alliances],
            contesting: Gated::new(),
            contest_deadline: Gated::new(),
            contest_direction: Gated::new(),
        }
    }

    /// Compare the state against the last transmission and return every
    /// field that changed, in a fixed field order.
    pub fn collect(&mut self, state: &MatchState) -> Vec<SyncUpdate> {
        let mut updates = Vec::new();
        if let Some(value) = self.king.publish(state.king) {
            updates.push(SyncUpdate::King(value));
        }
        if let Some(value) = self.king_start_tick.publish(state.king_start_tick) {
            updates.push(SyncUpdate::KingStartTick(value));
        }
        for (idx, gate) in self.possession.iter_mut().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let alliance = idx as AllianceId;
            if let Some(ticks) = gate.publish(state.possession_ticks(alliance)) {
                updates.push(SyncUpdate::Possession { alliance, ticks });
            }
        }
        if let Some(value) = self.contesting.publish(state.contesting) {
            updates.push(SyncUpdate::Contesting(value));
        }
        if let Some(value) = self.contest_deadline.publish(state.contest_deadline) {
            updates.push(SyncUpdate::ContestDeadline(value));
        }
        if let Some(value) = self.contest_direction.publish(state.contest_direction) {
            updates.push(SyncUpdate::ContestDirection(value));
        }
        updates
    }
}
