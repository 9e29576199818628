//! The seam between the rules engine and the host simulation.
//!
//! The engine never talks to an engine API directly: unit positions are
//! read through [`PositionSource`], inbound lifecycle events arrive as
//! typed method calls on the machine, and outbound mutations leave as
//! [`Effect`](crate::rules::Effect) values for the adapter to apply.

use std::collections::HashMap;

use crate::rules::UnitId;

/// Fresh per-tick access to unit positions in the host simulation.
///
/// Positions are queried anew on every evaluation; implementations must
/// return `None` for units that no longer exist.
pub trait PositionSource {
    /// Current `(x, z)` map position of a unit.
    fn position(&self, unit: UnitId) -> Option<(f32, f32)>;
}

impl PositionSource for HashMap<UnitId, (f32, f32)> {
    fn position(&self, unit: UnitId) -> Option<(f32, f32)> {
        self.get(&unit).copied()
    }
}
