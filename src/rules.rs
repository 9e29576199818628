//! Rules layer for the King of the Hill game mode.
//!
//! Implements the authoritative match rules on top of the host seam:
//! - Region geometry (rectangle and circle hills, start regions)
//! - Alliance roster and elimination
//! - Capture-eligible unit tracking
//! - The tick-driven ownership state machine
//! - Build admission and damage shielding
//! - Change-gated state publication

mod alliance;
mod guards;
mod invariants;
mod machine;
mod publish;
mod region;
mod state;
mod units;

pub use alliance::{Alliance, AllianceId, Roster, TeamId, MAX_ALLIANCES};
pub use guards::{build_allowed, shields_damage};
pub use invariants::{assert_invariants, check_invariants, InvariantViolation};
pub use machine::{Effect, HillMachine};
pub use publish::{Gated, HillSync, SyncUpdate};
pub use region::{MapSize, Region, RegionParseError, DESCRIPTOR_GRID};
pub use state::{MatchState, Progress, DISQUALIFIED};
pub use units::{UnitId, UnitKind, UnitTracker};
