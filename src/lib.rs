// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Koth: a King of the Hill rules engine for RTS matches.
//!
//! This crate implements the authoritative game-mode rules designed for:
//! - Host-agnostic, deterministic tick-driven evaluation
//! - Typed side effects applied by a thin host adapter
//! - Change-gated state publication to observers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │     Host adapter / Simulator        │
//! ├─────────────────────────────────────┤
//! │     Rules (hill state machine)      │
//! ├─────────────────────────────────────┤
//! │   Regions · Roster · Unit tracker   │
//! └─────────────────────────────────────┘
//! ```

pub mod config;
pub mod host;
pub mod rules;
pub mod sim;

pub use config::{ModOptions, RulesConfig};
pub use host::PositionSource;

// Re-export key rules types at crate root for convenience
pub use rules::{
    AllianceId, Effect, HillMachine, HillSync, MapSize, MatchState, Region, SyncUpdate, TeamId,
    UnitId, UnitKind,
};
