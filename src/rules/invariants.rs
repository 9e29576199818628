//! Rules invariants - sanity checks that detect bugs.
//!
//! These should NEVER trigger in a correctly implemented machine. They
//! are bug detectors, not gameplay limits, and are checked after every
//! evaluation in debug builds by the simulator.

use crate::rules::{HillMachine, DISQUALIFIED};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all machine invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(machine: &HillMachine) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let state = machine.state();
    let roster = machine.roster();

    let in_roster = |alliance: u8| usize::from(alliance) < roster.len();

    if let Some(king) = state.king {
        if !in_roster(king) {
            violations.push(InvariantViolation {
                message: format!("King {king} is not in the roster"),
            });
        }
        if state.is_disqualified(king) {
            violations.push(InvariantViolation {
                message: format!("King {king} is disqualified"),
            });
        }
        if state.contesting.is_some() {
            violations.push(InvariantViolation {
                message: format!(
                    "Contest recorded for {:?} while {king} reigns",
                    state.contesting
                ),
            });
        }
        if state.win_tick.is_none() {
            violations.push(InvariantViolation {
                message: format!("King {king} has no win tick"),
            });
        }
    } else {
        if state.win_tick.is_some() {
            violations.push(InvariantViolation {
                message: "Win tick set without a king".to_string(),
            });
        }
        if !state.hill_buildings.is_empty() {
            violations.push(InvariantViolation {
                message: format!(
                    "{} hill buildings tracked without a king",
                    state.hill_buildings.len()
                ),
            });
        }
    }

    if let Some(contesting) = state.contesting {
        if !in_roster(contesting) {
            violations.push(InvariantViolation {
                message: format!("Contesting alliance {contesting} is not in the roster"),
            });
        }
    } else if state.contest_direction && state.king.is_none() {
        violations.push(InvariantViolation {
            message: "Progressing contest without a contesting alliance or king".to_string(),
        });
    }

    for alliance in roster.iter() {
        let ticks = state.possession_ticks(alliance.id);
        if ticks < 0 && ticks != DISQUALIFIED {
            violations.push(InvariantViolation {
                message: format!(
                    "Alliance {} possession {ticks} is negative but not the sentinel",
                    alliance.id
                ),
            });
        }
        if alliance.is_eliminated() && ticks != DISQUALIFIED {
            violations.push(InvariantViolation {
                message: format!(
                    "Eliminated alliance {} is not disqualified (possession {ticks})",
                    alliance.id
                ),
            });
        }
    }

    for (unit, alliance) in machine.tracker().iter() {
        if !in_roster(alliance) {
            violations.push(InvariantViolation {
                message: format!("Tracked unit {unit} belongs to unknown alliance {alliance}"),
            });
        }
    }

    violations
}

/// Assert all machine invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(machine: &HillMachine) {
    let violations = check_invariants(machine);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Rules invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_machine: &HillMachine) {}
