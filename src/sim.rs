//! Headless match simulation.
//!
//! Because the rules engine is deterministic and host-agnostic, an
//! entire match can be replayed from a scenario script alone: map
//! dimensions, the option table, the roster, and a tick-ordered list of
//! host events. The runner drives the machine exactly the way a host
//! adapter would and records everything it emits.

mod random;
mod runner;
mod scenario;

pub use random::random_scenario;
pub use runner::{run_scenario, MatchOutcome, MatchRunner};
pub use scenario::{
    AllianceDef, Scenario, ScenarioError, ScenarioEvent, TimedEvent,
};
