//! Run command implementation.

use super::{CliError, OutputFormat};
use koth::rules::{Effect, SyncUpdate};
use koth::sim::{run_scenario, MatchOutcome, Scenario};
use std::path::PathBuf;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the scenario fails to load, validate, or run
/// cleanly.
pub(crate) fn execute(
    scenario_path: PathBuf,
    format: OutputFormat,
    quiet: bool,
) -> Result<(), CliError> {
    let scenario = Scenario::load(&scenario_path)?;

    if !quiet {
        println!("Running scenario {} ({} events)...", scenario.name, scenario.events.len());
        println!();
    }

    let outcome = run_scenario(&scenario)?;

    match format {
        OutputFormat::Text => print_text(&outcome, quiet),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    if outcome.violations.is_empty() {
        Ok(())
    } else {
        Err(CliError::new(format!(
            "{} invariant violation(s) observed",
            outcome.violations.len()
        )))
    }
}

/// Human-readable match report.
fn print_text(outcome: &MatchOutcome, quiet: bool) {
    if !quiet {
        for (tick, effect) in &outcome.effects {
            println!("  tick {tick:>7}  {}", describe_effect(*effect));
        }
        if !outcome.effects.is_empty() {
            println!();
        }
    }

    match outcome.winner {
        Some(alliance) => println!("Winner: alliance {alliance}"),
        None => println!("Result: no winner"),
    }
    println!("Ticks simulated: {}", outcome.ticks_run);
    println!("State updates published: {}", outcome.updates.len());

    let possession: Vec<_> = outcome
        .updates
        .iter()
        .filter(|(_, u)| matches!(u, SyncUpdate::Possession { .. }))
        .collect();
    if !possession.is_empty() && !quiet {
        println!();
        println!("Possession changes:");
        for (tick, update) in possession {
            if let SyncUpdate::Possession { alliance, ticks } = update {
                if *ticks < 0 {
                    println!("  tick {tick:>7}  alliance {alliance} disqualified");
                } else {
                    println!("  tick {tick:>7}  alliance {alliance} banked {ticks} ticks");
                }
            }
        }
    }

    for violation in &outcome.violations {
        println!("VIOLATION: {violation}");
    }
}

/// One-line description of an effect.
fn describe_effect(effect: Effect) -> String {
    match effect {
        Effect::GrantVision(a) => format!("alliance {a} crowned, vision granted"),
        Effect::RevokeVision(a) => format!("alliance {a} dethroned, vision revoked"),
        Effect::Demolish(unit) => format!("hill building {unit} demolished"),
        Effect::ScaleHealth { unit, factor } => {
            format!("unit {unit} health scaled by {factor}")
        }
        Effect::MatchWon(a) => format!("alliance {a} wins the match"),
    }
}
