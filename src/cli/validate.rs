//! Validate command implementation.

use super::CliError;
use koth::config::RulesConfig;
use koth::sim::Scenario;
use std::path::PathBuf;

/// Execute the validate command: parse the scenario, check it, and
/// report the resolved configuration.
///
/// # Errors
///
/// Returns an error if the scenario fails to load or validate.
pub(crate) fn execute(scenario_path: PathBuf) -> Result<(), CliError> {
    let scenario = Scenario::load(&scenario_path)?;
    scenario.validate()?;

    let config = RulesConfig::from_options(&scenario.mod_options(), scenario.map);

    println!("Scenario: {}", scenario.name);
    println!("  Map: {} x {}", scenario.map.width, scenario.map.length);
    println!("  Alliances: {}", scenario.alliances.len());
    println!("  Events: {}", scenario.events.len());
    println!("  Max ticks: {}", scenario.max_ticks);
    println!();
    println!("Resolved configuration:");
    println!("  Mode enabled: {}", config.enabled);
    println!("  Hill: {:?}", config.hill);
    println!("  Win duration: {} ticks", config.win_ticks);
    println!("  Capture delay: {} ticks", config.capture_ticks);
    println!("  Health multiplier: {}", config.health_multiplier);
    println!("  King vision: {}", config.king_vision);
    println!("  Build outside boxes: {}", config.build_outside_boxes);
    println!();
    println!("OK");
    Ok(())
}
