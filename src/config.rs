//! Game-mode configuration.
//!
//! Options arrive as a named string table supplied by the host match
//! setup and are parsed exactly once at initialization. Malformed values
//! are never fatal: each falls back to its documented default with a
//! warning, so a broken lobby setting degrades the mode instead of
//! killing the match.

use std::collections::BTreeMap;

use tracing::warn;

use crate::rules::{MapSize, Region};

/// Option key: master enable flag for the game mode.
pub const OPT_ENABLED: &str = "koth";
/// Option key: hill region descriptor (`"rect L T R B"` or
/// `"circle X Z R"`).
pub const OPT_REGION: &str = "kothregion";
/// Option key: allow construction outside start regions and the hill.
pub const OPT_BUILD_OUTSIDE: &str = "buildoutsideboxes";
/// Option key: total possession minutes required to win.
pub const OPT_DURATION: &str = "kothduration";
/// Option key: contest seconds required to flip ownership.
pub const OPT_DELAY: &str = "kothdelay";
/// Option key: health multiplier applied to capture-eligible units.
pub const OPT_HEALTH_MULT: &str = "kothhealthmult";
/// Option key: whether the king receives full map visibility.
pub const OPT_MAP_VIEW: &str = "kothmapview";

/// Default win duration in minutes.
pub const DEFAULT_DURATION_MINUTES: f32 = 10.0;
/// Default capture delay in seconds.
pub const DEFAULT_DELAY_SECONDS: f32 = 20.0;
/// Default simulation rate.
pub const DEFAULT_TICKS_PER_SECOND: u32 = 30;
/// Default evaluation cadence: the machine runs every Nth tick.
pub const DEFAULT_EVAL_INTERVAL: u32 = 6;

/// The named option table supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct ModOptions {
    values: BTreeMap<String, String>,
}

impl ModOptions {
    /// Create an empty option table (all defaults).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Raw string lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Parse a boolean option. Accepts `1/0`, `true/false`, `yes/no`,
    /// `on/off` (case-insensitive); anything else falls back with a
    /// warning.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        let Some(raw) = self.get(key) else {
            return default;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => {
                warn!(key, value = other, default, "unparseable boolean option, using default");
                default
            }
        }
    }

    /// Parse a numeric option; non-finite or unparseable values fall
    /// back with a warning.
    #[must_use]
    pub fn get_f32(&self, key: &str, default: f32) -> f32 {
        let Some(raw) = self.get(key) else {
            return default;
        };
        match raw.trim().parse::<f32>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                warn!(key, value = raw, default, "unparseable numeric option, using default");
                default
            }
        }
    }
}

impl FromIterator<(String, String)> for ModOptions {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Fully resolved, tick-domain configuration for the rules engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulesConfig {
    /// Whether the game mode is active at all.
    pub enabled: bool,
    /// The contested hill region, in world coordinates.
    pub hill: Region,
    /// When `false`, construction outside start regions and the held
    /// hill is rejected.
    pub build_outside_boxes: bool,
    /// Total possession ticks required to win.
    pub win_ticks: u32,
    /// Contest ticks required to flip ownership.
    pub capture_ticks: u32,
    /// Health multiplier applied to capture-eligible units on
    /// completion.
    pub health_multiplier: f32,
    /// Whether the king alliance receives full map visibility.
    pub king_vision: bool,
    /// The machine evaluates once every `eval_interval` ticks.
    pub eval_interval: u32,
    /// Simulation rate used to convert the duration options.
    pub ticks_per_second: u32,
}

impl RulesConfig {
    /// All-defaults configuration for a map (mode disabled, centered
    /// hill).
    #[must_use]
    pub fn defaults(map: MapSize) -> Self {
        Self::from_options(&ModOptions::new(), map)
    }

    /// Resolve the option table against the map dimensions.
    ///
    /// A malformed region descriptor falls back to the default centered
    /// rectangle with a logged warning; malformed numerics fall back per
    /// option. Never fails.
    #[must_use]
    pub fn from_options(options: &ModOptions, map: MapSize) -> Self {
        let hill = match options.get(OPT_REGION) {
            None => Region::default_hill(map),
            Some(descriptor) => match Region::parse(descriptor, map) {
                Ok(region) => region,
                Err(err) => {
                    warn!(descriptor, %err, "unparseable hill region, using default");
                    Region::default_hill(map)
                }
            },
        };

        let ticks_per_second = DEFAULT_TICKS_PER_SECOND;
        let minutes = options.get_f32(OPT_DURATION, DEFAULT_DURATION_MINUTES);
        let seconds = options.get_f32(OPT_DELAY, DEFAULT_DELAY_SECONDS);

        Self {
            enabled: options.get_bool(OPT_ENABLED, false),
            hill,
            build_outside_boxes: options.get_bool(OPT_BUILD_OUTSIDE, true),
            win_ticks: to_ticks(minutes * 60.0, ticks_per_second),
            capture_ticks: to_ticks(seconds, ticks_per_second),
            health_multiplier: options.get_f32(OPT_HEALTH_MULT, 1.0),
            king_vision: options.get_bool(OPT_MAP_VIEW, true),
            eval_interval: DEFAULT_EVAL_INTERVAL,
            ticks_per_second,
        }
    }
}

/// Convert a non-negative wall-clock duration to ticks.
fn to_ticks(seconds: f32, ticks_per_second: u32) -> u32 {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    let ticks = (seconds.max(0.0) * ticks_per_second as f32).round() as u32;
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: MapSize = MapSize::new(1000.0, 1000.0);

    #[test]
    fn test_defaults_when_table_empty() {
        let config = RulesConfig::defaults(MAP);
        assert!(!config.enabled);
        assert!(config.build_outside_boxes);
        assert!(config.king_vision);
        assert_eq!(config.win_ticks, 10 * 60 * 30);
        assert_eq!(config.capture_ticks, 20 * 30);
        assert_eq!(config.hill, Region::default_hill(MAP));
        assert!((config.health_multiplier - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_explicit_options_resolve() {
        let mut options = ModOptions::new();
        options.set(OPT_ENABLED, "1");
        options.set(OPT_REGION, "circle 100 100 30");
        options.set(OPT_DURATION, "5");
        options.set(OPT_DELAY, "10");
        options.set(OPT_HEALTH_MULT, "2.5");
        options.set(OPT_MAP_VIEW, "off");
        options.set(OPT_BUILD_OUTSIDE, "no");

        let config = RulesConfig::from_options(&options, MAP);
        assert!(config.enabled);
        assert!(!config.build_outside_boxes);
        assert!(!config.king_vision);
        assert_eq!(config.win_ticks, 5 * 60 * 30);
        assert_eq!(config.capture_ticks, 10 * 30);
        assert!((config.health_multiplier - 2.5).abs() < f32::EPSILON);
        assert_eq!(
            config.hill,
            Region::Circle {
                x: 500.0,
                z: 500.0,
                radius: 150.0,
            }
        );
    }

    #[test]
    fn test_malformed_region_falls_back() {
        let mut options = ModOptions::new();
        options.set(OPT_REGION, "rect 1 2 three 4");
        let config = RulesConfig::from_options(&options, MAP);
        assert_eq!(config.hill, Region::default_hill(MAP));
    }

    #[test]
    fn test_malformed_numbers_fall_back() {
        let mut options = ModOptions::new();
        options.set(OPT_DURATION, "soon");
        options.set(OPT_DELAY, "NaN");
        let config = RulesConfig::from_options(&options, MAP);
        assert_eq!(config.win_ticks, 10 * 60 * 30);
        assert_eq!(config.capture_ticks, 20 * 30);
    }

    #[test]
    fn test_malformed_bool_falls_back() {
        let mut options = ModOptions::new();
        options.set(OPT_ENABLED, "maybe");
        let config = RulesConfig::from_options(&options, MAP);
        assert!(!config.enabled);
    }

    #[test]
    fn test_bool_spellings() {
        let mut options = ModOptions::new();
        options.set(OPT_ENABLED, "YES");
        options.set(OPT_MAP_VIEW, "0");
        let config = RulesConfig::from_options(&options, MAP);
        assert!(config.enabled);
        assert!(!config.king_vision);
    }
}
