//! Command and damage interception.
//!
//! Pure admission checks consulted by the host adapter: build-placement
//! admission against start regions and the held hill, and the
//! start-region damage shield.

use crate::rules::{AllianceId, HillMachine};

/// Whether a building placement command is allowed.
///
/// With `build_outside_boxes` set, everything is allowed. Otherwise the
/// footprint (centered at `(x, z)`, `size_x` by `size_z`) must lie fully
/// inside the issuing alliance's start region, or inside the hill when
/// the alliance is the current king.
#[must_use]
pub fn build_allowed(
    machine: &HillMachine,
    alliance: AllianceId,
    x: f32,
    z: f32,
    size_x: f32,
    size_z: f32,
) -> bool {
    let config = machine.config();
    if config.build_outside_boxes {
        return true;
    }
    let Some(builder) = machine.roster().get(alliance) else {
        return false;
    };
    if builder.start_region.contains_footprint(x, z, size_x, size_z) {
        return true;
    }
    machine.state().king == Some(alliance) && config.hill.contains_footprint(x, z, size_x, size_z)
}

/// Whether incoming damage (and its impulse) must be zeroed: the victim
/// stands inside its own alliance's start region and the attacker
/// belongs to a different alliance.
#[must_use]
pub fn shields_damage(
    machine: &HillMachine,
    victim_alliance: AllianceId,
    x: f32,
    z: f32,
    attacker_alliance: Option<AllianceId>,
) -> bool {
    let Some(attacker) = attacker_alliance else {
        return false;
    };
    if attacker == victim_alliance {
        return false;
    }
    machine
        .roster()
        .get(victim_alliance)
        .is_some_and(|a| a.start_region.contains_point(x, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::rules::{Alliance, MapSize, Region, Roster};
    use std::collections::HashSet;

    fn machine_with_flag(build_outside_boxes: bool) -> HillMachine {
        let mut config = RulesConfig::defaults(MapSize::new(1000.0, 1000.0));
        config.enabled = true;
        config.build_outside_boxes = build_outside_boxes;
        config.hill = Region::Rect {
            left: 400.0,
            top: 400.0,
            right: 600.0,
            bottom: 600.0,
        };
        let roster = Roster::new(vec![
            Alliance::new(
                0,
                vec![0],
                Region::Rect {
                    left: 0.0,
                    top: 0.0,
                    right: 100.0,
                    bottom: 100.0,
                },
            ),
            Alliance::new(
                1,
                vec![1],
                Region::Rect {
                    left: 900.0,
                    top: 900.0,
                    right: 1000.0,
                    bottom: 1000.0,
                },
            ),
        ]);
        HillMachine::new(config, roster, HashSet::from([7]))
    }

    fn machine() -> HillMachine {
        machine_with_flag(false)
    }

    #[test]
    fn test_build_inside_own_start_region() {
        let m = machine();
        assert!(build_allowed(&m, 0, 50.0, 50.0, 20.0, 20.0));
        // Same spot is outside alliance 1's start region.
        assert!(!build_allowed(&m, 1, 50.0, 50.0, 20.0, 20.0));
    }

    #[test]
    fn test_build_on_hill_requires_kingship() {
        let mut m = machine();
        assert!(!build_allowed(&m, 0, 500.0, 500.0, 20.0, 20.0));

        m.state_mut().king = Some(0);
        m.state_mut().win_tick = Some(1);
        assert!(build_allowed(&m, 0, 500.0, 500.0, 20.0, 20.0));
        // Kingship does not open the hill for other alliances.
        assert!(!build_allowed(&m, 1, 500.0, 500.0, 20.0, 20.0));
    }

    #[test]
    fn test_build_overhanging_region_edge_rejected() {
        let m = machine();
        assert!(!build_allowed(&m, 0, 95.0, 50.0, 20.0, 20.0));
    }

    #[test]
    fn test_build_anywhere_when_flag_set() {
        let open = machine_with_flag(true);
        assert!(build_allowed(&open, 0, 700.0, 700.0, 20.0, 20.0));
        let closed = machine();
        assert!(!build_allowed(&closed, 0, 700.0, 700.0, 20.0, 20.0));
    }

    #[test]
    fn test_damage_shield_in_own_start_region() {
        let m = machine();
        assert!(shields_damage(&m, 0, 50.0, 50.0, Some(1)));
        // Outside the region: no shield.
        assert!(!shields_damage(&m, 0, 500.0, 500.0, Some(1)));
        // Friendly fire is not shielded.
        assert!(!shields_damage(&m, 0, 50.0, 50.0, Some(0)));
        // Attacker-less damage (debris, decay) is not shielded.
        assert!(!shields_damage(&m, 0, 50.0, 50.0, None));
    }
}
