//! Player intent classification
//!
//! Labels one observation window of enemy-player behaviour. Rules are
//! checked in a fixed order and the first match wins.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::battle::snapshot::PlayerObservation;

/// What the player appears to be doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerIntent {
    AggressiveRush,
    Kiting,
    Camping,
    CautiousAdvance,
    Fleeing,
    Exploring,
    Idle,
    /// No observation this tick
    Unknown,
}

impl PlayerIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerIntent::AggressiveRush => "aggressive_rush",
            PlayerIntent::Kiting => "kiting",
            PlayerIntent::Camping => "camping",
            PlayerIntent::CautiousAdvance => "cautious_advance",
            PlayerIntent::Fleeing => "fleeing",
            PlayerIntent::Exploring => "exploring",
            PlayerIntent::Idle => "idle",
            PlayerIntent::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PlayerIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the player's current behaviour
pub fn classify_intent(player: Option<&PlayerObservation>) -> PlayerIntent {
    let Some(player) = player else {
        return PlayerIntent::Unknown;
    };

    let speed = player.speed;
    let attacks = player.attack_count;
    let retreats = player.retreat_count;

    // Order matters: earlier rules shadow later ones
    if speed > 5.0 && attacks > 3 {
        PlayerIntent::AggressiveRush
    } else if speed > 3.0 && retreats > 2 && attacks > 1 {
        PlayerIntent::Kiting
    } else if speed < 1.0 && attacks > 0 {
        PlayerIntent::Camping
    } else if (1.0..=4.0).contains(&speed) && attacks <= 2 {
        PlayerIntent::CautiousAdvance
    } else if speed > 4.0 && retreats > attacks {
        PlayerIntent::Fleeing
    } else if speed > 0.5 && attacks == 0 {
        PlayerIntent::Exploring
    } else {
        PlayerIntent::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observe(speed: f32, attacks: u32, retreats: u32) -> PlayerObservation {
        PlayerObservation {
            speed,
            attack_count: attacks,
            retreat_count: retreats,
            ..Default::default()
        }
    }

    fn classify(speed: f32, attacks: u32, retreats: u32) -> PlayerIntent {
        classify_intent(Some(&observe(speed, attacks, retreats)))
    }

    #[test]
    fn test_no_observation_is_unknown() {
        assert_eq!(classify_intent(None), PlayerIntent::Unknown);
    }

    #[test]
    fn test_each_label() {
        assert_eq!(classify(6.0, 4, 0), PlayerIntent::AggressiveRush);
        assert_eq!(classify(3.5, 2, 3), PlayerIntent::Kiting);
        assert_eq!(classify(0.5, 1, 0), PlayerIntent::Camping);
        assert_eq!(classify(2.0, 1, 0), PlayerIntent::CautiousAdvance);
        assert_eq!(classify(4.5, 0, 2), PlayerIntent::Fleeing);
        assert_eq!(classify(4.5, 0, 0), PlayerIntent::Exploring);
        assert_eq!(classify(0.2, 0, 0), PlayerIntent::Idle);
    }

    #[test]
    fn test_rush_shadows_kiting() {
        // Qualifies for both; rush is checked first
        assert_eq!(classify(6.0, 4, 5), PlayerIntent::AggressiveRush);
    }

    #[test]
    fn test_cautious_shadows_exploring() {
        // speed 2 with no attacks matches cautious_advance before exploring
        assert_eq!(classify(2.0, 0, 0), PlayerIntent::CautiousAdvance);
    }

    #[test]
    fn test_cautious_bounds_inclusive() {
        assert_eq!(classify(1.0, 2, 0), PlayerIntent::CautiousAdvance);
        assert_eq!(classify(4.0, 2, 0), PlayerIntent::CautiousAdvance);
    }
}
