//! Battle decision constants - speed multipliers and fixed geometry
//!
//! Thresholds that designers tune live in `core::config`; the values here
//! are part of the host contract and are not meant to be tuned.

// Soldier speed multipliers (applied to the snapshot's move speed)
pub const SOLDIER_PANIC_FLEE_SPEED: f32 = 1.5;
pub const SOLDIER_RALLY_FLEE_SPEED: f32 = 1.2;
pub const SOLDIER_BLIND_FLEE_SPEED: f32 = 1.3;
pub const SOLDIER_ORDERED_RETREAT_SPEED: f32 = 1.3;
pub const SOLDIER_LOW_HP_FLEE_SPEED: f32 = 1.2;
pub const SOLDIER_SLOT_MOVE_SPEED: f32 = 0.9;
pub const SOLDIER_ADVANCE_SPEED: f32 = 0.7;
pub const SOLDIER_ADVANCE_CHASE_SPEED: f32 = 0.8;
pub const SOLDIER_FALLBACK_SPEED: f32 = 0.7;
pub const SOLDIER_WANDER_SPEED: f32 = 0.5;

/// Advancing soldiers break off toward enemies inside this multiple of attack range
pub const ADVANCE_ENGAGE_RANGE_FACTOR: f32 = 1.5;

/// Holding soldiers slow down as they approach their slot: speed <= distance * this
pub const HOLD_APPROACH_GAIN: f32 = 2.0;

// Squad leader speed multipliers
pub const LEADER_RETREAT_SPEED: f32 = 1.2;
pub const LEADER_PANIC_FLEE_SPEED: f32 = 1.3;
pub const LEADER_FLANK_MOVE_SPEED: f32 = 0.8;
pub const LEADER_PINCER_STRIKE_SPEED: f32 = 0.8;
pub const LEADER_HOLD_CHASE_SPEED: f32 = 0.5;
/// Leader leading the squad toward the target of an order it cannot decompose
pub const LEADER_FALLBACK_SPEED: f32 = 0.7;

/// Holding leaders react to enemies inside this multiple of attack range
pub const HOLD_REACT_RANGE_FACTOR: f32 = 2.0;

// Priority target scoring
pub const TARGET_DISTANCE_WEIGHT: f32 = 0.4;
pub const TARGET_HEALTH_WEIGHT: f32 = 0.6;
/// Added to score denominators so an all-zero field cannot divide by zero
pub const TARGET_NORMALIZE_PAD: f32 = 0.1;

// Order defaults
pub const DEFAULT_SPREAD_ANGLE: f32 = 60.0;
pub const DEFAULT_FLANK_OFFSET: f32 = 15.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flee_faster_than_walk() {
        assert!(SOLDIER_PANIC_FLEE_SPEED > 1.0);
        assert!(SOLDIER_RALLY_FLEE_SPEED > 1.0);
        assert!(SOLDIER_WANDER_SPEED < 1.0);
    }

    #[test]
    fn test_target_weights_sum_to_one() {
        assert!((TARGET_DISTANCE_WEIGHT + TARGET_HEALTH_WEIGHT - 1.0).abs() < 1e-6);
    }
}
