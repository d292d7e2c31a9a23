//! Priority target scoring
//!
//! Ranks visible enemies by a weighted blend of proximity and weakness.
//! Scores are normalized against the field's maxima, padded so an
//! all-zero field cannot divide by zero.

use crate::battle::constants::{TARGET_DISTANCE_WEIGHT, TARGET_HEALTH_WEIGHT, TARGET_NORMALIZE_PAD};
use crate::battle::snapshot::EnemyInfo;

/// Score a single enemy against the field's maximum distance and health
///
/// Closer and weaker is higher. Range is roughly [0, 1].
pub fn target_score(enemy: &EnemyInfo, max_distance: f32, max_health: f32) -> f32 {
    let distance_score = 1.0 - enemy.distance / (max_distance + TARGET_NORMALIZE_PAD);
    let health_score = 1.0 - enemy.health / (max_health + TARGET_NORMALIZE_PAD);
    distance_score * TARGET_DISTANCE_WEIGHT + health_score * TARGET_HEALTH_WEIGHT
}

/// Pick the highest-scoring enemy; ties go to the first in list order
pub fn choose_priority_target(enemies: &[EnemyInfo]) -> Option<&EnemyInfo> {
    let max_distance = enemies.iter().map(|e| e.distance).fold(0.0f32, f32::max);
    let max_health = enemies.iter().map(|e| e.health).fold(0.0f32, f32::max);

    let mut best: Option<(&EnemyInfo, f32)> = None;
    for enemy in enemies {
        let score = target_score(enemy, max_distance, max_health);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((enemy, score)),
        }
    }

    best.map(|(enemy, _)| enemy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::EntityId;
    use glam::Vec3;

    fn enemy(id: u64, distance: f32, health: f32) -> EnemyInfo {
        EnemyInfo {
            id: EntityId(id),
            position: Vec3::new(distance, 0.0, 0.0),
            health,
            distance,
        }
    }

    #[test]
    fn test_empty_field() {
        assert!(choose_priority_target(&[]).is_none());
    }

    #[test]
    fn test_weak_target_beats_close_target() {
        // Health carries more weight than distance
        let enemies = [enemy(1, 1.0, 100.0), enemy(2, 6.0, 10.0)];
        assert_eq!(choose_priority_target(&enemies).map(|e| e.id), Some(EntityId(2)));
    }

    #[test]
    fn test_close_target_wins_at_equal_health() {
        let enemies = [enemy(1, 8.0, 50.0), enemy(2, 2.0, 50.0)];
        assert_eq!(choose_priority_target(&enemies).map(|e| e.id), Some(EntityId(2)));
    }

    #[test]
    fn test_ties_keep_first() {
        let enemies = [enemy(4, 3.0, 40.0), enemy(5, 3.0, 40.0)];
        assert_eq!(choose_priority_target(&enemies).map(|e| e.id), Some(EntityId(4)));
    }

    #[test]
    fn test_all_zero_field_does_not_divide_by_zero() {
        let enemies = [enemy(1, 0.0, 0.0)];
        let score = target_score(&enemies[0], 0.0, 0.0);
        assert!(score.is_finite());
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_exact_score() {
        // max_distance 4, max_health 50
        let e = enemy(1, 2.0, 25.0);
        let expected = (1.0 - 2.0 / 4.1) * 0.4 + (1.0 - 25.0 / 50.1) * 0.6;
        assert!((target_score(&e, 4.0, 50.0) - expected).abs() < 1e-6);
    }
}
