//! Formation layout computation
//!
//! Converts a formation center, facing and member index into a world-space
//! slot position. Slot tables and fan angles are part of the host contract:
//! every engine consuming these orders must place members identically.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::geometry::{normalize, right_of, rotate_y};
use crate::core::types::EntityId;

/// Formation shapes a squad can adopt
///
/// Travels as a bare string. Names we do not know are kept verbatim so they
/// survive being passed down the chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FormationKind {
    #[default]
    Triangle,
    Line,
    Spread,
    Wedge,
    /// Any shape name the host sent that we do not know; members collapse to the center
    Unknown(String),
}

impl FormationKind {
    pub fn as_str(&self) -> &str {
        match self {
            FormationKind::Triangle => "triangle",
            FormationKind::Line => "line",
            FormationKind::Spread => "spread",
            FormationKind::Wedge => "wedge",
            FormationKind::Unknown(name) => name.as_str(),
        }
    }
}

impl From<String> for FormationKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "triangle" => FormationKind::Triangle,
            "line" => FormationKind::Line,
            "spread" => FormationKind::Spread,
            "wedge" => FormationKind::Wedge,
            _ => FormationKind::Unknown(name),
        }
    }
}

impl From<FormationKind> for String {
    fn from(kind: FormationKind) -> Self {
        match kind {
            FormationKind::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// Local slot offsets as (right, forward) multiples of spacing
type SlotTable = [(f32, f32); 5];

/// Point at the front, ranks fanning back-left and back-right
const TRIANGLE_SLOTS: SlotTable = [(0.0, 0.0), (-1.0, -1.0), (1.0, -1.0), (-2.0, -2.0), (2.0, -2.0)];

/// Single rank centered on slot 2
const LINE_SLOTS: SlotTable = [(-2.0, 0.0), (-1.0, 0.0), (0.0, 0.0), (1.0, 0.0), (2.0, 0.0)];

/// Point ahead, wings level with the center, wider second rank behind
const WEDGE_SLOTS: SlotTable = [(0.0, 1.0), (-1.0, 0.0), (1.0, 0.0), (-2.0, -1.0), (2.0, -1.0)];

/// Fan angles (degrees from facing) for the spread formation
const SPREAD_ANGLES: [f32; 5] = [-144.0, -72.0, 0.0, 72.0, 144.0];

/// Spread members stand this many spacings from the center
const SPREAD_RADIUS_FACTOR: f32 = 1.5;

/// Highest slot index; larger indices clamp here
pub const MAX_SLOT_INDEX: usize = 4;

/// Compute the world-space position of member `index` in a formation
///
/// `forward` need not be normalized. A facing with no horizontal component
/// falls back to +Z so the layout stays defined.
pub fn formation_position(
    center: Vec3,
    forward: Vec3,
    index: usize,
    kind: &FormationKind,
    spacing: f32,
) -> Vec3 {
    let slot = index.min(MAX_SLOT_INDEX);
    let forward = ground_facing(forward);
    let right = right_of(forward);

    let local = match kind {
        FormationKind::Triangle => TRIANGLE_SLOTS[slot],
        FormationKind::Line => LINE_SLOTS[slot],
        FormationKind::Wedge => WEDGE_SLOTS[slot],
        FormationKind::Spread => {
            let dir = rotate_y(forward, SPREAD_ANGLES[slot]);
            return center + dir * (SPREAD_RADIUS_FACTOR * spacing);
        }
        FormationKind::Unknown(_) => return center,
    };

    center + right * (local.0 * spacing) + forward * (local.1 * spacing)
}

/// Compute positions for the first `count` members of a formation
pub fn formation_positions(
    center: Vec3,
    forward: Vec3,
    count: usize,
    kind: &FormationKind,
    spacing: f32,
) -> Vec<Vec3> {
    (0..count)
        .map(|i| formation_position(center, forward, i, kind, spacing))
        .collect()
}

/// Slot index for `self_id` among its visible squadmates
///
/// Every member sorts the same id set, so members that see each other agree
/// on the assignment without talking.
pub fn slot_index_for(self_id: EntityId, ally_ids: impl IntoIterator<Item = EntityId>) -> usize {
    let mut ids: Vec<EntityId> = ally_ids.into_iter().collect();
    ids.push(self_id);
    ids.sort();
    ids.iter().position(|id| *id == self_id).unwrap_or(0)
}

/// Flatten a facing onto the ground plane, defaulting to +Z
fn ground_facing(forward: Vec3) -> Vec3 {
    let flat = normalize(Vec3::new(forward.x, 0.0, forward.z));
    if flat == Vec3::ZERO {
        Vec3::Z
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f32 = 1e-4;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn test_line_center_slot_is_center() {
        let center = Vec3::new(3.0, 1.0, -7.0);
        let pos = formation_position(center, Vec3::new(1.0, 0.0, 1.0), 2, &FormationKind::Line, 2.5);
        assert_eq!(pos, center);
    }

    #[test]
    fn test_line_outer_slots_symmetric() {
        let center = Vec3::new(10.0, 0.0, 10.0);
        let forward = Vec3::Z;
        let left = formation_position(center, forward, 0, &FormationKind::Line, 2.0);
        let right = formation_position(center, forward, 4, &FormationKind::Line, 2.0);

        assert!(close(left, Vec3::new(6.0, 0.0, 10.0)));
        assert!(close(right, Vec3::new(14.0, 0.0, 10.0)));
        assert!(close((left + right) * 0.5, center));
    }

    #[test]
    fn test_triangle_slots() {
        let center = Vec3::ZERO;
        let positions = formation_positions(center, Vec3::Z, 5, &FormationKind::Triangle, 2.0);

        assert!(close(positions[0], Vec3::ZERO));
        assert!(close(positions[1], Vec3::new(-2.0, 0.0, -2.0)));
        assert!(close(positions[2], Vec3::new(2.0, 0.0, -2.0)));
        assert!(close(positions[3], Vec3::new(-4.0, 0.0, -4.0)));
        assert!(close(positions[4], Vec3::new(4.0, 0.0, -4.0)));
    }

    #[test]
    fn test_wedge_point_is_forward() {
        let pos = formation_position(Vec3::ZERO, Vec3::X, 0, &FormationKind::Wedge, 2.0);
        assert!(close(pos, Vec3::new(2.0, 0.0, 0.0)));

        // Second rank trails the wings
        let wing = formation_position(Vec3::ZERO, Vec3::Z, 1, &FormationKind::Wedge, 2.0);
        let rear = formation_position(Vec3::ZERO, Vec3::Z, 3, &FormationKind::Wedge, 2.0);
        assert!(rear.z < wing.z);
        assert!(rear.x < wing.x);
    }

    #[test]
    fn test_spread_fan() {
        let center = Vec3::new(1.0, 0.0, 1.0);
        let front = formation_position(center, Vec3::Z, 2, &FormationKind::Spread, 2.0);
        assert!(close(front, Vec3::new(1.0, 0.0, 4.0)));

        for i in 0..5 {
            let p = formation_position(center, Vec3::Z, i, &FormationKind::Spread, 2.0);
            assert!(((p - center).length() - 3.0).abs() < EPS);
        }
    }

    #[test]
    fn test_unknown_collapses_to_center() {
        let center = Vec3::new(5.0, 2.0, 5.0);
        for i in 0..8 {
            assert_eq!(
                formation_position(center, Vec3::Z, i, &FormationKind::Unknown("column".into()), 3.0),
                center
            );
        }
    }

    #[test]
    fn test_index_clamps_to_last_slot() {
        let last = formation_position(Vec3::ZERO, Vec3::Z, 4, &FormationKind::Triangle, 2.0);
        let beyond = formation_position(Vec3::ZERO, Vec3::Z, 17, &FormationKind::Triangle, 2.0);
        assert_eq!(last, beyond);
    }

    #[test]
    fn test_degenerate_facing_uses_default_heading() {
        let a = formation_position(Vec3::ZERO, Vec3::ZERO, 0, &FormationKind::Line, 2.0);
        let b = formation_position(Vec3::ZERO, Vec3::Z, 0, &FormationKind::Line, 2.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_slot_index_for() {
        let allies = [EntityId(30), EntityId(10)];
        assert_eq!(slot_index_for(EntityId(20), allies), 1);
        assert_eq!(slot_index_for(EntityId(5), allies), 0);
        assert_eq!(slot_index_for(EntityId(99), allies), 2);
        assert_eq!(slot_index_for(EntityId(1), std::iter::empty()), 0);
    }

    #[test]
    fn test_formation_kind_parses_unknown() {
        let kind: FormationKind = serde_json::from_str("\"phalanx\"").unwrap();
        assert_eq!(kind, FormationKind::Unknown("phalanx".to_string()));
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"phalanx\"");
        let kind: FormationKind = serde_json::from_str("\"wedge\"").unwrap();
        assert_eq!(kind, FormationKind::Wedge);
    }

    proptest! {
        #[test]
        fn prop_line_symmetric_about_center(
            cx in -50.0f32..50.0, cz in -50.0f32..50.0,
            fx in -1.0f32..1.0, fz in -1.0f32..1.0,
            spacing in 0.5f32..5.0,
        ) {
            let center = Vec3::new(cx, 0.0, cz);
            let forward = Vec3::new(fx, 0.0, fz);
            let a = formation_position(center, forward, 0, &FormationKind::Line, spacing);
            let b = formation_position(center, forward, 4, &FormationKind::Line, spacing);
            prop_assert!(((a + b) * 0.5 - center).length() < 1e-3);
            prop_assert!(((a - b).length() - 4.0 * spacing).abs() < 1e-3);
        }
    }
}
