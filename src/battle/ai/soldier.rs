//! Soldier decision logic
//!
//! Strict priority per tick; each level short-circuits the ones below:
//! 1. dead
//! 2. self-preservation (flee at critical health, overriding orders)
//! 3. emergency threat (enemy inside close range, overriding orders)
//! 4. order execution
//! 5. independent behaviour

use ahash::AHashMap;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::battle::action::{Action, AgentState};
use crate::battle::ai::{AgentInfo, TacticalAgent};
use crate::battle::constants::*;
use crate::battle::formation_layout::{formation_position, slot_index_for};
use crate::battle::orders::{Order, OrderKind};
use crate::battle::snapshot::{EnemyInfo, Role, Snapshot};
use crate::core::config::{SoldierConfig, TacticsConfig};
use crate::core::geometry::{direction_to, distance, distance_xz, rotate_y};
use crate::core::types::{EntityId, TickDelta};

/// Per-soldier state carried between ticks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoldierMemory {
    /// Slot in the current formation, assigned on first formation order
    pub formation_slot: Option<usize>,
    /// Seconds spent without meaningful displacement
    pub stuck_timer: f32,
    pub last_position: Option<Vec3>,
}

impl SoldierMemory {
    /// Track displacement since the previous tick
    fn observe(&mut self, position: Vec3, delta: TickDelta, epsilon: f32) {
        if let Some(last) = self.last_position {
            if distance(position, last) < epsilon {
                self.stuck_timer += delta;
            } else {
                self.stuck_timer = 0.0;
            }
        }
        self.last_position = Some(position);
    }
}

/// Decision brain shared by every soldier, with one memory entry per entity
pub struct SoldierBrain {
    config: SoldierConfig,
    spacing: f32,
    memories: AHashMap<EntityId, SoldierMemory>,
    rng: StdRng,
}

impl SoldierBrain {
    /// Create a brain with a fixed default seed
    pub fn new(config: &TacticsConfig) -> Self {
        Self::with_seed(config, 42)
    }

    /// Create with specific RNG seed for deterministic unstick headings
    pub fn with_seed(config: &TacticsConfig, seed: u64) -> Self {
        Self {
            config: config.soldier.clone(),
            spacing: config.formation.spacing,
            memories: AHashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn memory(&self, entity_id: EntityId) -> Option<&SoldierMemory> {
        self.memories.get(&entity_id)
    }

    /// Drop the memory of a despawned soldier
    pub fn forget(&mut self, entity_id: EntityId) -> Option<SoldierMemory> {
        self.memories.remove(&entity_id)
    }

    pub fn tracked(&self) -> usize {
        self.memories.len()
    }

    /// Run one tick of soldier logic
    pub fn decide(&mut self, snap: &Snapshot) -> Action {
        let cfg = &self.config;
        let memory = self.memories.entry(snap.entity_id).or_default();
        memory.observe(snap.position, snap.delta, cfg.stuck_epsilon);

        if snap.is_dead() {
            return Action::dead();
        }

        if let Some(action) = self_preservation(snap, cfg) {
            return action;
        }

        if let Some(action) = emergency_threat(snap, cfg) {
            return action;
        }

        if let Some(order) = &snap.order {
            return execute_order(snap, order, memory, cfg, self.spacing);
        }

        independent_behavior(snap, memory, cfg, &mut self.rng)
    }
}

impl TacticalAgent for SoldierBrain {
    fn decide(&mut self, snapshot: &Snapshot) -> Action {
        SoldierBrain::decide(self, snapshot)
    }

    fn info(&self) -> AgentInfo {
        AgentInfo {
            name: "Smart Soldier",
            version: "1.0",
            role: Role::Soldier,
            description: "Executes leader orders, keeps formation, fights locally and flees when critical",
        }
    }
}

fn self_preservation(snap: &Snapshot, cfg: &SoldierConfig) -> Option<Action> {
    if !snap.health_below(cfg.flee_health_ratio) {
        return None;
    }

    let speed = snap.move_speed;
    let action = if let Some(enemy) = snap.nearest_enemy() {
        Action::away_from(AgentState::Flee, snap.position, enemy.position, speed * SOLDIER_PANIC_FLEE_SPEED)
            .with_tag("emergency_flee")
    } else if let Some(ally) = snap.nearest_ally() {
        Action::toward(AgentState::Flee, snap.position, ally.position, speed * SOLDIER_RALLY_FLEE_SPEED)
            .with_tag("retreat_to_ally")
    } else {
        Action::new(AgentState::Flee, Vec3::Z, speed * SOLDIER_BLIND_FLEE_SPEED).with_tag("flee_blind")
    };
    Some(action)
}

fn emergency_threat(snap: &Snapshot, cfg: &SoldierConfig) -> Option<Action> {
    let threat = snap.nearest_enemy()?;
    if threat.distance >= snap.attack_range * cfg.emergency_range_factor {
        return None;
    }
    Some(strike(snap, threat).with_tag("self_defense"))
}

/// Stand and hit `enemy`
fn strike(snap: &Snapshot, enemy: &EnemyInfo) -> Action {
    Action::toward(AgentState::Attack, snap.position, enemy.position, 0.0).with_target(enemy.id)
}

/// Attack `enemy` if in range, otherwise close in at `speed`
fn engage(snap: &Snapshot, enemy: &EnemyInfo, speed: f32) -> Action {
    if enemy.distance <= snap.attack_range {
        strike(snap, enemy)
    } else {
        Action::toward(AgentState::Chase, snap.position, enemy.position, speed).with_target(enemy.id)
    }
}

fn execute_order(
    snap: &Snapshot,
    order: &Order,
    memory: &mut SoldierMemory,
    cfg: &SoldierConfig,
    spacing: f32,
) -> Action {
    let speed = snap.move_speed;
    match &order.kind {
        OrderKind::Retreat => Action::toward(
            AgentState::Flee,
            snap.position,
            order.target_pos,
            speed * SOLDIER_ORDERED_RETREAT_SPEED,
        )
        .with_tag("ordered_retreat"),
        OrderKind::Attack | OrderKind::Rush => execute_attack(snap, order),
        OrderKind::Advance { .. } => execute_advance(snap, order, memory, cfg, spacing),
        OrderKind::HoldFormation { .. } | OrderKind::MoveTo { .. } => {
            execute_hold_formation(snap, order, memory, cfg, spacing)
        }
        // Leader-level orders a soldier cannot decompose: head for the target
        OrderKind::Defend
        | OrderKind::Pincer { .. }
        | OrderKind::Flank { .. }
        | OrderKind::Hold
        | OrderKind::Unrecognized { .. } => Action::toward(
            AgentState::Patrol,
            snap.position,
            order.target_pos,
            speed * SOLDIER_FALLBACK_SPEED,
        )
        .with_tag("following_order"),
    }
}

fn execute_attack(snap: &Snapshot, order: &Order) -> Action {
    let speed = snap.move_speed;

    if let Some(target) = order.target_id.and_then(|id| snap.find_enemy(id)) {
        let tag = if target.distance <= snap.attack_range {
            "ordered_attack"
        } else {
            "ordered_chase"
        };
        return engage(snap, target, speed).with_tag(tag);
    }

    if let Some(nearest) = snap.nearest_enemy() {
        let tag = if nearest.distance <= snap.attack_range {
            "attack_nearest"
        } else {
            "chase_nearest"
        };
        return engage(snap, nearest, speed).with_tag(tag);
    }

    Action::toward(AgentState::Patrol, snap.position, order.target_pos, speed).with_tag("move_to_attack")
}

/// Slot position this soldier should occupy for a formation order
fn formation_slot_position(snap: &Snapshot, order: &Order, memory: &mut SoldierMemory, spacing: f32) -> Vec3 {
    let slot = *memory.formation_slot.get_or_insert_with(|| {
        let slot = slot_index_for(snap.entity_id, snap.allies.iter().map(|a| a.id));
        tracing::debug!("Soldier {} assigned formation slot {}", snap.entity_id, slot);
        slot
    });

    let anchor = order.formation_anchor();
    let facing = direction_to(anchor, order.target_pos);
    formation_position(anchor, facing, slot, &order.formation, spacing)
}

fn execute_advance(
    snap: &Snapshot,
    order: &Order,
    memory: &mut SoldierMemory,
    cfg: &SoldierConfig,
    spacing: f32,
) -> Action {
    let speed = snap.move_speed;
    let slot_pos = formation_slot_position(snap, order, memory, spacing);

    if distance_xz(snap.position, slot_pos) > cfg.advance_slot_tolerance {
        return Action::toward(AgentState::Patrol, snap.position, slot_pos, speed * SOLDIER_SLOT_MOVE_SPEED)
            .with_tag("formation_move");
    }

    // In position: engage anything close on the way
    if let Some(enemy) = snap.nearest_enemy() {
        if enemy.distance <= snap.attack_range * ADVANCE_ENGAGE_RANGE_FACTOR {
            return engage(snap, enemy, speed * SOLDIER_ADVANCE_CHASE_SPEED).with_tag("advance_engage");
        }
    }

    Action::toward(AgentState::Patrol, snap.position, order.target_pos, speed * SOLDIER_ADVANCE_SPEED)
        .with_tag("advancing")
}

fn execute_hold_formation(
    snap: &Snapshot,
    order: &Order,
    memory: &mut SoldierMemory,
    cfg: &SoldierConfig,
    spacing: f32,
) -> Action {
    let slot_pos = formation_slot_position(snap, order, memory, spacing);
    let gap = distance_xz(snap.position, slot_pos);

    if gap > cfg.hold_slot_tolerance {
        // Ease off near the slot so we do not overshoot it
        let speed = snap.move_speed.min(gap * HOLD_APPROACH_GAIN);
        return Action::toward(AgentState::Patrol, snap.position, slot_pos, speed)
            .with_tag("maintaining_formation");
    }

    if let Some(enemy) = snap.nearest_enemy() {
        if enemy.distance <= snap.attack_range {
            return strike(snap, enemy).with_tag("formation_attack");
        }
    }

    Action::idle().with_tag("in_formation")
}

fn independent_behavior(
    snap: &Snapshot,
    memory: &mut SoldierMemory,
    cfg: &SoldierConfig,
    rng: &mut StdRng,
) -> Action {
    let speed = snap.move_speed;

    if snap.health_below(cfg.independent_flee_ratio) {
        if let Some(enemy) = snap.nearest_enemy() {
            return Action::away_from(AgentState::Flee, snap.position, enemy.position, speed * SOLDIER_LOW_HP_FLEE_SPEED)
                .with_tag("low_hp_flee");
        }
    }

    if let Some(shared) = find_focus_target(snap, cfg.focus_fire_radius) {
        let tag = if shared.distance <= snap.attack_range {
            "focus_fire"
        } else {
            "chase_shared_target"
        };
        return engage(snap, shared, speed).with_tag(tag);
    }

    if let Some(nearest) = snap.nearest_enemy() {
        return engage(snap, nearest, speed).with_tag("engage_nearest");
    }

    if memory.stuck_timer > cfg.stuck_seconds {
        let angle: f32 = rng.gen_range(0.0..360.0);
        memory.stuck_timer = 0.0;
        tracing::debug!("Soldier {} stuck, wandering at {:.0} degrees", snap.entity_id, angle);
        return Action::new(AgentState::Patrol, rotate_y(Vec3::Z, angle), speed * SOLDIER_WANDER_SPEED)
            .with_tag("unstuck");
    }

    if let Some(ally) = snap.nearest_ally() {
        if ally.distance > cfg.regroup_distance {
            return Action::toward(AgentState::Patrol, snap.position, ally.position, speed * SOLDIER_WANDER_SPEED)
                .with_tag("regroup");
        }
    }

    Action::idle().with_tag("standby")
}

/// Enemy with the most engaged allies around it, if any ally is engaged at all
///
/// Ties keep the nearer enemy (the list is distance-sorted).
fn find_focus_target(snap: &Snapshot, radius: f32) -> Option<&EnemyInfo> {
    let mut best: Option<&EnemyInfo> = None;
    let mut most_allies = 0;

    for enemy in &snap.enemies {
        let allies_near = snap
            .allies
            .iter()
            .filter(|a| a.state.is_engaged() && distance(a.position, enemy.position) < radius)
            .count();
        if allies_near > most_allies {
            most_allies = allies_near;
            best = Some(enemy);
        }
    }

    best
}
