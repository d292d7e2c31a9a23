//! Squad leader: turns a commander order into its own action plus a
//! sub-order for the soldiers it leads

use glam::Vec3;

use crate::battle::action::{Action, AgentState};
use crate::battle::ai::scoring::choose_priority_target;
use crate::battle::ai::{AgentInfo, TacticalAgent};
use crate::battle::constants::*;
use crate::battle::formation_layout::FormationKind;
use crate::battle::orders::{FlankSide, Order, OrderKind};
use crate::battle::snapshot::{Role, Snapshot};
use crate::core::config::{LeaderConfig, TacticsConfig};
use crate::core::geometry::{direction_to, distance_xz, rotate_y};

/// Stateless apart from its configuration
#[derive(Debug, Clone)]
pub struct SquadLeader {
    config: LeaderConfig,
}

impl SquadLeader {
    pub fn new(config: &TacticsConfig) -> Self {
        Self {
            config: config.leader.clone(),
        }
    }

    pub fn config(&self) -> &LeaderConfig {
        &self.config
    }

    /// Run one tick of leader logic
    pub fn decide(&self, snap: &Snapshot) -> Action {
        if snap.is_dead() {
            return Action::dead();
        }

        let Some(order) = &snap.order else {
            return self.independent(snap);
        };

        match &order.kind {
            OrderKind::Retreat => retreat(snap, order),
            OrderKind::Defend => self.defend(snap, order),
            OrderKind::Attack | OrderKind::Rush => attack(snap, order),
            OrderKind::Pincer { spread_angle, .. } => self.pincer(snap, order, *spread_angle),
            OrderKind::Flank { side, offset } => self.flank(snap, order, *side, *offset),
            OrderKind::Hold => hold(snap, order),
            OrderKind::Advance { .. }
            | OrderKind::HoldFormation { .. }
            | OrderKind::MoveTo { .. }
            | OrderKind::Unrecognized { .. } => follow(snap, order),
        }
    }

    /// No usable order: look after ourselves and fight what we see
    fn independent(&self, snap: &Snapshot) -> Action {
        let speed = snap.move_speed;

        if snap.health_below(self.config.independent_flee_ratio) {
            if let Some(enemy) = snap.nearest_enemy() {
                return Action::away_from(AgentState::Flee, snap.position, enemy.position, speed * LEADER_PANIC_FLEE_SPEED)
                    .with_tag("leader_flee");
            }
        }

        if let Some(target) = choose_priority_target(&snap.enemies) {
            if target.distance <= snap.attack_range {
                return Action::toward(AgentState::Attack, snap.position, target.position, 0.0)
                    .with_target(target.id)
                    .with_tag("leader_attack");
            }
            return Action::toward(AgentState::Chase, snap.position, target.position, speed)
                .with_target(target.id)
                .with_tag("leader_chase");
        }

        Action::idle().with_tag("leader_idle")
    }

    fn defend(&self, snap: &Snapshot, order: &Order) -> Action {
        let defend_point = order.target_pos;

        if distance_xz(snap.position, defend_point) > self.config.arrival_radius {
            let sub = move_to(defend_point, None, None)
                .with_formation(order.formation.clone())
                .with_priority(0.8);
            return Action::toward(AgentState::Patrol, snap.position, defend_point, snap.move_speed)
                .with_tag("moving_to_defend")
                .with_order(sub);
        }

        let sub = Order::hold_formation(defend_point, snap.position)
            .with_formation(order.formation.clone())
            .with_priority(0.7);

        if let Some(enemy) = snap.nearest_enemy() {
            if enemy.distance <= snap.attack_range {
                return Action::toward(AgentState::Attack, snap.position, enemy.position, 0.0)
                    .with_target(enemy.id)
                    .with_tag("defending_attack")
                    .with_order(sub);
            }
        }

        Action::idle().with_tag("defending").with_order(sub)
    }

    fn pincer(&self, snap: &Snapshot, order: &Order, spread_angle: f32) -> Action {
        let (angle, side) = if snap.squad_id.is_even() {
            (spread_angle, FlankSide::Left)
        } else {
            (-spread_angle, FlankSide::Right)
        };

        let to_target = direction_to(snap.position, order.target_pos);
        let flank_dir = rotate_y(to_target, angle);
        let flank_pos = order.target_pos - flank_dir * self.config.pincer_standoff;

        if distance_xz(snap.position, flank_pos) > self.config.arrival_radius {
            let sub = move_to(flank_pos, Some(snap.position), Some(side))
                .with_formation(FormationKind::Wedge)
                .with_priority(0.9);
            return Action::toward(AgentState::Chase, snap.position, flank_pos, snap.move_speed)
                .with_tag(format!("flanking_{}", side.as_str()))
                .with_order(sub);
        }

        let sub = Order::attack(order.target_pos)
            .with_formation(FormationKind::Wedge)
            .with_priority(1.0);

        if let Some(enemy) = snap.nearest_enemy() {
            return Action::toward(
                AgentState::Attack,
                snap.position,
                enemy.position,
                snap.move_speed * LEADER_PINCER_STRIKE_SPEED,
            )
            .with_target(enemy.id)
            .with_tag("pincer_attack")
            .with_order(sub);
        }

        Action::toward(AgentState::Chase, snap.position, order.target_pos, snap.move_speed)
            .with_tag("pincer_close")
            .with_order(sub)
    }

    fn flank(&self, snap: &Snapshot, order: &Order, side: FlankSide, offset: f32) -> Action {
        let angle = match side {
            FlankSide::Right => -90.0,
            FlankSide::Left => 90.0,
        };
        let to_target = direction_to(snap.position, order.target_pos);
        let flank_pos = order.target_pos + rotate_y(to_target, angle) * offset;

        if distance_xz(snap.position, flank_pos) > self.config.arrival_radius {
            let sub = move_to(flank_pos, Some(snap.position), Some(side))
                .with_formation(order.formation.clone())
                .with_priority(0.8);
            return Action::toward(
                AgentState::Patrol,
                snap.position,
                flank_pos,
                snap.move_speed * LEADER_FLANK_MOVE_SPEED,
            )
            .with_tag(format!("flanking_{}", side.as_str()))
            .with_order(sub);
        }

        let sub = Order::attack(order.target_pos)
            .with_formation(FormationKind::Wedge)
            .with_priority(1.0);
        Action::toward(AgentState::Chase, snap.position, order.target_pos, snap.move_speed)
            .with_tag("flank_attack")
            .with_order(sub)
    }
}

impl TacticalAgent for SquadLeader {
    fn decide(&mut self, snapshot: &Snapshot) -> Action {
        SquadLeader::decide(self, snapshot)
    }

    fn info(&self) -> AgentInfo {
        AgentInfo {
            name: "Squad Leader",
            version: "1.0",
            role: Role::Leader,
            description: "Decomposes commander orders into squad manoeuvres and soldier sub-orders",
        }
    }
}

/// Without a leader position soldiers form up around the target itself
fn move_to(target: Vec3, leader_pos: Option<Vec3>, side: Option<FlankSide>) -> Order {
    Order::new(OrderKind::MoveTo { leader_pos, side }, target)
}

/// Orders with no squad-level decomposition: lead the squad to the target
fn follow(snap: &Snapshot, order: &Order) -> Action {
    tracing::debug!(
        "Leader {} has no decomposition for '{}', moving to target",
        snap.entity_id,
        order.type_name()
    );
    let sub = move_to(order.target_pos, Some(snap.position), None)
        .with_formation(order.formation.clone())
        .with_priority(order.priority);
    Action::toward(
        AgentState::Patrol,
        snap.position,
        order.target_pos,
        snap.move_speed * LEADER_FALLBACK_SPEED,
    )
    .with_tag("following_order")
    .with_order(sub)
}

fn retreat(snap: &Snapshot, order: &Order) -> Action {
    let sub = Order::retreat(order.target_pos)
        .with_formation(FormationKind::Line)
        .with_priority(1.0);
    Action::toward(
        AgentState::Flee,
        snap.position,
        order.target_pos,
        snap.move_speed * LEADER_RETREAT_SPEED,
    )
    .with_tag("retreat")
    .with_order(sub)
}

fn attack(snap: &Snapshot, order: &Order) -> Action {
    if let Some(target) = choose_priority_target(&snap.enemies) {
        if target.distance <= snap.attack_range {
            let sub = Order::attack(target.position)
                .with_target_id(target.id)
                .with_formation(order.formation.clone())
                .with_priority(0.9);
            return Action::toward(AgentState::Attack, snap.position, target.position, 0.0)
                .with_target(target.id)
                .with_tag("attacking")
                .with_order(sub);
        }
    }

    let sub = Order::advance(order.target_pos, snap.position)
        .with_formation(order.formation.clone())
        .with_priority(0.8);
    Action::toward(AgentState::Chase, snap.position, order.target_pos, snap.move_speed)
        .with_tag("advancing")
        .with_order(sub)
}

fn hold(snap: &Snapshot, order: &Order) -> Action {
    let sub = Order::hold_formation(snap.position, snap.position)
        .with_formation(order.formation.clone())
        .with_priority(0.5);

    if let Some(enemy) = snap.nearest_enemy() {
        if enemy.distance <= snap.attack_range * HOLD_REACT_RANGE_FACTOR {
            let action = if enemy.distance <= snap.attack_range {
                Action::toward(AgentState::Attack, snap.position, enemy.position, 0.0)
                    .with_tag("hold_attack")
            } else {
                Action::toward(
                    AgentState::Chase,
                    snap.position,
                    enemy.position,
                    snap.move_speed * LEADER_HOLD_CHASE_SPEED,
                )
                .with_tag("hold_chase")
            };
            return action.with_target(enemy.id).with_order(sub);
        }
    }

    Action::idle().with_tag("holding").with_order(sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::snapshot::EnemyInfo;
    use crate::core::geometry::distance;
    use crate::core::types::{EntityId, SquadId};

    fn leader() -> SquadLeader {
        SquadLeader::new(&TacticsConfig::default())
    }

    fn snap_with(order: Option<Order>) -> Snapshot {
        Snapshot {
            entity_id: EntityId(100),
            role: Role::Leader,
            order,
            ..Default::default()
        }
    }

    fn enemy(id: u64, pos: Vec3, health: f32) -> EnemyInfo {
        EnemyInfo {
            id: EntityId(id),
            position: pos,
            health,
            distance: pos.length(),
        }
    }

    fn sub_order(action: &Action) -> &Order {
        action.order.as_ref().expect("leader should issue a sub-order")
    }

    #[test]
    fn test_dead_leader() {
        let mut snap = snap_with(Some(Order::retreat(Vec3::X)));
        snap.health = -5.0;
        let action = leader().decide(&snap);
        assert_eq!(action.state, AgentState::Dead);
        assert!(action.order.is_none());
    }

    #[test]
    fn test_no_order_issues_no_sub_order() {
        let mut snap = snap_with(None);
        snap.enemies.push(enemy(5, Vec3::new(0.0, 0.0, 6.0), 40.0));
        let action = leader().decide(&snap);
        assert_eq!(action.state, AgentState::Chase);
        assert_eq!(action.target, Some(EntityId(5)));
        assert!(action.order.is_none());

        let idle = leader().decide(&snap_with(None));
        assert_eq!(idle.state, AgentState::Idle);
        assert!(idle.order.is_none());
    }

    #[test]
    fn test_no_order_low_health_flees() {
        let mut snap = snap_with(None);
        snap.health = 15.0;
        snap.enemies.push(enemy(5, Vec3::new(1.0, 0.0, 0.0), 40.0));
        let action = leader().decide(&snap);
        assert_eq!(action.state, AgentState::Flee);
        assert!((action.speed - 3.9).abs() < 1e-5);
        assert!(action.order.is_none());
    }

    #[test]
    fn test_retreat_broadcasts_line() {
        let rally = Vec3::new(0.0, 0.0, -30.0);
        let action = leader().decide(&snap_with(Some(Order::retreat(rally))));
        assert_eq!(action.state, AgentState::Flee);
        let sub = sub_order(&action);
        assert_eq!(sub.kind, OrderKind::Retreat);
        assert_eq!(sub.formation, FormationKind::Line);
        assert_eq!(sub.target_pos, rally);
        assert_eq!(sub.priority, 1.0);
    }

    #[test]
    fn test_defend_moves_then_holds() {
        let point = Vec3::new(10.0, 0.0, 0.0);
        let order = Order::new(OrderKind::Defend, point);

        let action = leader().decide(&snap_with(Some(order.clone())));
        assert_eq!(action.state, AgentState::Patrol);
        assert_eq!(action.tag, "moving_to_defend");
        let sub = sub_order(&action);
        assert_eq!(sub.kind, OrderKind::MoveTo { leader_pos: None, side: None });
        assert_eq!(sub.formation_anchor(), point);

        let mut snap = snap_with(Some(order));
        snap.position = Vec3::new(8.5, 0.0, 0.0);
        let action = leader().decide(&snap);
        assert_eq!(action.state, AgentState::Idle);
        let sub = sub_order(&action);
        assert_eq!(sub.kind, OrderKind::HoldFormation { leader_pos: Some(snap.position) });
        assert_eq!(sub.target_pos, point);
    }

    #[test]
    fn test_attack_in_range_names_target() {
        let mut snap = snap_with(Some(Order::attack(Vec3::new(0.0, 0.0, 20.0))));
        snap.enemies.push(enemy(7, Vec3::new(0.0, 0.0, 1.5), 90.0));
        snap.enemies.push(enemy(8, Vec3::new(0.0, 0.0, 1.9), 10.0));

        let action = leader().decide(&snap);
        assert_eq!(action.state, AgentState::Attack);
        assert_eq!(action.target, Some(EntityId(8)));
        let sub = sub_order(&action);
        assert_eq!(sub.target_id, Some(EntityId(8)));
        assert_eq!(sub.kind, OrderKind::Attack);
    }

    #[test]
    fn test_attack_out_of_range_advances() {
        let target = Vec3::new(0.0, 0.0, 20.0);
        let mut snap = snap_with(Some(Order::new(OrderKind::Rush, target)));
        snap.enemies.push(enemy(7, Vec3::new(0.0, 0.0, 9.0), 90.0));

        let action = leader().decide(&snap);
        assert_eq!(action.state, AgentState::Chase);
        assert_eq!(action.tag, "advancing");
        let sub = sub_order(&action);
        assert_eq!(sub.kind, OrderKind::Advance { leader_pos: Some(Vec3::ZERO) });
        assert_eq!(sub.target_pos, target);
    }

    #[test]
    fn test_pincer_sides_mirror_by_squad_parity() {
        let target = Vec3::new(0.0, 0.0, 20.0);
        let order = Order::new(
            OrderKind::Pincer {
                spread_angle: 60.0,
                left_squad: true,
            },
            target,
        );

        let mut even = snap_with(Some(order.clone()));
        even.squad_id = SquadId(0);
        let mut odd = snap_with(Some(order));
        odd.squad_id = SquadId(1);

        let a = leader().decide(&even);
        let b = leader().decide(&odd);
        assert_eq!(a.tag, "flanking_left");
        assert_eq!(b.tag, "flanking_right");

        let pa = match sub_order(&a).kind {
            OrderKind::MoveTo { .. } => sub_order(&a).target_pos,
            _ => panic!("expected move_to"),
        };
        let pb = sub_order(&b).target_pos;

        // Mirror images across the leader-to-target axis
        assert!((pa.x + pb.x).abs() < 1e-4);
        assert!((pa.z - pb.z).abs() < 1e-4);
        assert!(pa.x.abs() > 1.0);
        assert!((distance(pa, target) - 8.0).abs() < 1e-4);
        assert_eq!(sub_order(&a).formation, FormationKind::Wedge);
    }

    #[test]
    fn test_pincer_arrived_attacks() {
        let target = Vec3::new(0.0, 0.0, 20.0);
        let order = Order::new(
            OrderKind::Pincer {
                spread_angle: 0.0,
                left_squad: true,
            },
            target,
        );
        let mut snap = snap_with(Some(order));
        snap.position = Vec3::new(0.0, 0.0, 12.0);
        snap.enemies.push(enemy(3, Vec3::new(0.0, 0.0, 19.0), 50.0));

        let action = leader().decide(&snap);
        assert_eq!(action.state, AgentState::Attack);
        assert_eq!(action.target, Some(EntityId(3)));
        assert_eq!(sub_order(&action).kind, OrderKind::Attack);
        assert_eq!(sub_order(&action).priority, 1.0);
    }

    #[test]
    fn test_flank_moves_then_attacks() {
        let target = Vec3::new(0.0, 0.0, 20.0);
        let order = Order::new(
            OrderKind::Flank {
                side: FlankSide::Right,
                offset: 15.0,
            },
            target,
        );

        let action = leader().decide(&snap_with(Some(order.clone())));
        assert_eq!(action.state, AgentState::Patrol);
        assert_eq!(action.tag, "flanking_right");
        let flank_pos = sub_order(&action).target_pos;
        assert!((distance(flank_pos, target) - 15.0).abs() < 1e-3);

        let mut snap = snap_with(Some(order));
        snap.position = flank_pos;
        let action = leader().decide(&snap);
        assert_eq!(action.tag, "flank_attack");
        assert_eq!(sub_order(&action).kind, OrderKind::Attack);
    }

    #[test]
    fn test_unhandled_order_leads_squad_to_target() {
        let target = Vec3::new(10.0, 0.0, 0.0);
        let order = Order::from_json(r#"{"type":"ambush","target_pos":[10,0,0],"priority":0.4,"formation":"line"}"#)
            .unwrap();

        let action = leader().decide(&snap_with(Some(order)));
        assert_eq!(action.state, AgentState::Patrol);
        assert_eq!(action.tag, "following_order");
        assert!((action.direction - Vec3::X).length() < 1e-6);
        assert!((action.speed - 2.1).abs() < 1e-5);

        let sub = sub_order(&action);
        assert_eq!(
            sub.kind,
            OrderKind::MoveTo {
                leader_pos: Some(Vec3::ZERO),
                side: None
            }
        );
        assert_eq!(sub.target_pos, target);
        assert_eq!(sub.formation, FormationKind::Line);
        assert_eq!(sub.priority, 0.4);

        let advance = leader().decide(&snap_with(Some(Order::advance(target, Vec3::ZERO))));
        assert_eq!(advance.tag, "following_order");
        assert!(advance.order.is_some());
    }

    #[test]
    fn test_hold_reacts_within_double_range() {
        let mut snap = snap_with(Some(Order::new(OrderKind::Hold, Vec3::ZERO)));
        snap.enemies.push(enemy(4, Vec3::new(3.0, 0.0, 0.0), 50.0));
        let action = leader().decide(&snap);
        assert_eq!(action.state, AgentState::Chase);
        assert!((action.speed - 1.5).abs() < 1e-5);
        assert!(matches!(sub_order(&action).kind, OrderKind::HoldFormation { .. }));

        let quiet = leader().decide(&snap_with(Some(Order::new(OrderKind::Hold, Vec3::ZERO))));
        assert_eq!(quiet.tag, "holding");
    }
}
