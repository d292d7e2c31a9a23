//! Per-tick decision results returned to the host

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::battle::orders::Order;
use crate::core::geometry::{direction_to, normalize};
use crate::core::types::EntityId;

/// Behavioral state an agent reports to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AgentState {
    #[default]
    #[serde(alias = "idle")]
    Idle,
    #[serde(alias = "patrol")]
    Patrol,
    #[serde(alias = "chase")]
    Chase,
    #[serde(alias = "attack")]
    Attack,
    #[serde(alias = "flee")]
    Flee,
    #[serde(alias = "dead")]
    Dead,
}

impl AgentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentState::Idle => "Idle",
            AgentState::Patrol => "Patrol",
            AgentState::Chase => "Chase",
            AgentState::Attack => "Attack",
            AgentState::Flee => "Flee",
            AgentState::Dead => "Dead",
        }
    }

    /// Attacking or chasing
    pub fn is_engaged(&self) -> bool {
        matches!(self, AgentState::Attack | AgentState::Chase)
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an agent wants to do this tick
///
/// `direction` is always either zero or unit length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub state: AgentState,
    pub direction: Vec3,
    pub speed: f32,
    pub target: Option<EntityId>,
    pub tag: String,
    pub order: Option<Order>,
}

impl Action {
    /// Create an action, normalizing `direction`
    pub fn new(state: AgentState, direction: Vec3, speed: f32) -> Self {
        Self {
            state,
            direction: normalize(direction),
            speed,
            target: None,
            tag: String::new(),
            order: None,
        }
    }

    /// Action heading from `from` toward `to`
    pub fn toward(state: AgentState, from: Vec3, to: Vec3, speed: f32) -> Self {
        Self::new(state, direction_to(from, to), speed)
    }

    /// Action heading from `threat` away through `from`
    pub fn away_from(state: AgentState, from: Vec3, threat: Vec3, speed: f32) -> Self {
        Self::new(state, direction_to(threat, from), speed)
    }

    pub fn idle() -> Self {
        Self::new(AgentState::Idle, Vec3::ZERO, 0.0)
    }

    /// Terminal action; nothing else in it is meaningful
    pub fn dead() -> Self {
        Self::new(AgentState::Dead, Vec3::ZERO, 0.0)
    }

    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = (!target.is_none()).then_some(target);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Encode as `state|dx,dy,dz|speed|target|tag[|order_json]`
    ///
    /// Direction uses 3 decimals, speed 2; a missing target is written as 0.
    pub fn encode(&self) -> String {
        let mut line = format!(
            "{}|{:.3},{:.3},{:.3}|{:.2}|{}|{}",
            self.state,
            self.direction.x,
            self.direction.y,
            self.direction.z,
            self.speed,
            self.target.unwrap_or(EntityId::NONE),
            self.tag
        );

        if let Some(order) = &self.order {
            match order.to_json() {
                Ok(json) => {
                    line.push('|');
                    line.push_str(&json);
                }
                Err(e) => tracing::warn!("Dropping unencodable order from action: {}", e),
            }
        }

        line
    }
}

impl Default for Action {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::orders::Order;
    use crate::core::geometry::is_unit_or_zero;

    #[test]
    fn test_new_normalizes_direction() {
        let action = Action::new(AgentState::Chase, Vec3::new(3.0, 0.0, 4.0), 2.0);
        assert!((action.direction.length() - 1.0).abs() < 1e-5);
        assert!(is_unit_or_zero(action.direction, 1e-5));
    }

    #[test]
    fn test_encode_format() {
        let action = Action::new(AgentState::Attack, Vec3::X, 0.0)
            .with_target(EntityId(7))
            .with_tag("self_defense");
        assert_eq!(action.encode(), "Attack|1.000,0.000,0.000|0.00|7|self_defense");
    }

    #[test]
    fn test_encode_dead() {
        assert_eq!(Action::dead().encode(), "Dead|0.000,0.000,0.000|0.00|0|");
    }

    #[test]
    fn test_encode_embeds_order() {
        let action = Action::idle()
            .with_tag("tactic:rush")
            .with_order(Order::attack(Vec3::new(1.0, 0.0, 1.0)));
        let line = action.encode();
        let fields: Vec<&str> = line.splitn(6, '|').collect();

        assert_eq!(fields.len(), 6);
        assert_eq!(fields[4], "tactic:rush");
        let order = Order::from_json(fields[5]).unwrap();
        assert_eq!(order.type_name(), "attack");
    }

    #[test]
    fn test_away_from() {
        let action = Action::away_from(AgentState::Flee, Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0), 4.5);
        assert!((action.direction + Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_with_target_zero_is_none() {
        assert_eq!(Action::idle().with_target(EntityId::NONE).target, None);
    }

    #[test]
    fn test_engaged_states() {
        assert!(AgentState::Attack.is_engaged());
        assert!(AgentState::Chase.is_engaged());
        assert!(!AgentState::Flee.is_engaged());
    }
}
