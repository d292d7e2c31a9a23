//! Per-tick battlefield snapshot supplied by the host
//!
//! Decoding never fails a tick: malformed input becomes the documented
//! default snapshot and a malformed embedded order is dropped.

use glam::Vec3;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::battle::action::AgentState;
use crate::battle::orders::Order;
use crate::core::error::Result;
use crate::core::types::{EntityId, SquadId, TickDelta, DEFAULT_TICK_DELTA};

/// Which decision tier a snapshot is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Commander,
    #[serde(alias = "squad_leader")]
    Leader,
    #[default]
    #[serde(other)]
    Soldier,
}

/// A visible enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyInfo {
    pub id: EntityId,
    #[serde(rename = "pos", default)]
    pub position: Vec3,
    #[serde(default)]
    pub health: f32,
    #[serde(rename = "dist", default)]
    pub distance: f32,
}

/// A visible ally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllyInfo {
    pub id: EntityId,
    #[serde(rename = "pos", default)]
    pub position: Vec3,
    #[serde(rename = "dist", default = "far_away")]
    pub distance: f32,
    #[serde(default, deserialize_with = "lenient_state")]
    pub state: AgentState,
}

fn far_away() -> f32 {
    999.0
}

/// Observed behaviour of the enemy player over the host's sample window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerObservation {
    #[serde(rename = "pos", default)]
    pub position: Vec3,
    #[serde(default)]
    pub speed: f32,
    #[serde(default)]
    pub avg_speed: f32,
    #[serde(default)]
    pub attack_count: u32,
    #[serde(default)]
    pub retreat_count: u32,
    #[serde(default = "neutral_aggression")]
    pub aggression: f32,
}

fn neutral_aggression() -> f32 {
    0.5
}

impl Default for PlayerObservation {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            speed: 0.0,
            avg_speed: 0.0,
            attack_count: 0,
            retreat_count: 0,
            aggression: neutral_aggression(),
        }
    }
}

/// Head count of one friendly squad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquadStatus {
    #[serde(default)]
    pub squad_id: SquadId,
    #[serde(default)]
    pub alive: u32,
    #[serde(default)]
    pub total: u32,
}

/// Everything an agent may look at for one decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub entity_id: EntityId,
    #[serde(rename = "pos")]
    pub position: Vec3,
    pub health: f32,
    pub max_health: f32,
    #[serde(deserialize_with = "lenient_state")]
    pub state: AgentState,
    #[serde(rename = "dt")]
    pub delta: TickDelta,
    pub move_speed: f32,
    pub attack_range: f32,
    pub detect_range: f32,
    /// Sorted by distance, nearest first
    pub enemies: Vec<EnemyInfo>,
    pub allies: Vec<AllyInfo>,
    pub player: Option<PlayerObservation>,
    pub squads: Vec<SquadStatus>,
    #[serde(deserialize_with = "lenient_order", skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    pub squad_id: SquadId,
    pub role: Role,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            entity_id: EntityId::NONE,
            position: Vec3::ZERO,
            health: 100.0,
            max_health: 100.0,
            state: AgentState::Idle,
            delta: DEFAULT_TICK_DELTA,
            move_speed: 3.0,
            attack_range: 2.0,
            detect_range: 10.0,
            enemies: Vec::new(),
            allies: Vec::new(),
            player: None,
            squads: Vec::new(),
            order: None,
            squad_id: SquadId::default(),
            role: Role::default(),
        }
    }
}

impl Snapshot {
    /// Decode from JSON, reporting failures
    pub fn try_decode(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode from JSON, substituting the default snapshot on failure
    pub fn decode(json: &str) -> Self {
        Self::try_decode(json).unwrap_or_else(|e| {
            tracing::warn!("Malformed snapshot, using defaults: {}", e);
            Self::default()
        })
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Whether health is strictly below `ratio` of max health
    pub fn health_below(&self, ratio: f32) -> bool {
        self.health < self.max_health * ratio
    }

    /// Nearest visible enemy (the host pre-sorts by distance)
    pub fn nearest_enemy(&self) -> Option<&EnemyInfo> {
        self.enemies.first()
    }

    /// Nearest visible ally; ally lists are not guaranteed sorted
    pub fn nearest_ally(&self) -> Option<&AllyInfo> {
        self.allies
            .iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    pub fn find_enemy(&self, id: EntityId) -> Option<&EnemyInfo> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// (alive, total) summed across every reported squad
    pub fn force_totals(&self) -> (u32, u32) {
        self.squads.iter().fold((0u32, 0u32), |(alive, total), s| {
            (alive.saturating_add(s.alive), total.saturating_add(s.total))
        })
    }
}

/// Accept any state value; states we do not know read as Idle
fn lenient_state<'de, D>(deserializer: D) -> std::result::Result<AgentState, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(AgentState::deserialize(&value).unwrap_or_else(|_| {
        tracing::warn!("Unknown agent state {}, treating as Idle", value);
        AgentState::Idle
    }))
}

/// Accept any order payload; drop it (with a warning) if it does not parse
fn lenient_order<'de, D>(deserializer: D) -> std::result::Result<Option<Order>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(value) => match Order::from_value(value) {
            Ok(order) => Some(order),
            Err(e) => {
                tracing::warn!("Ignoring malformed order: {}", e);
                None
            }
        },
    })
}
