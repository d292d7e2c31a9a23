//! Orders passed one tier down the command chain
//!
//! On the wire an order is a flat JSON object with an open `extra` map.
//! In memory the per-kind payload is lifted into `OrderKind` so every
//! dispatch site matches exhaustively.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::battle::constants::{DEFAULT_FLANK_OFFSET, DEFAULT_SPREAD_ANGLE};
use crate::battle::formation_layout::FormationKind;
use crate::core::error::{Result, TacticsError};
use crate::core::types::EntityId;

/// Which side a flanking manoeuvre swings around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlankSide {
    Left,
    Right,
}

impl FlankSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlankSide::Left => "left",
            FlankSide::Right => "right",
        }
    }
}

/// Order type together with its kind-specific payload
#[derive(Debug, Clone, PartialEq)]
pub enum OrderKind {
    /// Fall back to the target position
    Retreat,
    /// Take and hold the target position
    Defend,
    /// Engage around the target position (optionally a named target)
    Attack,
    /// Same as attack; kept distinct so the wire name survives
    Rush,
    /// Two squads swing around opposite sides of the target
    Pincer { spread_angle: f32, left_squad: bool },
    /// Swing around one side of the target at a given offset
    Flank { side: FlankSide, offset: f32 },
    /// Stay put in formation
    Hold,
    /// Move in formation toward the target, engaging en route
    Advance { leader_pos: Option<Vec3> },
    /// Keep formation around the leader, engaging only inside attack range
    HoldFormation { leader_pos: Option<Vec3> },
    /// Move in formation to the target position
    MoveTo {
        leader_pos: Option<Vec3>,
        side: Option<FlankSide>,
    },
    /// A type name this build does not know; payload kept verbatim
    Unrecognized { name: String, extra: Map<String, Value> },
}

impl OrderKind {
    /// Wire name of this order type
    pub fn type_name(&self) -> &str {
        match self {
            OrderKind::Retreat => "retreat",
            OrderKind::Defend => "defend",
            OrderKind::Attack => "attack",
            OrderKind::Rush => "rush",
            OrderKind::Pincer { .. } => "pincer",
            OrderKind::Flank { .. } => "flank",
            OrderKind::Hold => "hold",
            OrderKind::Advance { .. } => "advance",
            OrderKind::HoldFormation { .. } => "hold_formation",
            OrderKind::MoveTo { .. } => "move_to",
            OrderKind::Unrecognized { name, .. } => name.as_str(),
        }
    }

    /// `extra` keys lifted into this kind's typed payload
    fn payload_keys(&self) -> &'static [&'static str] {
        match self {
            OrderKind::Pincer { .. } => &["spread_angle", "left_squad"],
            OrderKind::Flank { .. } => &["side", "offset"],
            OrderKind::Advance { .. } | OrderKind::HoldFormation { .. } => &["leader_pos"],
            OrderKind::MoveTo { .. } => &["leader_pos", "side"],
            _ => &[],
        }
    }

    /// Formation reference point carried by formation-keeping orders
    pub fn leader_pos(&self) -> Option<Vec3> {
        match self {
            OrderKind::Advance { leader_pos }
            | OrderKind::HoldFormation { leader_pos }
            | OrderKind::MoveTo { leader_pos, .. } => *leader_pos,
            _ => None,
        }
    }
}

/// An immutable command for the tier below
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireOrder", try_from = "WireOrder")]
pub struct Order {
    pub kind: OrderKind,
    pub target_pos: Vec3,
    pub target_id: Option<EntityId>,
    /// Urgency in [0, 1]
    pub priority: f32,
    pub formation: FormationKind,
    /// Payload keys no tier reads, carried through untouched
    pub extra: Map<String, Value>,
}

impl Order {
    pub fn new(kind: OrderKind, target_pos: Vec3) -> Self {
        Self {
            kind,
            target_pos,
            target_id: None,
            priority: DEFAULT_PRIORITY,
            formation: FormationKind::default(),
            extra: Map::new(),
        }
    }

    /// Convenience: create a retreat order toward a rally point
    pub fn retreat(rally_point: Vec3) -> Self {
        Self::new(OrderKind::Retreat, rally_point)
    }

    /// Convenience: create an attack order
    pub fn attack(target_pos: Vec3) -> Self {
        Self::new(OrderKind::Attack, target_pos)
    }

    /// Convenience: create an advance order referencing the leader position
    pub fn advance(target_pos: Vec3, leader_pos: Vec3) -> Self {
        Self::new(
            OrderKind::Advance {
                leader_pos: Some(leader_pos),
            },
            target_pos,
        )
    }

    /// Convenience: create a hold-formation order referencing the leader position
    pub fn hold_formation(target_pos: Vec3, leader_pos: Vec3) -> Self {
        Self::new(
            OrderKind::HoldFormation {
                leader_pos: Some(leader_pos),
            },
            target_pos,
        )
    }

    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = priority.clamp(0.0, 1.0);
        self
    }

    pub fn with_formation(mut self, formation: FormationKind) -> Self {
        self.formation = formation;
        self
    }

    /// Name a specific target; id 0 means none
    pub fn with_target_id(mut self, target_id: EntityId) -> Self {
        self.target_id = (!target_id.is_none()).then_some(target_id);
        self
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    /// Formation reference point, defaulting to the target position
    pub fn formation_anchor(&self) -> Vec3 {
        self.kind.leader_pos().unwrap_or(self.target_pos)
    }

    /// Serialize to the external JSON representation
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from the external JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from an already-decoded JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

const DEFAULT_PRIORITY: f32 = 0.5;

fn default_priority() -> f32 {
    DEFAULT_PRIORITY
}

fn default_type() -> String {
    "hold".to_string()
}

/// Flat external shape of an order
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireOrder {
    #[serde(rename = "type", default = "default_type")]
    kind: String,
    #[serde(default)]
    target_pos: Vec3,
    #[serde(default)]
    target_id: EntityId,
    #[serde(default = "default_priority")]
    priority: f32,
    #[serde(default)]
    formation: FormationKind,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    extra: Map<String, Value>,
}

impl From<Order> for WireOrder {
    fn from(order: Order) -> Self {
        let mut extra = Map::new();
        let kind = order.kind.type_name().to_string();

        match order.kind {
            OrderKind::Pincer {
                spread_angle,
                left_squad,
            } => {
                extra.insert("spread_angle".into(), json!(spread_angle));
                extra.insert("left_squad".into(), json!(left_squad));
            }
            OrderKind::Flank { side, offset } => {
                extra.insert("side".into(), json!(side.as_str()));
                extra.insert("offset".into(), json!(offset));
            }
            OrderKind::Advance { leader_pos } | OrderKind::HoldFormation { leader_pos } => {
                insert_vec(&mut extra, "leader_pos", leader_pos);
            }
            OrderKind::MoveTo { leader_pos, side } => {
                insert_vec(&mut extra, "leader_pos", leader_pos);
                if let Some(side) = side {
                    extra.insert("side".into(), json!(side.as_str()));
                }
            }
            OrderKind::Unrecognized { extra: raw, .. } => extra = raw,
            OrderKind::Retreat
            | OrderKind::Defend
            | OrderKind::Attack
            | OrderKind::Rush
            | OrderKind::Hold => {}
        }

        for (key, value) in order.extra {
            extra.entry(key).or_insert(value);
        }

        WireOrder {
            kind,
            target_pos: order.target_pos,
            target_id: order.target_id.unwrap_or(EntityId::NONE),
            priority: order.priority,
            formation: order.formation,
            extra,
        }
    }
}

impl TryFrom<WireOrder> for Order {
    type Error = TacticsError;

    fn try_from(wire: WireOrder) -> Result<Self> {
        let extra = &wire.extra;
        let kind = match wire.kind.as_str() {
            "retreat" => OrderKind::Retreat,
            "defend" => OrderKind::Defend,
            "attack" => OrderKind::Attack,
            "rush" => OrderKind::Rush,
            "hold" => OrderKind::Hold,
            "pincer" => OrderKind::Pincer {
                spread_angle: read_f32(extra, "spread_angle")?.unwrap_or(DEFAULT_SPREAD_ANGLE),
                left_squad: read_bool(extra, "left_squad")?.unwrap_or(false),
            },
            "flank" => OrderKind::Flank {
                side: read_side(extra)?.unwrap_or(FlankSide::Right),
                offset: read_f32(extra, "offset")?.unwrap_or(DEFAULT_FLANK_OFFSET),
            },
            "advance" => OrderKind::Advance {
                leader_pos: read_vec(extra, "leader_pos")?,
            },
            "hold_formation" => OrderKind::HoldFormation {
                leader_pos: read_vec(extra, "leader_pos")?,
            },
            "move_to" => OrderKind::MoveTo {
                leader_pos: read_vec(extra, "leader_pos")?,
                side: read_side(extra)?,
            },
            other => OrderKind::Unrecognized {
                name: other.to_string(),
                extra: wire.extra.clone(),
            },
        };

        let passthrough = match &kind {
            OrderKind::Unrecognized { .. } => Map::new(),
            known => {
                let consumed = known.payload_keys();
                wire.extra
                    .into_iter()
                    .filter(|(key, _)| !consumed.contains(&key.as_str()))
                    .collect()
            }
        };

        let mut order = Order::new(kind, wire.target_pos)
            .with_priority(wire.priority)
            .with_formation(wire.formation)
            .with_target_id(wire.target_id);
        order.extra = passthrough;
        if !order.priority.is_finite() {
            order.priority = DEFAULT_PRIORITY;
        }
        Ok(order)
    }
}

fn insert_vec(extra: &mut Map<String, Value>, key: &str, v: Option<Vec3>) {
    if let Some(v) = v {
        extra.insert(key.into(), json!([v.x, v.y, v.z]));
    }
}

fn read_f32(extra: &Map<String, Value>, key: &str) -> Result<Option<f32>> {
    match extra.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .map(|f| Some(f as f32))
            .ok_or_else(|| TacticsError::InvalidOrder(format!("{} is not a number: {}", key, v))),
    }
}

fn read_bool(extra: &Map<String, Value>, key: &str) -> Result<Option<bool>> {
    match extra.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_bool()
            .map(Some)
            .ok_or_else(|| TacticsError::InvalidOrder(format!("{} is not a bool: {}", key, v))),
    }
}

fn read_vec(extra: &Map<String, Value>, key: &str) -> Result<Option<Vec3>> {
    match extra.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value::<Vec3>(v.clone())
            .map(Some)
            .map_err(|e| TacticsError::InvalidOrder(format!("{}: {}", key, e))),
    }
}

fn read_side(extra: &Map<String, Value>) -> Result<Option<FlankSide>> {
    match extra.get("side") {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value::<FlankSide>(v.clone())
            .map(Some)
            .map_err(|e| TacticsError::InvalidOrder(format!("side: {}", e))),
    }
}
