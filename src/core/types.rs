//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-assigned entity identifier
///
/// `0` is reserved by the host protocol to mean "no entity".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    pub const NONE: EntityId = EntityId(0);

    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Squad identifier (parity decides pincer side)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquadId(pub i64);

impl SquadId {
    /// Even squads swing left on a pincer, odd squads swing right
    pub fn is_even(&self) -> bool {
        self.0.rem_euclid(2) == 0
    }
}

/// Elapsed simulation time for one tick, in seconds
pub type TickDelta = f32;

/// Default tick delta when the host does not supply one (~60 Hz)
pub const DEFAULT_TICK_DELTA: TickDelta = 0.016;
