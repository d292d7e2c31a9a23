//! Battle layer - per-tick tactical decisions for NPC squads
//!
//! The host engine owns movement, physics and entity lifecycles. Each tick
//! it hands every agent a `Snapshot` and gets back an `Action`, possibly
//! carrying an `Order` for the tier below.
//!
//! Key rules:
//! - Orders only flow downward
//! - Lower tiers report back only through the next tick's snapshot
//! - Bad input degrades to defaults, never to a failed tick

pub mod action;
pub mod ai;
pub mod constants;
pub mod formation_layout;
pub mod orders;
pub mod snapshot;

// Re-exports for convenient access
pub use action::{Action, AgentState};
pub use ai::{AgentInfo, Commander, SoldierBrain, SquadLeader, TacticalAgent, TacticalCore};
pub use formation_layout::{formation_position, formation_positions, slot_index_for, FormationKind};
pub use orders::{FlankSide, Order, OrderKind};
pub use snapshot::{AllyInfo, EnemyInfo, PlayerObservation, Role, Snapshot, SquadStatus};
