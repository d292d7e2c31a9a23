//! Three-tier squad AI: commander → squad leader → soldier
//!
//! Architecture: Trait + Data hybrid
//! - TacticalAgent trait gives every tier the same per-tick interface
//! - TacticsConfig holds TOML-loaded thresholds
//! - TacticalCore owns the long-lived memory and routes snapshots by role

pub mod commander;
pub mod intent;
pub mod profile;
pub mod scoring;
pub mod soldier;
pub mod squad_leader;

pub use commander::{force_ratio, tactic_order, Commander};
pub use intent::{classify_intent, PlayerIntent};
pub use profile::{PlayerProfile, PreferredApproach, Tactic, TacticRecord};
pub use scoring::{choose_priority_target, target_score};
pub use soldier::{SoldierBrain, SoldierMemory};
pub use squad_leader::SquadLeader;

use serde::Serialize;
use std::io::{BufRead, Write};

use crate::battle::action::Action;
use crate::battle::snapshot::{Role, Snapshot};
use crate::core::config::TacticsConfig;
use crate::core::error::Result;
use crate::core::types::EntityId;

/// Descriptor of an agent implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub role: Role,
    pub description: &'static str,
}

/// Trait for tactical AI tiers
pub trait TacticalAgent {
    /// Process a single tick - returns the action for this entity
    fn decide(&mut self, snapshot: &Snapshot) -> Action;

    /// Describe this implementation
    fn info(&self) -> AgentInfo;
}

/// Long-lived service holding every tier and its memory
///
/// Invoke once per agent per tick from a single thread; the commander's
/// profile and the soldier memory table are single-writer.
pub struct TacticalCore {
    commander: Commander,
    leader: SquadLeader,
    soldiers: SoldierBrain,
}

impl TacticalCore {
    pub fn new(config: &TacticsConfig) -> Self {
        Self::with_seed(config, 42)
    }

    /// Create with specific RNG seed for the soldier brain
    pub fn with_seed(config: &TacticsConfig, seed: u64) -> Self {
        Self {
            commander: Commander::new(config),
            leader: SquadLeader::new(config),
            soldiers: SoldierBrain::with_seed(config, seed),
        }
    }

    /// Route a snapshot to the tier named by its role
    pub fn tick(&mut self, snapshot: &Snapshot) -> Action {
        let action = self.agent_for(snapshot.role).decide(snapshot);
        tracing::debug!(
            "{:?} {} -> {} [{}]",
            snapshot.role,
            snapshot.entity_id,
            action.state,
            action.tag
        );
        action
    }

    /// Decode a JSON snapshot (falling back to defaults) and run it
    pub fn tick_json(&mut self, json: &str) -> Action {
        let snapshot = Snapshot::decode(json);
        self.tick(&snapshot)
    }

    /// Run newline-delimited snapshots from `input`, writing one encoded
    /// action per line to `output`
    ///
    /// Blank lines are skipped. A line that is not UTF-8 is decoded lossily,
    /// so it falls back to the default snapshot like any other bad input.
    /// Returns the number of snapshots processed.
    pub fn run_stream<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<u64> {
        let mut ticks = 0;
        for (index, line) in input.split(b'\n').enumerate() {
            let text = match String::from_utf8(line?) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Snapshot line {} is not valid UTF-8", index + 1);
                    String::from_utf8_lossy(e.as_bytes()).into_owned()
                }
            };
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let action = self.tick_json(text);
            writeln!(output, "{}", action.encode())?;
            ticks += 1;
        }
        output.flush()?;
        Ok(ticks)
    }

    pub fn info(&self, role: Role) -> AgentInfo {
        match role {
            Role::Commander => self.commander.info(),
            Role::Leader => self.leader.info(),
            Role::Soldier => self.soldiers.info(),
        }
    }

    pub fn commander(&self) -> &Commander {
        &self.commander
    }

    /// Feed a tactic outcome back to the commander's profile
    pub fn record_outcome(&mut self, tactic: Tactic, success: bool) {
        self.commander.record_outcome(tactic, success);
    }

    /// Drop soldier memory for a despawned entity
    pub fn forget(&mut self, entity_id: EntityId) -> Option<SoldierMemory> {
        self.soldiers.forget(entity_id)
    }

    pub fn soldiers(&self) -> &SoldierBrain {
        &self.soldiers
    }

    fn agent_for(&mut self, role: Role) -> &mut dyn TacticalAgent {
        match role {
            Role::Commander => &mut self.commander,
            Role::Leader => &mut self.leader,
            Role::Soldier => &mut self.soldiers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::action::AgentState;

    #[test]
    fn test_routes_by_role() {
        let mut core = TacticalCore::new(&TacticsConfig::default());

        let commander = core.tick_json(r#"{"entity_id": 1, "role": "commander", "dt": 0.1}"#);
        assert!(commander.tag.starts_with("tactic:"));
        assert!(commander.order.is_some());

        let leader = core.tick_json(r#"{"entity_id": 2, "role": "squad_leader"}"#);
        assert_eq!(leader.tag, "leader_idle");

        let soldier = core.tick_json(r#"{"entity_id": 3, "role": "grenadier"}"#);
        assert_eq!(soldier.tag, "standby");
        assert!(core.soldiers().memory(EntityId(3)).is_some());
    }

    #[test]
    fn test_garbage_input_uses_default_snapshot() {
        let mut core = TacticalCore::new(&TacticsConfig::default());
        let action = core.tick_json("{not json");
        assert_eq!(action.state, AgentState::Idle);
        assert_eq!(action.tag, "standby");
    }

    #[test]
    fn test_stream_survives_bad_lines() {
        let mut core = TacticalCore::new(&TacticsConfig::default());
        let mut input = Vec::new();
        input.extend_from_slice(b"{\"entity_id\": 1, \"health\": 0}\n");
        input.extend_from_slice(b"\xff\xfe bad\n\n");
        input.extend_from_slice(b"{\"entity_id\": 2}\r\n");
        let mut output = Vec::new();

        let ticks = core.run_stream(std::io::Cursor::new(input), &mut output).unwrap();
        assert_eq!(ticks, 3);

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Dead|"));
        assert!(lines[1].ends_with("|standby"));
        assert!(lines[2].ends_with("|standby"));
        assert!(core.soldiers().memory(EntityId(2)).is_some());
    }

    #[test]
    fn test_info_per_role() {
        let core = TacticalCore::new(&TacticsConfig::default());
        assert_eq!(core.info(Role::Commander).role, Role::Commander);
        assert_eq!(core.info(Role::Leader).role, Role::Leader);
        assert_eq!(core.info(Role::Soldier).name, "Smart Soldier");
    }
}
