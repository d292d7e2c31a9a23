//! Tactical tuning configuration with documented constants
//!
//! Every threshold the decision tiers compare against lives here, grouped
//! by tier. Values load from TOML; missing sections fall back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{Result, TacticsError};

/// Formation geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    /// Distance between neighbouring slots (world units)
    pub spacing: f32,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self { spacing: 2.0 }
    }
}

/// Soldier decision thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoldierConfig {
    /// Health fraction below which a soldier flees regardless of orders
    pub flee_health_ratio: f32,
    /// Health fraction below which an unordered soldier flees from enemies
    pub independent_flee_ratio: f32,
    /// Fraction of attack range inside which an enemy is an emergency
    pub emergency_range_factor: f32,
    /// Seconds without displacement before the soldier counts as stuck
    pub stuck_seconds: f32,
    /// Per-tick displacement below which the soldier counts as stationary
    pub stuck_epsilon: f32,
    /// Distance beyond which an idle soldier walks back to the nearest ally
    pub regroup_distance: f32,
    /// Radius around an enemy in which engaged allies count toward focus fire
    pub focus_fire_radius: f32,
    /// Slot tolerance while advancing
    pub advance_slot_tolerance: f32,
    /// Slot tolerance while holding formation
    pub hold_slot_tolerance: f32,
}

impl Default for SoldierConfig {
    fn default() -> Self {
        Self {
            flee_health_ratio: 0.15,
            independent_flee_ratio: 0.25,
            emergency_range_factor: 0.8,
            stuck_seconds: 2.0,
            stuck_epsilon: 0.01,
            regroup_distance: 5.0,
            focus_fire_radius: 5.0,
            advance_slot_tolerance: 1.5,
            hold_slot_tolerance: 1.0,
        }
    }
}

/// Squad leader thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderConfig {
    /// Health fraction below which an unordered leader flees
    pub independent_flee_ratio: f32,
    /// Distance at which the leader counts as arrived at a waypoint
    pub arrival_radius: f32,
    /// How far behind the target a pincer squad swings in
    pub pincer_standoff: f32,
}

impl Default for LeaderConfig {
    fn default() -> Self {
        Self {
            independent_flee_ratio: 0.2,
            arrival_radius: 3.0,
            pincer_standoff: 8.0,
        }
    }
}

/// Commander memory and tactic selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommanderConfig {
    /// Minimum seconds between tactic changes
    pub tactic_cooldown: f32,
    /// Intent labels remembered
    pub history_capacity: usize,
    /// Most recent labels considered for the preferred approach
    pub approach_window: usize,
    /// Labels required before the preferred approach is recomputed
    pub approach_min_history: usize,
    /// Weight kept by the old aggression score on each update
    pub aggression_smoothing: f32,
    /// Force ratio below which every squad retreats
    pub retreat_ratio: f32,
    /// Force ratio below which every squad defends
    pub defend_ratio: f32,
    /// Aggression score above which the default tactic is a pincer
    pub pincer_aggression: f32,
}

impl Default for CommanderConfig {
    fn default() -> Self {
        Self {
            tactic_cooldown: 5.0,
            history_capacity: 100,
            approach_window: 20,
            approach_min_history: 10,
            aggression_smoothing: 0.9,
            retreat_ratio: 0.3,
            defend_ratio: 0.5,
            pincer_aggression: 0.6,
        }
    }
}

/// Complete tactics configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TacticsConfig {
    #[serde(default)]
    pub formation: FormationConfig,
    #[serde(default)]
    pub soldier: SoldierConfig,
    #[serde(default)]
    pub leader: LeaderConfig,
    #[serde(default)]
    pub commander: CommanderConfig,
}

impl TacticsConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: TacticsConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let c = &self.commander;
        if c.retreat_ratio >= c.defend_ratio {
            return Err(TacticsError::InvalidConfig(format!(
                "retreat_ratio ({}) should be < defend_ratio ({})",
                c.retreat_ratio, c.defend_ratio
            )));
        }
        if c.tactic_cooldown <= 0.0 {
            return Err(TacticsError::InvalidConfig(
                "tactic_cooldown must be positive".into(),
            ));
        }
        if c.history_capacity == 0 || c.approach_window > c.history_capacity {
            return Err(TacticsError::InvalidConfig(format!(
                "approach_window ({}) must fit in history_capacity ({})",
                c.approach_window, c.history_capacity
            )));
        }
        if !(0.0..1.0).contains(&c.aggression_smoothing) {
            return Err(TacticsError::InvalidConfig(
                "aggression_smoothing must be in [0, 1)".into(),
            ));
        }

        let s = &self.soldier;
        for (name, ratio) in [
            ("soldier.flee_health_ratio", s.flee_health_ratio),
            ("soldier.independent_flee_ratio", s.independent_flee_ratio),
            ("leader.independent_flee_ratio", self.leader.independent_flee_ratio),
        ] {
            if !(ratio > 0.0 && ratio < 1.0) {
                return Err(TacticsError::InvalidConfig(format!(
                    "{} ({}) must be in (0, 1)",
                    name, ratio
                )));
            }
        }

        if self.formation.spacing <= 0.0 {
            return Err(TacticsError::InvalidConfig(
                "formation.spacing must be positive".into(),
            ));
        }

        Ok(())
    }
}
