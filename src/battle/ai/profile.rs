//! Long-lived opponent model owned by the commander
//!
//! Remembers recent intent labels, smooths an aggression score, derives the
//! player's preferred approach and tracks how each tactic has fared.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::battle::ai::intent::PlayerIntent;
use crate::battle::snapshot::PlayerObservation;
use crate::core::config::CommanderConfig;
use crate::core::types::TickDelta;

/// Squad-wide tactic the commander can order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tactic {
    FlankLeft,
    FlankRight,
    Pincer,
    Rush,
    Defend,
    Retreat,
}

impl Tactic {
    pub const ALL: [Tactic; 6] = [
        Tactic::FlankLeft,
        Tactic::FlankRight,
        Tactic::Pincer,
        Tactic::Rush,
        Tactic::Defend,
        Tactic::Retreat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tactic::FlankLeft => "flank_left",
            Tactic::FlankRight => "flank_right",
            Tactic::Pincer => "pincer",
            Tactic::Rush => "rush",
            Tactic::Defend => "defend",
            Tactic::Retreat => "retreat",
        }
    }
}

impl fmt::Display for Tactic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the player usually closes distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferredApproach {
    #[default]
    Direct,
    Kiting,
    Camping,
    Cautious,
}

/// Usage and success counters for one tactic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticRecord {
    pub used: u32,
    pub success: u32,
}

impl TacticRecord {
    /// Fraction of uses that succeeded; 0 when never used
    pub fn success_rate(&self) -> f32 {
        self.success as f32 / self.used.max(1) as f32
    }
}

/// Adaptive memory of the opposing player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    history: VecDeque<PlayerIntent>,
    history_capacity: usize,
    aggression_score: f32,
    preferred_approach: PreferredApproach,
    tactic_results: AHashMap<Tactic, TacticRecord>,
    last_tactic: Tactic,
    tactic_timer: f32,
    tactic_cooldown: f32,
}

impl PlayerProfile {
    pub fn new(config: &CommanderConfig) -> Self {
        Self {
            history: VecDeque::with_capacity(config.history_capacity),
            history_capacity: config.history_capacity,
            aggression_score: 0.5,
            preferred_approach: PreferredApproach::Direct,
            tactic_results: Tactic::ALL
                .iter()
                .map(|t| (*t, TacticRecord::default()))
                .collect(),
            last_tactic: Tactic::Defend,
            tactic_timer: 0.0,
            tactic_cooldown: config.tactic_cooldown,
        }
    }

    /// Fold one classified observation into the profile
    pub fn observe(
        &mut self,
        intent: PlayerIntent,
        player: Option<&PlayerObservation>,
        config: &CommanderConfig,
    ) {
        if self.history.len() >= self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(intent);

        if let Some(player) = player {
            let observed = player.aggression.clamp(0.0, 1.0);
            let keep = config.aggression_smoothing;
            self.aggression_score = self.aggression_score * keep + observed * (1.0 - keep);
        }

        if self.history.len() >= config.approach_min_history {
            self.preferred_approach = self.recent_approach(config.approach_window);
        }
    }

    /// Majority approach over the last `window` labels
    ///
    /// Ties resolve direct > kiting > camping > cautious.
    fn recent_approach(&self, window: usize) -> PreferredApproach {
        let skip = self.history.len().saturating_sub(window);
        let (mut rush, mut kite, mut camp, mut cautious) = (0u32, 0u32, 0u32, 0u32);
        for intent in self.history.iter().skip(skip) {
            match intent {
                PlayerIntent::AggressiveRush => rush += 1,
                PlayerIntent::Kiting => kite += 1,
                PlayerIntent::Camping => camp += 1,
                PlayerIntent::CautiousAdvance => cautious += 1,
                _ => {}
            }
        }

        let max = rush.max(kite).max(camp).max(cautious);
        if max == rush {
            PreferredApproach::Direct
        } else if max == kite {
            PreferredApproach::Kiting
        } else if max == camp {
            PreferredApproach::Camping
        } else {
            PreferredApproach::Cautious
        }
    }

    /// Advance the cooldown; returns true (and resets) once it has expired
    pub fn cooldown_expired(&mut self, delta: TickDelta) -> bool {
        self.tactic_timer += delta.max(0.0);
        if self.tactic_timer < self.tactic_cooldown {
            return false;
        }
        self.tactic_timer = 0.0;
        true
    }

    pub fn record_use(&mut self, tactic: Tactic) {
        self.tactic_results.entry(tactic).or_default().used += 1;
    }

    pub fn record_outcome(&mut self, tactic: Tactic, success: bool) {
        if success {
            self.tactic_results.entry(tactic).or_default().success += 1;
        }
    }

    pub fn set_last_tactic(&mut self, tactic: Tactic) {
        self.last_tactic = tactic;
    }

    pub fn success_rate(&self, tactic: Tactic) -> f32 {
        self.record(tactic).success_rate()
    }

    pub fn record(&self, tactic: Tactic) -> TacticRecord {
        self.tactic_results.get(&tactic).copied().unwrap_or_default()
    }

    pub fn last_tactic(&self) -> Tactic {
        self.last_tactic
    }

    pub fn aggression_score(&self) -> f32 {
        self.aggression_score
    }

    pub fn preferred_approach(&self) -> PreferredApproach {
        self.preferred_approach
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> impl Iterator<Item = PlayerIntent> + '_ {
        self.history.iter().copied()
    }
}
