//! Commander: reads the enemy player, picks a squad-wide tactic and turns
//! it into an order for the squad leaders
//!
//! The commander never moves; its action is always Idle and carries the
//! order for the tier below.

use glam::Vec3;

use crate::battle::action::Action;
use crate::battle::ai::intent::{classify_intent, PlayerIntent};
use crate::battle::ai::profile::{PlayerProfile, Tactic};
use crate::battle::ai::{AgentInfo, TacticalAgent};
use crate::battle::constants::{DEFAULT_FLANK_OFFSET, DEFAULT_SPREAD_ANGLE};
use crate::battle::formation_layout::FormationKind;
use crate::battle::orders::{FlankSide, Order, OrderKind};
use crate::battle::snapshot::{Role, Snapshot};
use crate::core::config::{CommanderConfig, TacticsConfig};

/// Commander tier with its long-lived opponent model
#[derive(Debug, Clone)]
pub struct Commander {
    config: CommanderConfig,
    profile: PlayerProfile,
}

impl Commander {
    pub fn new(config: &TacticsConfig) -> Self {
        Self {
            profile: PlayerProfile::new(&config.commander),
            config: config.commander.clone(),
        }
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    /// Report whether a previously ordered tactic worked out
    pub fn record_outcome(&mut self, tactic: Tactic, success: bool) {
        tracing::debug!("Tactic {} outcome: success={}", tactic, success);
        self.profile.record_outcome(tactic, success);
    }

    /// Run one tick of commander logic
    pub fn decide(&mut self, snap: &Snapshot) -> Action {
        if snap.is_dead() {
            return Action::dead();
        }

        let intent = classify_intent(snap.player.as_ref());
        self.profile.observe(intent, snap.player.as_ref(), &self.config);

        let tactic = if self.profile.cooldown_expired(snap.delta) {
            let tactic = self.select_tactic(snap, intent);
            self.profile.record_use(tactic);
            if tactic != self.profile.last_tactic() {
                tracing::info!(
                    "Commander {} switching tactic {} -> {} (player {})",
                    snap.entity_id,
                    self.profile.last_tactic(),
                    tactic,
                    intent
                );
            }
            self.profile.set_last_tactic(tactic);
            tactic
        } else {
            self.profile.last_tactic()
        };

        Action::idle()
            .with_tag(format!("tactic:{}", tactic))
            .with_order(tactic_order(tactic, snap))
    }

    /// Fixed-order decision table; earlier rows win
    fn select_tactic(&self, snap: &Snapshot, intent: PlayerIntent) -> Tactic {
        let ratio = force_ratio(snap);
        if ratio < self.config.retreat_ratio {
            return Tactic::Retreat;
        }
        if ratio < self.config.defend_ratio {
            return Tactic::Defend;
        }

        match intent {
            PlayerIntent::AggressiveRush => Tactic::Pincer,
            PlayerIntent::Kiting => {
                if self.profile.success_rate(Tactic::FlankLeft)
                    >= self.profile.success_rate(Tactic::FlankRight)
                {
                    Tactic::FlankLeft
                } else {
                    Tactic::FlankRight
                }
            }
            PlayerIntent::Camping => Tactic::FlankRight,
            PlayerIntent::Fleeing => Tactic::Rush,
            PlayerIntent::CautiousAdvance
            | PlayerIntent::Exploring
            | PlayerIntent::Idle
            | PlayerIntent::Unknown => {
                if self.profile.aggression_score() > self.config.pincer_aggression {
                    Tactic::Pincer
                } else {
                    Tactic::Rush
                }
            }
        }
    }
}

impl TacticalAgent for Commander {
    fn decide(&mut self, snapshot: &Snapshot) -> Action {
        Commander::decide(self, snapshot)
    }

    fn info(&self) -> AgentInfo {
        AgentInfo {
            name: "Adaptive Commander",
            version: "1.0",
            role: Role::Commander,
            description: "Profiles the player and selects squad-wide tactics under a cooldown",
        }
    }
}

/// Alive fraction of all friendly squads; 0 when nothing is reported
pub fn force_ratio(snap: &Snapshot) -> f32 {
    let (alive, total) = snap.force_totals();
    alive as f32 / total.max(1) as f32
}

/// Concrete order for a tactic
///
/// Defensive tactics anchor on the commander; offensive ones on the
/// player, or the commander when the player is unseen.
pub fn tactic_order(tactic: Tactic, snap: &Snapshot) -> Order {
    let player_pos: Vec3 = snap.player.as_ref().map_or(snap.position, |p| p.position);

    match tactic {
        Tactic::Retreat => Order::retreat(snap.position)
            .with_priority(1.0)
            .with_formation(FormationKind::Line),
        Tactic::Defend => Order::new(OrderKind::Defend, snap.position)
            .with_priority(0.8)
            .with_formation(FormationKind::Line),
        Tactic::Pincer => Order::new(
            OrderKind::Pincer {
                spread_angle: DEFAULT_SPREAD_ANGLE,
                left_squad: true,
            },
            player_pos,
        )
        .with_priority(0.9)
        .with_formation(FormationKind::Wedge),
        Tactic::FlankLeft | Tactic::FlankRight => {
            let side = if tactic == Tactic::FlankLeft {
                FlankSide::Left
            } else {
                FlankSide::Right
            };
            Order::new(
                OrderKind::Flank {
                    side,
                    offset: DEFAULT_FLANK_OFFSET,
                },
                player_pos,
            )
            .with_priority(0.7)
            .with_formation(FormationKind::Triangle)
        }
        Tactic::Rush => Order::attack(player_pos)
            .with_priority(0.9)
            .with_formation(FormationKind::Wedge),
    }
}
