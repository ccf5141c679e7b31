//! Combat session state and core simulation types
//!
//! Everything a frame reads or writes lives on `Combat`; frames produce a new
//! snapshot rather than sharing one.

use std::fmt;

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::{CombatEffect, EffectKind};
use super::projectile::Projectile;
use crate::consts::*;
use crate::error::{CombatError, Result};
use crate::loadout::{Card, CardProc, Deck, EmojiAttack, Stage};

/// Session identifier, allocated by the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatId(pub u32);

impl fmt::Display for CombatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "combat-{}", self.0)
    }
}

/// One of the two combatants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }

    /// Center of this side's hit zone
    pub fn anchor(self) -> Vec2 {
        match self {
            Side::Player => PLAYER_ANCHOR,
            Side::Enemy => ENEMY_ANCHOR,
        }
    }

    /// Unit direction from this side toward its opponent
    pub fn forward(self) -> Vec2 {
        (self.opponent().anchor() - self.anchor()).normalize_or_zero()
    }

    /// Where this side's projectiles appear
    pub fn spawn_point(self) -> Vec2 {
        self.anchor() + self.forward() * SPAWN_OFFSET
    }
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatStatus {
    /// Created, no frame simulated yet
    Preparing,
    /// Frames are simulated
    Active,
    /// Frames are ignored until resumed
    Paused,
    /// Terminal, `result` is set
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Player,
    Enemy,
    Draw,
}

/// Why a session completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    MutualKnockout,
    PlayerDefeated,
    EnemyDefeated,
    Timeout,
    /// Ended through the manager with a caller-supplied reason
    Forced(String),
}

/// Terminal summary, written once when the session completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatResult {
    pub winner: Winner,
    /// Simulated milliseconds
    pub duration: f64,
    pub damage_dealt: f32,
    pub damage_received: f32,
    pub effects_applied: u32,
    pub projectiles_fired: u32,
    pub reason: EndReason,
}

/// Running counters for the result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    /// Damage taken by the enemy
    pub damage_dealt: f32,
    /// Damage taken by the player
    pub damage_received: f32,
    pub effects_applied: u32,
    pub projectiles_fired: u32,
    pub hits_landed: u32,
    pub hits_taken: u32,
    pub projectiles_evicted: u32,
}

/// Engine-wide limits copied into each session at creation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatRules {
    pub projectile_cap: usize,
    pub max_duration_ms: f64,
    pub zone_radius: f32,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            projectile_cap: PROJECTILE_CAP,
            max_duration_ms: MAX_COMBAT_DURATION_MS,
            zone_radius: ZONE_RADIUS,
        }
    }
}

/// How an emitter uses its attack list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireMode {
    /// Every attack fires on each volley (cards)
    Volley,
    /// One attack per volley, round-robin (stage pattern)
    Cycle,
}

/// Periodic proc bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcTimer {
    pub proc: CardProc,
    pub remaining_ms: f32,
}

/// Something that fires projectiles on a cooldown: a card or the stage enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emitter {
    /// Attribution label, e.g. `card:dragon`
    pub label: String,
    pub side: Side,
    pub damage: f32,
    /// Milliseconds between volleys (infinite = never fires)
    pub interval_ms: f32,
    pub cooldown_ms: f32,
    pub attacks: Vec<EmojiAttack>,
    pub mode: FireMode,
    pub cursor: usize,
    pub proc_timer: Option<ProcTimer>,
}

impl Emitter {
    fn new(label: String, side: Side, damage: f32, attack_speed: f32, attacks: Vec<EmojiAttack>, mode: FireMode) -> Self {
        let interval_ms = if attack_speed > 0.0 {
            1_000.0 / attack_speed
        } else {
            f32::INFINITY
        };
        Self {
            label,
            side,
            damage,
            interval_ms,
            cooldown_ms: interval_ms,
            attacks,
            mode,
            cursor: 0,
            proc_timer: None,
        }
    }

    pub fn from_card(card: &Card) -> Self {
        let mut emitter = Self::new(
            format!("card:{}", card.id),
            Side::Player,
            card.attack_damage,
            card.attack_speed,
            card.attacks.clone(),
            FireMode::Volley,
        );
        emitter.proc_timer = card
            .proc_effect
            .filter(|p| p.interval_ms > 0.0)
            .map(|proc| ProcTimer {
                proc,
                remaining_ms: proc.interval_ms,
            });
        emitter
    }

    pub fn from_stage(stage: &Stage) -> Self {
        Self::new(
            format!("stage:{}", stage.id),
            Side::Enemy,
            stage.enemy_damage,
            stage.enemy_attack_speed,
            stage.attack_pattern.clone(),
            FireMode::Cycle,
        )
    }

    /// Whether this emitter can ever produce a projectile
    pub fn can_fire(&self) -> bool {
        self.interval_ms.is_finite() && !self.attacks.is_empty()
    }
}

/// What happened during the last processed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    Fired { projectile_id: u32, side: Side, emoji: String },
    Hit { projectile_id: u32, target: Side, damage: f32, position: Vec2 },
    Reflected { target: Side, damage: f32 },
    Bounced { projectile_id: u32 },
    Expired { projectile_id: u32 },
    Evicted { projectile_id: u32 },
    EffectApplied { kind: EffectKind, target: Side },
    Completed { winner: Winner },
}

/// Seeded RNG streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Independent generator for one (key, frame) pair
    pub fn stream(&self, key: u64, frame: u64) -> Pcg32 {
        Pcg32::new(self.seed ^ frame.wrapping_mul(0x9E37_79B9_7F4A_7C15), key)
    }
}

/// A combat session (aggregate root)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combat {
    pub id: CombatId,
    pub player_health: f32,
    pub max_player_health: f32,
    pub enemy_health: f32,
    pub max_enemy_health: f32,
    /// Active projectiles in fire order
    pub projectiles: Vec<Projectile>,
    pub active_effects: Vec<CombatEffect>,
    pub status: CombatStatus,
    /// Elapsed simulated milliseconds
    pub duration: f64,
    /// Session time of the last processed frame (ms)
    pub last_frame_time: f64,
    /// Set only once `status` is `Completed`
    pub result: Option<CombatResult>,
    pub emitters: Vec<Emitter>,
    pub stats: CombatStats,
    pub rules: CombatRules,
    pub rng: RngState,
    /// Number of Active frames processed
    pub frame_index: u64,
    /// Events from the last processed frame
    pub events: Vec<CombatEvent>,
    /// Next projectile ID
    next_id: u32,
}

impl Combat {
    /// Build a session in `Preparing` from a deck and a stage
    pub fn new(id: CombatId, deck: &Deck, stage: &Stage, rules: CombatRules, seed: u64) -> Result<Self> {
        if deck.cards.is_empty() {
            return Err(CombatError::EmptyDeck);
        }
        if let Some(card) = deck.cards.iter().find(|c| !(c.health > 0.0)) {
            return Err(CombatError::InvalidCardHealth {
                card_id: card.id.clone(),
                health: card.health,
            });
        }
        if !(stage.enemy_health > 0.0) {
            return Err(CombatError::InvalidStage(format!(
                "stage {} has non-positive enemy health {}",
                stage.id, stage.enemy_health
            )));
        }

        let player_health = deck.total_health();
        let mut emitters: Vec<Emitter> = deck.cards.iter().map(Emitter::from_card).collect();
        emitters.push(Emitter::from_stage(stage));

        Ok(Self {
            id,
            player_health,
            max_player_health: player_health,
            enemy_health: stage.enemy_health,
            max_enemy_health: stage.enemy_health,
            projectiles: Vec::new(),
            active_effects: Vec::new(),
            status: CombatStatus::Preparing,
            duration: 0.0,
            last_frame_time: 0.0,
            result: None,
            emitters,
            stats: CombatStats::default(),
            rules,
            rng: RngState::new(seed),
            frame_index: 0,
            events: Vec::new(),
            next_id: 1,
        })
    }

    /// Allocate a new projectile ID
    pub fn next_projectile_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn health(&self, side: Side) -> f32 {
        match side {
            Side::Player => self.player_health,
            Side::Enemy => self.enemy_health,
        }
    }

    pub fn max_health(&self, side: Side) -> f32 {
        match side {
            Side::Player => self.max_player_health,
            Side::Enemy => self.max_enemy_health,
        }
    }

    /// Remaining health as a fraction of max
    pub fn health_fraction(&self, side: Side) -> f32 {
        let max = self.max_health(side);
        if max > 0.0 { self.health(side) / max } else { 0.0 }
    }

    fn set_health(&mut self, side: Side, value: f32) {
        let clamped = value.clamp(0.0, self.max_health(side));
        match side {
            Side::Player => self.player_health = clamped,
            Side::Enemy => self.enemy_health = clamped,
        }
    }

    /// Remove health from a side and record it. Returns the amount actually removed.
    pub fn deal_damage(&mut self, side: Side, amount: f32) -> f32 {
        let before = self.health(side);
        self.set_health(side, before - amount.max(0.0));
        let dealt = before - self.health(side);
        match side {
            Side::Enemy => self.stats.damage_dealt += dealt,
            Side::Player => self.stats.damage_received += dealt,
        }
        dealt
    }

    /// Restore health to a side. Returns the amount actually restored.
    pub fn restore_health(&mut self, side: Side, amount: f32) -> f32 {
        let before = self.health(side);
        self.set_health(side, before + amount.max(0.0));
        self.health(side) - before
    }

    /// Either side is out of health
    pub fn is_decided(&self) -> bool {
        self.player_health <= 0.0 || self.enemy_health <= 0.0
    }

    /// Winner by remaining health percentage, exact tie is a draw
    pub fn winner_by_health_fraction(&self) -> Winner {
        let player = self.health_fraction(Side::Player);
        let enemy = self.health_fraction(Side::Enemy);
        if player > enemy {
            Winner::Player
        } else if enemy > player {
            Winner::Enemy
        } else {
            Winner::Draw
        }
    }

    /// Transition into `Completed`. The result is written only the first time.
    pub fn complete(&mut self, winner: Winner, reason: EndReason) {
        if self.status == CombatStatus::Completed {
            return;
        }
        self.status = CombatStatus::Completed;
        self.projectiles.clear();
        self.result = Some(CombatResult {
            winner,
            duration: self.duration,
            damage_dealt: self.stats.damage_dealt,
            damage_received: self.stats.damage_received,
            effects_applied: self.stats.effects_applied,
            projectiles_fired: self.stats.projectiles_fired,
            reason,
        });
        self.events.push(CombatEvent::Completed { winner });
    }
}
