//! Deck and stage inputs
//!
//! These come from the deck-building and progression systems already
//! validated; the engine only reads them when a session starts.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_LIFESPAN_MS, DEFAULT_PROJECTILE_SPEED};
use crate::sim::{EffectKind, Trajectory};

/// One emoji projectile definition carried by a card or a stage pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmojiAttack {
    pub emoji: String,
    #[serde(default)]
    pub trajectory: Trajectory,
    /// Multiplier on the emitter's base damage
    #[serde(default = "default_damage_scale")]
    pub damage_scale: f32,
    /// Units per second
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default = "default_lifespan")]
    pub lifespan_ms: f32,
    #[serde(default)]
    pub effects: Vec<EffectKind>,
    #[serde(default)]
    pub piercing: bool,
    #[serde(default)]
    pub homing: bool,
    #[serde(default)]
    pub bounces: u8,
}

fn default_damage_scale() -> f32 {
    1.0
}

fn default_speed() -> f32 {
    DEFAULT_PROJECTILE_SPEED
}

fn default_lifespan() -> f32 {
    DEFAULT_LIFESPAN_MS
}

impl EmojiAttack {
    pub fn new(emoji: impl Into<String>, trajectory: Trajectory) -> Self {
        Self {
            emoji: emoji.into(),
            trajectory,
            damage_scale: default_damage_scale(),
            speed: default_speed(),
            lifespan_ms: default_lifespan(),
            effects: Vec::new(),
            piercing: false,
            homing: false,
            bounces: 0,
        }
    }

    pub fn with_effects(mut self, effects: &[EffectKind]) -> Self {
        self.effects = effects.to_vec();
        self
    }
}

/// Periodic effect a card triggers on its own
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardProc {
    pub kind: EffectKind,
    pub interval_ms: f32,
}

/// A card in the player's deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub health: f32,
    #[serde(default)]
    pub attack_damage: f32,
    /// Volleys per second (0 = never fires)
    #[serde(default)]
    pub attack_speed: f32,
    #[serde(default)]
    pub attacks: Vec<EmojiAttack>,
    #[serde(default)]
    pub proc_effect: Option<CardProc>,
}

impl Card {
    /// A card that only contributes health
    pub fn new(id: impl Into<String>, health: f32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            health,
            attack_damage: 0.0,
            attack_speed: 0.0,
            attacks: Vec::new(),
            proc_effect: None,
        }
    }

    pub fn with_attack(mut self, damage: f32, attack_speed: f32, attack: EmojiAttack) -> Self {
        self.attack_damage = damage;
        self.attack_speed = attack_speed;
        self.attacks.push(attack);
        self
    }
}

/// A finished, size-validated deck
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub cards: Vec<Card>,
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn total_health(&self) -> f32 {
        self.cards.iter().map(|c| c.health).sum()
    }
}

/// Enemy definition for one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub enemy_health: f32,
    /// Volleys per second
    #[serde(default)]
    pub enemy_attack_speed: f32,
    #[serde(default)]
    pub enemy_damage: f32,
    /// Cycled round-robin, one attack per volley
    #[serde(default)]
    pub attack_pattern: Vec<EmojiAttack>,
}

impl Stage {
    /// An enemy that never attacks
    pub fn passive(id: impl Into<String>, enemy_health: f32) -> Self {
        Self {
            id: id.into(),
            enemy_health,
            enemy_attack_speed: 0.0,
            enemy_damage: 0.0,
            attack_pattern: Vec::new(),
        }
    }
}
