//! Emoji Skirmish - combat simulation engine for an emoji card battler
//!
//! Core modules:
//! - `sim`: Frame-driven combat simulation (projectiles, collisions, effects)
//! - `session`: Session registry and lifecycle transitions
//! - `loadout`: Deck and stage inputs handed over by the surrounding game
//! - `tuning`: Data-driven effect balance
//! - `settings`: Engine configuration

pub mod error;
pub mod loadout;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{CombatError, Result};
pub use loadout::{Card, CardProc, Deck, EmojiAttack, Stage};
pub use session::{CombatManager, Transition};
pub use settings::{Pace, Settings};

use glam::Vec2;

/// Engine configuration constants
pub mod consts {
    use glam::Vec2;

    /// Nominal frame delta (60 updates per second)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Combatant anchor points. The player sits at the bottom, the enemy at the top.
    pub const PLAYER_ANCHOR: Vec2 = Vec2::new(0.0, -250.0);
    pub const ENEMY_ANCHOR: Vec2 = Vec2::new(0.0, 250.0);
    /// Hit radius around an anchor
    pub const ZONE_RADIUS: f32 = 40.0;
    /// Distance in front of the own anchor where projectiles appear
    pub const SPAWN_OFFSET: f32 = 45.0;

    /// Maximum concurrently active projectiles per session
    pub const PROJECTILE_CAP: usize = 50;
    /// Forced end of a session (simulated milliseconds)
    pub const MAX_COMBAT_DURATION_MS: f64 = 120_000.0;

    /// Projectile defaults
    pub const DEFAULT_PROJECTILE_SPEED: f32 = 300.0;
    pub const DEFAULT_LIFESPAN_MS: f32 = 3_000.0;

    /// Spawn point to opposing anchor. Shaped paths rejoin the straight line here.
    pub const FLIGHT_DISTANCE: f32 = ENEMY_ANCHOR.y - PLAYER_ANCHOR.y - SPAWN_OFFSET;
    /// Arc: peak sideways bow (units)
    pub const ARC_HEIGHT: f32 = 90.0;
    /// Wave: sideways sway (units) and full cycles per flight
    pub const WAVE_AMPLITUDE: f32 = 30.0;
    pub const WAVE_CYCLES: f32 = 2.0;
    /// Spiral: loop radius (units) and loops per flight
    pub const SPIRAL_RADIUS: f32 = 24.0;
    pub const SPIRAL_LOOPS: f32 = 3.0;
    /// Homing: maximum turn rate (rad/s)
    pub const HOMING_TURN_RATE: f32 = std::f32::consts::PI;
    /// Random: per-frame heading jitter and the cone it stays inside (radians)
    pub const RANDOM_JITTER: f32 = 0.35;
    pub const RANDOM_CONE: f32 = std::f32::consts::FRAC_PI_4;

    /// Emitter recharge rate while frozen
    pub const FREEZE_RECHARGE_FACTOR: f32 = 0.5;
    /// Damage multiplier on a lucky critical hit
    pub const CRIT_MULTIPLIER: f32 = 2.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Heading of a vector in radians
#[inline]
pub fn heading(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Unit vector for a heading
#[inline]
pub fn from_heading(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Rotate `current` toward `desired` by at most `max_angle` radians, keeping its length
pub fn rotate_toward(current: Vec2, desired: Vec2, max_angle: f32) -> Vec2 {
    let speed = current.length();
    if speed == 0.0 || desired.length_squared() == 0.0 {
        return current;
    }
    let delta = normalize_angle(heading(desired) - heading(current));
    let turn = delta.clamp(-max_angle, max_angle);
    from_heading(heading(current) + turn) * speed
}
