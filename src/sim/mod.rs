//! Combat simulation module
//!
//! All battle logic lives here. Frames are pure transforms:
//! - Caller-supplied delta time only, no clocks or timers
//! - Seeded RNG streams only
//! - Stable iteration order (fire order for projectiles)
//! - No rendering or platform dependencies

pub mod collision;
pub mod effects;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod trajectory;

pub use collision::{Collision, HitOutcome, check_collisions, reflect_velocity, resolve_hit};
pub use effects::{CombatEffect, EffectKind, StackRule, advance_effects, apply_effects, effect_total};
pub use projectile::{Projectile, enforce_projectile_cap, spawn, update_projectiles};
pub use state::{
    Combat, CombatEvent, CombatId, CombatResult, CombatRules, CombatStats, CombatStatus, EndReason, Side, Winner,
};
pub use tick::{evaluate_termination, process_frame};
pub use trajectory::{Motion, Trajectory};
