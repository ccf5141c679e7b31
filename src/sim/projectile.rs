//! Projectile spawning, aging and eviction

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::EffectKind;
use super::state::{RngState, Side};
use super::trajectory::{self, Motion, MotionContext, Trajectory};
use crate::loadout::EmojiAttack;

/// One active emoji attack in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub emoji: String,
    pub position: Vec2,
    /// Position before the last move; collisions sweep from here
    #[serde(default)]
    pub last_position: Vec2,
    /// Base velocity (units/s); shaped trajectories add their offset on top
    pub velocity: Vec2,
    pub damage: f32,
    pub trajectory: Trajectory,
    /// Effects applied on hit
    pub effects: Vec<EffectKind>,
    /// Side that fired it; it threatens the other side
    pub source: Side,
    /// Emitter label, used to attribute effects
    pub origin: String,
    /// Session time at spawn (ms)
    pub created_at: f64,
    /// Maximum age (ms)
    pub lifespan: f32,
    /// Survives hits instead of being consumed
    #[serde(default)]
    pub piercing: bool,
    /// Re-aims toward the target each frame regardless of trajectory
    #[serde(default)]
    pub homing: bool,
    /// Remaining ricochets
    #[serde(default)]
    pub bounces: u8,
    /// Currently overlapping the opposing zone (hits register on entry only)
    #[serde(default)]
    pub inside_zone: bool,
}

impl Projectile {
    /// Age at session time `now` (ms)
    pub fn age(&self, now: f64) -> f64 {
        now - self.created_at
    }

    pub fn is_expired(&self, now: f64) -> bool {
        self.age(now) >= self.lifespan as f64
    }

    /// Anchor of the side this projectile threatens
    pub fn target_anchor(&self) -> Vec2 {
        self.source.opponent().anchor()
    }
}

/// Create a projectile for `attack` fired by `side`
pub fn spawn(attack: &EmojiAttack, side: Side, damage: f32, id: u32, now: f64, origin: &str) -> Projectile {
    Projectile {
        id,
        emoji: attack.emoji.clone(),
        position: side.spawn_point(),
        last_position: side.spawn_point(),
        velocity: side.forward() * attack.speed.max(0.0),
        damage: damage.max(0.0),
        trajectory: attack.trajectory,
        effects: attack.effects.clone(),
        source: side,
        origin: origin.to_string(),
        created_at: now,
        lifespan: attack.lifespan_ms,
        piercing: attack.piercing,
        homing: attack.homing,
        bounces: attack.bounces,
        inside_zone: false,
    }
}

/// Move one projectile forward by `dt` seconds. Returns a new value.
pub fn step_projectile(p: &Projectile, dt: f32, now: f64, rng: &RngState, frame: u64) -> Projectile {
    let target = p.target_anchor();
    // Random flight wanders around the line to the target, or around the way back once bounced
    let to_target = target - p.position;
    let forward = if p.velocity.dot(to_target) >= 0.0 {
        to_target
    } else {
        -p.source.forward()
    };
    let ctx = MotionContext {
        age_ms: p.age(now - dt as f64 * 1000.0).max(0.0) as f32,
        target,
        forward,
    };

    let mut velocity = p.velocity;
    if p.homing && p.trajectory != Trajectory::Homing {
        velocity = trajectory::home(velocity, p.position, target, dt);
    }

    let mut stream = rng.stream(p.id as u64, frame);
    let motion = trajectory::advance(
        Motion {
            position: p.position,
            velocity,
        },
        p.trajectory,
        &ctx,
        dt,
        &mut stream,
    );

    Projectile {
        position: motion.position,
        last_position: p.position,
        velocity: motion.velocity,
        ..p.clone()
    }
}

/// Advance all projectiles to session time `now`, splitting out the expired ones.
///
/// Returns the survivors in their original order and the IDs that aged out.
pub fn advance_projectiles(
    projectiles: &[Projectile],
    dt: f32,
    now: f64,
    rng: &RngState,
    frame: u64,
) -> (Vec<Projectile>, Vec<u32>) {
    let mut alive = Vec::with_capacity(projectiles.len());
    let mut expired = Vec::new();

    for p in projectiles {
        if p.is_expired(now) {
            expired.push(p.id);
            continue;
        }
        alive.push(step_projectile(p, dt, now, rng, frame));
    }

    (alive, expired)
}

/// Advance projectiles and drop those whose age reached their lifespan
pub fn update_projectiles(projectiles: &[Projectile], dt: f32, now: f64, rng: &RngState, frame: u64) -> Vec<Projectile> {
    advance_projectiles(projectiles, dt, now, rng, frame).0
}

/// Drop the oldest projectiles until at most `cap` remain.
///
/// Returns the survivors and the evicted IDs (oldest first).
pub fn enforce_projectile_cap(mut projectiles: Vec<Projectile>, cap: usize) -> (Vec<Projectile>, Vec<u32>) {
    if projectiles.len() <= cap {
        return (projectiles, Vec::new());
    }
    let excess = projectiles.len() - cap;
    let evicted = projectiles.drain(..excess).map(|p| p.id).collect();
    (projectiles, evicted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use proptest::prelude::*;

    fn straight(id: u32, created_at: f64, lifespan: f32) -> Projectile {
        let mut attack = EmojiAttack::new("⭐", Trajectory::Straight);
        attack.lifespan_ms = lifespan;
        spawn(&attack, Side::Player, 5.0, id, created_at, "card:test")
    }

    #[test]
    fn test_spawn_positions_per_side() {
        let attack = EmojiAttack::new("🔥", Trajectory::Straight);
        let p = spawn(&attack, Side::Player, 10.0, 1, 0.0, "card:a");
        assert_eq!(p.position, Side::Player.spawn_point());
        assert!(p.velocity.y > 0.0);

        let e = spawn(&attack, Side::Enemy, 10.0, 2, 0.0, "stage:1");
        assert_eq!(e.position, Side::Enemy.spawn_point());
        assert!(e.velocity.y < 0.0);
        assert_eq!(e.target_anchor(), PLAYER_ANCHOR);
    }

    #[test]
    fn test_update_does_not_mutate_input() {
        let input = vec![straight(1, 0.0, 1_000.0)];
        let snapshot = input.clone();
        let out = update_projectiles(&input, 0.1, 100.0, &RngState::new(1), 0);
        assert_eq!(input, snapshot);
        assert_ne!(out[0].position, input[0].position);
    }

    #[test]
    fn test_lifespan_boundary_is_inclusive() {
        let rng = RngState::new(1);
        let p = vec![straight(1, 0.0, 500.0)];
        assert_eq!(update_projectiles(&p, 0.016, 499.0, &rng, 0).len(), 1);
        assert!(update_projectiles(&p, 0.016, 500.0, &rng, 0).is_empty());
        assert!(update_projectiles(&p, 0.016, 501.0, &rng, 0).is_empty());
    }

    #[test]
    fn test_advance_reports_expired_ids() {
        let rng = RngState::new(1);
        let p = vec![straight(1, 0.0, 100.0), straight(2, 0.0, 1_000.0)];
        let (alive, expired) = advance_projectiles(&p, 0.016, 200.0, &rng, 0);
        assert_eq!(expired, vec![1]);
        assert_eq!(alive.len(), 1);
        assert_eq!(alive[0].id, 2);
    }

    #[test]
    fn test_cap_evicts_oldest_first() {
        let projectiles: Vec<_> = (1..=60).map(|id| straight(id, id as f64, 10_000.0)).collect();
        let (kept, evicted) = enforce_projectile_cap(projectiles, PROJECTILE_CAP);
        assert_eq!(kept.len(), 50);
        assert_eq!(evicted, (1..=10).collect::<Vec<_>>());
        assert_eq!(kept[0].id, 11);
    }

    #[test]
    fn test_cap_under_limit_is_untouched() {
        let projectiles: Vec<_> = (1..=5).map(|id| straight(id, 0.0, 10_000.0)).collect();
        let (kept, evicted) = enforce_projectile_cap(projectiles.clone(), PROJECTILE_CAP);
        assert_eq!(kept, projectiles);
        assert!(evicted.is_empty());
    }

    #[test]
    fn test_homing_modifier_turns_straight_shot() {
        let mut attack = EmojiAttack::new("🎯", Trajectory::Straight);
        attack.homing = true;
        let mut p = spawn(&attack, Side::Player, 1.0, 1, 0.0, "card:a");
        p.velocity = Vec2::new(300.0, 0.0);
        let next = step_projectile(&p, 0.016, 16.0, &RngState::new(3), 0);
        assert!(next.velocity.y > 0.0);
    }

    proptest! {
        #[test]
        fn prop_straight_moves_by_velocity_times_dt(
            x in -200.0f32..200.0,
            y in -200.0f32..200.0,
            vx in -400.0f32..400.0,
            vy in -400.0f32..400.0,
            dt in 0.0f32..0.1,
        ) {
            let mut p = straight(1, 0.0, 10_000.0);
            p.position = Vec2::new(x, y);
            p.velocity = Vec2::new(vx, vy);
            let out = update_projectiles(&[p.clone()], dt, dt as f64 * 1000.0, &RngState::new(9), 0);
            let expected = p.position + p.velocity * dt;
            prop_assert!((out[0].position - expected).length() < 1e-3);
        }

        #[test]
        fn prop_removal_is_boundary_inclusive(lifespan in 1.0f32..5_000.0, eps in 0.01f64..100.0) {
            let rng = RngState::new(5);
            let p = vec![straight(1, 0.0, lifespan)];
            let l = lifespan as f64;
            prop_assert_eq!(update_projectiles(&p, 0.0, (l - eps).max(0.0), &rng, 0).len(), 1);
            prop_assert!(update_projectiles(&p, 0.0, l + eps, &rng, 0).is_empty());
        }
    }
}
