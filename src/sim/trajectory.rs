//! Trajectory shapes and motion integration
//!
//! A projectile keeps a base velocity. Arc, wave and spiral add a sideways
//! shape keyed to distance flown; homing and random rewrite the base
//! velocity's heading each frame. Speed is never changed here.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{from_heading, heading, normalize_angle, rotate_toward};

/// Named flight path of a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Trajectory {
    #[default]
    Straight,
    Arc,
    Homing,
    Wave,
    Spiral,
    Random,
}

/// Position and base velocity of a moving body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Per-frame inputs that are not part of the projectile itself
#[derive(Debug, Clone, Copy)]
pub struct MotionContext {
    /// Projectile age at the start of the frame (ms)
    pub age_ms: f32,
    /// Live position of the target anchor
    pub target: Vec2,
    /// Axis the random cone is centered on
    pub forward: Vec2,
}

impl Trajectory {
    /// Offset from the straight line after `distance` units of flight, as
    /// (sideways, along-track).
    ///
    /// Zero at launch and again at `FLIGHT_DISTANCE`; past that the path runs
    /// straight, so every shape arrives on the line to the target anchor
    /// whatever the speed.
    pub fn shape(self, distance: f32) -> Vec2 {
        let s = (distance / FLIGHT_DISTANCE).clamp(0.0, 1.0);
        match self {
            Trajectory::Arc => Vec2::new(ARC_HEIGHT * (PI * s).sin(), 0.0),
            Trajectory::Wave => Vec2::new(WAVE_AMPLITUDE * (TAU * WAVE_CYCLES * s).sin(), 0.0),
            Trajectory::Spiral => {
                let theta = TAU * SPIRAL_LOOPS * s;
                Vec2::new(SPIRAL_RADIUS * theta.sin(), SPIRAL_RADIUS * (theta.cos() - 1.0))
            }
            Trajectory::Straight | Trajectory::Homing | Trajectory::Random => Vec2::ZERO,
        }
    }

    /// World-space displacement the shape adds between `from` and `to` units of flight along `base`
    pub fn shape_delta(self, base: Vec2, from: f32, to: f32) -> Vec2 {
        let dir = base.normalize_or_zero();
        let d = self.shape(to) - self.shape(from);
        dir.perp() * d.x + dir * d.y
    }
}

/// Turn a velocity toward a target with a bounded turn rate
pub fn home(velocity: Vec2, position: Vec2, target: Vec2, dt: f32) -> Vec2 {
    rotate_toward(velocity, target - position, HOMING_TURN_RATE * dt)
}

/// Perturb a heading by `jitter`, keeping it inside the cone around `forward`
pub fn jitter_heading(velocity: Vec2, forward: Vec2, jitter: f32) -> Vec2 {
    let speed = velocity.length();
    if speed == 0.0 {
        return velocity;
    }
    let axis = heading(forward);
    let deviation = normalize_angle(heading(velocity) + jitter - axis).clamp(-RANDOM_CONE, RANDOM_CONE);
    from_heading(axis + deviation) * speed
}

/// Advance one body by `dt` seconds along its trajectory
pub fn advance<R: Rng>(motion: Motion, trajectory: Trajectory, ctx: &MotionContext, dt: f32, rng: &mut R) -> Motion {
    let velocity = match trajectory {
        Trajectory::Homing => home(motion.velocity, motion.position, ctx.target, dt),
        Trajectory::Random => {
            let jitter = rng.random_range(-RANDOM_JITTER..=RANDOM_JITTER);
            jitter_heading(motion.velocity, ctx.forward, jitter)
        }
        _ => motion.velocity,
    };

    let speed = velocity.length();
    let flown = speed * ctx.age_ms / 1000.0;
    let shaped = trajectory.shape_delta(velocity, flown, flown + speed * dt);
    Motion {
        position: motion.position + velocity * dt + shaped,
        velocity,
    }
}
