//! Collision detection and response against combatant hit zones
//!
//! Each side has a circular zone around its anchor. A projectile can only hit
//! the zone of the side it threatens, and only when it enters that zone.
//! Entry is tested along the whole move of the frame, so a fast projectile or
//! a long frame cannot skip over a zone.

use glam::Vec2;

use super::effects::EffectKind;
use super::projectile::Projectile;
use super::state::Side;

/// A projectile entering the opposing zone this frame
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    /// Index into the projectile slice that was checked
    pub index: usize,
    pub projectile_id: u32,
    pub target: Side,
    pub damage: f32,
    pub effects: Vec<EffectKind>,
    /// Projectile position at impact
    pub position: Vec2,
    /// Zone surface normal at impact (pointing away from the anchor)
    pub normal: Vec2,
}

/// What happened to a projectile after it hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Velocity reflected, one bounce used
    Bounced,
    /// Passed through
    Pierced,
    /// Removed
    Consumed,
}

/// Check if a point is inside a zone
#[inline]
pub fn in_zone(position: Vec2, anchor: Vec2, radius: f32) -> bool {
    position.distance_squared(anchor) <= radius * radius
}

/// Closest point to `center` on the segment from `from` to `to`
pub fn closest_on_segment(from: Vec2, to: Vec2, center: Vec2) -> Vec2 {
    let span = to - from;
    let len2 = span.length_squared();
    if len2 == 0.0 {
        return from;
    }
    let t = ((center - from).dot(span) / len2).clamp(0.0, 1.0);
    from + span * t
}

/// Outward normal of the zone of `side` at `position`
pub fn zone_normal(side: Side, position: Vec2) -> Vec2 {
    let n = (position - side.anchor()).normalize_or_zero();
    if n == Vec2::ZERO { side.forward() } else { n }
}

/// Find projectiles entering the opposing zone, in input (fire) order
pub fn check_collisions(projectiles: &[Projectile], zone_radius: f32) -> Vec<Collision> {
    projectiles
        .iter()
        .enumerate()
        .filter_map(|(index, p)| {
            let target = p.source.opponent();
            if p.inside_zone {
                return None;
            }
            let contact = closest_on_segment(p.last_position, p.position, target.anchor());
            if !in_zone(contact, target.anchor(), zone_radius) {
                return None;
            }
            Some(Collision {
                index,
                projectile_id: p.id,
                target,
                damage: p.damage,
                effects: p.effects.clone(),
                position: contact,
                normal: zone_normal(target, contact),
            })
        })
        .collect()
}

/// Refresh `inside_zone` so a projectile that stays in the zone does not hit again
pub fn update_zone_flags(projectiles: &mut [Projectile], zone_radius: f32) {
    for p in projectiles {
        p.inside_zone = in_zone(p.position, p.target_anchor(), zone_radius);
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Apply the post-hit rules to a projectile.
///
/// Bounces are spent first, whether or not the projectile is piercing; a
/// projectile with no bounces left survives only if it is piercing.
pub fn resolve_hit(p: &mut Projectile, normal: Vec2) -> HitOutcome {
    if p.bounces > 0 {
        p.bounces -= 1;
        if p.velocity.dot(normal) < 0.0 {
            p.velocity = reflect_velocity(p.velocity, normal);
        }
        HitOutcome::Bounced
    } else if p.piercing {
        HitOutcome::Pierced
    } else {
        HitOutcome::Consumed
    }
}
