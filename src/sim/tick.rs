//! Frame stepper
//!
//! Advances a combat session by one externally timed frame. Within a frame
//! the order is fixed: move projectiles, resolve collisions, fire emitters,
//! enforce the projectile cap, tick effects, then check for the end. Once a
//! collision takes a side to zero, firing and effect ticks are skipped.

use rand::Rng;

use super::collision::{Collision, HitOutcome, check_collisions, resolve_hit, update_zone_flags};
use super::effects::{CombatEffect, EffectKind, absorb_with_shield, effect_total, has_effect, register_effects, tick_effects};
use super::projectile::{Projectile, advance_projectiles, enforce_projectile_cap, spawn};
use super::state::{Combat, CombatEvent, CombatStatus, EndReason, FireMode, Side, Winner};
use crate::consts::*;
use crate::error::{CombatError, Result};
use crate::loadout::EmojiAttack;

/// Volleys a single emitter may fire in one frame; the rest of the backlog is dropped
pub const MAX_VOLLEYS_PER_FRAME: u32 = 8;

/// RNG key space for crit rolls, kept apart from per-projectile motion streams
const CRIT_STREAM: u64 = 1 << 40;

/// Advance a session by `dt` seconds and return the new snapshot.
///
/// Sessions that are not `Active` come back unchanged.
pub fn process_frame(combat: &Combat, dt: f32) -> Result<Combat> {
    if !dt.is_finite() || dt < 0.0 {
        return Err(CombatError::InvalidDeltaTime(dt));
    }
    if combat.status != CombatStatus::Active {
        return Ok(combat.clone());
    }

    let mut next = combat.clone();
    step(&mut next, dt);
    Ok(next)
}

fn step(combat: &mut Combat, dt: f32) {
    combat.events.clear();
    let now = combat.duration + dt as f64 * 1000.0;

    // Move, then drop anything that aged out
    let (mut projectiles, expired) =
        advance_projectiles(&combat.projectiles, dt, now, &combat.rng, combat.frame_index);
    combat
        .events
        .extend(expired.into_iter().map(|projectile_id| CombatEvent::Expired { projectile_id }));

    // Collisions against the advanced positions, in fire order
    let collisions = check_collisions(&projectiles, combat.rules.zone_radius);
    let mut consumed = vec![false; projectiles.len()];
    for hit in &collisions {
        if combat.is_decided() {
            break;
        }
        let outcome = apply_hit(combat, &mut projectiles[hit.index], hit);
        consumed[hit.index] = outcome == HitOutcome::Consumed;
    }
    let mut survivors: Vec<Projectile> = projectiles
        .into_iter()
        .zip(consumed)
        .filter_map(|(p, gone)| (!gone).then_some(p))
        .collect();
    update_zone_flags(&mut survivors, combat.rules.zone_radius);
    combat.projectiles = survivors;

    if !combat.is_decided() {
        fire_emitters(combat, dt, now);
    }

    let (kept, evicted) = enforce_projectile_cap(std::mem::take(&mut combat.projectiles), combat.rules.projectile_cap);
    if !evicted.is_empty() {
        log::warn!(
            "{}: projectile cap {} reached, evicted {} oldest",
            combat.id,
            combat.rules.projectile_cap,
            evicted.len()
        );
        combat.stats.projectiles_evicted += evicted.len() as u32;
        combat
            .events
            .extend(evicted.into_iter().map(|projectile_id| CombatEvent::Evicted { projectile_id }));
    }
    combat.projectiles = kept;

    // A lethal collision ends the frame's processing; heals must not undo it
    if !combat.is_decided() {
        tick_effects(combat, dt);
    }

    combat.duration = now;
    combat.last_frame_time = now;
    combat.frame_index += 1;

    log::trace!(
        "{} frame {}: t={:.0}ms player={:.1} enemy={:.1} projectiles={} effects={}",
        combat.id,
        combat.frame_index,
        combat.duration,
        combat.player_health,
        combat.enemy_health,
        combat.projectiles.len(),
        combat.active_effects.len()
    );

    evaluate_termination(combat);
}

/// Apply one collision to the session and the projectile that caused it
fn apply_hit(combat: &mut Combat, projectile: &mut Projectile, hit: &Collision) -> HitOutcome {
    let target = hit.target;
    let attacker = projectile.source;

    let mut damage = absorb_with_shield(&mut combat.active_effects, target, hit.damage);

    let reflect = effect_total(&combat.active_effects, target, EffectKind::Reflect);
    if reflect > 0.0 && damage > 0.0 {
        let redirected = damage * reflect;
        damage -= redirected;
        let dealt = combat.deal_damage(attacker, redirected);
        combat.events.push(CombatEvent::Reflected {
            target: attacker,
            damage: dealt,
        });
    }

    let dealt = combat.deal_damage(target, damage);
    match target {
        Side::Enemy => combat.stats.hits_landed += 1,
        Side::Player => combat.stats.hits_taken += 1,
    }
    combat.events.push(CombatEvent::Hit {
        projectile_id: projectile.id,
        target,
        damage: dealt,
        position: hit.position,
    });
    log::debug!(
        "{}: {} #{} hit {:?} for {:.1} ({:.1} left)",
        combat.id,
        projectile.emoji,
        projectile.id,
        target,
        dealt,
        combat.health(target)
    );

    let effects: Vec<CombatEffect> = hit
        .effects
        .iter()
        .map(|&kind| CombatEffect::new(kind, kind.target_for_hit(target), projectile.origin.clone()))
        .collect();
    register_effects(combat, &effects);

    let outcome = resolve_hit(projectile, hit.normal);
    if outcome == HitOutcome::Bounced {
        combat.events.push(CombatEvent::Bounced {
            projectile_id: projectile.id,
        });
    }
    outcome
}

/// Emitter recharge multiplier for a side under its current effects
pub fn recharge_rate(effects: &[CombatEffect], side: Side) -> f32 {
    if has_effect(effects, side, EffectKind::Stun) {
        return 0.0;
    }
    let mut rate = 1.0 + effect_total(effects, side, EffectKind::Burst);
    if has_effect(effects, side, EffectKind::Freeze) {
        rate *= FREEZE_RECHARGE_FACTOR;
    }
    rate
}

/// A projectile waiting to be spawned
struct Shot {
    attack: EmojiAttack,
    side: Side,
    damage: f32,
    origin: String,
}

/// Recharge emitters and card procs, spawning whatever came off cooldown
fn fire_emitters(combat: &mut Combat, dt: f32, now: f64) {
    let dt_ms = dt * 1000.0;
    let player_rate = recharge_rate(&combat.active_effects, Side::Player);
    let enemy_rate = recharge_rate(&combat.active_effects, Side::Enemy);

    let mut shots: Vec<Shot> = Vec::new();
    let mut procs: Vec<CombatEffect> = Vec::new();

    for emitter in &mut combat.emitters {
        if let Some(timer) = &mut emitter.proc_timer {
            timer.remaining_ms -= dt_ms;
            if timer.remaining_ms <= 0.0 {
                timer.remaining_ms += timer.proc.interval_ms;
                timer.remaining_ms = timer.remaining_ms.max(0.0);
                let kind = timer.proc.kind;
                let target = if kind.is_harmful() {
                    emitter.side.opponent()
                } else {
                    emitter.side
                };
                procs.push(CombatEffect::new(kind, target, emitter.label.clone()));
            }
        }

        if !emitter.can_fire() {
            continue;
        }
        let rate = match emitter.side {
            Side::Player => player_rate,
            Side::Enemy => enemy_rate,
        };
        emitter.cooldown_ms -= dt_ms * rate;

        let mut volleys = 0;
        while emitter.cooldown_ms <= 0.0 && volleys < MAX_VOLLEYS_PER_FRAME {
            emitter.cooldown_ms += emitter.interval_ms;
            volleys += 1;

            let attacks: Vec<EmojiAttack> = match emitter.mode {
                FireMode::Volley => emitter.attacks.clone(),
                FireMode::Cycle => {
                    let attack = emitter.attacks[emitter.cursor % emitter.attacks.len()].clone();
                    emitter.cursor = (emitter.cursor + 1) % emitter.attacks.len();
                    vec![attack]
                }
            };
            shots.extend(attacks.into_iter().map(|attack| Shot {
                damage: emitter.damage * attack.damage_scale,
                attack,
                side: emitter.side,
                origin: emitter.label.clone(),
            }));
        }
        if emitter.cooldown_ms <= 0.0 {
            emitter.cooldown_ms = emitter.interval_ms;
        }
    }

    register_effects(combat, &procs);

    for shot in shots {
        let id = combat.next_projectile_id();
        let damage = roll_damage(combat, shot.side, shot.damage, id);
        let projectile = spawn(&shot.attack, shot.side, damage, id, now, &shot.origin);
        combat.events.push(CombatEvent::Fired {
            projectile_id: id,
            side: shot.side,
            emoji: projectile.emoji.clone(),
        });
        combat.stats.projectiles_fired += 1;
        combat.projectiles.push(projectile);
    }
}

/// Outgoing damage after boost and a lucky crit roll
fn roll_damage(combat: &Combat, side: Side, base: f32, projectile_id: u32) -> f32 {
    let mut damage = base * (1.0 + effect_total(&combat.active_effects, side, EffectKind::Boost));
    let crit_chance = effect_total(&combat.active_effects, side, EffectKind::Lucky);
    if crit_chance > 0.0 {
        let mut rng = combat.rng.stream(CRIT_STREAM | projectile_id as u64, combat.frame_index);
        if rng.random::<f32>() < crit_chance {
            damage *= CRIT_MULTIPLIER;
        }
    }
    damage
}

/// Complete the session if an end condition holds. Returns true when it completed.
pub fn evaluate_termination(combat: &mut Combat) -> bool {
    let player_down = combat.player_health <= 0.0;
    let enemy_down = combat.enemy_health <= 0.0;

    let (winner, reason) = if player_down && enemy_down {
        (Winner::Draw, EndReason::MutualKnockout)
    } else if player_down {
        (Winner::Enemy, EndReason::PlayerDefeated)
    } else if enemy_down {
        (Winner::Player, EndReason::EnemyDefeated)
    } else if combat.duration >= combat.rules.max_duration_ms {
        (combat.winner_by_health_fraction(), EndReason::Timeout)
    } else {
        return false;
    };

    log::info!(
        "{} completed after {:.0}ms: {:?} ({:?})",
        combat.id,
        combat.duration,
        winner,
        reason
    );
    combat.complete(winner, reason);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loadout::{Card, CardProc, Deck, Stage};
    use crate::sim::state::{CombatId, CombatRules};
    use crate::sim::Trajectory;
    use glam::Vec2;

    fn active(deck: Deck, stage: Stage) -> Combat {
        let mut combat = Combat::new(CombatId(1), &deck, &stage, CombatRules::default(), 42).unwrap();
        combat.status = CombatStatus::Active;
        combat
    }

    fn passive_combat(player: f32, enemy: f32) -> Combat {
        active(Deck::new(vec![Card::new("tank", player)]), Stage::passive("1-1", enemy))
    }

    /// A straight projectile one frame away from entering the zone of the side it threatens
    fn incoming(combat: &mut Combat, source: Side, damage: f32) -> Projectile {
        let id = combat.next_projectile_id();
        let attack = EmojiAttack::new("💥", Trajectory::Straight);
        let mut p = spawn(&attack, source, damage, id, combat.duration, "test");
        let target = source.opponent();
        p.position = target.anchor() - source.forward() * (ZONE_RADIUS + 1.0);
        p
    }

    #[test]
    fn test_negative_dt_is_rejected() {
        let combat = passive_combat(100.0, 100.0);
        assert!(matches!(process_frame(&combat, -0.1), Err(CombatError::InvalidDeltaTime(_))));
        assert!(process_frame(&combat, f32::NAN).is_err());
    }

    #[test]
    fn test_non_active_frames_are_noops() {
        let mut combat = passive_combat(100.0, 100.0);
        let p = incoming(&mut combat, Side::Player, 10.0);
        combat.projectiles.push(p);

        for status in [CombatStatus::Preparing, CombatStatus::Paused] {
            combat.status = status;
            assert_eq!(process_frame(&combat, 0.016).unwrap(), combat);
        }

        combat.status = CombatStatus::Active;
        combat.complete(Winner::Draw, EndReason::Forced("test".into()));
        assert_eq!(process_frame(&combat, 0.5).unwrap(), combat);
    }

    #[test]
    fn test_idle_frames_leave_health_untouched() {
        let mut combat = passive_combat(100.0, 150.0);
        for _ in 0..120 {
            combat = process_frame(&combat, 0.016).unwrap();
        }
        assert_eq!(combat.enemy_health, 150.0);
        assert_eq!(combat.player_health, 100.0);
        assert_eq!(combat.status, CombatStatus::Active);
        assert_eq!(combat.frame_index, 120);
        assert!((combat.duration - 1_920.0).abs() < 0.1);
    }

    #[test]
    fn test_non_piercing_consumed_piercing_survives() {
        let mut combat = passive_combat(100.0, 1_000.0);
        let plain = incoming(&mut combat, Side::Player, 10.0);
        let mut piercing = incoming(&mut combat, Side::Player, 10.0);
        piercing.piercing = true;
        let piercing_id = piercing.id;
        combat.projectiles = vec![plain, piercing];

        let next = process_frame(&combat, 0.016).unwrap();
        assert_eq!(next.enemy_health, 980.0);
        assert_eq!(next.projectiles.len(), 1);
        assert_eq!(next.projectiles[0].id, piercing_id);
        assert!(next.projectiles[0].inside_zone);

        // Still overlapping the zone: no second hit
        let after = process_frame(&next, 0.016).unwrap();
        assert_eq!(after.enemy_health, 980.0);
    }

    #[test]
    fn test_bouncing_projectile_reflects() {
        let mut combat = passive_combat(100.0, 1_000.0);
        let mut p = incoming(&mut combat, Side::Player, 10.0);
        p.bounces = 2;
        combat.projectiles.push(p);

        let next = process_frame(&combat, 0.016).unwrap();
        assert_eq!(next.projectiles.len(), 1);
        assert_eq!(next.projectiles[0].bounces, 1);
        assert!(next.projectiles[0].velocity.y < 0.0);
        assert!(next.events.iter().any(|e| matches!(e, CombatEvent::Bounced { .. })));
    }

    #[test]
    fn test_lethal_hit_clamps_and_completes() {
        let mut combat = passive_combat(100.0, 5.0);
        let p = incoming(&mut combat, Side::Player, 50.0);
        combat.projectiles.push(p);

        let next = process_frame(&combat, 0.016).unwrap();
        assert_eq!(next.enemy_health, 0.0);
        assert_eq!(next.status, CombatStatus::Completed);
        let result = next.result.as_ref().unwrap();
        assert_eq!(result.winner, Winner::Player);
        assert_eq!(result.reason, EndReason::EnemyDefeated);
        assert_eq!(result.damage_dealt, 5.0);
        assert!(next.projectiles.is_empty());
    }

    #[test]
    fn test_heal_cannot_undo_lethal_hit() {
        let mut combat = passive_combat(100.0, 100.0);
        combat.enemy_health = 5.0;
        let mut heal = CombatEffect::new(EffectKind::Heal, Side::Enemy, "stage:1-1");
        heal.value = 100.0;
        combat.active_effects.push(heal);
        let p = incoming(&mut combat, Side::Player, 50.0);
        combat.projectiles.push(p);

        let next = process_frame(&combat, 0.016).unwrap();
        assert_eq!(next.enemy_health, 0.0);
        assert_eq!(next.status, CombatStatus::Completed);
        assert_eq!(next.result.unwrap().winner, Winner::Player);
    }

    /// Fire one default projectile from `side` and count the frames it takes to land
    fn frames_to_land(combat: &mut Combat, side: Side, trajectory: Trajectory) -> Option<u32> {
        let id = combat.next_projectile_id();
        let p = spawn(&EmojiAttack::new("💥", trajectory), side, 10.0, id, combat.duration, "test");
        combat.projectiles.push(p);
        let target = side.opponent();
        let start = combat.health(target);
        for frame in 1..=240 {
            *combat = process_frame(combat, SIM_DT).unwrap();
            if combat.health(target) < start {
                return Some(frame);
            }
        }
        None
    }

    #[test]
    fn test_every_trajectory_lands_from_spawn() {
        let kinds = [
            Trajectory::Straight,
            Trajectory::Arc,
            Trajectory::Homing,
            Trajectory::Wave,
            Trajectory::Spiral,
            Trajectory::Random,
        ];
        for side in [Side::Player, Side::Enemy] {
            for kind in kinds {
                let mut combat = passive_combat(1_000.0, 1_000.0);
                assert!(frames_to_land(&mut combat, side, kind).is_some(), "{side:?} {kind:?} missed");
                assert_eq!(combat.health(side.opponent()), 990.0, "{side:?} {kind:?}");
            }
        }
    }

    #[test]
    fn test_random_lands_for_every_seed() {
        let deck = Deck::new(vec![Card::new("tank", 100.0)]);
        let stage = Stage::passive("1-1", 1_000.0);
        let landed = (0..50u64)
            .filter(|&seed| {
                let mut combat = Combat::new(CombatId(1), &deck, &stage, CombatRules::default(), seed).unwrap();
                combat.status = CombatStatus::Active;
                frames_to_land(&mut combat, Side::Player, Trajectory::Random).is_some()
            })
            .count();
        assert_eq!(landed, 50);
    }

    #[test]
    fn test_long_frame_does_not_skip_zone() {
        let mut combat = passive_combat(100.0, 100.0);
        let id = combat.next_projectile_id();
        let p = spawn(&EmojiAttack::new("💥", Trajectory::Straight), Side::Player, 10.0, id, 0.0, "test");
        combat.projectiles.push(p);

        // 300 u/s for 1.6 s carries it from the spawn point past the far side of the zone
        let next = process_frame(&combat, 1.6).unwrap();
        assert_eq!(next.enemy_health, 90.0);
        assert!(next.projectiles.is_empty());
    }

    #[test]
    fn test_first_lethal_collision_short_circuits() {
        let mut combat = passive_combat(10.0, 100.0);
        let first = incoming(&mut combat, Side::Enemy, 10.0);
        let second = incoming(&mut combat, Side::Enemy, 10.0);
        combat.projectiles = vec![first, second];

        let next = process_frame(&combat, 0.016).unwrap();
        assert_eq!(next.player_health, 0.0);
        let result = next.result.unwrap();
        assert_eq!(result.winner, Winner::Enemy);
        assert_eq!(result.damage_received, 10.0);
        assert_eq!(next.stats.hits_taken, 1);
    }

    #[test]
    fn test_mutual_knockout_is_draw() {
        let mut combat = passive_combat(1.0, 1.0);
        combat.active_effects.push(CombatEffect::new(EffectKind::Burn, Side::Player, "x"));
        combat.active_effects.push(CombatEffect::new(EffectKind::Burn, Side::Enemy, "y"));
        let next = process_frame(&combat, 1.0).unwrap();
        let result = next.result.unwrap();
        assert_eq!(result.winner, Winner::Draw);
        assert_eq!(result.reason, EndReason::MutualKnockout);
    }

    #[test]
    fn test_timeout_uses_health_percentage() {
        let mut combat = passive_combat(100.0, 1_000.0);
        combat.player_health = 50.0;
        combat.enemy_health = 300.0;
        combat.duration = MAX_COMBAT_DURATION_MS;

        let next = process_frame(&combat, 0.0).unwrap();
        assert_eq!(next.status, CombatStatus::Completed);
        let result = next.result.unwrap();
        assert_eq!(result.winner, Winner::Player);
        assert_eq!(result.reason, EndReason::Timeout);
    }

    #[test]
    fn test_timeout_exact_tie_is_draw() {
        let mut combat = passive_combat(100.0, 200.0);
        combat.player_health = 50.0;
        combat.enemy_health = 100.0;
        combat.duration = MAX_COMBAT_DURATION_MS - 8.0;
        let next = process_frame(&combat, 0.016).unwrap();
        assert_eq!(next.result.unwrap().winner, Winner::Draw);
    }

    #[test]
    fn test_card_fires_on_cooldown() {
        let card = Card::new("imp", 50.0).with_attack(10.0, 4.0, EmojiAttack::new("🔥", Trajectory::Straight));
        let mut combat = active(Deck::new(vec![card]), Stage::passive("1-1", 500.0));

        combat = process_frame(&combat, 0.125).unwrap();
        assert!(combat.projectiles.is_empty());
        combat = process_frame(&combat, 0.125).unwrap();
        assert_eq!(combat.projectiles.len(), 1);
        let p = &combat.projectiles[0];
        assert_eq!(p.source, Side::Player);
        assert_eq!(p.damage, 10.0);
        assert_eq!(p.position, Side::Player.spawn_point());
        assert_eq!(p.created_at, 250.0);
        assert_eq!(combat.stats.projectiles_fired, 1);
    }

    #[test]
    fn test_enemy_cycles_attack_pattern() {
        let stage = Stage {
            id: "boss".into(),
            enemy_health: 500.0,
            enemy_attack_speed: 4.0,
            enemy_damage: 8.0,
            attack_pattern: vec![
                EmojiAttack::new("❄️", Trajectory::Straight),
                EmojiAttack::new("🌀", Trajectory::Spiral),
            ],
        };
        let mut combat = active(Deck::new(vec![Card::new("tank", 100.0)]), stage);
        for _ in 0..3 {
            combat = process_frame(&combat, 0.25).unwrap();
        }
        let emojis: Vec<_> = combat.projectiles.iter().map(|p| p.emoji.as_str()).collect();
        assert_eq!(emojis, vec!["❄️", "🌀", "❄️"]);
        assert!(combat.projectiles.iter().all(|p| p.source == Side::Enemy));
    }

    #[test]
    fn test_stun_halts_emitters() {
        let card = Card::new("imp", 50.0).with_attack(10.0, 4.0, EmojiAttack::new("🔥", Trajectory::Straight));
        let mut combat = active(Deck::new(vec![card]), Stage::passive("1-1", 500.0));
        let mut stun = CombatEffect::new(EffectKind::Stun, Side::Player, "stage:1-1");
        stun.duration = 10_000.0;
        combat.active_effects.push(stun);

        for _ in 0..4 {
            combat = process_frame(&combat, 0.25).unwrap();
        }
        assert!(combat.projectiles.is_empty());
    }

    #[test]
    fn test_recharge_rate_modifiers() {
        let mut effects = vec![CombatEffect::new(EffectKind::Freeze, Side::Enemy, "a")];
        assert_eq!(recharge_rate(&effects, Side::Enemy), FREEZE_RECHARGE_FACTOR);
        assert_eq!(recharge_rate(&effects, Side::Player), 1.0);
        effects.push(CombatEffect::new(EffectKind::Burst, Side::Player, "b"));
        assert!(recharge_rate(&effects, Side::Player) > 1.0);
    }

    #[test]
    fn test_boost_scales_fired_damage() {
        let card = Card::new("imp", 50.0).with_attack(10.0, 4.0, EmojiAttack::new("🔥", Trajectory::Straight));
        let mut combat = active(Deck::new(vec![card]), Stage::passive("1-1", 500.0));
        let mut boost = CombatEffect::new(EffectKind::Boost, Side::Player, "card:imp");
        boost.value = 0.5;
        combat.active_effects.push(boost);

        combat = process_frame(&combat, 0.25).unwrap();
        assert_eq!(combat.projectiles[0].damage, 15.0);
    }

    #[test]
    fn test_shield_and_reflect_on_hit() {
        let mut combat = passive_combat(100.0, 100.0);
        let mut shield = CombatEffect::new(EffectKind::Shield, Side::Enemy, "stage");
        shield.value = 5.0;
        let mut reflect = CombatEffect::new(EffectKind::Reflect, Side::Enemy, "stage");
        reflect.value = 0.5;
        combat.active_effects = vec![shield, reflect];
        let p = incoming(&mut combat, Side::Player, 25.0);
        combat.projectiles.push(p);

        let next = process_frame(&combat, 0.016).unwrap();
        // 5 soaked, 10 reflected, 10 taken
        assert_eq!(next.enemy_health, 90.0);
        assert_eq!(next.player_health, 90.0);
        assert!(!has_effect(&next.active_effects, Side::Enemy, EffectKind::Shield));
    }

    #[test]
    fn test_hit_applies_carried_effects() {
        let mut combat = passive_combat(100.0, 100.0);
        let mut p = incoming(&mut combat, Side::Player, 1.0);
        p.effects = vec![EffectKind::Poison, EffectKind::Heal];
        combat.projectiles.push(p);

        let next = process_frame(&combat, 0.016).unwrap();
        assert!(has_effect(&next.active_effects, Side::Enemy, EffectKind::Poison));
        assert!(has_effect(&next.active_effects, Side::Player, EffectKind::Heal));
        assert_eq!(next.stats.effects_applied, 2);
    }

    #[test]
    fn test_card_proc_applies_periodically() {
        let mut card = Card::new("cleric", 100.0);
        card.proc_effect = Some(CardProc {
            kind: EffectKind::Shield,
            interval_ms: 500.0,
        });
        let mut combat = active(Deck::new(vec![card]), Stage::passive("1-1", 100.0));
        combat = process_frame(&combat, 0.25).unwrap();
        assert!(combat.active_effects.is_empty());
        combat = process_frame(&combat, 0.25).unwrap();
        assert!(has_effect(&combat.active_effects, Side::Player, EffectKind::Shield));
        assert_eq!(combat.active_effects[0].source, "card:cleric");
    }

    #[test]
    fn test_cap_evicts_oldest_during_frame() {
        let card = Card::new("imp", 50.0).with_attack(1.0, 4.0, EmojiAttack::new("🔥", Trajectory::Straight));
        let mut combat = active(Deck::new(vec![card]), Stage::passive("1-1", 500.0));
        for _ in 0..PROJECTILE_CAP {
            let id = combat.next_projectile_id();
            let mut p = spawn(&EmojiAttack::new("·", Trajectory::Straight), Side::Player, 1.0, id, 0.0, "filler");
            p.lifespan = 100_000.0;
            p.velocity = Vec2::ZERO;
            combat.projectiles.push(p);
        }

        combat = process_frame(&combat, 0.25).unwrap();
        assert_eq!(combat.projectiles.len(), PROJECTILE_CAP);
        assert_eq!(combat.projectiles[0].id, 2);
        assert_eq!(combat.stats.projectiles_evicted, 1);
        assert!(combat.events.contains(&CombatEvent::Evicted { projectile_id: 1 }));
    }

    #[test]
    fn test_projectiles_expire_in_frame() {
        let mut combat = passive_combat(100.0, 100.0);
        let id = combat.next_projectile_id();
        let mut p = spawn(&EmojiAttack::new("·", Trajectory::Straight), Side::Player, 1.0, id, 0.0, "t");
        p.lifespan = 100.0;
        combat.projectiles.push(p);

        let next = process_frame(&combat, 0.1).unwrap();
        assert!(next.projectiles.is_empty());
        assert!(next.events.contains(&CombatEvent::Expired { projectile_id: id }));
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let card = Card::new("imp", 80.0).with_attack(6.0, 3.0, EmojiAttack::new("🎲", Trajectory::Random));
        let stage = Stage {
            id: "s".into(),
            enemy_health: 120.0,
            enemy_attack_speed: 2.0,
            enemy_damage: 5.0,
            attack_pattern: vec![EmojiAttack::new("🌊", Trajectory::Wave)],
        };
        let mut a = active(Deck::new(vec![card.clone()]), stage.clone());
        let mut b = active(Deck::new(vec![card]), stage);
        for _ in 0..600 {
            a = process_frame(&a, SIM_DT).unwrap();
            b = process_frame(&b, SIM_DT).unwrap();
        }
        assert_eq!(a, b);
    }
}
