//! Timed status effects attached to combatants
//!
//! Stacking is decided per kind:
//! - Additive: burn, poison, heal. Each source ticks on its own.
//! - Refresh: stun, freeze, shield, reflect. Reapplying resets the timer.
//! - Capped: boost, lucky, burst. Values add up to a ceiling.

use serde::{Deserialize, Serialize};

use super::state::{Combat, CombatEvent, Side};
use crate::tuning::effect_tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Burn,
    Freeze,
    Stun,
    Heal,
    Shield,
    Boost,
    Poison,
    Lucky,
    Burst,
    Reflect,
}

/// How a repeated application from the same source merges
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StackRule {
    Additive,
    Refresh,
    Capped(f32),
}

impl EffectKind {
    pub const ALL: [EffectKind; 10] = [
        EffectKind::Burn,
        EffectKind::Freeze,
        EffectKind::Stun,
        EffectKind::Heal,
        EffectKind::Shield,
        EffectKind::Boost,
        EffectKind::Poison,
        EffectKind::Lucky,
        EffectKind::Burst,
        EffectKind::Reflect,
    ];

    pub fn stack_rule(self) -> StackRule {
        match self {
            EffectKind::Burn | EffectKind::Poison | EffectKind::Heal => StackRule::Additive,
            EffectKind::Stun | EffectKind::Freeze | EffectKind::Shield | EffectKind::Reflect => StackRule::Refresh,
            EffectKind::Boost | EffectKind::Lucky | EffectKind::Burst => StackRule::Capped(effect_tuning(self).ceiling),
        }
    }

    /// Harmful effects land on the side that was hit, the rest on the shooter
    pub fn is_harmful(self) -> bool {
        matches!(
            self,
            EffectKind::Burn | EffectKind::Poison | EffectKind::Freeze | EffectKind::Stun
        )
    }

    /// Side that receives this effect when a projectile hits `hit`
    pub fn target_for_hit(self, hit: Side) -> Side {
        if self.is_harmful() { hit } else { hit.opponent() }
    }

    /// Upper bound on the summed value across sources
    pub fn ceiling(self) -> Option<f32> {
        match self {
            EffectKind::Boost | EffectKind::Lucky | EffectKind::Burst | EffectKind::Reflect => {
                Some(effect_tuning(self).ceiling)
            }
            _ => None,
        }
    }
}

/// An active status on one combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEffect {
    pub kind: EffectKind,
    pub target: Side,
    /// Remaining time (ms)
    pub duration: f32,
    pub value: f32,
    /// Emitter label of the origin card or stage
    pub source: String,
}

impl CombatEffect {
    /// Effect with the default magnitude and duration for its kind
    pub fn new(kind: EffectKind, target: Side, source: impl Into<String>) -> Self {
        let tuning = effect_tuning(kind);
        Self {
            kind,
            target,
            duration: tuning.duration_ms,
            value: tuning.value,
            source: source.into(),
        }
    }

    fn same_slot(&self, other: &CombatEffect) -> bool {
        self.kind == other.kind && self.target == other.target && self.source == other.source
    }
}

/// Merge one effect into a ledger according to its stack rule
pub fn register(ledger: &mut Vec<CombatEffect>, effect: CombatEffect) {
    let Some(existing) = ledger.iter_mut().find(|e| e.same_slot(&effect)) else {
        ledger.push(effect);
        return;
    };

    existing.duration = existing.duration.max(effect.duration);
    existing.value = match effect.kind.stack_rule() {
        StackRule::Additive => existing.value + effect.value,
        StackRule::Refresh => existing.value.max(effect.value),
        StackRule::Capped(ceiling) => (existing.value + effect.value).min(ceiling),
    };
}

/// Register effects on a session in place, counting and logging each one
pub fn register_effects(combat: &mut Combat, effects: &[CombatEffect]) {
    for effect in effects {
        log::debug!(
            "{}: {:?} on {:?} from {} ({:.2} for {:.0}ms)",
            combat.id,
            effect.kind,
            effect.target,
            effect.source,
            effect.value,
            effect.duration
        );
        combat.stats.effects_applied += 1;
        combat.events.push(CombatEvent::EffectApplied {
            kind: effect.kind,
            target: effect.target,
        });
        register(&mut combat.active_effects, effect.clone());
    }
}

/// Return a new session with `effects` registered
pub fn apply_effects(combat: &Combat, effects: &[CombatEffect]) -> Combat {
    let mut next = combat.clone();
    register_effects(&mut next, effects);
    next
}

/// Summed value of one kind on one side, clamped to the kind's ceiling
pub fn effect_total(ledger: &[CombatEffect], side: Side, kind: EffectKind) -> f32 {
    let total: f32 = ledger
        .iter()
        .filter(|e| e.target == side && e.kind == kind)
        .map(|e| e.value)
        .sum();
    match kind.ceiling() {
        Some(ceiling) => total.min(ceiling),
        None => total,
    }
}

pub fn has_effect(ledger: &[CombatEffect], side: Side, kind: EffectKind) -> bool {
    ledger.iter().any(|e| e.target == side && e.kind == kind)
}

/// Soak incoming damage with the side's shields. Returns the damage left over.
///
/// Shields are drained in the order they were applied; empty ones are removed.
pub fn absorb_with_shield(ledger: &mut Vec<CombatEffect>, side: Side, damage: f32) -> f32 {
    let mut remaining = damage;
    for shield in ledger
        .iter_mut()
        .filter(|e| e.target == side && e.kind == EffectKind::Shield)
    {
        if remaining <= 0.0 {
            break;
        }
        let soaked = remaining.min(shield.value);
        shield.value -= soaked;
        remaining -= soaked;
    }
    ledger.retain(|e| !(e.kind == EffectKind::Shield && e.value <= 0.0));
    remaining
}

/// Advance all effects by `dt` seconds: periodic health changes, then decay
pub fn tick_effects(combat: &mut Combat, dt: f32) {
    let dt_ms = dt * 1000.0;

    let mut deltas: Vec<(Side, EffectKind, f32)> = Vec::new();
    for effect in &combat.active_effects {
        if matches!(effect.kind, EffectKind::Burn | EffectKind::Poison | EffectKind::Heal) {
            let seconds = dt_ms.min(effect.duration).max(0.0) / 1000.0;
            deltas.push((effect.target, effect.kind, effect.value * seconds));
        }
    }
    for (side, kind, amount) in deltas {
        if kind == EffectKind::Heal {
            combat.restore_health(side, amount);
        } else {
            combat.deal_damage(side, amount);
        }
    }

    for effect in &mut combat.active_effects {
        effect.duration -= dt_ms;
    }
    combat.active_effects.retain(|e| e.duration > 0.0);
}

/// Return a new session with effects advanced by `dt` seconds
pub fn advance_effects(combat: &Combat, dt: f32) -> Combat {
    let mut next = combat.clone();
    tick_effects(&mut next, dt);
    next
}
