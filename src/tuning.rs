//! Effect balance tables
//!
//! Default magnitudes and durations used when a projectile or a card proc
//! applies an effect without its own numbers.

use crate::sim::EffectKind;

/// Balance numbers for one effect kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectTuning {
    /// Magnitude applied per application
    pub value: f32,
    /// Duration per application (ms)
    pub duration_ms: f32,
    /// Upper bound on the stacked value (capped kinds and reflect)
    pub ceiling: f32,
}

impl EffectTuning {
    const fn new(value: f32, duration_ms: f32, ceiling: f32) -> Self {
        Self {
            value,
            duration_ms,
            ceiling,
        }
    }
}

/// Look up the balance numbers for an effect kind
pub fn effect_tuning(kind: EffectKind) -> EffectTuning {
    match kind {
        // Damage / heal per second
        EffectKind::Burn => EffectTuning::new(8.0, 3_000.0, f32::INFINITY),
        EffectKind::Poison => EffectTuning::new(5.0, 5_000.0, f32::INFINITY),
        EffectKind::Heal => EffectTuning::new(6.0, 4_000.0, f32::INFINITY),
        // Disables carry no magnitude
        EffectKind::Freeze => EffectTuning::new(0.0, 1_500.0, 0.0),
        EffectKind::Stun => EffectTuning::new(0.0, 800.0, 0.0),
        // Absorb pool
        EffectKind::Shield => EffectTuning::new(30.0, 5_000.0, f32::INFINITY),
        // Outgoing damage multiplier bonus
        EffectKind::Boost => EffectTuning::new(0.25, 4_000.0, 1.0),
        // Crit chance
        EffectKind::Lucky => EffectTuning::new(0.15, 5_000.0, 0.6),
        // Emitter recharge bonus
        EffectKind::Burst => EffectTuning::new(0.3, 3_000.0, 1.5),
        // Fraction of incoming damage sent back
        EffectKind::Reflect => EffectTuning::new(0.3, 3_000.0, 0.8),
    }
}
