//! Engine settings
//!
//! Loaded from a JSON file by the driver; every field has a default so a
//! partial file is fine.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_COMBAT_DURATION_MS, PROJECTILE_CAP};
use crate::error::Result;
use crate::sim::CombatRules;

/// Pace presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Pace {
    Relaxed,
    #[default]
    Standard,
    Frantic,
}

impl Pace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pace::Relaxed => "Relaxed",
            Pace::Standard => "Standard",
            Pace::Frantic => "Frantic",
        }
    }

    /// Projectile cap for this preset
    pub fn projectile_cap(&self) -> usize {
        match self {
            Pace::Relaxed => PROJECTILE_CAP / 2,
            Pace::Standard => PROJECTILE_CAP,
            Pace::Frantic => PROJECTILE_CAP * 2,
        }
    }

    /// Forced end of a session (ms)
    pub fn max_duration_ms(&self) -> f64 {
        match self {
            Pace::Relaxed => MAX_COMBAT_DURATION_MS * 1.5,
            Pace::Standard => MAX_COMBAT_DURATION_MS,
            Pace::Frantic => MAX_COMBAT_DURATION_MS / 2.0,
        }
    }
}

impl FromStr for Pace {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relaxed" => Ok(Pace::Relaxed),
            "standard" | "std" => Ok(Pace::Standard),
            "frantic" => Ok(Pace::Frantic),
            other => Err(format!("unknown pace '{other}'")),
        }
    }
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pace: Pace,
    /// Limits copied into every new session
    pub rules: CombatRules,
    /// Frames per simulated second for the driver
    pub tick_rate_hz: u32,
    /// Base seed; session N uses `seed + N`
    pub seed: u64,
    /// Safety stop for the driver loop
    pub max_frames: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pace: Pace::Standard,
            rules: CombatRules::default(),
            tick_rate_hz: 60,
            seed: 0,
            max_frames: 60 * 60 * 5,
        }
    }
}

impl Settings {
    /// Create settings from a pace preset (applies preset rules)
    pub fn from_preset(pace: Pace) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(pace);
        settings
    }

    /// Apply a pace preset (updates the session rules)
    pub fn apply_preset(&mut self, pace: Pace) {
        self.pace = pace;
        self.rules.projectile_cap = pace.projectile_cap();
        self.rules.max_duration_ms = pace.max_duration_ms();
    }

    /// Frame delta in seconds
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.tick_rate_hz.max(1) as f32
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        log::info!("Loaded settings from {} ({})", path.display(), settings.pace.as_str());
        Ok(settings)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
