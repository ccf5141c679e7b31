//! Emoji Skirmish headless driver
//!
//! Runs one combat session at a fixed frame rate and prints the result.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

use emoji_skirmish::sim::{CombatStatus, EffectKind, Trajectory};
use emoji_skirmish::{
    Card, CardProc, CombatError, CombatManager, Deck, EmojiAttack, Pace, Result, Settings, Stage,
};

#[derive(Parser, Debug)]
#[command(name = "emoji-skirmish")]
#[command(about = "Run an emoji card battle headlessly")]
struct Args {
    /// Match file: JSON with `deck` and `stage`
    #[arg(short, long)]
    r#match: Option<PathBuf>,

    /// Settings file (JSON)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Pace preset, overrides the settings file
    #[arg(long)]
    pace: Option<Pace>,

    /// RNG seed, overrides the settings file
    #[arg(long)]
    seed: Option<u64>,

    /// Print the final session snapshot instead of just the result
    #[arg(long)]
    full: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct MatchFile {
    deck: Deck,
    stage: Stage,
}

fn demo_match() -> MatchFile {
    let mut cleric = Card::new("cleric", 90.0).with_attack(4.0, 1.0, EmojiAttack::new("✨", Trajectory::Homing));
    cleric.proc_effect = Some(CardProc {
        kind: EffectKind::Heal,
        interval_ms: 5_000.0,
    });

    MatchFile {
        deck: Deck::new(vec![
            Card::new("dragon", 120.0).with_attack(
                9.0,
                1.2,
                EmojiAttack::new("🔥", Trajectory::Arc).with_effects(&[EffectKind::Burn]),
            ),
            Card::new("yeti", 140.0).with_attack(
                6.0,
                0.8,
                EmojiAttack::new("❄️", Trajectory::Wave).with_effects(&[EffectKind::Freeze]),
            ),
            cleric,
        ]),
        stage: Stage {
            id: "demo-1".into(),
            enemy_health: 400.0,
            enemy_attack_speed: 1.5,
            enemy_damage: 7.0,
            attack_pattern: vec![
                EmojiAttack::new("👾", Trajectory::Straight),
                EmojiAttack::new("🌀", Trajectory::Spiral),
                EmojiAttack::new("🎲", Trajectory::Random).with_effects(&[EffectKind::Poison]),
            ],
        },
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(pace) = args.pace {
        settings.apply_preset(pace);
    }
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }

    let matchup = match &args.r#match {
        Some(path) => serde_json::from_str::<MatchFile>(&std::fs::read_to_string(path)?)?,
        None => {
            log::info!("No match file given, running the demo match");
            demo_match()
        }
    };

    let mut manager = CombatManager::new(settings);
    let dt = manager.settings().frame_dt();
    let max_frames = manager.settings().max_frames;
    let id = manager.start_combat(&matchup.deck, &matchup.stage)?.id;

    let mut completed = false;
    for _ in 0..max_frames {
        if manager.process_frame(id, dt)?.status == CombatStatus::Completed {
            completed = true;
            break;
        }
    }

    if !completed {
        log::warn!("Frame limit {} reached, ending {}", max_frames, id);
        manager.end_combat(id, "frame limit");
    }
    let combat = manager.get_combat(id).ok_or(CombatError::NotFound(id))?;

    let output = if args.full {
        serde_json::to_string_pretty(combat)?
    } else {
        serde_json::to_string_pretty(&combat.result)?
    };
    println!("{output}");
    Ok(())
}
