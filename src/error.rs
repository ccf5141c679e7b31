use thiserror::Error;

use crate::sim::{CombatId, CombatStatus};

#[derive(Error, Debug)]
pub enum CombatError {
    #[error("Deck has no cards")]
    EmptyDeck,

    #[error("Card {card_id} has non-positive health: {health}")]
    InvalidCardHealth { card_id: String, health: f32 },

    #[error("Invalid stage: {0}")]
    InvalidStage(String),

    #[error("Delta time must be finite and non-negative, got {0}")]
    InvalidDeltaTime(f32),

    #[error("Combat not found: {0}")]
    NotFound(CombatId),

    #[error("Combat {id} cannot {action} while {status:?}")]
    InvalidState {
        id: CombatId,
        action: &'static str,
        status: CombatStatus,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CombatError>;
