//! Combat session registry
//!
//! Owns every live session, hands out IDs, and drives lifecycle transitions.
//! Completed sessions stay readable until reaped.

use std::collections::BTreeMap;

use crate::error::{CombatError, Result};
use crate::loadout::{Deck, Stage};
use crate::settings::Settings;
use crate::sim::{self, Combat, CombatStatus, EndReason};

pub use crate::sim::CombatId;

/// Outcome of a pause/resume request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    NotFound,
    /// The session was not in a state the transition starts from
    InvalidState(CombatStatus),
}

/// Session registry
#[derive(Debug, Default)]
pub struct CombatManager {
    settings: Settings,
    sessions: BTreeMap<CombatId, Combat>,
    next_id: u32,
}

impl CombatManager {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            sessions: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Create a session in `Preparing` and store it
    pub fn start_combat(&mut self, deck: &Deck, stage: &Stage) -> Result<&Combat> {
        let id = CombatId(self.next_id + 1);
        let seed = self.settings.seed.wrapping_add(id.0 as u64);
        let combat = Combat::new(id, deck, stage, self.settings.rules, seed)?;
        self.next_id += 1;

        log::info!(
            "{} started: {} cards ({:.0} hp) vs stage {} ({:.0} hp)",
            id,
            deck.cards.len(),
            combat.max_player_health,
            stage.id,
            combat.max_enemy_health
        );
        Ok(&*self.sessions.entry(id).or_insert(combat))
    }

    /// Move a session from `Preparing` to `Active`
    pub fn begin_combat(&mut self, id: CombatId) -> Result<&Combat> {
        let combat = self.sessions.get_mut(&id).ok_or(CombatError::NotFound(id))?;
        if combat.status != CombatStatus::Preparing {
            return Err(CombatError::InvalidState {
                id,
                action: "begin",
                status: combat.status,
            });
        }
        combat.status = CombatStatus::Active;
        log::debug!("{} active", id);
        Ok(&*combat)
    }

    /// Advance a stored session by `dt` seconds and keep the new snapshot.
    ///
    /// A session still in `Preparing` becomes `Active` on its first frame.
    pub fn process_frame(&mut self, id: CombatId, dt: f32) -> Result<&Combat> {
        let current = self.sessions.get(&id).ok_or(CombatError::NotFound(id))?;
        let next = if current.status == CombatStatus::Preparing {
            let mut started = current.clone();
            started.status = CombatStatus::Active;
            let next = sim::process_frame(&started, dt)?;
            log::debug!("{} active", id);
            next
        } else {
            sim::process_frame(current, dt)?
        };

        let slot = self.sessions.get_mut(&id).ok_or(CombatError::NotFound(id))?;
        *slot = next;
        Ok(&*slot)
    }

    pub fn pause_combat(&mut self, id: CombatId) -> Transition {
        self.toggle(id, CombatStatus::Active, CombatStatus::Paused)
    }

    pub fn resume_combat(&mut self, id: CombatId) -> Transition {
        self.toggle(id, CombatStatus::Paused, CombatStatus::Active)
    }

    fn toggle(&mut self, id: CombatId, from: CombatStatus, to: CombatStatus) -> Transition {
        let Some(combat) = self.sessions.get_mut(&id) else {
            return Transition::NotFound;
        };
        if combat.status != from {
            log::warn!("{}: cannot go {:?} -> {:?} from {:?}", id, from, to, combat.status);
            return Transition::InvalidState(combat.status);
        }
        combat.status = to;
        log::debug!("{} {:?}", id, to);
        Transition::Applied
    }

    /// Force a session to `Completed`, deciding the winner by health percentage.
    ///
    /// An already completed session is returned as is. Unknown IDs give `None`.
    pub fn end_combat(&mut self, id: CombatId, reason: &str) -> Option<&Combat> {
        let combat = self.sessions.get_mut(&id)?;
        if combat.status != CombatStatus::Completed {
            let winner = combat.winner_by_health_fraction();
            log::info!("{} ended ({}): {:?}", id, reason, winner);
            combat.complete(winner, EndReason::Forced(reason.to_string()));
        }
        Some(&*combat)
    }

    /// Look up a session; unknown IDs are `None`
    pub fn get_combat(&self, id: CombatId) -> Option<&Combat> {
        self.sessions.get(&id)
    }

    /// Remove and return all completed sessions, oldest first
    pub fn reap_completed(&mut self) -> Vec<Combat> {
        let done: Vec<CombatId> = self
            .sessions
            .iter()
            .filter(|(_, c)| c.status == CombatStatus::Completed)
            .map(|(id, _)| *id)
            .collect();
        done.into_iter().filter_map(|id| self.sessions.remove(&id)).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
