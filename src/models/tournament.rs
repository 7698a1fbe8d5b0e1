//! Tournament record and its per-tournament settings.

use crate::error::{BracketError, ValidationError};
use crate::models::match_record::PlayerId;
use crate::models::status::TournamentStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Per-tournament switches. Read-only to the progression engine.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSettings {
    /// Generate the next round automatically when a round finishes.
    #[serde(default)]
    pub auto_progress: bool,
    /// Pick a random winner for completed matches that have none.
    #[serde(default)]
    pub simulation_mode: bool,
}

/// A single-elimination tournament with a power-of-two bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub status: TournamentStatus,
    pub current_round: u32,
    pub total_rounds: u32,
    pub max_players: u32,
    /// Set if and only if `status` is `Completed` (or archived after completion).
    pub champion: Option<PlayerId>,
    pub settings: TournamentSettings,
    /// An operator asked for the current round to be pushed through.
    #[serde(default)]
    pub force_advance_requested: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub revision: u64,
}

impl Tournament {
    /// Create a tournament in Setup for `max_players` entrants (power of two, at least 2).
    pub fn new(max_players: u32, settings: TournamentSettings) -> Result<Self, ValidationError> {
        let total_rounds = rounds_for(max_players as usize)?;
        Ok(Self {
            id: Uuid::new_v4(),
            status: TournamentStatus::Setup,
            current_round: 1,
            total_rounds,
            max_players,
            champion: None,
            settings,
            force_advance_requested: false,
            created_at: Utc::now(),
            revision: 0,
        })
    }

    /// Number of matches round `round` holds in a clean bracket.
    pub fn matches_in_round(&self, round: u32) -> u32 {
        if round == 0 || round > self.total_rounds {
            return 0;
        }
        self.max_players >> round
    }

    /// Move to `next`, rejecting anything the transition table does not list.
    pub fn transition(&mut self, next: TournamentStatus) -> Result<(), BracketError> {
        if !self.status.can_transition_to(next) {
            return Err(BracketError::InvalidTournamentTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// `log2(players)` for a power-of-two player count of at least 2.
pub fn rounds_for(players: usize) -> Result<u32, ValidationError> {
    if players < 2 || !players.is_power_of_two() {
        return Err(ValidationError::NotPowerOfTwo(players));
    }
    Ok(players.trailing_zeros())
}
