//! Document store boundary: the only shared mutable state of the bracket.
//!
//! Single-record writes are compare-and-swap on `revision`. Creating a round is
//! the one multi-record operation and is atomic with its existence check and
//! with the revisions of the records it was planned from.

mod memory;

pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::models::{MatchRecord, Tournament, TournamentId};
use async_trait::async_trait;

/// Result of an atomic "create round unless it already exists".
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RoundCreation {
    /// This call wrote the round.
    Created(Vec<MatchRecord>),
    /// Someone else got there first; these are the records already stored.
    AlreadyExists(Vec<MatchRecord>),
}

impl RoundCreation {
    pub fn matches(&self) -> &[MatchRecord] {
        match self {
            RoundCreation::Created(m) | RoundCreation::AlreadyExists(m) => m,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, RoundCreation::Created(_))
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a new tournament together with its round-1 matches.
    async fn insert_tournament(
        &self,
        tournament: Tournament,
        matches: Vec<MatchRecord>,
    ) -> Result<Tournament, StoreError>;

    async fn get_tournament(&self, id: TournamentId) -> Result<Tournament, StoreError>;

    async fn list_tournaments(&self) -> Result<Vec<Tournament>, StoreError>;

    /// Replace the tournament if its stored revision still equals `tournament.revision`.
    /// Returns the stored copy with the bumped revision.
    async fn update_tournament(&self, tournament: Tournament) -> Result<Tournament, StoreError>;

    async fn get_match(&self, tournament_id: TournamentId, match_id: &str)
        -> Result<MatchRecord, StoreError>;

    /// Replace the match if its stored revision still equals `record.revision`.
    async fn update_match(&self, record: MatchRecord) -> Result<MatchRecord, StoreError>;

    /// `update_match`, refused with `AlreadyExists` while `round` has any record.
    /// The round check and the write are one atomic step.
    async fn update_match_before_round(
        &self,
        record: MatchRecord,
        round: u32,
    ) -> Result<MatchRecord, StoreError>;

    /// All matches of one round, ordered by position.
    async fn round_matches(
        &self,
        tournament_id: TournamentId,
        round: u32,
    ) -> Result<Vec<MatchRecord>, StoreError>;

    /// Check for any existing match in `round` and, only if there is none, insert
    /// `matches`, as one atomic step. Fails with `Conflict` if any of `sources`
    /// (the records `matches` were planned from) was rewritten since it was read.
    async fn create_round_if_absent(
        &self,
        tournament_id: TournamentId,
        round: u32,
        matches: Vec<MatchRecord>,
        sources: &[MatchRecord],
    ) -> Result<RoundCreation, StoreError>;
}

/// Re-read a round until it has records, up to `attempts` reads `interval` apart.
///
/// Progression is asynchronous, so callers that just reported a result use this
/// instead of expecting the next round to exist immediately.
pub async fn poll_round(
    store: &dyn DocumentStore,
    tournament_id: TournamentId,
    round: u32,
    interval: std::time::Duration,
    attempts: u32,
) -> Result<Option<Vec<MatchRecord>>, StoreError> {
    for attempt in 0..attempts {
        let matches = store.round_matches(tournament_id, round).await?;
        if !matches.is_empty() {
            return Ok(Some(matches));
        }
        if attempt + 1 < attempts {
            tokio::time::sleep(interval).await;
        }
    }
    Ok(None)
}
