//! Error taxonomy for the bracket engine.

use crate::models::{MatchId, MatchStatus, PlayerId, TournamentId, TournamentStatus};
use thiserror::Error;

/// Malformed or forbidden write, rejected at the write boundary.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ValidationError {
    #[error("winner {winner} is not a participant of match {match_id}")]
    WinnerNotParticipant { match_id: MatchId, winner: PlayerId },

    #[error("winner's score must be strictly higher than the opponent's ({winner_score} vs {loser_score})")]
    WinnerScoreNotAhead { winner_score: u32, loser_score: u32 },

    #[error("match {0} is already completed")]
    AlreadyCompleted(MatchId),

    #[error("match {match_id} cannot go from {from} to {to}")]
    InvalidMatchTransition {
        match_id: MatchId,
        from: MatchStatus,
        to: MatchStatus,
    },

    #[error("match {0} has an empty participant slot")]
    MissingParticipant(MatchId),

    #[error("a completed match needs a winner")]
    MissingWinner,

    #[error("scores {score_a}-{score_b} decide match {match_id}; the winner must be named")]
    UnnamedWinner {
        match_id: MatchId,
        score_a: u32,
        score_b: u32,
    },

    #[error("match {0} cannot have a winner before it is completed")]
    WinnerBeforeCompletion(MatchId),

    #[error("participants, round and position of match {0} cannot change")]
    ImmutableField(MatchId),

    #[error("bracket needs a power-of-two player count of at least 2, got {0}")]
    NotPowerOfTwo(usize),

    #[error("player {0} appears more than once")]
    DuplicatePlayer(PlayerId),

    #[error("player ids must not be empty")]
    EmptyPlayerId,

    #[error("reportedBy must not be empty")]
    MissingReporter,

    #[error("operator actions need an adminId")]
    MissingAdmin,
}

/// Failure talking to the document store.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StoreError {
    #[error("tournament {0} not found")]
    TournamentNotFound(TournamentId),

    #[error("match {match_id} not found in tournament {tournament_id}")]
    MatchNotFound {
        tournament_id: TournamentId,
        match_id: MatchId,
    },

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0} was modified concurrently")]
    Conflict(String),

    #[error("store lock poisoned")]
    Lock,
}

/// Anything that can stop a bracket operation.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum BracketError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Completed match without a winner while simulation is off.
    #[error("match {0} is completed but has no winner and simulation mode is off")]
    UndeterminedWinner(MatchId),

    /// A resolved winner that is not one of the two players.
    #[error("match {match_id} resolved to {winner}, who did not play in it")]
    WinnerNotParticipant { match_id: MatchId, winner: PlayerId },

    /// Pairing would need a bye; the round needs manual resolution.
    #[error("round {round} produced {count} winners, which cannot be paired")]
    OddWinnerCount { round: u32, count: usize },

    /// The match already fed the next round (or crowned the champion).
    #[error("round {round} has already progressed; the winner of match {match_id} can no longer change")]
    RoundAlreadyProgressed { match_id: MatchId, round: u32 },

    #[error("round {0} has no matches")]
    EmptyRound(u32),

    #[error("tournament cannot go from {from} to {to}")]
    InvalidTournamentTransition {
        from: TournamentStatus,
        to: TournamentStatus,
    },
}

pub type BracketResult<T> = Result<T, BracketError>;
