//! Match record: one pairing of two players in one round of a bracket.

use crate::error::ValidationError;
use crate::models::status::MatchStatus;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier for a match, unique within its tournament (`r{round}_{position}`).
pub type MatchId = String;

/// Identifier for a player, issued by the account system.
pub type PlayerId = String;

/// Build the deterministic id of the match at `position` in `round`.
pub fn match_id_for(round: u32, position: u32) -> MatchId {
    format!("r{round}_{position}")
}

/// Who is writing a match record. Each writer gets a different set of permissions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Writer {
    /// Player or admin reporting a result through the normal flow.
    Submission,
    /// The progression engine itself (simulated winners).
    Engine,
    /// Explicit operator override or forced bye.
    Operator,
}

/// Audit trail entry for an operator override.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideAudit {
    pub admin_id: String,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// 1-based round number.
    pub round: u32,
    /// Slot within the round; fixes the seeding order of the next round.
    pub position: u32,
    /// None while a later-round slot is still unfilled.
    pub player_a: Option<PlayerId>,
    pub player_b: Option<PlayerId>,
    pub score_a: u32,
    pub score_b: u32,
    pub winner: Option<PlayerId>,
    pub status: MatchStatus,
    pub reported_by: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub overrides: Vec<OverrideAudit>,
    /// Bumped by the store on every write; used for compare-and-swap.
    #[serde(default)]
    pub revision: u64,
}

impl MatchRecord {
    /// A fresh pending match with zeroed scores.
    pub fn new(
        tournament_id: TournamentId,
        round: u32,
        position: u32,
        player_a: Option<PlayerId>,
        player_b: Option<PlayerId>,
    ) -> Self {
        Self {
            id: match_id_for(round, position),
            tournament_id,
            round,
            position,
            player_a,
            player_b,
            score_a: 0,
            score_b: 0,
            winner: None,
            status: MatchStatus::Pending,
            reported_by: None,
            submitted_at: None,
            created_at: Utc::now(),
            overrides: Vec::new(),
            revision: 0,
        }
    }

    pub fn is_participant(&self, player: &str) -> bool {
        self.player_a.as_deref() == Some(player) || self.player_b.as_deref() == Some(player)
    }

    /// Completed with a winner: frozen for everyone except an operator.
    pub fn is_decided(&self) -> bool {
        self.status == MatchStatus::Completed && self.winner.is_some()
    }

    /// (winner's score, opponent's score) for a candidate winner.
    pub fn scores_for(&self, winner: &str) -> (u32, u32) {
        if self.player_a.as_deref() == Some(winner) {
            (self.score_a, self.score_b)
        } else {
            (self.score_b, self.score_a)
        }
    }

    /// Check that `next` is an allowed successor of `self` for the given writer.
    pub fn validate_update(&self, next: &MatchRecord, writer: Writer) -> Result<(), ValidationError> {
        if next.id != self.id
            || next.tournament_id != self.tournament_id
            || next.round != self.round
            || next.position != self.position
            || next.player_a != self.player_a
            || next.player_b != self.player_b
        {
            return Err(ValidationError::ImmutableField(self.id.clone()));
        }

        if self.status == MatchStatus::Completed {
            match writer {
                Writer::Operator => {}
                // The engine may only fill in a winner that nobody reported.
                Writer::Engine if self.winner.is_none() => {}
                _ => return Err(ValidationError::AlreadyCompleted(self.id.clone())),
            }
        }

        if next.status != self.status && !self.status.can_transition_to(next.status) {
            return Err(ValidationError::InvalidMatchTransition {
                match_id: self.id.clone(),
                from: self.status,
                to: next.status,
            });
        }

        if next.status == MatchStatus::Completed {
            let Some(winner) = next.winner.as_deref() else {
                return next.validate_open_result(writer);
            };
            if !next.is_participant(winner) {
                return Err(ValidationError::WinnerNotParticipant {
                    match_id: next.id.clone(),
                    winner: winner.to_string(),
                });
            }
            if writer == Writer::Submission {
                next.ensure_both_players()?;
                let (winner_score, loser_score) = next.scores_for(winner);
                if winner_score <= loser_score {
                    return Err(ValidationError::WinnerScoreNotAhead {
                        winner_score,
                        loser_score,
                    });
                }
            }
        } else if next.winner.is_some() {
            return Err(ValidationError::WinnerBeforeCompletion(next.id.clone()));
        }

        Ok(())
    }

    /// A completed match without a winner. Only a reporter may write one, and only
    /// on a level score; the winner resolver decides it afterwards.
    fn validate_open_result(&self, writer: Writer) -> Result<(), ValidationError> {
        if writer != Writer::Submission {
            return Err(ValidationError::MissingWinner);
        }
        self.ensure_both_players()?;
        if self.score_a != self.score_b {
            return Err(ValidationError::UnnamedWinner {
                match_id: self.id.clone(),
                score_a: self.score_a,
                score_b: self.score_b,
            });
        }
        Ok(())
    }

    fn ensure_both_players(&self) -> Result<(), ValidationError> {
        if self.player_a.is_none() || self.player_b.is_none() {
            return Err(ValidationError::MissingParticipant(self.id.clone()));
        }
        Ok(())
    }
}
