//! Normal result reporting: the validated write boundary for players and admins.

use crate::error::{BracketResult, ValidationError};
use crate::logic::writes::write_match;
use crate::models::{MatchRecord, MatchStatus, PlayerId, TournamentId, Writer};
use crate::store::DocumentStore;
use chrono::Utc;
use serde::Deserialize;

/// A reported result. Scores are unsigned, so negatives never deserialize.
///
/// `winner` may be left out only on a level score; the match then completes
/// undecided and the winner resolver settles it.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub score_a: u32,
    pub score_b: u32,
    #[serde(default)]
    pub winner: Option<PlayerId>,
    pub reported_by: String,
}

/// A match write: the record before and after. Feed both to the completion trigger.
pub type WrittenMatch = (MatchRecord, MatchRecord);

/// Record a result and mark the match completed.
pub async fn submit_result(
    store: &dyn DocumentStore,
    tournament_id: TournamentId,
    match_id: &str,
    submission: Submission,
) -> BracketResult<WrittenMatch> {
    if submission.reported_by.trim().is_empty() {
        return Err(ValidationError::MissingReporter.into());
    }
    let before = store.get_match(tournament_id, match_id).await?;

    let mut next = before.clone();
    next.score_a = submission.score_a;
    next.score_b = submission.score_b;
    next.winner = submission.winner;
    next.status = MatchStatus::Completed;
    next.reported_by = Some(submission.reported_by);
    next.submitted_at = Some(Utc::now());

    let after = write_match(store, &before, next, Writer::Submission).await?;
    log::info!(
        "tournament {tournament_id}: match {} reported {}-{} by {}, winner {}",
        after.id,
        after.score_a,
        after.score_b,
        after.reported_by.as_deref().unwrap_or_default(),
        after.winner.as_deref().unwrap_or("undecided")
    );
    Ok((before, after))
}

/// Pending -> Live.
pub async fn mark_live(
    store: &dyn DocumentStore,
    tournament_id: TournamentId,
    match_id: &str,
) -> BracketResult<WrittenMatch> {
    let before = store.get_match(tournament_id, match_id).await?;
    let mut next = before.clone();
    next.status = MatchStatus::Live;
    let after = write_match(store, &before, next, Writer::Submission).await?;
    Ok((before, after))
}
