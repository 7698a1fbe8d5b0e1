//! Tournament-level bookkeeping after a round is generated or the final is decided.
//!
//! Both updates are idempotent so a repeated trigger reproduces the same record.

use crate::error::{BracketResult, StoreError};
use crate::models::{PlayerId, Tournament, TournamentId, TournamentStatus};
use crate::store::DocumentStore;

/// Compare-and-swap attempts before giving up on a busy tournament record.
const MAX_UPDATE_ATTEMPTS: usize = 8;

/// Read-modify-write the tournament with optimistic retries.
///
/// `apply` returns `Ok(false)` when nothing needs to change; the record is then
/// returned without a write. The second value of the result says whether a write happened.
pub async fn update_tournament<F>(
    store: &dyn DocumentStore,
    tournament_id: TournamentId,
    mut apply: F,
) -> BracketResult<(Tournament, bool)>
where
    F: FnMut(&mut Tournament) -> BracketResult<bool> + Send,
{
    for _ in 0..MAX_UPDATE_ATTEMPTS {
        let mut tournament = store.get_tournament(tournament_id).await?;
        if !apply(&mut tournament)? {
            return Ok((tournament, false));
        }
        match store.update_tournament(tournament).await {
            Ok(saved) => return Ok((saved, true)),
            Err(StoreError::Conflict(_)) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(StoreError::Conflict(format!("tournament {tournament_id}")).into())
}

/// Round `round` now exists: move `currentRound` forward and go live past round 1.
pub async fn record_round_generated(
    store: &dyn DocumentStore,
    tournament_id: TournamentId,
    round: u32,
) -> BracketResult<(Tournament, bool)> {
    update_tournament(store, tournament_id, |t| {
        if matches!(t.status, TournamentStatus::Completed | TournamentStatus::Archived) {
            return Ok(false);
        }
        let mut changed = false;
        if t.current_round < round {
            t.current_round = round;
            changed = true;
        }
        if round > 1 && t.status == TournamentStatus::Setup {
            t.transition(TournamentStatus::Live)?;
            changed = true;
        }
        Ok(changed)
    })
    .await
}

/// Final decided: set the champion and complete the tournament.
/// Call only once nothing else about the bracket remains to be written.
pub async fn record_champion(
    store: &dyn DocumentStore,
    tournament_id: TournamentId,
    champion: &PlayerId,
) -> BracketResult<(Tournament, bool)> {
    update_tournament(store, tournament_id, |t| {
        if t.champion.as_ref() == Some(champion)
            && matches!(t.status, TournamentStatus::Completed | TournamentStatus::Archived)
        {
            return Ok(false);
        }
        t.transition(TournamentStatus::Completed)?;
        t.champion = Some(champion.clone());
        Ok(true)
    })
    .await
}
