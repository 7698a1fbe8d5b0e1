//! At most one generation of round `n + 1` per tournament, however many
//! invocations see round `n` finish at the same time.

use crate::error::BracketResult;
use crate::models::{MatchRecord, TournamentId};
use crate::store::{DocumentStore, RoundCreation};

/// Insert `matches` as round `round` unless any record of that round exists.
/// The existence check and the insert are one store operation; a separate
/// read-then-write here would let two invocations both create the round.
/// `sources` are the previous round's records the pairing was computed from.
pub async fn create_round_once(
    store: &dyn DocumentStore,
    tournament_id: TournamentId,
    round: u32,
    matches: Vec<MatchRecord>,
    sources: &[MatchRecord],
) -> BracketResult<RoundCreation> {
    let creation = store
        .create_round_if_absent(tournament_id, round, matches, sources)
        .await?;
    match &creation {
        RoundCreation::Created(m) => {
            log::info!(
                "tournament {tournament_id}: generated round {round} with {} match(es)",
                m.len()
            );
        }
        RoundCreation::AlreadyExists(m) => {
            log::debug!(
                "tournament {tournament_id}: round {round} already has {} match(es), skipping",
                m.len()
            );
        }
    }
    Ok(creation)
}
