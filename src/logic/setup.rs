//! Setup phase: seed the bracket and optionally start the tournament.

use crate::error::{BracketResult, ValidationError};
use crate::logic::status::update_tournament;
use crate::models::{MatchRecord, PlayerId, Tournament, TournamentId, TournamentSettings, TournamentStatus};
use crate::store::DocumentStore;
use std::collections::HashSet;

/// Create a tournament for `players` (power-of-two count) with its round-1 matches.
///
/// Players are paired in the order given: (0, 1), (2, 3), ...
pub async fn seed_bracket(
    store: &dyn DocumentStore,
    players: Vec<PlayerId>,
    settings: TournamentSettings,
) -> BracketResult<Tournament> {
    let mut seen = HashSet::new();
    for p in &players {
        if p.trim().is_empty() {
            return Err(ValidationError::EmptyPlayerId.into());
        }
        if !seen.insert(p.as_str()) {
            return Err(ValidationError::DuplicatePlayer(p.clone()).into());
        }
    }
    let max_players =
        u32::try_from(players.len()).map_err(|_| ValidationError::NotPowerOfTwo(players.len()))?;
    let tournament = Tournament::new(max_players, settings)?;

    let matches: Vec<MatchRecord> = players
        .chunks_exact(2)
        .zip(0u32..)
        .map(|(pair, position)| {
            MatchRecord::new(
                tournament.id,
                1,
                position,
                Some(pair[0].clone()),
                Some(pair[1].clone()),
            )
        })
        .collect();

    let stored = store.insert_tournament(tournament, matches).await?;
    log::info!(
        "seeded tournament {} with {} players over {} round(s)",
        stored.id,
        stored.max_players,
        stored.total_rounds
    );
    Ok(stored)
}

/// Setup -> Live.
pub async fn start_tournament(
    store: &dyn DocumentStore,
    tournament_id: TournamentId,
) -> BracketResult<Tournament> {
    let (tournament, _) = update_tournament(store, tournament_id, |t| {
        t.transition(TournamentStatus::Live)?;
        Ok(true)
    })
    .await?;
    Ok(tournament)
}
