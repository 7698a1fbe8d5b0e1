//! Round completion: has every match of a round been decided?

use crate::error::BracketResult;
use crate::models::{MatchRecord, PlayerId, TournamentId};
use crate::store::DocumentStore;

/// What a round looks like right now.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RoundState {
    /// No match records exist for the round.
    Empty,
    /// `open` matches are still pending or live.
    Incomplete { open: usize },
    /// Every match is completed.
    Complete {
        /// Winners in match-position order.
        winners: Vec<PlayerId>,
        /// Completed matches that still have no winner.
        unresolved: Vec<MatchRecord>,
    },
}

/// Evaluate a round from its records. `matches` may come in any order.
pub fn evaluate_round(matches: &[MatchRecord]) -> RoundState {
    if matches.is_empty() {
        return RoundState::Empty;
    }
    let open = matches.iter().filter(|m| m.status.is_open()).count();
    if open > 0 {
        return RoundState::Incomplete { open };
    }

    let mut ordered: Vec<&MatchRecord> = matches.iter().collect();
    ordered.sort_by_key(|m| m.position);

    let winners = ordered.iter().filter_map(|m| m.winner.clone()).collect();
    let unresolved = ordered
        .iter()
        .filter(|m| m.winner.is_none())
        .map(|m| (*m).clone())
        .collect();
    RoundState::Complete { winners, unresolved }
}

/// Load `(tournament_id, round)` and evaluate it. Returns the records read,
/// ordered by position, alongside their evaluation.
pub async fn detect_round(
    store: &dyn DocumentStore,
    tournament_id: TournamentId,
    round: u32,
) -> BracketResult<(Vec<MatchRecord>, RoundState)> {
    let matches = store.round_matches(tournament_id, round).await?;
    let state = evaluate_round(&matches);
    if let RoundState::Incomplete { open } = &state {
        log::debug!("tournament {tournament_id} round {round}: {open} match(es) still open");
    }
    Ok((matches, state))
}
