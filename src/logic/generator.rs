//! Next-round generation from an ordered list of winners.
//!
//! Pairing is sequential: the winner of position `2i` meets the winner of
//! position `2i + 1` in position `i` of the next round. Seeding therefore
//! follows the bracket tree and is fully reproducible.

use crate::error::{BracketError, BracketResult};
use crate::models::{MatchRecord, PlayerId, TournamentId};

/// What follows a completed round.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NextRound {
    /// One winner left: no further round, the tournament is over.
    Champion(PlayerId),
    /// Fresh pending matches for `round`.
    Matches { round: u32, matches: Vec<MatchRecord> },
}

/// Plan what comes after `round` given its winners in position order.
pub fn plan_next_round(
    tournament_id: TournamentId,
    round: u32,
    winners: &[PlayerId],
) -> BracketResult<NextRound> {
    match winners {
        [champion] => Ok(NextRound::Champion(champion.clone())),
        _ if winners.is_empty() || winners.len() % 2 != 0 => Err(BracketError::OddWinnerCount {
            round,
            count: winners.len(),
        }),
        _ => {
            let next = round + 1;
            let matches = winners
                .chunks_exact(2)
                .zip(0u32..)
                .map(|(pair, position)| {
                    MatchRecord::new(
                        tournament_id,
                        next,
                        position,
                        Some(pair[0].clone()),
                        Some(pair[1].clone()),
                    )
                })
                .collect();
            Ok(NextRound::Matches {
                round: next,
                matches,
            })
        }
    }
}
