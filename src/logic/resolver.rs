//! Winner resolution: explicit report first, otherwise the configured strategy.

use crate::error::{BracketError, BracketResult, StoreError};
use crate::logic::context::ProgressionContext;
use crate::logic::writes::write_match;
use crate::models::{MatchRecord, PlayerId, TournamentSettings, Writer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

/// Decides a winner for a completed match that has none recorded.
pub trait WinnerStrategy: Send + Sync {
    fn pick(&self, record: &MatchRecord) -> Option<PlayerId>;
}

/// Production policy: only an explicit report counts, so there is nothing to pick.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReportedWinner;

impl WinnerStrategy for ReportedWinner {
    fn pick(&self, _record: &MatchRecord) -> Option<PlayerId> {
        None
    }
}

/// Simulation policy: uniform coin flip between the two participants.
#[derive(Debug)]
pub struct SimulatedWinner {
    rng: Mutex<StdRng>,
}

impl SimulatedWinner {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible coin flips for tests and demos.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl WinnerStrategy for SimulatedWinner {
    fn pick(&self, record: &MatchRecord) -> Option<PlayerId> {
        match (&record.player_a, &record.player_b) {
            (Some(a), Some(b)) => {
                let first = match self.rng.lock() {
                    Ok(mut rng) => rng.gen_bool(0.5),
                    Err(poisoned) => poisoned.into_inner().gen_bool(0.5),
                };
                Some(if first { a.clone() } else { b.clone() })
            }
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        }
    }
}

/// Strategy selected by the tournament's configuration.
pub fn strategy_for(
    settings: TournamentSettings,
    reported: &Arc<dyn WinnerStrategy>,
    simulated: &Arc<dyn WinnerStrategy>,
) -> Arc<dyn WinnerStrategy> {
    if settings.simulation_mode {
        simulated.clone()
    } else {
        reported.clone()
    }
}

/// Return `record` with a winner guaranteed to be one of its participants.
///
/// An existing winner is used as-is. A missing one is picked by the context's
/// strategy and written back before anything else looks at the round.
pub async fn resolve_winner(
    ctx: &ProgressionContext,
    record: MatchRecord,
) -> BracketResult<MatchRecord> {
    if let Some(winner) = record.winner.as_deref() {
        ensure_participant(&record, winner)?;
        return Ok(record);
    }

    let winner = ctx
        .winners
        .pick(&record)
        .ok_or_else(|| BracketError::UndeterminedWinner(record.id.clone()))?;
    ensure_participant(&record, &winner)?;

    let mut next = record.clone();
    next.winner = Some(winner);
    match write_match(ctx.store.as_ref(), &record, next, Writer::Engine).await {
        Ok(written) => {
            log::info!(
                "simulated winner for match {}: {}",
                written.id,
                written.winner.as_deref().unwrap_or_default()
            );
            Ok(written)
        }
        // Another invocation filled it in first; theirs stands.
        Err(BracketError::Store(StoreError::Conflict(_))) => {
            let current = ctx.store.get_match(record.tournament_id, &record.id).await?;
            match current.winner.as_deref() {
                Some(w) => {
                    ensure_participant(&current, w)?;
                    Ok(current)
                }
                None => Err(BracketError::Store(StoreError::Conflict(format!(
                    "match {}",
                    record.id
                )))),
            }
        }
        Err(e) => Err(e),
    }
}

fn ensure_participant(record: &MatchRecord, winner: &str) -> BracketResult<()> {
    if record.is_participant(winner) {
        Ok(())
    } else {
        Err(BracketError::WinnerNotParticipant {
            match_id: record.id.clone(),
            winner: winner.to_string(),
        })
    }
}
