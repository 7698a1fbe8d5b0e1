//! The progression steps in order: resolve, detect, generate (guarded), update status.

use crate::audit::AuditEvent;
use crate::error::{BracketError, BracketResult, StoreError};
use crate::logic::context::ProgressionContext;
use crate::logic::detector::{detect_round, RoundState};
use crate::logic::generator::{plan_next_round, NextRound};
use crate::logic::guard::create_round_once;
use crate::logic::resolver::resolve_winner;
use crate::logic::status::{record_champion, record_round_generated};
use crate::models::{MatchRecord, PlayerId};

/// Re-reads of a round whose records change underneath the generator.
const SOURCE_ATTEMPTS: u32 = 3;

/// How far one pipeline run got.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Advance {
    /// Other matches of the round are still open.
    RoundIncomplete { round: u32, open: usize },
    /// Round `round` exists. `created` is false when another invocation wrote it.
    RoundGenerated { round: u32, created: bool },
    /// The final is decided. `newly` is false when it had already been recorded.
    ChampionDeclared { champion: PlayerId, newly: bool },
}

/// Full run for one freshly completed match.
pub async fn advance_from_match(
    ctx: &ProgressionContext,
    record: MatchRecord,
) -> BracketResult<Advance> {
    let resolved = resolve_winner(ctx, record).await?;
    if let Some(winner) = &resolved.winner {
        ctx.audit.emit(AuditEvent::MatchCompleted {
            tournament_id: ctx.tournament_id,
            match_id: resolved.id.clone(),
            winner: winner.clone(),
        });
    }
    complete_round_if_ready(ctx, resolved.round).await
}

/// Check `round` and, once every match is decided, move the bracket on.
pub async fn complete_round_if_ready(
    ctx: &ProgressionContext,
    round: u32,
) -> BracketResult<Advance> {
    let mut attempt = 1;
    loop {
        match attempt_round(ctx, round).await {
            // A round-`round` record changed while the next round was planned.
            Err(BracketError::Store(StoreError::Conflict(what))) if attempt < SOURCE_ATTEMPTS => {
                log::debug!(
                    "tournament {} round {round}: {what} changed during progression, re-reading",
                    ctx.tournament_id
                );
                attempt += 1;
            }
            other => return other,
        }
    }
}

async fn attempt_round(ctx: &ProgressionContext, round: u32) -> BracketResult<Advance> {
    let store = ctx.store.as_ref();
    let (mut matches, mut state) = detect_round(store, ctx.tournament_id, round).await?;

    // Siblings completed without a winner get resolved here so the winners list is whole.
    let unresolved = match &state {
        RoundState::Complete { unresolved, .. } => unresolved.clone(),
        _ => Vec::new(),
    };
    if !unresolved.is_empty() {
        for m in unresolved {
            resolve_winner(ctx, m).await?;
        }
        (matches, state) = detect_round(store, ctx.tournament_id, round).await?;
    }

    match state {
        RoundState::Empty => Err(BracketError::EmptyRound(round)),
        RoundState::Incomplete { open } => Ok(Advance::RoundIncomplete { round, open }),
        RoundState::Complete { winners, .. } => progress_round(ctx, round, &matches, &winners).await,
    }
}

/// Generate round `round + 1` from `winners`, or declare the champion.
///
/// `sources` are the round-`round` records `winners` were read from; round
/// creation fails with a conflict if any of them has been rewritten since.
pub async fn progress_round(
    ctx: &ProgressionContext,
    round: u32,
    sources: &[MatchRecord],
    winners: &[PlayerId],
) -> BracketResult<Advance> {
    let store = ctx.store.as_ref();
    match plan_next_round(ctx.tournament_id, round, winners)? {
        NextRound::Champion(champion) => {
            let (_, newly) = record_champion(store, ctx.tournament_id, &champion).await?;
            if newly {
                log::info!("tournament {}: champion is {}", ctx.tournament_id, champion);
                ctx.audit.emit(AuditEvent::TournamentCompleted {
                    tournament_id: ctx.tournament_id,
                    champion: champion.clone(),
                });
            }
            Ok(Advance::ChampionDeclared { champion, newly })
        }
        NextRound::Matches { round: next, matches } => {
            let creation = create_round_once(store, ctx.tournament_id, next, matches, sources).await?;
            // Idempotent; also runs when another invocation created the round.
            record_round_generated(store, ctx.tournament_id, next).await?;
            let created = creation.was_created();
            if created {
                ctx.audit.emit(AuditEvent::RoundGenerated {
                    tournament_id: ctx.tournament_id,
                    round: next,
                    matches: creation.matches().len(),
                });
            }
            Ok(Advance::RoundGenerated {
                round: next,
                created,
            })
        }
    }
}
