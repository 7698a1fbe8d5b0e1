//! Operator escape hatches: winner override and force-advance of a stuck round.

use crate::audit::AuditEvent;
use crate::error::{BracketError, BracketResult, StoreError, ValidationError};
use crate::logic::context::{Engine, ProgressionContext};
use crate::logic::pipeline::{complete_round_if_ready, Advance};
use crate::logic::status::update_tournament;
use crate::logic::submission::WrittenMatch;
use crate::logic::writes::{write_match, write_match_before_next_round};
use crate::models::{
    MatchRecord, MatchStatus, OverrideAudit, PlayerId, Tournament, TournamentId, Writer,
};
use chrono::Utc;

const FORCED_BYE_REASON: &str = "forced bye (force-advance)";

/// Force `winner` onto a match regardless of the reported scores.
///
/// Completes the match if it was still open. Returns the record before and after;
/// pass them to the completion trigger. Refused with `RoundAlreadyProgressed`
/// once the match's winner has moved on: the next round exists, or the match is
/// the final and the champion is recorded.
pub async fn override_winner(
    engine: &Engine,
    tournament_id: TournamentId,
    match_id: &str,
    winner: PlayerId,
    admin_id: &str,
    reason: &str,
) -> BracketResult<WrittenMatch> {
    if admin_id.trim().is_empty() {
        return Err(ValidationError::MissingAdmin.into());
    }
    let tournament = engine.store.get_tournament(tournament_id).await?;
    let before = engine.store.get_match(tournament_id, match_id).await?;
    if tournament.champion.is_some() && before.round >= tournament.total_rounds {
        return Err(BracketError::RoundAlreadyProgressed {
            match_id: before.id,
            round: before.round,
        });
    }
    let now = Utc::now();

    let mut next = before.clone();
    next.winner = Some(winner.clone());
    next.status = MatchStatus::Completed;
    next.reported_by = Some(admin_id.to_string());
    next.submitted_at = Some(now);
    next.overrides.push(OverrideAudit {
        admin_id: admin_id.to_string(),
        reason: reason.to_string(),
        timestamp: now,
    });

    let after =
        write_match_before_next_round(engine.store.as_ref(), &before, next, Writer::Operator).await?;
    log::warn!(
        "tournament {tournament_id}: {admin_id} overrode winner of match {match_id} to {winner}: {reason}"
    );
    engine.audit.emit(AuditEvent::WinnerOverridden {
        tournament_id,
        match_id: match_id.to_string(),
        winner,
        admin_id: admin_id.to_string(),
    });
    Ok((before, after))
}

/// Flag the tournament as needing a manual push.
pub async fn request_force_advance(
    engine: &Engine,
    tournament_id: TournamentId,
) -> BracketResult<Tournament> {
    let (tournament, _) = update_tournament(engine.store.as_ref(), tournament_id, |t| {
        if t.force_advance_requested {
            return Ok(false);
        }
        t.force_advance_requested = true;
        Ok(true)
    })
    .await?;
    Ok(tournament)
}

/// Push `round` through even with matches still open.
///
/// Every unresolved match becomes a forced bye for its first present player, then
/// the round is completed exactly as the trigger would. The force-advance flag is
/// cleared afterwards whether or not the round could be progressed.
pub async fn force_advance(
    engine: &Engine,
    tournament_id: TournamentId,
    round: u32,
    admin_id: &str,
) -> BracketResult<Advance> {
    if admin_id.trim().is_empty() {
        return Err(ValidationError::MissingAdmin.into());
    }
    let tournament = engine.store.get_tournament(tournament_id).await?;
    let ctx = engine.context_for(&tournament);

    let result = force_round(&ctx, round, admin_id).await;

    let cleared = update_tournament(engine.store.as_ref(), tournament_id, |t| {
        if !t.force_advance_requested {
            return Ok(false);
        }
        t.force_advance_requested = false;
        Ok(true)
    })
    .await;

    match (result, cleared) {
        (Ok(advance), Ok(_)) => Ok(advance),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), cleared) => {
            if let Err(clear_err) = cleared {
                log::error!("tournament {tournament_id}: could not clear force-advance flag: {clear_err}");
            }
            log::error!("tournament {tournament_id}: force-advance of round {round} failed: {e}");
            Err(e)
        }
    }
}

async fn force_round(
    ctx: &ProgressionContext,
    round: u32,
    admin_id: &str,
) -> BracketResult<Advance> {
    let store = ctx.store.as_ref();
    let matches = store.round_matches(ctx.tournament_id, round).await?;
    if matches.is_empty() {
        return Err(BracketError::EmptyRound(round));
    }

    for m in matches.into_iter().filter(|m| m.winner.is_none()) {
        close_as_bye(ctx, m, admin_id).await?;
    }

    log::warn!(
        "tournament {}: round {round} force-advanced by {admin_id}",
        ctx.tournament_id
    );
    ctx.audit.emit(AuditEvent::RoundForced {
        tournament_id: ctx.tournament_id,
        round,
        admin_id: admin_id.to_string(),
    });
    complete_round_if_ready(ctx, round).await
}

/// Give an unresolved match to a forced winner. Completed-but-undecided matches
/// ask the configured strategy first.
async fn close_as_bye(
    ctx: &ProgressionContext,
    record: MatchRecord,
    admin_id: &str,
) -> BracketResult<()> {
    let picked = if record.status == MatchStatus::Completed {
        ctx.winners.pick(&record)
    } else {
        None
    };
    let winner = picked
        .or_else(|| record.player_a.clone())
        .or_else(|| record.player_b.clone())
        .ok_or_else(|| ValidationError::MissingParticipant(record.id.clone()))?;

    let now = Utc::now();
    let mut next = record.clone();
    next.winner = Some(winner);
    next.status = MatchStatus::Completed;
    next.reported_by = Some(admin_id.to_string());
    next.submitted_at = Some(now);
    next.overrides.push(OverrideAudit {
        admin_id: admin_id.to_string(),
        reason: FORCED_BYE_REASON.to_string(),
        timestamp: now,
    });

    match write_match(ctx.store.as_ref(), &record, next, Writer::Operator).await {
        Ok(_) => Ok(()),
        // A result landed in the meantime; keep it if it decided the match.
        Err(BracketError::Store(StoreError::Conflict(what))) => {
            let current = ctx.store.get_match(record.tournament_id, &record.id).await?;
            if current.is_decided() {
                Ok(())
            } else {
                Err(StoreError::Conflict(what).into())
            }
        }
        Err(e) => Err(e),
    }
}
