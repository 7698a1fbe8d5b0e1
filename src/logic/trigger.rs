//! Completion trigger: entry point run after every match write.
//!
//! The write that fired it has already succeeded and is never rolled back, so
//! nothing here returns an error to the writer. Failures are logged and reported
//! in the returned outcome.

use crate::error::BracketError;
use crate::logic::context::Engine;
use crate::logic::pipeline::{advance_from_match, Advance};
use crate::models::{MatchRecord, MatchStatus};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TriggerOutcome {
    /// The write did not move the match into `completed`.
    NotACompletion,
    /// Tournament has `autoProgress` off; progression is manual.
    AutoProgressOff,
    Advanced(Advance),
    /// Pipeline aborted; already logged.
    Failed(BracketError),
}

/// React to a match write. `before` is the record prior to the write, if any.
pub async fn on_match_written(
    engine: &Engine,
    before: Option<&MatchRecord>,
    after: &MatchRecord,
) -> TriggerOutcome {
    let was_completed = before.is_some_and(|b| b.status == MatchStatus::Completed);
    if after.status != MatchStatus::Completed || was_completed {
        return TriggerOutcome::NotACompletion;
    }

    let tournament = match engine.store.get_tournament(after.tournament_id).await {
        Ok(t) => t,
        Err(e) => return failed(after, e.into()),
    };
    if !tournament.settings.auto_progress {
        log::debug!(
            "tournament {}: auto-progress off, match {} left for manual progression",
            tournament.id,
            after.id
        );
        return TriggerOutcome::AutoProgressOff;
    }

    let ctx = engine.context_for(&tournament);
    match advance_from_match(&ctx, after.clone()).await {
        Ok(advance) => TriggerOutcome::Advanced(advance),
        Err(e) => failed(after, e),
    }
}

fn failed(record: &MatchRecord, err: BracketError) -> TriggerOutcome {
    match &err {
        BracketError::UndeterminedWinner(_) => log::warn!(
            "tournament {}: match {} needs operator attention: {}",
            record.tournament_id,
            record.id,
            err
        ),
        _ => log::error!(
            "tournament {}: progression after match {} failed: {}",
            record.tournament_id,
            record.id,
            err
        ),
    }
    TriggerOutcome::Failed(err)
}
