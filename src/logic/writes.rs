//! The single validated write path for match records, shared by every writer.

use crate::error::{BracketError, BracketResult, StoreError};
use crate::models::{MatchRecord, Writer};
use crate::store::DocumentStore;

/// Validate `next` against `previous` for `writer`, then store it only if nobody
/// else wrote the record since `previous` was read.
pub async fn write_match(
    store: &dyn DocumentStore,
    previous: &MatchRecord,
    mut next: MatchRecord,
    writer: Writer,
) -> BracketResult<MatchRecord> {
    previous.validate_update(&next, writer)?;
    next.revision = previous.revision;
    let written = store.update_match(next).await?;
    log::debug!(
        "match {} written by {:?}: {} -> {}",
        written.id,
        writer,
        previous.status,
        written.status
    );
    Ok(written)
}

/// `write_match` for a record whose winner feeds round `round + 1`: refused with
/// `RoundAlreadyProgressed` once that round has any record.
pub async fn write_match_before_next_round(
    store: &dyn DocumentStore,
    previous: &MatchRecord,
    mut next: MatchRecord,
    writer: Writer,
) -> BracketResult<MatchRecord> {
    previous.validate_update(&next, writer)?;
    next.revision = previous.revision;
    let following = previous.round + 1;
    match store.update_match_before_round(next, following).await {
        Ok(written) => Ok(written),
        Err(StoreError::AlreadyExists(_)) => Err(BracketError::RoundAlreadyProgressed {
            match_id: previous.id.clone(),
            round: previous.round,
        }),
        Err(e) => Err(e.into()),
    }
}
