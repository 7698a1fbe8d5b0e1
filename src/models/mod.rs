//! Data structures for the bracket: match records, tournaments, statuses.

mod match_record;
mod status;
mod tournament;

pub use match_record::{match_id_for, MatchId, MatchRecord, OverrideAudit, PlayerId, Writer};
pub use status::{MatchStatus, TournamentStatus};
pub use tournament::{rounds_for, Tournament, TournamentId, TournamentSettings};
