//! Single-elimination bracket engine: models, document store boundary and
//! the auto-progression logic that advances winners round by round.

pub mod audit;
pub mod config;
pub mod error;
pub mod logic;
pub mod models;
pub mod store;

pub use audit::{AuditEntry, AuditEvent, AuditSink, LogAuditSink, MemoryAuditLog};
pub use config::ServerConfig;
pub use error::{BracketError, BracketResult, StoreError, ValidationError};
pub use logic::{
    force_advance, mark_live, on_match_written, override_winner, request_force_advance,
    seed_bracket, start_tournament, submit_result, Advance, Engine, SimulatedWinner, Submission,
    TriggerOutcome,
};
pub use models::{
    MatchId, MatchRecord, MatchStatus, PlayerId, Tournament, TournamentId, TournamentSettings,
    TournamentStatus,
};
pub use store::{poll_round, DocumentStore, MemoryStore, RoundCreation};
