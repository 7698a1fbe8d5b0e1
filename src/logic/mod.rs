//! Bracket business logic: seeding, result reporting, auto-progression, operator actions.

mod context;
mod detector;
mod generator;
mod guard;
mod operator;
mod pipeline;
mod resolver;
mod setup;
mod status;
mod submission;
mod trigger;
mod writes;

pub use context::{Engine, ProgressionContext};
pub use detector::{detect_round, evaluate_round, RoundState};
pub use generator::{plan_next_round, NextRound};
pub use guard::create_round_once;
pub use operator::{force_advance, override_winner, request_force_advance};
pub use pipeline::{advance_from_match, complete_round_if_ready, progress_round, Advance};
pub use resolver::{resolve_winner, strategy_for, ReportedWinner, SimulatedWinner, WinnerStrategy};
pub use setup::{seed_bracket, start_tournament};
pub use status::{record_champion, record_round_generated, update_tournament};
pub use submission::{mark_live, submit_result, Submission, WrittenMatch};
pub use trigger::{on_match_written, TriggerOutcome};
pub use writes::{write_match, write_match_before_next_round};
