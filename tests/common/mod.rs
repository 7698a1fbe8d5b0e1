//! Shared helpers for the integration tests.
#![allow(dead_code)]

use bracket_progression::{
    on_match_written, poll_round, seed_bracket, submit_result, DocumentStore, Engine, MatchRecord,
    MemoryAuditLog, MemoryStore, PlayerId, Submission, Tournament, TournamentId,
    TournamentSettings, TriggerOutcome,
};
use std::sync::Arc;
use std::time::Duration;

pub fn engine() -> (Engine, Arc<MemoryAuditLog>) {
    let audit = Arc::new(MemoryAuditLog::new());
    let engine = Engine::new(Arc::new(MemoryStore::new()), audit.clone());
    (engine, audit)
}

pub fn auto() -> TournamentSettings {
    TournamentSettings {
        auto_progress: true,
        simulation_mode: false,
    }
}

pub fn players(n: usize) -> Vec<PlayerId> {
    (1..=n).map(|i| format!("p{i}")).collect()
}

pub async fn seed(engine: &Engine, n: usize, settings: TournamentSettings) -> Tournament {
    seed_bracket(engine.store.as_ref(), players(n), settings)
        .await
        .unwrap()
}

pub fn report(score_a: u32, score_b: u32, winner: &str) -> Submission {
    Submission {
        score_a,
        score_b,
        winner: Some(winner.to_string()),
        reported_by: "referee".to_string(),
    }
}

/// A level score reported without naming a winner.
pub fn undecided(score: u32) -> Submission {
    Submission {
        score_a: score,
        score_b: score,
        winner: None,
        reported_by: "referee".to_string(),
    }
}

/// Submit a result and run the completion trigger to the end.
pub async fn complete(
    engine: &Engine,
    tournament_id: TournamentId,
    match_id: &str,
    score_a: u32,
    score_b: u32,
    winner: &str,
) -> TriggerOutcome {
    let (before, after) = submit_result(
        engine.store.as_ref(),
        tournament_id,
        match_id,
        report(score_a, score_b, winner),
    )
    .await
    .unwrap();
    on_match_written(engine, Some(&before), &after).await
}

/// Complete every match of `round` with player A winning 3-1.
pub async fn play_round(engine: &Engine, tournament_id: TournamentId, round: u32) -> Vec<TriggerOutcome> {
    let matches = engine
        .store
        .round_matches(tournament_id, round)
        .await
        .unwrap();
    let mut outcomes = Vec::new();
    for m in matches {
        let winner = m.player_a.clone().unwrap();
        outcomes.push(complete(engine, tournament_id, &m.id, 3, 1, &winner).await);
    }
    outcomes
}

/// Poll for round records the way an external harness would.
pub async fn wait_for_round(engine: &Engine, tournament_id: TournamentId, round: u32) -> Vec<MatchRecord> {
    poll_round(
        engine.store.as_ref(),
        tournament_id,
        round,
        Duration::from_millis(25),
        80,
    )
    .await
    .unwrap()
    .unwrap_or_else(|| panic!("round {round} never appeared"))
}
