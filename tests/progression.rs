//! Integration tests for auto-progression: round detection, generation, champion.

mod common;

use bracket_progression::{
    force_advance, on_match_written, override_winner, submit_result, Advance, AuditEvent,
    BracketError, DocumentStore, MatchStatus, SimulatedWinner, TournamentSettings,
    TournamentStatus, TriggerOutcome,
};
use common::{auto, complete, engine, play_round, report, seed, undecided, wait_for_round};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_completions_generate_exactly_one_final() {
    let (engine, audit) = engine();
    let t = seed(&engine, 4, auto()).await;
    let store = engine.store.as_ref();

    let (b0, a0) = submit_result(store, t.id, "r1_0", report(10, 5, "p1")).await.unwrap();
    let (b1, a1) = submit_result(store, t.id, "r1_1", report(9, 6, "p3")).await.unwrap();
    let h0 = engine.spawn_trigger(Some(b0), a0);
    let h1 = engine.spawn_trigger(Some(b1), a1);
    let outcomes = [h0.await.unwrap(), h1.await.unwrap()];

    let round2 = store.round_matches(t.id, 2).await.unwrap();
    assert_eq!(round2.len(), 1);
    let final_match = &round2[0];
    assert_eq!(final_match.player_a.as_deref(), Some("p1"));
    assert_eq!(final_match.player_b.as_deref(), Some("p3"));
    assert_eq!(final_match.status, MatchStatus::Pending);
    assert_eq!((final_match.score_a, final_match.score_b), (0, 0));
    assert_eq!(final_match.winner, None);

    let created = outcomes
        .iter()
        .filter(|o| {
            matches!(
                o,
                TriggerOutcome::Advanced(Advance::RoundGenerated { round: 2, created: true })
            )
        })
        .count();
    assert_eq!(created, 1);

    let generated_events = audit
        .events()
        .into_iter()
        .filter(|e| matches!(e, AuditEvent::RoundGenerated { round: 2, .. }))
        .count();
    assert_eq!(generated_events, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn racing_submissions_never_duplicate_a_round() {
    for _ in 0..20 {
        let (engine, _) = engine();
        let tid = seed(&engine, 8, auto()).await.id;

        let mut handles = Vec::new();
        for (match_id, winner) in [("r1_0", "p1"), ("r1_1", "p3"), ("r1_2", "p5"), ("r1_3", "p7")] {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                complete(&engine, tid, match_id, 2, 0, winner).await
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let round2 = engine.store.round_matches(tid, 2).await.unwrap();
        assert_eq!(round2.len(), 2);
        assert_eq!(round2[0].player_a.as_deref(), Some("p1"));
        assert_eq!(round2[0].player_b.as_deref(), Some("p3"));
        assert_eq!(round2[1].player_a.as_deref(), Some("p5"));
        assert_eq!(round2[1].player_b.as_deref(), Some("p7"));
    }
}

#[tokio::test]
async fn eight_player_bracket_runs_to_a_champion() {
    let (engine, audit) = engine();
    let t = seed(&engine, 8, auto()).await;
    assert_eq!(t.total_rounds, 3);
    let store = engine.store.as_ref();

    play_round(&engine, t.id, 1).await;
    assert_eq!(store.round_matches(t.id, 2).await.unwrap().len(), 2);
    let after_r1 = store.get_tournament(t.id).await.unwrap();
    assert_eq!(after_r1.current_round, 2);
    assert_eq!(after_r1.status, TournamentStatus::Live);

    play_round(&engine, t.id, 2).await;
    let round3 = store.round_matches(t.id, 3).await.unwrap();
    assert_eq!(round3.len(), 1);
    assert_eq!(round3[0].player_a.as_deref(), Some("p1"));
    assert_eq!(round3[0].player_b.as_deref(), Some("p5"));

    let outcomes = play_round(&engine, t.id, 3).await;
    assert_eq!(
        outcomes,
        vec![TriggerOutcome::Advanced(Advance::ChampionDeclared {
            champion: "p1".to_string(),
            newly: true,
        })]
    );

    let done = store.get_tournament(t.id).await.unwrap();
    assert_eq!(done.status, TournamentStatus::Completed);
    assert_eq!(done.champion.as_deref(), Some("p1"));
    assert_eq!(done.current_round, 3);
    assert!(store.round_matches(t.id, 4).await.unwrap().is_empty());
    assert!(audit.events().contains(&AuditEvent::TournamentCompleted {
        tournament_id: t.id,
        champion: "p1".to_string(),
    }));
}

#[tokio::test]
async fn every_completed_match_has_a_participant_winner_with_the_higher_score() {
    let (engine, _) = engine();
    let t = seed(&engine, 16, auto()).await;
    for round in 1..=4 {
        play_round(&engine, t.id, round).await;
    }
    for round in 1..=4 {
        let matches = engine.store.round_matches(t.id, round).await.unwrap();
        assert_eq!(matches.len(), 16 >> round);
        for m in matches {
            assert_eq!(m.status, MatchStatus::Completed);
            let winner = m.winner.clone().unwrap();
            assert!(m.is_participant(&winner));
            let (w, l) = m.scores_for(&winner);
            assert!(w > l);
        }
    }
}

#[tokio::test]
async fn one_of_four_completions_generates_nothing() {
    let (engine, _) = engine();
    let t = seed(&engine, 8, auto()).await;

    let outcome = complete(&engine, t.id, "r1_0", 5, 1, "p1").await;
    assert_eq!(
        outcome,
        TriggerOutcome::Advanced(Advance::RoundIncomplete { round: 1, open: 3 })
    );
    assert!(engine.store.round_matches(t.id, 2).await.unwrap().is_empty());
    let tournament = engine.store.get_tournament(t.id).await.unwrap();
    assert_eq!(tournament.current_round, 1);
    assert_eq!(tournament.status, TournamentStatus::Setup);
}

#[tokio::test]
async fn retriggering_after_progress_is_idempotent() {
    let (engine, _) = engine();
    let t = seed(&engine, 4, auto()).await;
    let store = engine.store.as_ref();

    let (before, after) = submit_result(store, t.id, "r1_0", report(3, 0, "p1")).await.unwrap();
    on_match_written(&engine, Some(&before), &after).await;
    complete(&engine, t.id, "r1_1", 0, 3, "p4").await;

    for _ in 0..5 {
        let outcome = on_match_written(&engine, None, &after).await;
        assert_eq!(
            outcome,
            TriggerOutcome::Advanced(Advance::RoundGenerated {
                round: 2,
                created: false,
            })
        );
    }
    let round2 = store.round_matches(t.id, 2).await.unwrap();
    assert_eq!(round2.len(), 1);
    assert_eq!(round2[0].player_b.as_deref(), Some("p4"));
    assert_eq!(store.get_tournament(t.id).await.unwrap().current_round, 2);
}

#[tokio::test]
async fn writes_that_do_not_complete_a_match_do_not_fire() {
    let (engine, _) = engine();
    let t = seed(&engine, 4, auto()).await;
    let store = engine.store.as_ref();

    let (before, live) = bracket_progression::mark_live(store, t.id, "r1_0").await.unwrap();
    assert_eq!(
        on_match_written(&engine, Some(&before), &live).await,
        TriggerOutcome::NotACompletion
    );

    let (_, done) = submit_result(store, t.id, "r1_0", report(2, 1, "p1")).await.unwrap();
    // Same completed record written again: no transition, no re-fire.
    assert_eq!(
        on_match_written(&engine, Some(&done), &done).await,
        TriggerOutcome::NotACompletion
    );
}

#[tokio::test]
async fn auto_progress_off_leaves_progression_to_operators() {
    let (engine, _) = engine();
    let t = seed(&engine, 4, TournamentSettings::default()).await;

    assert_eq!(
        complete(&engine, t.id, "r1_0", 2, 1, "p1").await,
        TriggerOutcome::AutoProgressOff
    );
    assert_eq!(
        complete(&engine, t.id, "r1_1", 2, 1, "p3").await,
        TriggerOutcome::AutoProgressOff
    );
    assert!(engine.store.round_matches(t.id, 2).await.unwrap().is_empty());
}

#[tokio::test]
async fn completed_match_without_winner_aborts_without_side_effects() {
    let (engine, _) = engine();
    let t = seed(&engine, 2, auto()).await;
    let store = engine.store.as_ref();

    let (before, after) = submit_result(store, t.id, "r1_0", undecided(1)).await.unwrap();
    assert_eq!(after.status, MatchStatus::Completed);

    assert_eq!(
        on_match_written(&engine, Some(&before), &after).await,
        TriggerOutcome::Failed(BracketError::UndeterminedWinner("r1_0".to_string()))
    );
    let stored = store.get_match(t.id, "r1_0").await.unwrap();
    assert_eq!(stored.winner, None);
    let tournament = store.get_tournament(t.id).await.unwrap();
    assert_eq!(tournament.champion, None);
    assert_eq!(tournament.status, TournamentStatus::Setup);
}

#[tokio::test]
async fn winner_outside_the_match_is_rejected_by_the_engine() {
    let (engine, _) = engine();
    let t = seed(&engine, 4, auto()).await;
    let store = engine.store.as_ref();

    // A record from a writer that skipped validation.
    let before = store.get_match(t.id, "r1_0").await.unwrap();
    let mut raw = before.clone();
    raw.status = MatchStatus::Completed;
    raw.winner = Some("p9".to_string());
    let after = store.update_match(raw).await.unwrap();

    assert_eq!(
        on_match_written(&engine, Some(&before), &after).await,
        TriggerOutcome::Failed(BracketError::WinnerNotParticipant {
            match_id: "r1_0".to_string(),
            winner: "p9".to_string(),
        })
    );
}

#[tokio::test]
async fn simulation_mode_fills_in_winners_and_finishes_the_bracket() {
    let (engine, _) = engine();
    let engine = engine.with_simulation(Arc::new(SimulatedWinner::with_seed(7)));
    let settings = TournamentSettings {
        auto_progress: true,
        simulation_mode: true,
    };
    let t = seed(&engine, 4, settings).await;
    let store = engine.store.as_ref();

    for round in 1..=2 {
        for m in store.round_matches(t.id, round).await.unwrap() {
            let (before, after) = submit_result(store, t.id, &m.id, undecided(0)).await.unwrap();
            assert_eq!(after.winner, None);
            on_match_written(&engine, Some(&before), &after).await;
        }
    }

    let round1 = store.round_matches(t.id, 1).await.unwrap();
    for m in &round1 {
        assert!(m.is_participant(m.winner.as_deref().unwrap()));
    }
    let final_match = &store.round_matches(t.id, 2).await.unwrap()[0];
    assert_eq!(final_match.player_a, round1[0].winner);
    assert_eq!(final_match.player_b, round1[1].winner);

    let done = store.get_tournament(t.id).await.unwrap();
    assert_eq!(done.status, TournamentStatus::Completed);
    assert_eq!(done.champion, final_match.winner);
    assert!(final_match.is_participant(done.champion.as_deref().unwrap()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn background_triggers_are_observed_by_polling() {
    let (engine, _) = engine();
    let t = seed(&engine, 4, auto()).await;
    let store = engine.store.as_ref();

    for (match_id, winner) in [("r1_0", "p2"), ("r1_1", "p4")] {
        let (before, after) = submit_result(store, t.id, match_id, report(1, 4, winner))
            .await
            .unwrap();
        // Fire and forget, like the web handler.
        drop(engine.spawn_trigger(Some(before), after));
    }

    let round2 = wait_for_round(&engine, t.id, 2).await;
    assert_eq!(round2.len(), 1);
    assert_eq!(round2[0].player_a.as_deref(), Some("p2"));
    assert_eq!(round2[0].player_b.as_deref(), Some("p4"));
}

#[tokio::test]
async fn undetermined_match_is_settled_by_an_operator() {
    let (engine, _) = engine();
    let t = seed(&engine, 4, auto()).await;
    let store = engine.store.as_ref();

    let (before, after) = submit_result(store, t.id, "r1_0", undecided(2)).await.unwrap();
    assert_eq!(
        on_match_written(&engine, Some(&before), &after).await,
        TriggerOutcome::Failed(BracketError::UndeterminedWinner("r1_0".to_string()))
    );
    // The sibling finishing does not get past the undecided match either.
    assert_eq!(
        complete(&engine, t.id, "r1_1", 3, 1, "p3").await,
        TriggerOutcome::Failed(BracketError::UndeterminedWinner("r1_0".to_string()))
    );
    assert!(store.round_matches(t.id, 2).await.unwrap().is_empty());

    override_winner(&engine, t.id, "r1_0", "p2".to_string(), "admin-1", "tiebreak")
        .await
        .unwrap();
    assert_eq!(
        force_advance(&engine, t.id, 1, "admin-1").await,
        Ok(Advance::RoundGenerated {
            round: 2,
            created: true,
        })
    );
    let round2 = store.round_matches(t.id, 2).await.unwrap();
    assert_eq!(round2[0].player_a.as_deref(), Some("p2"));
    assert_eq!(round2[0].player_b.as_deref(), Some("p3"));
}
