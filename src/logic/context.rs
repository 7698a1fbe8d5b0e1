//! Engine handle and the explicit per-invocation context passed down the pipeline.

use crate::audit::{AuditSink, LogAuditSink};
use crate::logic::resolver::{strategy_for, ReportedWinner, SimulatedWinner, WinnerStrategy};
use crate::models::{MatchRecord, Tournament, TournamentId, TournamentSettings};
use crate::store::DocumentStore;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Long-lived handle shared by every trigger invocation. Cheap to clone.
#[derive(Clone)]
pub struct Engine {
    pub store: Arc<dyn DocumentStore>,
    pub audit: Arc<dyn AuditSink>,
    reported: Arc<dyn WinnerStrategy>,
    simulated: Arc<dyn WinnerStrategy>,
}

impl Engine {
    pub fn new(store: Arc<dyn DocumentStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            store,
            audit,
            reported: Arc::new(ReportedWinner),
            simulated: Arc::new(SimulatedWinner::from_entropy()),
        }
    }

    /// Engine that only logs audit events.
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(store, Arc::new(LogAuditSink))
    }

    /// Replace the strategy used when `simulationMode` is on (e.g. a seeded one).
    pub fn with_simulation(mut self, strategy: Arc<dyn WinnerStrategy>) -> Self {
        self.simulated = strategy;
        self
    }

    /// Build the context for one invocation from the tournament's own settings.
    pub fn context_for(&self, tournament: &Tournament) -> ProgressionContext {
        ProgressionContext {
            store: self.store.clone(),
            audit: self.audit.clone(),
            tournament_id: tournament.id,
            settings: tournament.settings,
            winners: strategy_for(tournament.settings, &self.reported, &self.simulated),
        }
    }

    /// Run the completion trigger for a write in the background. Fire and forget.
    pub fn spawn_trigger(
        &self,
        before: Option<MatchRecord>,
        after: MatchRecord,
    ) -> JoinHandle<crate::logic::TriggerOutcome> {
        let engine = self.clone();
        tokio::spawn(async move {
            crate::logic::on_match_written(&engine, before.as_ref(), &after).await
        })
    }
}

/// Everything one pipeline run needs. Built fresh per invocation.
#[derive(Clone)]
pub struct ProgressionContext {
    pub store: Arc<dyn DocumentStore>,
    pub audit: Arc<dyn AuditSink>,
    pub tournament_id: TournamentId,
    pub settings: TournamentSettings,
    pub winners: Arc<dyn WinnerStrategy>,
}
