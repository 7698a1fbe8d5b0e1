//! Advisory audit events for an external timeline. The engine never reads them back.

use crate::models::{MatchId, PlayerId, TournamentId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditEvent {
    MatchCompleted {
        tournament_id: TournamentId,
        match_id: MatchId,
        winner: PlayerId,
    },
    RoundGenerated {
        tournament_id: TournamentId,
        round: u32,
        matches: usize,
    },
    TournamentCompleted {
        tournament_id: TournamentId,
        champion: PlayerId,
    },
    WinnerOverridden {
        tournament_id: TournamentId,
        match_id: MatchId,
        winner: PlayerId,
        admin_id: String,
    },
    RoundForced {
        tournament_id: TournamentId,
        round: u32,
        admin_id: String,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: AuditEvent,
}

/// Somewhere to send audit events. Emitting must never fail the caller.
pub trait AuditSink: Send + Sync {
    fn emit(&self, event: AuditEvent);
}

/// Writes events to the log at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn emit(&self, event: AuditEvent) {
        log::info!("audit: {:?}", event);
    }
}

/// Keeps every event in memory (timeline endpoint, tests) and also logs it.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        match self.entries.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.entries().into_iter().map(|e| e.event).collect()
    }
}

impl AuditSink for MemoryAuditLog {
    fn emit(&self, event: AuditEvent) {
        LogAuditSink.emit(event.clone());
        let entry = AuditEntry {
            at: Utc::now(),
            event,
        };
        match self.entries.lock() {
            Ok(mut g) => g.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}
