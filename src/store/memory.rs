//! In-process document store backed by a lock-protected map.

use crate::error::StoreError;
use crate::models::{MatchId, MatchRecord, Tournament, TournamentId};
use crate::store::{DocumentStore, RoundCreation};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// One tournament and all of its matches.
#[derive(Clone, Debug)]
struct TournamentDoc {
    tournament: Tournament,
    matches: BTreeMap<MatchId, MatchRecord>,
}

/// Keeps everything in memory. Every operation takes the lock once, so each call
/// is atomic with respect to every other call.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<TournamentId, TournamentDoc>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_tournament(
        &self,
        mut tournament: Tournament,
        matches: Vec<MatchRecord>,
    ) -> Result<Tournament, StoreError> {
        let mut g = self.docs.write().map_err(|_| StoreError::Lock)?;
        if g.contains_key(&tournament.id) {
            return Err(StoreError::AlreadyExists(format!("tournament {}", tournament.id)));
        }
        tournament.revision = 1;
        let mut by_id = BTreeMap::new();
        for mut m in matches {
            m.revision = 1;
            if by_id.insert(m.id.clone(), m).is_some() {
                return Err(StoreError::AlreadyExists("duplicate match id".to_string()));
            }
        }
        g.insert(
            tournament.id,
            TournamentDoc {
                tournament: tournament.clone(),
                matches: by_id,
            },
        );
        Ok(tournament)
    }

    async fn get_tournament(&self, id: TournamentId) -> Result<Tournament, StoreError> {
        let g = self.docs.read().map_err(|_| StoreError::Lock)?;
        g.get(&id)
            .map(|d| d.tournament.clone())
            .ok_or(StoreError::TournamentNotFound(id))
    }

    async fn list_tournaments(&self) -> Result<Vec<Tournament>, StoreError> {
        let g = self.docs.read().map_err(|_| StoreError::Lock)?;
        let mut all: Vec<Tournament> = g.values().map(|d| d.tournament.clone()).collect();
        all.sort_by_key(|t| t.created_at);
        Ok(all)
    }

    async fn update_tournament(&self, mut tournament: Tournament) -> Result<Tournament, StoreError> {
        let mut g = self.docs.write().map_err(|_| StoreError::Lock)?;
        let doc = g
            .get_mut(&tournament.id)
            .ok_or(StoreError::TournamentNotFound(tournament.id))?;
        if doc.tournament.revision != tournament.revision {
            return Err(StoreError::Conflict(format!("tournament {}", tournament.id)));
        }
        tournament.revision += 1;
        doc.tournament = tournament.clone();
        Ok(tournament)
    }

    async fn get_match(
        &self,
        tournament_id: TournamentId,
        match_id: &str,
    ) -> Result<MatchRecord, StoreError> {
        let g = self.docs.read().map_err(|_| StoreError::Lock)?;
        let doc = g
            .get(&tournament_id)
            .ok_or(StoreError::TournamentNotFound(tournament_id))?;
        doc.matches
            .get(match_id)
            .cloned()
            .ok_or_else(|| StoreError::MatchNotFound {
                tournament_id,
                match_id: match_id.to_string(),
            })
    }

    async fn update_match(&self, record: MatchRecord) -> Result<MatchRecord, StoreError> {
        let mut g = self.docs.write().map_err(|_| StoreError::Lock)?;
        let doc = g
            .get_mut(&record.tournament_id)
            .ok_or(StoreError::TournamentNotFound(record.tournament_id))?;
        swap_match(doc, record)
    }

    async fn update_match_before_round(
        &self,
        record: MatchRecord,
        round: u32,
    ) -> Result<MatchRecord, StoreError> {
        let mut g = self.docs.write().map_err(|_| StoreError::Lock)?;
        let doc = g
            .get_mut(&record.tournament_id)
            .ok_or(StoreError::TournamentNotFound(record.tournament_id))?;
        if doc.matches.values().any(|m| m.round == round) {
            return Err(StoreError::AlreadyExists(format!("round {round}")));
        }
        swap_match(doc, record)
    }

    async fn round_matches(
        &self,
        tournament_id: TournamentId,
        round: u32,
    ) -> Result<Vec<MatchRecord>, StoreError> {
        let g = self.docs.read().map_err(|_| StoreError::Lock)?;
        let doc = g
            .get(&tournament_id)
            .ok_or(StoreError::TournamentNotFound(tournament_id))?;
        Ok(collect_round(doc, round))
    }

    async fn create_round_if_absent(
        &self,
        tournament_id: TournamentId,
        round: u32,
        matches: Vec<MatchRecord>,
        sources: &[MatchRecord],
    ) -> Result<RoundCreation, StoreError> {
        // Check and insert under the same write guard.
        let mut g = self.docs.write().map_err(|_| StoreError::Lock)?;
        let doc = g
            .get_mut(&tournament_id)
            .ok_or(StoreError::TournamentNotFound(tournament_id))?;

        let existing = collect_round(doc, round);
        if !existing.is_empty() {
            return Ok(RoundCreation::AlreadyExists(existing));
        }
        if let Some(stale) = sources
            .iter()
            .find(|s| doc.matches.get(&s.id).map(|m| m.revision) != Some(s.revision))
        {
            return Err(StoreError::Conflict(format!("match {}", stale.id)));
        }
        if let Some(clash) = matches.iter().find(|m| doc.matches.contains_key(&m.id)) {
            return Err(StoreError::AlreadyExists(format!("match {}", clash.id)));
        }

        let mut created = Vec::with_capacity(matches.len());
        for mut m in matches {
            m.revision = 1;
            doc.matches.insert(m.id.clone(), m.clone());
            created.push(m);
        }
        created.sort_by_key(|m| m.position);
        Ok(RoundCreation::Created(created))
    }
}

fn swap_match(doc: &mut TournamentDoc, mut record: MatchRecord) -> Result<MatchRecord, StoreError> {
    let stored = doc
        .matches
        .get_mut(&record.id)
        .ok_or_else(|| StoreError::MatchNotFound {
            tournament_id: record.tournament_id,
            match_id: record.id.clone(),
        })?;
    if stored.revision != record.revision {
        return Err(StoreError::Conflict(format!("match {}", record.id)));
    }
    record.revision += 1;
    *stored = record.clone();
    Ok(record)
}

fn collect_round(doc: &TournamentDoc, round: u32) -> Vec<MatchRecord> {
    let mut out: Vec<MatchRecord> = doc
        .matches
        .values()
        .filter(|m| m.round == round)
        .cloned()
        .collect();
    out.sort_by_key(|m| m.position);
    out
}
