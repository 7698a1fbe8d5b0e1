//! Closed status enums for matches and tournaments, with their allowed transitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a single match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Created, waiting to be played.
    #[default]
    Pending,
    /// Being played right now.
    Live,
    /// Result reported. Terminal.
    Completed,
}

impl MatchStatus {
    /// Statuses reachable from `self` in one write. Staying in the same status is not a transition.
    pub fn allowed_next(self) -> &'static [MatchStatus] {
        use MatchStatus::*;
        match self {
            Pending => &[Live, Completed],
            Live => &[Completed],
            Completed => &[],
        }
    }

    pub fn can_transition_to(self, next: MatchStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    /// Pending or live: the match still blocks its round.
    pub fn is_open(self) -> bool {
        matches!(self, MatchStatus::Pending | MatchStatus::Live)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Live => "live",
            MatchStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Lifecycle of a tournament.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Bracket seeded; round 1 may already be underway.
    #[default]
    Setup,
    /// Past round 1 (or explicitly started).
    Live,
    /// Champion declared.
    Completed,
    /// Closed for good.
    Archived,
}

impl TournamentStatus {
    pub fn allowed_next(self) -> &'static [TournamentStatus] {
        use TournamentStatus::*;
        match self {
            // A two-player bracket completes straight from setup.
            Setup => &[Live, Completed, Archived],
            Live => &[Completed, Archived],
            Completed => &[Archived],
            Archived => &[],
        }
    }

    pub fn can_transition_to(self, next: TournamentStatus) -> bool {
        self.allowed_next().contains(&next)
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TournamentStatus::Setup => "setup",
            TournamentStatus::Live => "live",
            TournamentStatus::Completed => "completed",
            TournamentStatus::Archived => "archived",
        };
        f.write_str(s)
    }
}
