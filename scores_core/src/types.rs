//! Shared wire and domain types for the live scores core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked game. Value-typed: the store replaces the whole record on
/// update rather than mutating fields behind a shared reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: Uuid,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    /// Free-form label: "Scheduled", "Live", "Q4 02:13", "Final", ...
    pub status: String,
}

impl Game {
    /// Build a candidate game for `GameStore::create`. The store assigns
    /// the real id; the one set here is discarded.
    pub fn new(home_team: impl Into<String>, away_team: impl Into<String>) -> Self {
        Self {
            id: Uuid::nil(),
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_score: 0,
            away_score: 0,
            status: "Scheduled".to_string(),
        }
    }
}

/// A single play-by-play entry. Immutable once stored; each game keeps
/// its plays newest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayEvent {
    pub id: Uuid,
    pub game_id: Uuid,
    pub team: String,
    pub player: String,
    /// e.g. "Touchdown - 25 yd run"
    pub description: String,
    /// e.g. "Q4"
    pub quarter: String,
    /// e.g. "02:13"
    pub clock: String,
    pub timestamp: DateTime<Utc>,
}

/// Play submission shape. Timestamp defaults to insertion time when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlay {
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub player: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quarter: String,
    #[serde(default)]
    pub clock: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Manual score update shape (HTTP surface and tests).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdate {
    pub home_score: u32,
    pub away_score: u32,
    pub status: Option<String>,
}

/// Upstream game snapshot entry, provider-agnostic. Every field is
/// optional: an absent field means "no information this poll" and must
/// never overwrite local state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalGame {
    pub external_id: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub status: Option<String>,
    pub start_time_utc: Option<DateTime<Utc>>,
    pub end_time_utc: Option<DateTime<Utc>>,
}

impl ExternalGame {
    /// True when both team names are present and non-blank, i.e. the
    /// entry carries enough identity to act on.
    pub fn has_teams(&self) -> bool {
        fn non_blank(s: &Option<String>) -> bool {
            s.as_deref().is_some_and(|v| !v.trim().is_empty())
        }
        non_blank(&self.home_team) && non_blank(&self.away_team)
    }
}
