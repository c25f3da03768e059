//! In-memory game and play-by-play store.
//!
//! Single source of truth for `Game` and `PlayEvent` state. All
//! operations take `&self` and are safe to call from any number of
//! tasks; callers never coordinate locking themselves. Games are never
//! deleted, so a passed `exists` check stays valid.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use thiserror::Error;
use uuid::Uuid;

use crate::types::{Game, NewPlay, PlayEvent};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("game {0} not found")]
    GameNotFound(Uuid),
}

/// Cheaply cloneable handle to the shared store.
#[derive(Clone, Default)]
pub struct GameStore {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    games: RwLock<HashMap<Uuid, Game>>,
    // A game's play list is created together with the game and always
    // exists afterwards; plays are kept newest-first.
    plays: RwLock<HashMap<Uuid, Vec<PlayEvent>>>,
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all games, ordered by status for stable display.
    pub fn list_all(&self) -> Vec<Game> {
        let games = self.inner.games.read();
        let mut all: Vec<Game> = games.values().cloned().collect();
        all.sort_by(|a, b| a.status.cmp(&b.status).then(a.id.cmp(&b.id)));
        all
    }

    /// Insert a new game. The candidate's id is ignored and a fresh one
    /// assigned; an empty play list is created alongside. Never fails.
    pub fn create(&self, mut candidate: Game) -> Game {
        candidate.id = Uuid::new_v4();
        let mut games = self.inner.games.write();
        let mut plays = self.inner.plays.write();
        games.insert(candidate.id, candidate.clone());
        plays.insert(candidate.id, Vec::new());
        candidate
    }

    pub fn exists(&self, id: Uuid) -> bool {
        self.inner.games.read().contains_key(&id)
    }

    pub fn get(&self, id: Uuid) -> Option<Game> {
        self.inner.games.read().get(&id).cloned()
    }

    /// Replace scores and status wholesale, atomically with respect to
    /// other writers. Accepts decreasing scores (upstream corrections).
    pub fn update_score(
        &self,
        id: Uuid,
        home: u32,
        away: u32,
        status: &str,
    ) -> Result<Game, StoreError> {
        let mut games = self.inner.games.write();
        let current = games.get(&id).ok_or(StoreError::GameNotFound(id))?;
        let mut updated = current.clone();
        updated.home_score = home;
        updated.away_score = away;
        updated.status = status.to_string();
        games.insert(id, updated.clone());
        Ok(updated)
    }

    /// Record a play against an existing game, newest-first. Rejects
    /// unknown game ids rather than creating orphaned play history.
    pub fn add_play(&self, game_id: Uuid, play: NewPlay) -> Result<PlayEvent, StoreError> {
        if !self.exists(game_id) {
            return Err(StoreError::GameNotFound(game_id));
        }
        let event = PlayEvent {
            id: Uuid::new_v4(),
            game_id,
            team: play.team,
            player: play.player,
            description: play.description,
            quarter: play.quarter,
            clock: play.clock,
            timestamp: play.timestamp.unwrap_or_else(Utc::now),
        };
        let mut plays = self.inner.plays.write();
        plays.entry(game_id).or_default().insert(0, event.clone());
        Ok(event)
    }

    /// Snapshot of a game's play history, newest-first.
    pub fn get_plays(&self, game_id: Uuid) -> Result<Vec<PlayEvent>, StoreError> {
        self.inner
            .plays
            .read()
            .get(&game_id)
            .cloned()
            .ok_or(StoreError::GameNotFound(game_id))
    }
}
