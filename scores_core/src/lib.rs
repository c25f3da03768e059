//! Live scores core - in-memory game state, feed reconciliation and
//! group-addressed broadcast.
//!
//! This crate provides:
//! - The `GameStore`: concurrent single source of truth for games and
//!   play-by-play history (newest-first)
//! - `ScoresProvider`: the upstream feed seam, with an HTTP scoreboard
//!   implementation
//! - Best-effort team-name matching behind the `GameMatcher` seam
//! - `Broadcaster` over a pluggable `PushTransport` (`ScoreUpdated` /
//!   `PlayEvent` to `game-<id>` topics)
//! - `ScorePoller`: the cancellable background reconciliation loop
//!
//! The HTTP surface and the concrete WebSocket transport live in
//! `services/scores_server`.

pub mod broadcast;
pub mod config;
pub mod matching;
pub mod poller;
pub mod providers;
pub mod store;
pub mod types;

pub use broadcast::{Broadcaster, PushTransport};
pub use config::PollerConfig;
pub use poller::ScorePoller;
pub use store::{GameStore, StoreError};
pub use types::*;
