//! Upstream score feed abstraction.
//!
//! One capability: fetch the currently known games as a point-in-time
//! snapshot. No stable ids, no delivery guarantees; a snapshot may be
//! empty or the fetch may fail outright, and the poller treats either as
//! a recoverable per-cycle condition.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::ExternalGame;

pub mod http;

pub use http::HttpScoresProvider;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feed returned an unparseable payload: {0}")]
    Decode(String),
    #[error("feed unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ScoresProvider: Send + Sync {
    async fn get_live_games(&self) -> Result<Vec<ExternalGame>, FeedError>;
}
