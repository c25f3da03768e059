//! Background reconciliation between the upstream feed and the local
//! game store.
//!
//! One cycle per interval: snapshot the feed, snapshot local games,
//! merge each feed entry into its best-effort match (or create a local
//! game when there is none), and publish `ScoreUpdated` for everything
//! that changed. A failed fetch or a bad entry costs at most its own
//! cycle or entry; only cancellation stops the loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::broadcast::Broadcaster;
use crate::matching::{GameMatcher, TeamNameMatcher};
use crate::providers::ScoresProvider;
use crate::store::{GameStore, StoreError};
use crate::types::{ExternalGame, Game};

pub struct ScorePoller {
    provider: Arc<dyn ScoresProvider>,
    store: GameStore,
    broadcaster: Broadcaster,
    matcher: Arc<dyn GameMatcher>,
    interval: Duration,
}

impl ScorePoller {
    pub fn new(
        provider: Arc<dyn ScoresProvider>,
        store: GameStore,
        broadcaster: Broadcaster,
        interval: Duration,
    ) -> Self {
        Self {
            provider,
            store,
            broadcaster,
            matcher: Arc::new(TeamNameMatcher),
            interval,
        }
    }

    /// Swap in a different matching heuristic, e.g. once the feed grows
    /// stable ids.
    pub fn with_matcher(mut self, matcher: Arc<dyn GameMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Run until `cancel` fires. Cancellation is observed both during
    /// the fetch and during the inter-cycle sleep, so the loop exits
    /// within one sleep quantum.
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            "score poller started, interval {}s",
            self.interval.as_secs()
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = self.poll_once() => {}
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("score poller stopped");
    }

    /// One reconciliation cycle. Feed faults are recovered here; the
    /// cycle then performs no mutations and no publishes.
    pub async fn poll_once(&self) {
        let snapshot = match self.provider.get_live_games().await {
            Ok(games) => games,
            Err(e) => {
                warn!("scores feed unavailable, skipping cycle: {e}");
                return;
            }
        };

        if snapshot.is_empty() {
            debug!("no games returned by scores feed");
            return;
        }

        // Point-in-time view; a concurrent manual update between this
        // read and our write is overwritten last-writer-wins.
        let locals = self.store.list_all();

        for external in &snapshot {
            if let Err(e) = self.reconcile_entry(&locals, external).await {
                warn!(
                    "skipping feed entry {} vs {}: {e:#}",
                    external.home_team.as_deref().unwrap_or("?"),
                    external.away_team.as_deref().unwrap_or("?"),
                );
            }
        }
    }

    async fn reconcile_entry(&self, locals: &[Game], external: &ExternalGame) -> Result<()> {
        match self.matcher.find_match(locals, external) {
            Some(local) => self.apply_update(local, external).await,
            None if external.has_teams() => self.create_local(external).await,
            None => {
                debug!(
                    "feed entry without usable team names ({:?} vs {:?}), nothing to do",
                    external.home_team, external.away_team
                );
                Ok(())
            }
        }
    }

    /// Merge feed fields over the local record; absent feed fields keep
    /// the local value. Identical results are a no-op with no publish.
    async fn apply_update(&self, local: &Game, external: &ExternalGame) -> Result<()> {
        let home = external.home_score.unwrap_or(local.home_score);
        let away = external.away_score.unwrap_or(local.away_score);
        let status = external
            .status
            .clone()
            .unwrap_or_else(|| local.status.clone());

        if home == local.home_score && away == local.away_score && status == local.status {
            return Ok(());
        }

        match self.store.update_score(local.id, home, away, &status) {
            Ok(updated) => {
                info!(
                    "updated score for {} vs {}: {}-{} ({})",
                    updated.home_team,
                    updated.away_team,
                    updated.home_score,
                    updated.away_score,
                    updated.status
                );
                self.broadcaster.score_updated(&updated).await;
                Ok(())
            }
            // Games are never deleted today, but the snapshot is not
            // atomic with the write.
            Err(StoreError::GameNotFound(id)) => {
                debug!("game {id} vanished between snapshot and update");
                Ok(())
            }
        }
    }

    async fn create_local(&self, external: &ExternalGame) -> Result<()> {
        let mut candidate = Game::new(
            external.home_team.clone().unwrap_or_default(),
            external.away_team.clone().unwrap_or_default(),
        );
        candidate.home_score = external.home_score.unwrap_or(0);
        candidate.away_score = external.away_score.unwrap_or(0);
        candidate.status = external.status.clone().unwrap_or_else(|| "Live".to_string());

        let created = self.store.create(candidate);
        info!(
            "created local game for upstream match {} vs {} (id: {})",
            created.home_team, created.away_team, created.id
        );
        self.broadcaster.score_updated(&created).await;
        Ok(())
    }
}
