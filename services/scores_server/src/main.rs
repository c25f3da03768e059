//! Scores Server
//!
//! Live scores service for the college sports blog:
//! - Serves the game/play HTTP API and the WebSocket hub
//! - Runs the background poller reconciling the upstream scores feed
//!   into the local game store
//! - Proxies the weather widget with caching
//! - Keeps the email subscription list

mod config;
mod hub;
mod routes;
mod subscriptions;
mod weather;

use std::sync::Arc;

use anyhow::Result;
use dotenv::dotenv;
use log::info;
use tokio_util::sync::CancellationToken;

use scores_core::providers::HttpScoresProvider;
use scores_core::{Broadcaster, Game, GameStore, PollerConfig, ScorePoller};

use config::ServerConfig;
use hub::WsHub;
use routes::AppState;
use subscriptions::SubscriptionStore;
use weather::WeatherService;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = ServerConfig::from_env()?;
    let poller_config = PollerConfig::from_env();

    let store = GameStore::new();
    // Seed one demo game so the page has something to show before the
    // first poll lands.
    let seeded = store.create(Game::new("College A", "College B"));
    info!("seeded demo game {}", seeded.id);

    let hub = WsHub::new();
    let broadcaster = Broadcaster::new(Arc::new(hub.clone()));

    let provider = Arc::new(HttpScoresProvider::new(config.feed_url.clone()));
    let poller = ScorePoller::new(
        provider,
        store.clone(),
        broadcaster.clone(),
        poller_config.interval,
    );

    let cancel = CancellationToken::new();
    let poller_cancel = cancel.clone();
    let poller_task = tokio::spawn(poller.run(poller_cancel));

    let state = AppState {
        store,
        broadcaster,
        hub,
        weather: WeatherService::new(config.weather_cache_ttl),
        subscriptions: SubscriptionStore::new(),
    };

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("scores server listening on {}", config.bind_addr);

    let shutdown_cancel = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
            shutdown_cancel.cancel();
        })
        .await?;

    cancel.cancel();
    poller_task.await?;
    info!("scores server stopped");
    Ok(())
}
