//! Server configuration from the environment.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::weather::DEFAULT_CACHE_TTL;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Default upstream scoreboard. Any endpoint returning the provider's
/// JSON shape works; override with SCORES_FEED_URL.
pub const DEFAULT_FEED_URL: &str = "http://localhost:9200/scoreboard";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub feed_url: String,
    pub weather_cache_ttl: Duration,
}

impl ServerConfig {
    /// Load from environment with defaults. A malformed bind address is
    /// the one startup error that aborts the process.
    pub fn from_env() -> Result<Self> {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR is not a valid socket address")?;

        let feed_url = env::var("SCORES_FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string());

        let weather_cache_ttl = env::var("WEATHER_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CACHE_TTL);

        Ok(Self {
            bind_addr,
            feed_url,
            weather_cache_ttl,
        })
    }
}
