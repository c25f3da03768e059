//! Poller configuration from the environment.

use std::env;
use std::time::Duration;

/// Default poll interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

/// Floor for the poll interval; guards against hot-looping on a
/// misconfigured environment.
pub const MIN_POLL_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
}

impl PollerConfig {
    /// Read `SCORES_POLL_INTERVAL_SECONDS`, defaulting to 15 and
    /// clamping to a 5 second minimum.
    pub fn from_env() -> Self {
        Self::from_value(env::var("SCORES_POLL_INTERVAL_SECONDS").ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        let seconds = value
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
            .max(MIN_POLL_INTERVAL_SECS);

        Self {
            interval: Duration::from_secs(seconds),
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::from_value(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_fifteen_seconds() {
        assert_eq!(PollerConfig::from_value(None).interval, Duration::from_secs(15));
        assert_eq!(
            PollerConfig::from_value(Some("garbage")).interval,
            Duration::from_secs(15)
        );
    }

    #[test]
    fn clamps_to_minimum_of_five() {
        assert_eq!(PollerConfig::from_value(Some("1")).interval, Duration::from_secs(5));
        assert_eq!(PollerConfig::from_value(Some("0")).interval, Duration::from_secs(5));
    }

    #[test]
    fn accepts_configured_values() {
        assert_eq!(PollerConfig::from_value(Some("30")).interval, Duration::from_secs(30));
        assert_eq!(PollerConfig::from_value(Some(" 5 ")).interval, Duration::from_secs(5));
    }
}
