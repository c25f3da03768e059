//! HTTP scoreboard provider.
//!
//! Fetches a JSON scoreboard and maps it to `ExternalGame` entries.
//! Accepts either a bare array or a `{"games": [...]}` envelope, and
//! extracts fields tolerantly: a missing or oddly-typed field becomes
//! `None` rather than failing the snapshot.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;

use super::{FeedError, ScoresProvider};
use crate::types::ExternalGame;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpScoresProvider {
    client: Client,
    url: String,
}

impl HttpScoresProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            url: url.into(),
        }
    }

    fn parse_snapshot(data: &Value) -> Result<Vec<ExternalGame>, FeedError> {
        let entries = data
            .as_array()
            .or_else(|| data["games"].as_array())
            .ok_or_else(|| FeedError::Decode("expected an array of games".to_string()))?;

        Ok(entries.iter().map(Self::parse_entry).collect())
    }

    fn parse_entry(entry: &Value) -> ExternalGame {
        fn text(v: &Value) -> Option<String> {
            v.as_str().map(|s| s.to_string())
        }
        fn score(v: &Value) -> Option<u32> {
            v.as_u64().and_then(|n| u32::try_from(n).ok())
        }
        fn time(v: &Value) -> Option<DateTime<Utc>> {
            v.as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|t| t.with_timezone(&Utc))
        }

        ExternalGame {
            external_id: text(&entry["externalId"]),
            home_team: text(&entry["homeTeam"]),
            away_team: text(&entry["awayTeam"]),
            home_score: score(&entry["homeScore"]),
            away_score: score(&entry["awayScore"]),
            status: text(&entry["status"]),
            start_time_utc: time(&entry["startTimeUtc"]),
            end_time_utc: time(&entry["endTimeUtc"]),
        }
    }
}

#[async_trait]
impl ScoresProvider for HttpScoresProvider {
    async fn get_live_games(&self) -> Result<Vec<ExternalGame>, FeedError> {
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Unavailable(status.to_string()));
        }
        let data: Value = resp.json().await?;
        Self::parse_snapshot(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_bare_array_and_envelope() {
        let bare = json!([{"homeTeam": "College A", "awayTeam": "College B"}]);
        let games = HttpScoresProvider::parse_snapshot(&bare).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].home_team.as_deref(), Some("College A"));

        let wrapped = json!({"games": [{"homeTeam": "College A"}]});
        assert_eq!(HttpScoresProvider::parse_snapshot(&wrapped).unwrap().len(), 1);
    }

    #[test]
    fn missing_fields_become_none() {
        let data = json!([{"homeTeam": "College A", "homeScore": 7}]);
        let games = HttpScoresProvider::parse_snapshot(&data).unwrap();
        let g = &games[0];
        assert_eq!(g.home_score, Some(7));
        assert_eq!(g.away_score, None);
        assert_eq!(g.away_team, None);
        assert_eq!(g.status, None);
    }

    #[test]
    fn odd_types_are_tolerated() {
        let data = json!([{"homeTeam": 3, "homeScore": "seven", "startTimeUtc": "not a date"}]);
        let games = HttpScoresProvider::parse_snapshot(&data).unwrap();
        let g = &games[0];
        assert_eq!(g.home_team, None);
        assert_eq!(g.home_score, None);
        assert_eq!(g.start_time_utc, None);
    }

    #[test]
    fn timestamps_parse_from_rfc3339() {
        let data = json!([{"startTimeUtc": "2026-01-10T18:30:00Z"}]);
        let games = HttpScoresProvider::parse_snapshot(&data).unwrap();
        assert!(games[0].start_time_utc.is_some());
    }

    #[test]
    fn non_array_payload_is_a_decode_error() {
        let data = json!({"unexpected": true});
        assert!(matches!(
            HttpScoresProvider::parse_snapshot(&data),
            Err(FeedError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn non_success_status_is_an_unavailable_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut sock, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = sock.read(&mut buf).await;
                let _ = sock
                    .write_all(
                        b"HTTP/1.1 503 Service Unavailable\r\n\
                          content-length: 0\r\nconnection: close\r\n\r\n",
                    )
                    .await;
            }
        });

        let provider = HttpScoresProvider::new(format!("http://{addr}/scoreboard"));
        match provider.get_live_games().await {
            Err(FeedError::Unavailable(status)) => assert!(status.contains("503")),
            other => panic!("expected unavailable error, got {other:?}"),
        }
    }
}
