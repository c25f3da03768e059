//! HTTP and WebSocket surface.
//!
//! Thin glue over the core: every write goes store-first, then through
//! the broadcaster on success, the same contract the poller follows.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use log::{debug, info};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use scores_core::broadcast::PushTransport;
use scores_core::{Broadcaster, Game, GameStore, NewPlay, ScoreUpdate, StoreError};

use crate::hub::WsHub;
use crate::subscriptions::SubscriptionStore;
use crate::weather::{WeatherQuery, WeatherService};

#[derive(Clone)]
pub struct AppState {
    pub store: GameStore,
    pub broadcaster: Broadcaster,
    pub hub: WsHub,
    pub weather: WeatherService,
    pub subscriptions: SubscriptionStore,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/games", get(list_games).post(create_game))
        .route("/api/games/{id}/plays", get(get_plays).post(add_play))
        .route("/api/games/{id}/score", post(update_score))
        .route("/api/weather", get(weather))
        .route("/api/subscribe", post(subscribe))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .with_state(state)
}

fn not_found(id: Uuid) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("game {id} not found") })),
    )
        .into_response()
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn list_games(State(state): State<AppState>) -> Json<Vec<Game>> {
    Json(state.store.list_all())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewGame {
    home_team: String,
    away_team: String,
    #[serde(default)]
    home_score: u32,
    #[serde(default)]
    away_score: u32,
    status: Option<String>,
}

async fn create_game(
    State(state): State<AppState>,
    Json(body): Json<NewGame>,
) -> impl IntoResponse {
    let mut candidate = Game::new(body.home_team, body.away_team);
    candidate.home_score = body.home_score;
    candidate.away_score = body.away_score;
    if let Some(status) = body.status {
        candidate.status = status;
    }
    let created = state.store.create(candidate);
    info!(
        "created game {} vs {} (id: {})",
        created.home_team, created.away_team, created.id
    );
    (StatusCode::CREATED, Json(created))
}

async fn get_plays(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.store.get_plays(id) {
        Ok(plays) => Json(plays).into_response(),
        Err(StoreError::GameNotFound(id)) => not_found(id),
    }
}

async fn update_score(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ScoreUpdate>,
) -> Response {
    // Manual updates keep the game's current status when none is sent.
    let status = match body.status {
        Some(status) => status,
        None => match state.store.get(id) {
            Some(game) => game.status,
            None => return not_found(id),
        },
    };

    match state
        .store
        .update_score(id, body.home_score, body.away_score, &status)
    {
        Ok(updated) => {
            state.broadcaster.score_updated(&updated).await;
            Json(updated).into_response()
        }
        Err(StoreError::GameNotFound(id)) => not_found(id),
    }
}

async fn add_play(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<NewPlay>,
) -> Response {
    match state.store.add_play(id, body) {
        Ok(play) => {
            state.broadcaster.play_event(&play).await;
            (StatusCode::CREATED, Json(play)).into_response()
        }
        Err(StoreError::GameNotFound(id)) => not_found(id),
    }
}

async fn weather(State(state): State<AppState>, Query(query): Query<WeatherQuery>) -> Response {
    state.weather.handle(query).await
}

#[derive(Debug, Deserialize)]
struct SubscribeRequest {
    email: String,
}

/// Accepts `local@domain.tld`: no whitespace, exactly one `@` with a
/// non-empty local part, and a domain with a dot that is neither its
/// first nor last character.
fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rfind('.') {
        Some(i) => i > 0 && i < domain.len() - 1,
        None => false,
    }
}

async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscribeRequest>,
) -> Response {
    let email = body.email.trim().to_string();
    if !is_valid_email(&email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "a valid email is required" })),
        )
            .into_response();
    }
    if state.subscriptions.exists(&email) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "error": "already subscribed" })),
        )
            .into_response();
    }
    let id = state.subscriptions.add(email);
    (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
}

/// Client-to-server group membership frames.
#[derive(Debug, Deserialize)]
struct ClientMessage {
    join: Option<String>,
    leave: Option<String>,
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state.hub))
}

async fn handle_socket(mut socket: WebSocket, hub: WsHub) {
    let (conn, mut rx) = hub.register();
    info!("ws client {conn} connected");

    loop {
        tokio::select! {
            incoming = socket.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(msg) = serde_json::from_str::<ClientMessage>(&text) {
                            if let Some(topic) = msg.join {
                                debug!("ws client {conn} joins {topic}");
                                hub.join(conn, &topic).await;
                            }
                            if let Some(topic) = msg.leave {
                                debug!("ws client {conn} leaves {topic}");
                                hub.leave(conn, &topic).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
            outgoing = rx.recv() => {
                match outgoing {
                    Some(frame) => {
                        if socket.send(Message::Text(frame.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    hub.unregister(conn);
    info!("ws client {conn} disconnected");
}

#[cfg(test)]
mod tests {
    use super::is_valid_email;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("fan@example.com"));
        assert!(is_valid_email("first.last@teams.example.co.uk"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("fan"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("fan@"));
        assert!(!is_valid_email("fan@.com"));
        assert!(!is_valid_email("fan@example."));
        assert!(!is_valid_email("fan@exa mple.com"));
        assert!(!is_valid_email("fan@one@two.com"));
    }
}
