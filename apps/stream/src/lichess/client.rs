//! HTTP access to the lichess streaming endpoints.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::events::{AccountEvent, GameEvent};
use super::ndjson;
use crate::error::AppError;

/// Decoded events of one long-lived feed. The stream ends when the server
/// closes the connection; an `Err` item means the transport broke.
pub type EventStream<T> = BoxStream<'static, Result<T, AppError>>;

/// Source of account and game feeds.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn account_events(&self, token: &str) -> Result<EventStream<AccountEvent>, AppError>;

    async fn game_events(
        &self,
        token: &str,
        game_id: &str,
    ) -> Result<EventStream<GameEvent>, AppError>;
}

/// Lichess sends a keep-alive newline every few seconds; a silence this
/// long means the connection is dead.
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct LichessClient {
    http: reqwest::Client,
    base_url: String,
}

impl LichessClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("lichess-tg-stream/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::upstream("failed to build lichess http client", e))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    async fn open<T>(&self, path: &str, token: &str) -> Result<EventStream<T>, AppError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header(ACCEPT, "application/x-ndjson")
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("request to {path} failed"), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream_rejected(format!(
                "{path} answered {status}"
            )));
        }
        debug!(path, "event stream opened");

        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(std::io::Error::other));
        let bytes = tokio_stream::StreamExt::timeout(bytes, IDLE_TIMEOUT).map(|item| match item {
            Ok(chunk) => chunk,
            Err(_) => Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "event stream went silent",
            )),
        });

        Ok(ndjson::decode_lines(bytes))
    }
}

/// Lichess game ids are short alphanumeric strings.
fn check_game_id(game_id: &str) -> Result<(), AppError> {
    if game_id.is_empty() || !game_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::decode(format!("invalid game id '{game_id}'")));
    }
    Ok(())
}

#[async_trait]
impl EventSource for LichessClient {
    async fn account_events(&self, token: &str) -> Result<EventStream<AccountEvent>, AppError> {
        self.open("/api/stream/event", token).await
    }

    async fn game_events(
        &self,
        token: &str,
        game_id: &str,
    ) -> Result<EventStream<GameEvent>, AppError> {
        check_game_id(game_id)?;
        self.open(&format!("/api/board/game/stream/{game_id}"), token)
            .await
    }
}
