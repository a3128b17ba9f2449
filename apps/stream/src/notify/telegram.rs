//! Telegram Bot API dispatcher.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::markup::board_keyboard;
use super::{BoardUpdate, NotificationDispatcher};
use crate::error::AppError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const TURN_ALERT_TEXT: &str = "Your turn";

/// Envelope of every Bot API answer.
#[derive(Debug, Deserialize)]
struct ApiReply<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Clone)]
pub struct TelegramDispatcher {
    http: reqwest::Client,
    /// `{api}/bot{token}`
    endpoint: String,
}

// The endpoint embeds the bot token.
impl std::fmt::Debug for TelegramDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramDispatcher").finish_non_exhaustive()
    }
}

impl TelegramDispatcher {
    pub fn new(api_url: &str, bot_token: &str) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::notification_failed("failed to build telegram client", e))?;
        Ok(Self {
            http,
            endpoint: format!("{api_url}/bot{bot_token}"),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
    ) -> Result<ApiReply<T>, AppError> {
        let response = self
            .http
            .post(format!("{}/{method}", self.endpoint))
            .json(body)
            .send()
            .await
            // The URL carries the bot token.
            .map_err(|e| AppError::notification_failed(format!("{method} failed"), e.without_url()))?;

        response
            .json::<ApiReply<T>>()
            .await
            .map_err(|e| AppError::notification_failed(format!("{method} answer unreadable"), e.without_url()))
    }

    async fn edit(&self, method: &str, body: Value) -> Result<(), AppError> {
        let reply = self.call::<Value>(method, &body).await?;
        accept_edit(method, reply)
    }
}

/// Edits succeed when Telegram applied them or when nothing changed.
fn accept_edit(method: &str, reply: ApiReply<Value>) -> Result<(), AppError> {
    if reply.ok {
        return Ok(());
    }
    let description = reply.description.unwrap_or_default();
    if description.contains("message is not modified") {
        debug!(method, "edit skipped by telegram: message is not modified");
        return Ok(());
    }
    Err(AppError::notification(format!(
        "{method} rejected: {description}"
    )))
}

fn initial_body(chat_id: i64, game_id: &str) -> Value {
    json!({
        "chat_id": chat_id,
        "text": format!("started game with id {game_id}"),
    })
}

fn edit_full_body(update: &BoardUpdate, header: &str) -> Value {
    json!({
        "chat_id": update.chat_id,
        "message_id": update.message_ref,
        "text": header,
        "reply_markup": board_keyboard(&update.snapshot, update.rotate),
    })
}

fn edit_markup_body(update: &BoardUpdate) -> Value {
    json!({
        "chat_id": update.chat_id,
        "message_id": update.message_ref,
        "reply_markup": board_keyboard(&update.snapshot, update.rotate),
    })
}

fn turn_alert_body(chat_id: i64, message_ref: i64) -> Value {
    json!({
        "chat_id": chat_id,
        "text": TURN_ALERT_TEXT,
        "reply_to_message_id": message_ref,
    })
}

#[async_trait]
impl NotificationDispatcher for TelegramDispatcher {
    async fn send_initial(&self, chat_id: i64, game_id: &str) -> Result<i64, AppError> {
        let reply = self
            .call::<SentMessage>("sendMessage", &initial_body(chat_id, game_id))
            .await?;
        match reply {
            ApiReply {
                ok: true,
                result: Some(sent),
                ..
            } => Ok(sent.message_id),
            ApiReply { description, .. } => Err(AppError::notification(format!(
                "sendMessage rejected: {}",
                description.unwrap_or_default()
            ))),
        }
    }

    async fn edit_full(&self, update: &BoardUpdate, header: &str) -> Result<(), AppError> {
        self.edit("editMessageText", edit_full_body(update, header))
            .await
    }

    async fn edit_board_only(&self, update: &BoardUpdate) -> Result<(), AppError> {
        self.edit("editMessageReplyMarkup", edit_markup_body(update))
            .await
    }

    async fn send_turn_alert(&self, chat_id: i64, message_ref: i64) -> Result<(), AppError> {
        let reply = self
            .call::<Value>("sendMessage", &turn_alert_body(chat_id, message_ref))
            .await?;
        if reply.ok {
            Ok(())
        } else {
            Err(AppError::notification(format!(
                "turn alert rejected: {}",
                reply.description.unwrap_or_default()
            )))
        }
    }
}
