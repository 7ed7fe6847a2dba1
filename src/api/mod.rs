//! Client for the chat API: account registration, login, chat turns, and
//! stored history.
//!
//! Every call is a single request/response with no retry. Failures carry
//! the backend's own message so the shell can show it verbatim.

pub mod models;

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::api::models::{
    ChatRequest, ChatResponse, HistoryEntry, HistoryRequest, LoginEnvelope, LoginForm,
    LoginResponse, SignupPayload,
};
use crate::core::message::{Message, Sender};
use crate::core::session::Credentials;
use crate::utils::url::construct_api_url;

#[derive(Debug)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    Transport(reqwest::Error),
    /// The backend answered with a non-2xx status.
    Status { status: u16, message: String },
    /// The backend answered 2xx with a body we could not interpret.
    Decode(String),
}

impl ApiError {
    /// Bad credentials, as opposed to an unreachable or failing backend.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Status { status: 400 | 401 | 403, .. })
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Transport(err) => err.to_string(),
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Decode(message) => message.clone(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Transport(err) => write!(f, "Could not reach the chat API: {err}"),
            ApiError::Status { status, message } => {
                write!(f, "Chat API error ({status}): {message}")
            }
            ApiError::Decode(message) => write!(f, "Unexpected chat API response: {message}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err)
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// FastAPI-style backends put it under `detail` (string or structured);
/// other services use `message` or `error`. Anything else is passed through.
pub fn extract_backend_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty response>".to_string();
    }

    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return trimmed.to_string();
    };

    let summary = ["detail", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key))
        .map(|found| match found {
            serde_json::Value::String(text) => text.clone(),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.get("msg")
                        .and_then(|msg| msg.as_str())
                        .map(str::to_owned)
                        .unwrap_or_else(|| item.to_string())
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => other
                .get("message")
                .and_then(|msg| msg.as_str())
                .map(str::to_owned)
                .unwrap_or_else(|| other.to_string()),
        });

    summary
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Rebuild typed messages from a history listing.
///
/// The backend stores turns without an author, so senders alternate starting
/// with the user. Timestamps are synthesized one minute apart from `start`.
pub fn convert_history(
    entries: Vec<HistoryEntry>,
    character_id: &str,
    start: DateTime<Utc>,
) -> Vec<Message> {
    let mut sender = Sender::User;
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let message = Message {
                id: entry.id_string(),
                content: entry.message,
                sender,
                timestamp: start + chrono::Duration::minutes(index as i64),
                character_id: character_id.to_string(),
            };
            sender = sender.flipped();
            message
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct RemoteApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        construct_api_url(&self.base_url, endpoint)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = extract_backend_message(&body);
        warn!(status = status.as_u16(), %message, "chat API request failed");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn signup(&self, username: &str, password: &str, image: &str) -> Result<(), ApiError> {
        debug!(username, "registering account");
        let response = self
            .client
            .post(self.url("register"))
            .json(&SignupPayload {
                username,
                password,
                image,
            })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        debug!(username, "logging in");
        let response = self
            .client
            .post(self.url("login"))
            .form(&LoginForm { username, password })
            .send()
            .await?;
        let envelope: LoginEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.response)
    }

    pub async fn send_chat(
        &self,
        character_id: &str,
        credentials: &Credentials,
        message: &str,
    ) -> Result<String, ApiError> {
        debug!(character_id, "sending chat turn");
        let response = self
            .client
            .post(self.url("chat"))
            .json(&ChatRequest {
                ai_character_id: character_id,
                message,
                username: &credentials.username,
                password: &credentials.password,
            })
            .send()
            .await?;
        let reply: ChatResponse = Self::check(response).await?.json().await?;
        Ok(reply.response.unwrap_or_default())
    }

    pub async fn get_chat_history(
        &self,
        credentials: &Credentials,
        character_id: &str,
    ) -> Result<Vec<Message>, ApiError> {
        debug!(character_id, "fetching chat history");
        let response = self
            .client
            .post(self.url("history"))
            .json(&HistoryRequest {
                ai_id: character_id,
                username: &credentials.username,
                password: &credentials.password,
            })
            .send()
            .await?;
        let entries: Vec<HistoryEntry> = Self::check(response).await?.json().await?;
        Ok(convert_history(entries, character_id, Utc::now()))
    }
}

#[cfg(test)]
mod tests;
