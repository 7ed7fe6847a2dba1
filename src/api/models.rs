use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::session::UserId;

#[derive(Serialize)]
pub struct SignupPayload<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub image: &'a str,
}

#[derive(Serialize)]
pub struct LoginForm<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
pub struct LoginEnvelope {
    pub response: LoginResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub username: String,
    pub user_id: UserId,
}

#[derive(Serialize)]
pub struct ChatRequest<'a> {
    pub ai_character_id: &'a str,
    pub message: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
}

#[derive(Serialize)]
pub struct HistoryRequest<'a> {
    pub ai_id: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

/// One stored turn as the history endpoint returns it. The backend does not
/// say who wrote it; see [`crate::api::convert_history`].
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    pub id: Value,
    pub message: String,
}

impl HistoryEntry {
    /// Ids arrive as numbers or strings depending on the backend version.
    pub fn id_string(&self) -> String {
        match &self.id {
            Value::String(id) => id.clone(),
            other => other.to_string(),
        }
    }
}
