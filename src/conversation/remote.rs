//! Per-user conversation rows in the data backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::backend::supabase::eq;
use crate::backend::{BackendError, SupabaseClient};
use crate::core::message::Message;
use crate::core::session::UserId;

pub const CONVERSATIONS_TABLE: &str = "conversations";

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Every stored conversation for `owner`, keyed by character id.
    async fn fetch_all(&self, owner: UserId) -> Result<HashMap<String, Vec<Message>>, BackendError>;

    /// Store the full message list, replacing whatever was there.
    async fn save(
        &self,
        owner: UserId,
        character_id: &str,
        messages: &[Message],
    ) -> Result<(), BackendError>;

    async fn delete(&self, owner: UserId, character_id: &str) -> Result<(), BackendError>;
}

#[derive(Debug, Deserialize)]
struct ConversationRow {
    character_id: String,
    #[serde(default)]
    messages: Value,
}

#[derive(Debug, Deserialize)]
struct ConversationIdRow {
    id: Value,
}

#[derive(Serialize)]
struct NewConversationRow<'a> {
    user_id: UserId,
    character_id: &'a str,
    messages: &'a [Message],
}

#[derive(Serialize)]
struct ConversationPatch<'a> {
    messages: &'a [Message],
    updated_at: String,
}

/// Decode a stored `messages` column, skipping entries that no longer parse.
fn decode_messages(character_id: &str, value: Value) -> Vec<Message> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Message>(item) {
            Ok(mut message) => {
                if message.character_id.is_empty() {
                    message.character_id = character_id.to_string();
                }
                Some(message)
            }
            Err(err) => {
                warn!(character_id, error = %err, "skipping unreadable stored message");
                None
            }
        })
        .collect()
}

fn id_filter_value(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub struct SupabaseConversationRepository {
    client: SupabaseClient,
}

impl SupabaseConversationRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConversationRepository for SupabaseConversationRepository {
    async fn fetch_all(&self, owner: UserId) -> Result<HashMap<String, Vec<Message>>, BackendError> {
        let rows: Vec<ConversationRow> = self
            .client
            .select(CONVERSATIONS_TABLE, &[eq("user_id", owner)])
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let messages = decode_messages(&row.character_id, row.messages);
                (row.character_id, messages)
            })
            .collect())
    }

    async fn save(
        &self,
        owner: UserId,
        character_id: &str,
        messages: &[Message],
    ) -> Result<(), BackendError> {
        let existing: Vec<ConversationIdRow> = self
            .client
            .select(
                CONVERSATIONS_TABLE,
                &[eq("user_id", owner), eq("character_id", character_id)],
            )
            .await?;

        match existing.first() {
            Some(row) => {
                self.client
                    .update(
                        CONVERSATIONS_TABLE,
                        &[eq("id", id_filter_value(&row.id))],
                        &ConversationPatch {
                            messages,
                            updated_at: Utc::now().to_rfc3339(),
                        },
                    )
                    .await?;
            }
            None => {
                let _: Value = self
                    .client
                    .insert(
                        CONVERSATIONS_TABLE,
                        &NewConversationRow {
                            user_id: owner,
                            character_id,
                            messages,
                        },
                    )
                    .await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, owner: UserId, character_id: &str) -> Result<(), BackendError> {
        self.client
            .delete(
                CONVERSATIONS_TABLE,
                &[eq("user_id", owner), eq("character_id", character_id)],
            )
            .await
    }
}

/// In-process repository. `set_failing(true)` makes every call fail, for
/// exercising error paths.
#[derive(Default)]
pub struct MemoryConversationRepository {
    rows: Mutex<HashMap<(UserId, String), Vec<Message>>>,
    failing: AtomicBool,
    saves: Mutex<Vec<(UserId, String, usize)>>,
}

impl MemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Stored copy of one conversation.
    pub fn stored(&self, owner: UserId, character_id: &str) -> Option<Vec<Message>> {
        self.rows()
            .get(&(owner, character_id.to_string()))
            .cloned()
    }

    /// `(owner, character, message count)` for every save, in arrival order.
    pub fn save_log(&self) -> Vec<(UserId, String, usize)> {
        self.saves
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn rows(&self) -> std::sync::MutexGuard<'_, HashMap<(UserId, String), Vec<Message>>> {
        self.rows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn check(&self) -> Result<(), BackendError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(BackendError::Status {
                status: 503,
                body: "backend unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ConversationRepository for MemoryConversationRepository {
    async fn fetch_all(&self, owner: UserId) -> Result<HashMap<String, Vec<Message>>, BackendError> {
        self.check()?;
        Ok(self
            .rows()
            .iter()
            .filter(|((row_owner, _), _)| *row_owner == owner)
            .map(|((_, character_id), messages)| (character_id.clone(), messages.clone()))
            .collect())
    }

    async fn save(
        &self,
        owner: UserId,
        character_id: &str,
        messages: &[Message],
    ) -> Result<(), BackendError> {
        self.check()?;
        self.rows()
            .insert((owner, character_id.to_string()), messages.to_vec());
        self.saves
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((owner, character_id.to_string(), messages.len()));
        Ok(())
    }

    async fn delete(&self, owner: UserId, character_id: &str) -> Result<(), BackendError> {
        self.check()?;
        self.rows().remove(&(owner, character_id.to_string()));
        Ok(())
    }
}
