//! Persistence for user-owned characters.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::backend::supabase::eq;
use crate::backend::{BackendError, SupabaseClient};
use crate::character::card::{Character, CharacterDraft, CharacterOrigin};
use crate::core::constants::DEFAULT_CHARACTER_IMAGE_URL;
use crate::core::session::UserId;

pub const CHARACTERS_TABLE: &str = "characters";

#[async_trait]
pub trait CharacterRepository: Send + Sync {
    async fn list(&self, owner: UserId) -> Result<Vec<Character>, BackendError>;

    async fn get(&self, owner: UserId, id: &str) -> Result<Option<Character>, BackendError>;

    async fn create(&self, owner: UserId, draft: &CharacterDraft) -> Result<Character, BackendError>;

    /// Returns `false` when no row matched (wrong id or owner).
    async fn update(
        &self,
        owner: UserId,
        id: &str,
        draft: &CharacterDraft,
    ) -> Result<bool, BackendError>;

    async fn delete(&self, owner: UserId, id: &str) -> Result<(), BackendError>;
}

#[derive(Debug, Deserialize)]
struct CharacterRow {
    id: String,
    user_id: UserId,
    name: String,
    description: String,
    personality: String,
    #[serde(default)]
    image_url: Option<String>,
}

impl From<CharacterRow> for Character {
    fn from(row: CharacterRow) -> Self {
        Character {
            id: row.id,
            name: row.name,
            description: row.description,
            personality: row.personality,
            image_url: row
                .image_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CHARACTER_IMAGE_URL.to_string()),
            origin: CharacterOrigin::UserOwned(row.user_id),
        }
    }
}

#[derive(Serialize)]
struct NewCharacterRow<'a> {
    user_id: UserId,
    name: &'a str,
    description: &'a str,
    personality: &'a str,
    image_url: &'a str,
}

#[derive(Serialize)]
struct CharacterPatch<'a> {
    name: &'a str,
    description: &'a str,
    personality: &'a str,
    image_url: &'a str,
    updated_at: String,
}

/// `characters` table behind PostgREST.
pub struct SupabaseCharacterRepository {
    client: SupabaseClient,
}

impl SupabaseCharacterRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CharacterRepository for SupabaseCharacterRepository {
    async fn list(&self, owner: UserId) -> Result<Vec<Character>, BackendError> {
        let rows: Vec<CharacterRow> = self
            .client
            .select(CHARACTERS_TABLE, &[eq("user_id", owner)])
            .await?;
        Ok(rows.into_iter().map(Character::from).collect())
    }

    async fn get(&self, owner: UserId, id: &str) -> Result<Option<Character>, BackendError> {
        let rows: Vec<CharacterRow> = self
            .client
            .select(CHARACTERS_TABLE, &[eq("id", id), eq("user_id", owner)])
            .await?;
        Ok(rows.into_iter().next().map(Character::from))
    }

    async fn create(&self, owner: UserId, draft: &CharacterDraft) -> Result<Character, BackendError> {
        let row: CharacterRow = self
            .client
            .insert(
                CHARACTERS_TABLE,
                &NewCharacterRow {
                    user_id: owner,
                    name: &draft.name,
                    description: &draft.description,
                    personality: &draft.personality,
                    image_url: &draft.image_url,
                },
            )
            .await?;
        Ok(row.into())
    }

    async fn update(
        &self,
        owner: UserId,
        id: &str,
        draft: &CharacterDraft,
    ) -> Result<bool, BackendError> {
        let changed = self
            .client
            .update(
                CHARACTERS_TABLE,
                &[eq("id", id), eq("user_id", owner)],
                &CharacterPatch {
                    name: &draft.name,
                    description: &draft.description,
                    personality: &draft.personality,
                    image_url: &draft.image_url,
                    updated_at: Utc::now().to_rfc3339(),
                },
            )
            .await?;
        Ok(changed > 0)
    }

    async fn delete(&self, owner: UserId, id: &str) -> Result<(), BackendError> {
        self.client
            .delete(CHARACTERS_TABLE, &[eq("id", id), eq("user_id", owner)])
            .await
    }
}

/// In-process repository; ids are fresh UUIDs like the hosted backend's.
#[derive(Default)]
pub struct MemoryCharacterRepository {
    rows: Mutex<Vec<Character>>,
}

impl MemoryCharacterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> std::sync::MutexGuard<'_, Vec<Character>> {
        self.rows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl CharacterRepository for MemoryCharacterRepository {
    async fn list(&self, owner: UserId) -> Result<Vec<Character>, BackendError> {
        Ok(self
            .rows()
            .iter()
            .filter(|character| character.owner() == Some(owner))
            .cloned()
            .collect())
    }

    async fn get(&self, owner: UserId, id: &str) -> Result<Option<Character>, BackendError> {
        Ok(self
            .rows()
            .iter()
            .find(|character| character.id == id && character.owner() == Some(owner))
            .cloned())
    }

    async fn create(&self, owner: UserId, draft: &CharacterDraft) -> Result<Character, BackendError> {
        let character = draft
            .clone()
            .into_character(uuid::Uuid::new_v4().to_string(), owner);
        self.rows().push(character.clone());
        Ok(character)
    }

    async fn update(
        &self,
        owner: UserId,
        id: &str,
        draft: &CharacterDraft,
    ) -> Result<bool, BackendError> {
        let mut rows = self.rows();
        match rows
            .iter_mut()
            .find(|character| character.id == id && character.owner() == Some(owner))
        {
            Some(existing) => {
                *existing = draft.clone().into_character(id, owner);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, owner: UserId, id: &str) -> Result<(), BackendError> {
        self.rows()
            .retain(|character| !(character.id == id && character.owner() == Some(owner)));
        Ok(())
    }
}
