//! Character directory: built-ins plus the signed-in user's own characters.
//!
//! This module provides the [`CharacterDirectory`], which merges the fixed
//! built-in list with a cached copy of the user's custom characters. The
//! custom list is only as fresh as the last [`refresh`](CharacterDirectory::refresh);
//! mutations update the cache in place after the repository accepts them.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::character::builtin::load_builtin_characters;
use crate::character::card::{Character, CharacterDraft, CharacterError};
use crate::character::repository::CharacterRepository;
use crate::core::session::{Session, UserId};
use crate::utils::url::looks_like_uuid;

/// Directory of characters available to the current user.
///
/// The repository is optional: without a data backend the directory still
/// serves the built-ins, while every custom-character operation reports
/// [`CharacterError::Unavailable`].
pub struct CharacterDirectory {
    builtin: Vec<Character>,
    user_characters: Vec<Character>,
    repository: Option<Arc<dyn CharacterRepository>>,
}

impl CharacterDirectory {
    pub fn new(repository: Option<Arc<dyn CharacterRepository>>) -> Self {
        Self {
            builtin: load_builtin_characters(),
            user_characters: Vec::new(),
            repository,
        }
    }

    pub fn builtin(&self) -> &[Character] {
        &self.builtin
    }

    /// Custom characters as of the last refresh.
    pub fn user_characters(&self) -> &[Character] {
        &self.user_characters
    }

    pub fn has_repository(&self) -> bool {
        self.repository.is_some()
    }

    /// Look a character up among the built-ins and the cached custom list
    /// without touching the network.
    pub fn find_cached(&self, id: &str) -> Option<&Character> {
        self.builtin
            .iter()
            .chain(self.user_characters.iter())
            .find(|character| character.id == id)
    }

    /// Reloads the custom list for `session`.
    ///
    /// Signed out (or with no backend), the list is simply emptied. On a
    /// backend failure the previous list is kept and the error returned.
    pub async fn refresh(&mut self, session: Option<&Session>) -> Result<(), CharacterError> {
        let (Some(session), Some(repository)) = (session, self.repository.as_ref()) else {
            self.user_characters.clear();
            return Ok(());
        };
        let characters = repository.list(session.user_id).await?;
        debug!(count = characters.len(), "loaded custom characters");
        self.user_characters = characters;
        Ok(())
    }

    /// Creates a custom character owned by the signed-in user.
    ///
    /// # Errors
    ///
    /// - [`CharacterError::AuthRequired`] without a session
    /// - [`CharacterError::Validation`] when name, description or personality
    ///   is blank
    /// - [`CharacterError::Unavailable`] without a data backend
    pub async fn create(
        &mut self,
        session: Option<&Session>,
        draft: &CharacterDraft,
    ) -> Result<Character, CharacterError> {
        let owner = Self::owner(session)?;
        let draft = draft.validate()?;
        let repository = self.repository()?;
        let character = repository.create(owner, &draft).await?;
        self.user_characters.push(character.clone());
        Ok(character)
    }

    /// Rewrites name, description, personality and image of a custom
    /// character. Built-ins are rejected with [`CharacterError::ReadOnly`].
    pub async fn update(
        &mut self,
        session: Option<&Session>,
        id: &str,
        draft: &CharacterDraft,
    ) -> Result<Character, CharacterError> {
        let owner = Self::owner(session)?;
        if self.builtin.iter().any(|character| character.id == id) {
            return Err(CharacterError::ReadOnly(id.to_string()));
        }
        let draft = draft.validate()?;
        let repository = self.repository()?;
        if !repository.update(owner, id, &draft).await? {
            return Err(CharacterError::NotFound(id.to_string()));
        }

        let character = draft.into_character(id, owner);
        match self.user_characters.iter_mut().find(|c| c.id == id) {
            Some(existing) => *existing = character.clone(),
            None => self.user_characters.push(character.clone()),
        }
        Ok(character)
    }

    /// Deletes a custom character row. Clearing the matching conversation
    /// is left to the caller, which owns the conversation store.
    pub async fn delete(&mut self, session: Option<&Session>, id: &str) -> Result<(), CharacterError> {
        let owner = Self::owner(session)?;
        if self.builtin.iter().any(|character| character.id == id) {
            return Err(CharacterError::ReadOnly(id.to_string()));
        }
        let repository = self.repository()?;
        repository.delete(owner, id).await?;
        self.user_characters.retain(|character| character.id != id);
        Ok(())
    }

    /// Resolves a character id for the conversation page.
    ///
    /// Lookup order: built-ins, the cached custom list, then (for UUID-shaped
    /// ids with a session) a direct repository lookup. A failing remote
    /// lookup is logged and reported as not found.
    pub async fn resolve(
        &self,
        session: Option<&Session>,
        id: &str,
    ) -> Result<Character, CharacterError> {
        if let Some(character) = self.find_cached(id) {
            return Ok(character.clone());
        }

        if let (Some(session), Some(repository)) = (session, self.repository.as_ref()) {
            if looks_like_uuid(id) {
                match repository.get(session.user_id, id).await {
                    Ok(Some(character)) => return Ok(character),
                    Ok(None) => {}
                    Err(err) => warn!(id, error = %err, "remote character lookup failed"),
                }
            }
        }

        Err(CharacterError::NotFound(id.to_string()))
    }

    fn owner(session: Option<&Session>) -> Result<UserId, CharacterError> {
        session
            .map(|session| session.user_id)
            .ok_or(CharacterError::AuthRequired)
    }

    fn repository(&self) -> Result<&Arc<dyn CharacterRepository>, CharacterError> {
        self.repository.as_ref().ok_or(CharacterError::Unavailable)
    }
}

#[cfg(test)]
mod tests;
