//! Application context: the session, the character directory and the
//! conversation store, wired together from injected services.

use std::error::Error;
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::RemoteApiClient;
use crate::auth::{AuthError, CredentialStore, FileCredentialStore, SessionManager};
use crate::backend::{SupabaseClient, SupabaseConfig};
use crate::character::{
    Character, CharacterDirectory, CharacterDraft, CharacterError, CharacterRepository,
    SupabaseCharacterRepository,
};
use crate::conversation::{
    ApiHistory, ApiReplies, ConversationRepository, ConversationStore, ConversationView,
    EdgeFunctionReplies, HistorySource, LocalMirror, ReplySource, StoreError,
    SupabaseConversationRepository,
};
use crate::core::config::data::{Config, ReplyBackend};
use crate::core::config::io::{config_dir, data_dir};
use crate::core::notice::Notifier;
use crate::core::session::{Credentials, Session};
use crate::utils::url::normalize_base_url;

/// Everything [`AppContext`] depends on. Tests fill this with in-memory
/// doubles; [`AppServices::from_config`] builds the real ones.
pub struct AppServices {
    pub api: RemoteApiClient,
    pub credentials: Arc<dyn CredentialStore>,
    pub characters: Option<Arc<dyn CharacterRepository>>,
    pub conversations: Option<Arc<dyn ConversationRepository>>,
    /// Replaces the chat API as the reply source when set.
    pub replies: Option<Arc<dyn ReplySource>>,
    pub local: LocalMirror,
}

impl AppServices {
    pub fn from_config(config: &Config) -> Result<Self, Box<dyn Error>> {
        let timeout = config.request_timeout();
        let api = RemoteApiClient::new(&normalize_base_url(&config.api_base_url()), timeout)?;

        let supabase = match config.backend_settings() {
            Some(settings) => Some(SupabaseClient::new(
                SupabaseConfig::new(normalize_base_url(&settings.url), settings.anon_key),
                timeout,
            )?),
            None => None,
        };

        let replies: Option<Arc<dyn ReplySource>> =
            match (config.effective_reply_backend(), &supabase) {
                (ReplyBackend::EdgeFunction, Some(client)) => {
                    Some(Arc::new(EdgeFunctionReplies::new(client.clone())))
                }
                (ReplyBackend::EdgeFunction, None) => {
                    warn!("edge-function replies need a data backend; using the chat API");
                    None
                }
                (ReplyBackend::Api, _) => None,
            };

        let characters = supabase.clone().map(|client| {
            Arc::new(SupabaseCharacterRepository::new(client)) as Arc<dyn CharacterRepository>
        });
        let conversations = supabase.map(|client| {
            Arc::new(SupabaseConversationRepository::new(client)) as Arc<dyn ConversationRepository>
        });

        Ok(Self {
            api,
            credentials: Arc::new(FileCredentialStore::in_dir(&config_dir())),
            characters,
            conversations,
            replies,
            local: LocalMirror::new(data_dir()),
        })
    }
}

pub struct AppContext {
    sessions: SessionManager,
    characters: CharacterDirectory,
    conversations: ConversationStore,
    replies: Option<Arc<dyn ReplySource>>,
    notifier: Notifier,
}

impl AppContext {
    /// Must be called inside a tokio runtime when a conversation repository
    /// is configured, since its mirror worker is spawned here.
    pub fn new(services: AppServices, notifier: Notifier) -> Self {
        let sessions = SessionManager::restore(services.credentials, services.api);
        let mut conversations =
            ConversationStore::new(services.local, services.conversations, notifier.clone());
        conversations.set_session(sessions.current().cloned());
        Self {
            sessions,
            characters: CharacterDirectory::new(services.characters),
            conversations,
            replies: services.replies,
            notifier,
        }
    }

    /// Load remote state for a restored session. Failures become notices.
    pub async fn start(&mut self) {
        if self.sessions.current().is_some() {
            self.sync_session().await;
        }
    }

    async fn sync_session(&mut self) {
        let _ = self.conversations.fetch_conversations().await;
        let _ = self.refresh_characters().await;
    }

    pub fn session(&self) -> Option<&Session> {
        self.sessions.current()
    }

    pub fn credentials(&self) -> Result<Option<Credentials>, AuthError> {
        self.sessions.credentials()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn characters(&self) -> &CharacterDirectory {
        &self.characters
    }

    pub fn conversations(&mut self) -> &mut ConversationStore {
        &mut self.conversations
    }

    /// Log in, then pull the user's conversations and characters. A failed
    /// login leaves the previous session in place.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Session, AuthError> {
        match self.sessions.login(username, password).await {
            Ok(session) => {
                self.conversations.set_session(Some(session.clone()));
                self.sync_session().await;
                self.notifier.success("Success!", "Logged in successfully.");
                Ok(session)
            }
            Err(err) => {
                self.notifier.error("Error", err.to_string());
                Err(err)
            }
        }
    }

    pub async fn register(
        &mut self,
        username: &str,
        password: &str,
        image: &str,
    ) -> Result<(), AuthError> {
        match self.sessions.register(username, password, image).await {
            Ok(()) => {
                self.notifier
                    .success("Success!", "Account created successfully.");
                Ok(())
            }
            Err(err) => {
                self.notifier.error("Error", err.to_string());
                Err(err)
            }
        }
    }

    /// Sign out. Pending remote writes are flushed first; local
    /// conversation files stay on disk.
    pub async fn logout(&mut self) -> Result<(), AuthError> {
        self.conversations.flush().await;
        self.sessions.logout()?;
        self.conversations.set_session(None);
        let _ = self.characters.refresh(None).await;
        Ok(())
    }

    pub async fn refresh_characters(&mut self) -> Result<(), CharacterError> {
        let result = self.characters.refresh(self.sessions.current()).await;
        if let Err(err) = &result {
            warn!(error = %err, "refreshing characters failed");
            self.notifier.error("Error", "Failed to load your characters");
        }
        result
    }

    pub async fn create_character(
        &mut self,
        draft: &CharacterDraft,
    ) -> Result<Character, CharacterError> {
        match self.characters.create(self.sessions.current(), draft).await {
            Ok(character) => {
                self.notifier.success(
                    "Character created",
                    format!("{} has been created successfully", character.name),
                );
                Ok(character)
            }
            Err(err) => {
                self.report_character_error("Failed to create character", &err);
                Err(err)
            }
        }
    }

    pub async fn update_character(
        &mut self,
        id: &str,
        draft: &CharacterDraft,
    ) -> Result<Character, CharacterError> {
        match self
            .characters
            .update(self.sessions.current(), id, draft)
            .await
        {
            Ok(character) => {
                self.notifier.success(
                    "Character updated",
                    format!("{} has been updated successfully", character.name),
                );
                Ok(character)
            }
            Err(err) => {
                self.report_character_error("Failed to update character", &err);
                Err(err)
            }
        }
    }

    /// Delete a custom character and everything said to it.
    pub async fn delete_character(&mut self, id: &str) -> Result<(), CharacterError> {
        if let Err(err) = self.characters.delete(self.sessions.current(), id).await {
            self.report_character_error("Failed to delete character", &err);
            return Err(err);
        }
        if let Err(err) = self.conversations.discard_conversation(id).await {
            warn!(id, error = %err, "character deleted but its remote conversation remains");
        }
        info!(id, "character deleted");
        self.notifier
            .success("Character deleted", "Character has been removed successfully");
        Ok(())
    }

    fn report_character_error(&self, fallback: &str, err: &CharacterError) {
        match err {
            CharacterError::AuthRequired => self
                .notifier
                .error("Authentication required", err.to_string()),
            CharacterError::Validation(_) => {
                self.notifier.error("Missing information", err.to_string())
            }
            CharacterError::Backend(_) => self.notifier.error("Error", fallback),
            _ => self.notifier.error("Error", err.to_string()),
        }
    }

    pub async fn clear_conversation(&mut self, character_id: &str) -> Result<(), StoreError> {
        self.conversations.clear_conversation(character_id).await?;
        self.notifier
            .success("Conversation cleared", "Your conversation has been deleted");
        Ok(())
    }

    pub async fn resolve_character(&self, id: &str) -> Result<Character, CharacterError> {
        self.characters.resolve(self.sessions.current(), id).await
    }

    /// Resolve `character_id` and mount a view over its conversation.
    pub async fn open_conversation(
        &mut self,
        character_id: &str,
    ) -> Result<ConversationView, CharacterError> {
        let character = self.resolve_character(character_id).await?;
        let history = self.history_source();
        let mut view = ConversationView::new(character, self.notifier.clone());
        view.mount(
            &mut self.conversations,
            history.as_ref().map(|source| source as &dyn HistorySource),
        )
        .await;
        Ok(view)
    }

    fn session_credentials(&self) -> Option<Credentials> {
        match self.sessions.credentials() {
            Ok(credentials) => credentials,
            Err(err) => {
                warn!(error = %err, "could not read stored credentials");
                None
            }
        }
    }

    fn history_source(&self) -> Option<ApiHistory> {
        self.session_credentials()
            .map(|credentials| ApiHistory::new(self.sessions.api().clone(), credentials))
    }

    /// The configured reply source, or the chat API with the session's
    /// credentials.
    pub fn reply_source(&self) -> Arc<dyn ReplySource> {
        match &self.replies {
            Some(replies) => replies.clone(),
            None => Arc::new(ApiReplies::new(
                self.sessions.api().clone(),
                self.session_credentials(),
            )),
        }
    }

    /// Wait for queued remote writes before exiting.
    pub async fn shutdown(&self) {
        self.conversations.flush().await;
    }
}
