//! In-memory conversations mirrored to disk and, with a session, to the
//! data backend.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::conversation::local::LocalMirror;
use crate::conversation::mirror::RemoteMirror;
use crate::conversation::remote::ConversationRepository;
use crate::conversation::StoreError;
use crate::core::message::Message;
use crate::core::notice::Notifier;
use crate::core::session::Session;

struct Remote {
    repository: Arc<dyn ConversationRepository>,
    mirror: RemoteMirror,
}

pub struct ConversationStore {
    conversations: HashMap<String, Vec<Message>>,
    local: LocalMirror,
    remote: Option<Remote>,
    session: Option<Session>,
    notifier: Notifier,
}

impl ConversationStore {
    /// Build a store. With a repository, a mirror worker is spawned on the
    /// current tokio runtime.
    pub fn new(
        local: LocalMirror,
        repository: Option<Arc<dyn ConversationRepository>>,
        notifier: Notifier,
    ) -> Self {
        let remote = repository.map(|repository| Remote {
            mirror: RemoteMirror::spawn(repository.clone(), notifier.clone()),
            repository,
        });
        Self {
            conversations: HashMap::new(),
            local,
            remote,
            session: None,
            notifier,
        }
    }

    pub fn set_session(&mut self, session: Option<Session>) {
        self.session = session;
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn local(&self) -> &LocalMirror {
        &self.local
    }

    /// Everything currently held in memory.
    pub fn conversations(&self) -> &HashMap<String, Vec<Message>> {
        &self.conversations
    }

    /// Messages for `character_id`: the cached list, else the local file
    /// (cached as a side effect), else nothing.
    pub fn get_conversation(&mut self, character_id: &str) -> &[Message] {
        self.ensure_loaded(character_id);
        self.conversations
            .get(character_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn ensure_loaded(&mut self, character_id: &str) {
        if self.conversations.contains_key(character_id) {
            return;
        }
        match self.local.load(character_id) {
            Ok(Some(messages)) => {
                debug!(character_id, count = messages.len(), "loaded local conversation");
                self.conversations
                    .insert(character_id.to_string(), messages);
            }
            Ok(None) => {}
            Err(err) => warn!(character_id, error = %err, "could not load local conversation"),
        }
    }

    /// Append one message. The full list is written to disk straight away
    /// and queued for the remote store when signed in; neither failure is
    /// returned to the caller.
    pub fn add_message(&mut self, character_id: &str, mut message: Message) {
        self.ensure_loaded(character_id);
        message.character_id = character_id.to_string();
        let conversation = self
            .conversations
            .entry(character_id.to_string())
            .or_default();
        conversation.push(message);
        let snapshot = conversation.clone();
        self.persist(character_id, snapshot);
    }

    /// Install `messages` as the conversation when none exists yet. Used to
    /// seed a fresh view from the chat API's history.
    pub fn seed_conversation(&mut self, character_id: &str, messages: Vec<Message>) -> bool {
        self.ensure_loaded(character_id);
        let is_empty = self
            .conversations
            .get(character_id)
            .is_none_or(|existing| existing.is_empty());
        if !is_empty || messages.is_empty() {
            return false;
        }
        let messages: Vec<Message> = messages
            .into_iter()
            .map(|mut message| {
                message.character_id = character_id.to_string();
                message
            })
            .collect();
        self.conversations
            .insert(character_id.to_string(), messages.clone());
        self.persist(character_id, messages);
        true
    }

    fn persist(&self, character_id: &str, messages: Vec<Message>) {
        if let Err(err) = self.local.save(character_id, &messages) {
            warn!(character_id, error = %err, "local save failed");
            self.notifier
                .error("Error", format!("Failed to save conversation locally: {err}"));
        }
        if let (Some(session), Some(remote)) = (&self.session, &self.remote) {
            if !remote.mirror.save(session.user_id, character_id, messages) {
                warn!(character_id, "conversation mirror is not running");
            }
        }
    }

    /// Replace every in-memory conversation with the signed-in user's remote
    /// rows. Last writer wins: local files are left alone, and anything only
    /// held locally drops out of memory until read from disk again.
    pub async fn fetch_conversations(&mut self) -> Result<(), StoreError> {
        let (Some(session), Some(remote)) = (&self.session, &self.remote) else {
            return Ok(());
        };
        remote.mirror.flush().await;
        match remote.repository.fetch_all(session.user_id).await {
            Ok(conversations) => {
                info!(count = conversations.len(), "fetched remote conversations");
                self.conversations = conversations;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "fetching conversations failed");
                self.notifier.error("Error", "Failed to load conversations");
                Err(err.into())
            }
        }
    }

    /// Forget a conversation everywhere. With a session the remote row goes
    /// first; if that fails, nothing local is touched.
    pub async fn clear_conversation(&mut self, character_id: &str) -> Result<(), StoreError> {
        self.delete_remote(character_id).await?;
        self.forget_locally(character_id);
        Ok(())
    }

    /// Drop a conversation from memory and disk unconditionally, then try
    /// the remote row. Used when its character no longer exists; a failed
    /// remote delete is reported but does not keep the thread around.
    pub async fn discard_conversation(&mut self, character_id: &str) -> Result<(), StoreError> {
        self.forget_locally(character_id);
        self.delete_remote(character_id).await
    }

    async fn delete_remote(&self, character_id: &str) -> Result<(), StoreError> {
        let (Some(session), Some(remote)) = (&self.session, &self.remote) else {
            return Ok(());
        };
        if let Err(err) = remote.mirror.delete(session.user_id, character_id).await {
            warn!(character_id, error = %err, "remote delete failed");
            self.notifier.error("Error", "Failed to clear conversation");
            return Err(err);
        }
        Ok(())
    }

    fn forget_locally(&mut self, character_id: &str) {
        self.conversations.remove(character_id);
        if let Err(err) = self.local.remove(character_id) {
            warn!(character_id, error = %err, "local delete failed");
        }
    }

    /// Wait for queued remote writes. Call before the runtime shuts down.
    pub async fn flush(&self) {
        if let Some(remote) = &self.remote {
            remote.mirror.flush().await;
        }
    }
}
