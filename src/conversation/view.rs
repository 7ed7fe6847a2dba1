//! One character's conversation page: load, greet, send, reply.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::api::{ApiError, RemoteApiClient};
use crate::character::Character;
use crate::conversation::reply::ReplySource;
use crate::conversation::store::ConversationStore;
use crate::core::constants::FALLBACK_REPLY;
use crate::core::message::Message;
use crate::core::notice::Notifier;
use crate::core::session::Credentials;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    LoadingHistory,
    Idle,
    AwaitingReply,
}

/// Server-side history used to seed an empty conversation.
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn history(&self, character_id: &str) -> Result<Vec<Message>, ApiError>;
}

pub struct ApiHistory {
    api: RemoteApiClient,
    credentials: Credentials,
}

impl ApiHistory {
    pub fn new(api: RemoteApiClient, credentials: Credentials) -> Self {
        Self { api, credentials }
    }
}

#[async_trait]
impl HistorySource for ApiHistory {
    async fn history(&self, character_id: &str) -> Result<Vec<Message>, ApiError> {
        self.api
            .get_chat_history(&self.credentials, character_id)
            .await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// A reply is still outstanding.
    Busy,
    /// The counterpart's reply, already appended.
    Replied(Message),
    /// The reply failed; the apology was appended instead.
    Fallback(Message),
}

/// A user message that has been appended and is waiting for its reply.
#[derive(Debug)]
pub struct PendingTurn {
    text: String,
    history: Vec<Message>,
}

#[derive(Debug)]
pub struct ConversationView {
    character: Character,
    state: ViewState,
    notifier: Notifier,
}

impl ConversationView {
    pub fn new(character: Character, notifier: Notifier) -> Self {
        Self {
            character,
            state: ViewState::LoadingHistory,
            notifier,
        }
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn messages<'a>(&self, store: &'a mut ConversationStore) -> &'a [Message] {
        store.get_conversation(&self.character.id)
    }

    /// Load the stored conversation. An empty one is first seeded from
    /// `history` (when given), and failing that gets exactly one greeting.
    pub async fn mount(
        &mut self,
        store: &mut ConversationStore,
        history: Option<&dyn HistorySource>,
    ) {
        self.state = ViewState::LoadingHistory;
        let id = self.character.id.clone();

        if store.get_conversation(&id).is_empty() {
            if let Some(source) = history {
                match source.history(&id).await {
                    Ok(messages) => {
                        debug!(character = %id, count = messages.len(), "fetched chat history");
                        store.seed_conversation(&id, messages);
                    }
                    Err(err) => {
                        warn!(character = %id, error = %err, "chat history unavailable");
                        self.notifier.error("Error", "Failed to load chat history");
                    }
                }
            }
        }

        if store.get_conversation(&id).is_empty() {
            store.add_message(&id, Message::counterpart(&id, self.character.greeting()));
        }
        self.state = ViewState::Idle;
    }

    /// Append the user's message and move to [`ViewState::AwaitingReply`].
    ///
    /// Blank input yields [`SubmitOutcome::Ignored`]; input while a reply is
    /// outstanding yields [`SubmitOutcome::Busy`].
    pub fn begin_submit(
        &mut self,
        store: &mut ConversationStore,
        input: &str,
    ) -> Result<PendingTurn, SubmitOutcome> {
        if self.state == ViewState::AwaitingReply {
            return Err(SubmitOutcome::Busy);
        }
        if input.trim().is_empty() {
            return Err(SubmitOutcome::Ignored);
        }

        let id = &self.character.id;
        let history = store.get_conversation(id).to_vec();
        store.add_message(id, Message::user(id, input));
        self.state = ViewState::AwaitingReply;
        Ok(PendingTurn {
            text: input.to_string(),
            history,
        })
    }

    /// Ask `replies` for the answer and append it, or the apology on failure.
    pub async fn finish_submit(
        &mut self,
        store: &mut ConversationStore,
        replies: &dyn ReplySource,
        pending: PendingTurn,
    ) -> SubmitOutcome {
        let id = self.character.id.clone();
        let outcome = match replies
            .reply(&self.character, &pending.history, &pending.text)
            .await
        {
            Ok(reply) => {
                let message = Message::counterpart(&id, reply);
                store.add_message(&id, message.clone());
                SubmitOutcome::Replied(message)
            }
            Err(err) => {
                warn!(character = %id, error = %err, "reply failed");
                let message = Message::counterpart(&id, FALLBACK_REPLY);
                store.add_message(&id, message.clone());
                self.notifier.error("Error", "Failed to generate AI response");
                SubmitOutcome::Fallback(message)
            }
        };
        self.state = ViewState::Idle;
        outcome
    }

    pub async fn submit(
        &mut self,
        store: &mut ConversationStore,
        replies: &dyn ReplySource,
        input: &str,
    ) -> SubmitOutcome {
        match self.begin_submit(store, input) {
            Ok(pending) => self.finish_submit(store, replies, pending).await,
            Err(outcome) => outcome,
        }
    }
}
