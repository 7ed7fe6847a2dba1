//! Conversations: storage, synchronization, and the chat view.

pub mod local;
pub mod mirror;
pub mod remote;
pub mod reply;
pub mod store;
pub mod typing;
pub mod view;

use std::path::PathBuf;

use crate::backend::BackendError;

pub use local::LocalMirror;
pub use remote::{
    ConversationRepository, MemoryConversationRepository, SupabaseConversationRepository,
};
pub use reply::{ApiReplies, EdgeFunctionReplies, ReplyError, ReplySource};
pub use store::ConversationStore;
pub use typing::TypingReveal;
pub use view::{ApiHistory, ConversationView, HistorySource, SubmitOutcome, ViewState};

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Corrupt {
        path: PathBuf,
        message: String,
    },
    Remote(BackendError),
    WorkerStopped,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io { path, source } => {
                write!(f, "Failed to access {}: {source}", path.display())
            }
            StoreError::Corrupt { path, message } => {
                write!(f, "Unreadable conversation file {}: {message}", path.display())
            }
            StoreError::Remote(err) => write!(f, "{err}"),
            StoreError::WorkerStopped => write!(f, "Conversation sync worker is not running"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io { source, .. } => Some(source),
            StoreError::Remote(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BackendError> for StoreError {
    fn from(err: BackendError) -> Self {
        StoreError::Remote(err)
    }
}
