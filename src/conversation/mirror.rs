//! Ordered, fire-and-forget remote writes.
//!
//! Every remote mutation goes through one worker task so saves land in the
//! order they were issued. Saves report failures as notices; deletes and
//! flushes hand their outcome back over a oneshot.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::backend::BackendError;
use crate::conversation::remote::ConversationRepository;
use crate::conversation::StoreError;
use crate::core::message::Message;
use crate::core::notice::Notifier;
use crate::core::session::UserId;

enum MirrorCommand {
    Save {
        owner: UserId,
        character_id: String,
        messages: Vec<Message>,
    },
    Delete {
        owner: UserId,
        character_id: String,
        done: oneshot::Sender<Result<(), BackendError>>,
    },
    Flush {
        done: oneshot::Sender<()>,
    },
}

#[derive(Clone)]
pub struct RemoteMirror {
    tx: mpsc::UnboundedSender<MirrorCommand>,
}

impl RemoteMirror {
    /// Start the worker on the current tokio runtime. It exits once every
    /// handle has been dropped and the queue is drained.
    pub fn spawn(repository: Arc<dyn ConversationRepository>, notifier: Notifier) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(repository, notifier, rx));
        Self { tx }
    }

    pub fn save(&self, owner: UserId, character_id: &str, messages: Vec<Message>) -> bool {
        self.tx
            .send(MirrorCommand::Save {
                owner,
                character_id: character_id.to_string(),
                messages,
            })
            .is_ok()
    }

    /// Delete after every previously queued save has been applied.
    pub async fn delete(&self, owner: UserId, character_id: &str) -> Result<(), StoreError> {
        let (done, result) = oneshot::channel();
        self.tx
            .send(MirrorCommand::Delete {
                owner,
                character_id: character_id.to_string(),
                done,
            })
            .map_err(|_| StoreError::WorkerStopped)?;
        result
            .await
            .map_err(|_| StoreError::WorkerStopped)?
            .map_err(StoreError::Remote)
    }

    /// Wait until everything queued so far has reached the repository.
    pub async fn flush(&self) {
        let (done, finished) = oneshot::channel();
        if self.tx.send(MirrorCommand::Flush { done }).is_ok() {
            let _ = finished.await;
        }
    }
}

async fn run_worker(
    repository: Arc<dyn ConversationRepository>,
    notifier: Notifier,
    mut rx: mpsc::UnboundedReceiver<MirrorCommand>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            MirrorCommand::Save {
                owner,
                character_id,
                messages,
            } => {
                debug!(%character_id, count = messages.len(), "mirroring conversation");
                if let Err(err) = repository.save(owner, &character_id, &messages).await {
                    warn!(%character_id, error = %err, "remote save failed");
                    notifier.error("Error", "Failed to save conversation");
                }
            }
            MirrorCommand::Delete {
                owner,
                character_id,
                done,
            } => {
                let result = repository.delete(owner, &character_id).await;
                let _ = done.send(result);
            }
            MirrorCommand::Flush { done } => {
                let _ = done.send(());
            }
        }
    }
    debug!("conversation mirror stopped");
}
