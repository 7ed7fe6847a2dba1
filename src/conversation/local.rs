//! On-disk fallback copy of each conversation.
//!
//! One `conversation_{id}.json` file per character under the data
//! directory, written atomically after every append. The files survive
//! logout and are never rewritten by a remote fetch.

use std::fs;
use std::path::{Path, PathBuf};

use crate::conversation::StoreError;
use crate::core::config::io::write_atomically;
use crate::core::message::Message;

#[derive(Debug, Clone)]
pub struct LocalMirror {
    dir: PathBuf,
}

impl LocalMirror {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `character_id`. Characters outside `[A-Za-z0-9_-]` are
    /// replaced so an id can never escape the directory.
    pub fn path_for(&self, character_id: &str) -> PathBuf {
        let safe: String = character_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("conversation_{safe}.json"))
    }

    /// `Ok(None)` when nothing has been stored for this character.
    pub fn load(&self, character_id: &str) -> Result<Option<Vec<Message>>, StoreError> {
        let path = self.path_for(character_id);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|err| StoreError::Corrupt {
                path,
                message: err.to_string(),
            })
    }

    pub fn save(&self, character_id: &str, messages: &[Message]) -> Result<(), StoreError> {
        let path = self.path_for(character_id);
        let json = serde_json::to_vec(messages).map_err(|err| StoreError::Corrupt {
            path: path.clone(),
            message: err.to_string(),
        })?;
        write_atomically(&path, &json).map_err(|source| StoreError::Io { path, source })
    }

    /// Deleting a conversation that was never stored succeeds.
    pub fn remove(&self, character_id: &str) -> Result<(), StoreError> {
        let path = self.path_for(character_id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}
