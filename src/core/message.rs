use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message.
///
/// Stored as `"user"` / `"ai"` so transcripts written by older web clients
/// stay readable; `"assistant"` and `"counterpart"` are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Sender {
    User,
    Counterpart,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Counterpart => "ai",
        }
    }

    /// The other side of the exchange.
    pub fn flipped(self) -> Self {
        match self {
            Sender::User => Sender::Counterpart,
            Sender::Counterpart => Sender::User,
        }
    }
}

impl TryFrom<&str> for Sender {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Sender::User),
            "ai" | "assistant" | "counterpart" => Ok(Sender::Counterpart),
            _ => Err(format!("invalid message sender: {value}")),
        }
    }
}

impl TryFrom<String> for Sender {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Sender> for String {
    fn from(value: Sender) -> Self {
        value.as_str().to_string()
    }
}

/// One turn in a conversation. Messages are immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub character_id: String,
}

impl Message {
    pub fn new(sender: Sender, character_id: &str, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
            character_id: character_id.to_string(),
        }
    }

    pub fn user(character_id: &str, content: impl Into<String>) -> Self {
        Self::new(Sender::User, character_id, content)
    }

    pub fn counterpart(character_id: &str, content: impl Into<String>) -> Self {
        Self::new(Sender::Counterpart, character_id, content)
    }

    /// Same content, identity, and author; timestamps are compared separately
    /// because storage backends round them differently.
    pub fn same_turn(&self, other: &Message) -> bool {
        self.id == other.id && self.content == other.content && self.sender == other.sender
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_serializes_with_legacy_labels() {
        let message = Message::counterpart("philosopher", "Greetings.");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["sender"], "ai");
        assert_eq!(json["characterId"], "philosopher");
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn sender_accepts_alternate_labels() {
        for (label, expected) in [
            ("user", Sender::User),
            ("ai", Sender::Counterpart),
            ("assistant", Sender::Counterpart),
            ("counterpart", Sender::Counterpart),
        ] {
            assert_eq!(Sender::try_from(label).unwrap(), expected, "label={label}");
        }
        assert!(Sender::try_from("system").is_err());
    }

    #[test]
    fn missing_character_id_defaults_to_empty() {
        let raw = r#"{"id":"1","content":"hi","sender":"user","timestamp":"2024-05-01T10:00:00.000Z"}"#;
        let message: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(message.character_id, "");
        assert_eq!(message.sender, Sender::User);
    }

    #[test]
    fn constructors_assign_fresh_ids() {
        let first = Message::user("coach", "one");
        let second = Message::user("coach", "one");
        assert_ne!(first.id, second.id);
        assert_eq!(first.sender, Sender::User);
        assert_eq!(Sender::User.flipped(), Sender::Counterpart);
    }
}
