use serde::{Deserialize, Serialize};

use crate::core::constants::DEFAULT_CHARACTER_IMAGE_URL;
use crate::core::session::UserId;

/// Where a character comes from. Built-ins ship with the client and cannot
/// be edited; user-owned characters belong to exactly one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "owner", rename_all = "snake_case")]
pub enum CharacterOrigin {
    Builtin,
    UserOwned(UserId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub description: String,
    pub personality: String,
    pub image_url: String,
    pub origin: CharacterOrigin,
}

impl Character {
    /// Opening line used when a conversation has no history yet.
    pub fn greeting(&self) -> String {
        format!(
            "Hello, I'm {}. {} How can I help you today?",
            self.name, self.description
        )
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.origin, CharacterOrigin::Builtin)
    }

    pub fn owner(&self) -> Option<UserId> {
        match self.origin {
            CharacterOrigin::Builtin => None,
            CharacterOrigin::UserOwned(owner) => Some(owner),
        }
    }
}

/// User-supplied fields for creating or editing a character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterDraft {
    pub name: String,
    pub description: String,
    pub personality: String,
    pub image_url: String,
}

impl CharacterDraft {
    pub fn from_character(character: &Character) -> Self {
        Self {
            name: character.name.clone(),
            description: character.description.clone(),
            personality: character.personality.clone(),
            image_url: character.image_url.clone(),
        }
    }

    /// Trim every field, require the text fields, and fill in the stock
    /// avatar when no image was given.
    pub fn validate(&self) -> Result<CharacterDraft, CharacterError> {
        let mut missing = Vec::new();
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("personality", &self.personality),
        ] {
            if value.trim().is_empty() {
                missing.push(field);
            }
        }
        if !missing.is_empty() {
            return Err(CharacterError::Validation(missing));
        }

        let image_url = match self.image_url.trim() {
            "" => DEFAULT_CHARACTER_IMAGE_URL.to_string(),
            url => url.to_string(),
        };
        Ok(CharacterDraft {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            personality: self.personality.trim().to_string(),
            image_url,
        })
    }

    pub fn into_character(self, id: impl Into<String>, owner: UserId) -> Character {
        Character {
            id: id.into(),
            name: self.name,
            description: self.description,
            personality: self.personality,
            image_url: self.image_url,
            origin: CharacterOrigin::UserOwned(owner),
        }
    }
}

#[derive(Debug)]
pub enum CharacterError {
    /// Creating, editing or deleting requires a signed-in user.
    AuthRequired,
    /// No data backend is configured, so custom characters are unavailable.
    Unavailable,
    /// Required draft fields left blank.
    Validation(Vec<&'static str>),
    /// Built-in characters cannot be changed.
    ReadOnly(String),
    NotFound(String),
    Backend(crate::backend::BackendError),
}

impl std::fmt::Display for CharacterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CharacterError::AuthRequired => {
                write!(f, "Please log in to manage your characters")
            }
            CharacterError::Unavailable => write!(
                f,
                "Custom characters need a data backend (set supabase-url and supabase-anon-key)"
            ),
            CharacterError::Validation(fields) => {
                write!(f, "Please fill in all required fields ({})", fields.join(", "))
            }
            CharacterError::ReadOnly(id) => {
                write!(f, "Character '{id}' is built in and cannot be changed")
            }
            CharacterError::NotFound(id) => write!(f, "Character '{id}' not found"),
            CharacterError::Backend(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CharacterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CharacterError::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<crate::backend::BackendError> for CharacterError {
    fn from(err: crate::backend::BackendError) -> Self {
        CharacterError::Backend(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> CharacterDraft {
        CharacterDraft {
            name: "  Nova ".into(),
            description: "A stargazer.".into(),
            personality: "Curious".into(),
            image_url: String::new(),
        }
    }

    #[test]
    fn greeting_names_character_and_description() {
        let character = draft().validate().unwrap().into_character("id-1", 9);
        assert_eq!(
            character.greeting(),
            "Hello, I'm Nova. A stargazer. How can I help you today?"
        );
    }

    #[test]
    fn validate_trims_and_defaults_image() {
        let validated = draft().validate().unwrap();
        assert_eq!(validated.name, "Nova");
        assert_eq!(validated.image_url, DEFAULT_CHARACTER_IMAGE_URL);

        let mut with_image = draft();
        with_image.image_url = " https://img.example/nova.png ".into();
        assert_eq!(
            with_image.validate().unwrap().image_url,
            "https://img.example/nova.png"
        );
    }

    #[test]
    fn validate_lists_every_missing_field() {
        let blank = CharacterDraft {
            name: " ".into(),
            personality: "\t".into(),
            ..draft()
        };
        match blank.validate() {
            Err(CharacterError::Validation(fields)) => {
                assert_eq!(fields, vec!["name", "personality"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn origin_reports_owner() {
        let owned = draft().validate().unwrap().into_character("id-2", 5);
        assert_eq!(owned.owner(), Some(5));
        assert!(!owned.is_builtin());
    }
}
