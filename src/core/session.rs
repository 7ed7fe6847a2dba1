use serde::{Deserialize, Serialize};

/// Numeric account id issued by the chat API at login.
pub type UserId = i64;

/// An authenticated user. Persisted between runs without the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
}

/// Username/password pair the chat API expects in request bodies.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_password() {
        let credentials = Credentials::new("ada", "hunter2");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("ada"));
        assert!(!rendered.contains("hunter2"));
    }
}
