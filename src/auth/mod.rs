//! Account registration, login and logout against the chat API.

pub mod credentials;

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{ApiError, RemoteApiClient};
use crate::core::session::{Credentials, Session};

pub use self::credentials::{
    CredentialError, CredentialStore, FileCredentialStore, MemoryCredentialStore,
};

#[derive(Debug)]
pub enum AuthError {
    MissingField(&'static str),
    Api(ApiError),
    Store(CredentialError),
}

impl AuthError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AuthError::Api(err) if err.is_auth_failure())
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingField(field) => write!(f, "{field} cannot be empty"),
            AuthError::Api(err) => write!(f, "{}", err.message()),
            AuthError::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::MissingField(_) => None,
            AuthError::Api(err) => Some(err),
            AuthError::Store(err) => Some(err),
        }
    }
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        AuthError::Api(err)
    }
}

impl From<CredentialError> for AuthError {
    fn from(err: CredentialError) -> Self {
        AuthError::Store(err)
    }
}

fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AuthError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

/// Owns the current session and keeps the credential store in step with it.
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    api: RemoteApiClient,
    current: Option<Session>,
}

impl SessionManager {
    /// Pick up whatever session the store already holds.
    pub fn restore(store: Arc<dyn CredentialStore>, api: RemoteApiClient) -> Self {
        let current = match store.load() {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "could not load stored session");
                None
            }
        };
        Self {
            store,
            api,
            current,
        }
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn api(&self) -> &RemoteApiClient {
        &self.api
    }

    /// Credentials for the current session. `None` when signed out or when
    /// the secret has gone missing from the store.
    pub fn credentials(&self) -> Result<Option<Credentials>, AuthError> {
        let Some(session) = &self.current else {
            return Ok(None);
        };
        let credentials = self.store.credentials(session)?;
        if credentials.is_none() {
            warn!(username = %session.username, "no stored secret for session");
        }
        Ok(credentials)
    }

    /// Log in and persist the session. On failure the current session is
    /// left as it was.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Session, AuthError> {
        let username = require(username, "Username")?;
        if password.is_empty() {
            return Err(AuthError::MissingField("Password"));
        }

        let response = self.api.login(username, password).await?;
        let session = Session {
            user_id: response.user_id,
            username: username.to_string(),
        };
        self.store.save(&session, password)?;
        info!(username = %session.username, user_id = session.user_id, "logged in");
        self.current = Some(session.clone());
        Ok(session)
    }

    /// Create an account. Registration does not sign the user in.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        image: &str,
    ) -> Result<(), AuthError> {
        let username = require(username, "Username")?;
        if password.is_empty() {
            return Err(AuthError::MissingField("Password"));
        }
        self.api.signup(username, password, image.trim()).await?;
        info!(username, "account registered");
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), AuthError> {
        let previous = self.current.take();
        self.store.clear()?;
        if let Some(session) = previous {
            info!(username = %session.username, "logged out");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{test_http_client, MockHttpServer};

    fn manager(server: &MockHttpServer, store: Arc<MemoryCredentialStore>) -> SessionManager {
        let api = RemoteApiClient::with_client(test_http_client(), server.base_url());
        SessionManager::restore(store, api)
    }

    #[tokio::test]
    async fn login_persists_session_and_secret() {
        let server = MockHttpServer::start().await;
        server.respond(
            "POST",
            "/login",
            200,
            r#"{"response":{"username":"ada","user_id":42}}"#,
        );
        let store = Arc::new(MemoryCredentialStore::new());
        let mut sessions = manager(&server, store.clone());

        let session = sessions.login(" ada ", "hunter2").await.unwrap();

        assert_eq!(session.user_id, 42);
        assert_eq!(session.username, "ada");
        assert_eq!(sessions.current(), Some(&session));
        assert_eq!(store.load().unwrap(), Some(session));
        assert_eq!(
            sessions.credentials().unwrap(),
            Some(Credentials::new("ada", "hunter2"))
        );
    }

    #[tokio::test]
    async fn failed_login_keeps_previous_session() {
        let server = MockHttpServer::start().await;
        server.respond("POST", "/login", 401, r#"{"detail":"Invalid credentials"}"#);
        let existing = Session {
            user_id: 1,
            username: "grace".into(),
        };
        let store = Arc::new(MemoryCredentialStore::with_session(existing.clone(), "pw"));
        let mut sessions = manager(&server, store.clone());

        let err = sessions.login("ada", "wrong").await.unwrap_err();

        assert!(err.is_auth_failure());
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(sessions.current(), Some(&existing));
        assert_eq!(store.load().unwrap(), Some(existing));
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_before_any_request() {
        let server = MockHttpServer::start().await;
        let mut sessions = manager(&server, Arc::new(MemoryCredentialStore::new()));

        let err = sessions.login("  ", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingField("Username")));
        let err = sessions.register("ada", "", "").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingField("Password")));
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn register_does_not_sign_in() {
        let server = MockHttpServer::start().await;
        server.respond("POST", "/register", 200, "{}");
        let sessions = manager(&server, Arc::new(MemoryCredentialStore::new()));

        sessions.register("ada", "pw", "").await.unwrap();

        assert!(sessions.current().is_none());
        let body = server.requests_to("POST", "/register")[0].json();
        assert_eq!(body["username"], "ada");
    }

    #[tokio::test]
    async fn logout_clears_store_and_session() {
        let server = MockHttpServer::start().await;
        let store = Arc::new(MemoryCredentialStore::with_session(
            Session {
                user_id: 3,
                username: "ada".into(),
            },
            "pw",
        ));
        let mut sessions = manager(&server, store.clone());
        assert!(sessions.current().is_some());

        sessions.logout().unwrap();

        assert!(sessions.current().is_none());
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(sessions.credentials().unwrap(), None);
    }
}
