//! Where counterpart replies come from.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{ApiError, RemoteApiClient};
use crate::backend::{BackendError, SupabaseClient};
use crate::character::Character;
use crate::core::constants::REPLY_HISTORY_WINDOW;
use crate::core::message::Message;
use crate::core::session::Credentials;

pub const REPLY_FUNCTION: &str = "generate-ai-response";

#[derive(Debug)]
pub enum ReplyError {
    /// The source needs a signed-in user and there is none.
    AuthRequired,
    Api(ApiError),
    Backend(BackendError),
    /// The source answered without any text.
    Empty,
}

impl std::fmt::Display for ReplyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplyError::AuthRequired => write!(f, "Please log in to chat"),
            ReplyError::Api(err) => write!(f, "{err}"),
            ReplyError::Backend(err) => write!(f, "{err}"),
            ReplyError::Empty => write!(f, "The reply was empty"),
        }
    }
}

impl std::error::Error for ReplyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReplyError::Api(err) => Some(err),
            ReplyError::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for ReplyError {
    fn from(err: ApiError) -> Self {
        ReplyError::Api(err)
    }
}

impl From<BackendError> for ReplyError {
    fn from(err: BackendError) -> Self {
        ReplyError::Backend(err)
    }
}

#[async_trait]
pub trait ReplySource: Send + Sync {
    /// Produce the counterpart's answer to `text`. `history` is the
    /// conversation as it stood before `text` was sent.
    async fn reply(
        &self,
        character: &Character,
        history: &[Message],
        text: &str,
    ) -> Result<String, ReplyError>;
}

fn non_blank(reply: String) -> Result<String, ReplyError> {
    if reply.trim().is_empty() {
        Err(ReplyError::Empty)
    } else {
        Ok(reply)
    }
}

/// Replies from the chat API's `/chat` endpoint. The backend keeps its own
/// history, so only the new text is sent.
pub struct ApiReplies {
    api: RemoteApiClient,
    credentials: Option<Credentials>,
}

impl ApiReplies {
    pub fn new(api: RemoteApiClient, credentials: Option<Credentials>) -> Self {
        Self { api, credentials }
    }
}

#[async_trait]
impl ReplySource for ApiReplies {
    async fn reply(
        &self,
        character: &Character,
        _history: &[Message],
        text: &str,
    ) -> Result<String, ReplyError> {
        let credentials = self.credentials.as_ref().ok_or(ReplyError::AuthRequired)?;
        let reply = self.api.send_chat(&character.id, credentials, text).await?;
        non_blank(reply)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EdgeReplyRequest<'a> {
    character_name: &'a str,
    character_description: &'a str,
    character_personality: &'a str,
    user_message: &'a str,
    conversation_history: Vec<HistoryTurn<'a>>,
}

#[derive(Serialize)]
struct HistoryTurn<'a> {
    sender: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EdgeReplyResponse {
    #[serde(default)]
    ai_response: Option<String>,
}

/// Replies from the data backend's `generate-ai-response` function, which
/// is stateless and gets the last few turns with every call.
pub struct EdgeFunctionReplies {
    client: SupabaseClient,
}

impl EdgeFunctionReplies {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReplySource for EdgeFunctionReplies {
    async fn reply(
        &self,
        character: &Character,
        history: &[Message],
        text: &str,
    ) -> Result<String, ReplyError> {
        let recent = &history[history.len().saturating_sub(REPLY_HISTORY_WINDOW)..];
        debug!(character = %character.id, turns = recent.len(), "invoking reply function");
        let request = EdgeReplyRequest {
            character_name: &character.name,
            character_description: &character.description,
            character_personality: &character.personality,
            user_message: text,
            conversation_history: recent
                .iter()
                .map(|message| HistoryTurn {
                    sender: message.sender.as_str(),
                    content: &message.content,
                })
                .collect(),
        };
        let response: EdgeReplyResponse = self.client.invoke(REPLY_FUNCTION, &request).await?;
        non_blank(response.ai_response.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SupabaseConfig;
    use crate::character::builtin::load_builtin_characters;
    use crate::utils::test_utils::{test_http_client, MockHttpServer};

    fn sophia() -> Character {
        load_builtin_characters().remove(0)
    }

    #[tokio::test]
    async fn edge_function_sends_last_ten_turns() {
        let server = MockHttpServer::start().await;
        server.respond(
            "POST",
            "/functions/v1/generate-ai-response",
            200,
            r#"{"aiResponse":"Consider the question itself."}"#,
        );
        let client = SupabaseClient::with_client(
            SupabaseConfig::new(server.base_url(), "anon"),
            test_http_client(),
        )
        .unwrap();
        let history: Vec<Message> = (0..12)
            .map(|n| Message::user("philosopher", format!("turn {n}")))
            .collect();

        let reply = EdgeFunctionReplies::new(client)
            .reply(&sophia(), &history, "What is virtue?")
            .await
            .unwrap();

        assert_eq!(reply, "Consider the question itself.");
        let body = server.requests_to("POST", "/functions/v1/generate-ai-response")[0].json();
        assert_eq!(body["characterName"], "Sophia");
        assert_eq!(body["characterPersonality"], "Thoughtful, wise, patient");
        assert_eq!(body["userMessage"], "What is virtue?");
        let turns = body["conversationHistory"].as_array().unwrap();
        assert_eq!(turns.len(), 10);
        assert_eq!(turns[0]["content"], "turn 2");
        assert_eq!(turns[0]["sender"], "user");
    }

    #[tokio::test]
    async fn edge_function_without_text_is_an_error() {
        let server = MockHttpServer::start().await;
        server.respond("POST", "/functions/v1/generate-ai-response", 200, "{}");
        let client = SupabaseClient::with_client(
            SupabaseConfig::new(server.base_url(), "anon"),
            test_http_client(),
        )
        .unwrap();

        let err = EdgeFunctionReplies::new(client)
            .reply(&sophia(), &[], "Hi")
            .await
            .unwrap_err();
        assert!(matches!(err, ReplyError::Empty));
    }

    #[tokio::test]
    async fn api_replies_need_credentials() {
        let api = RemoteApiClient::with_client(test_http_client(), "http://127.0.0.1:9");
        let err = ApiReplies::new(api, None)
            .reply(&sophia(), &[], "Hi")
            .await
            .unwrap_err();
        assert!(matches!(err, ReplyError::AuthRequired));
    }

    #[tokio::test]
    async fn api_replies_post_to_chat() {
        let server = MockHttpServer::start().await;
        server.respond("POST", "/chat", 200, r#"{"response":"Hello there"}"#);
        let api = RemoteApiClient::with_client(test_http_client(), server.base_url());

        let reply = ApiReplies::new(api, Some(Credentials::new("ada", "pw")))
            .reply(&sophia(), &[], "Hello")
            .await
            .unwrap();

        assert_eq!(reply, "Hello there");
        let body = server.requests_to("POST", "/chat")[0].json();
        assert_eq!(body["ai_character_id"], "philosopher");
        assert_eq!(body["message"], "Hello");
    }
}
