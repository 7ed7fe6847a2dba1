use super::*;
use crate::utils::test_utils::{test_http_client, MockHttpServer};
use chrono::TimeZone;

fn client_for(server: &MockHttpServer) -> RemoteApiClient {
    RemoteApiClient::with_client(test_http_client(), server.base_url())
}

fn ada() -> Credentials {
    Credentials::new("ada", "analytical")
}

#[tokio::test]
async fn login_posts_form_and_reads_nested_response() {
    let server = MockHttpServer::start().await;
    server.respond(
        "POST",
        "/login",
        200,
        r#"{"response":{"username":"ada","user_id":42}}"#,
    );

    let login = client_for(&server)
        .login("ada", "analytical engine")
        .await
        .expect("login should succeed");
    assert_eq!(
        login,
        LoginResponse {
            username: "ada".into(),
            user_id: 42
        }
    );

    let requests = server.requests_to("POST", "/login");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(
        requests[0].body_text(),
        "username=ada&password=analytical+engine"
    );
}

#[tokio::test]
async fn login_failure_carries_backend_detail() {
    let server = MockHttpServer::start().await;
    server.respond(
        "POST",
        "/login",
        401,
        r#"{"detail":"Incorrect username or password"}"#,
    );

    let err = client_for(&server)
        .login("ada", "wrong")
        .await
        .expect_err("login should fail");
    assert!(err.is_auth_failure());
    assert_eq!(err.message(), "Incorrect username or password");
    assert_eq!(
        err.to_string(),
        "Chat API error (401): Incorrect username or password"
    );
}

#[tokio::test]
async fn signup_sends_json_payload() {
    let server = MockHttpServer::start().await;
    server.respond("POST", "/register", 204, "");

    client_for(&server)
        .signup("grace", "cobol", "https://img.example.com/grace.png")
        .await
        .expect("signup should succeed");

    let body = server.requests_to("POST", "/register")[0].json();
    assert_eq!(body["username"], "grace");
    assert_eq!(body["password"], "cobol");
    assert_eq!(body["image"], "https://img.example.com/grace.png");
}

#[tokio::test]
async fn send_chat_returns_reply_text() {
    let server = MockHttpServer::start().await;
    server.respond("POST", "/chat", 200, r#"{"response":"Hello back!"}"#);

    let reply = client_for(&server)
        .send_chat("philosopher", &ada(), "Hello")
        .await
        .expect("chat should succeed");
    assert_eq!(reply, "Hello back!");

    let body = server.requests_to("POST", "/chat")[0].json();
    assert_eq!(body["ai_character_id"], "philosopher");
    assert_eq!(body["message"], "Hello");
    assert_eq!(body["username"], "ada");
    assert_eq!(body["password"], "analytical");
}

#[tokio::test]
async fn send_chat_without_response_field_yields_empty_text() {
    let server = MockHttpServer::start().await;
    server.respond("POST", "/chat", 200, r#"{}"#);

    let reply = client_for(&server)
        .send_chat("coach", &ada(), "Motivate me")
        .await
        .unwrap();
    assert_eq!(reply, "");
}

#[tokio::test]
async fn server_errors_pass_through_plain_bodies() {
    let server = MockHttpServer::start().await;
    server.respond("POST", "/chat", 502, "upstream unavailable");

    let err = client_for(&server)
        .send_chat("coach", &ada(), "hi")
        .await
        .expect_err("chat should fail");
    assert!(!err.is_auth_failure());
    assert_eq!(err.message(), "upstream unavailable");
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let client = RemoteApiClient::with_client(test_http_client(), "http://127.0.0.1:9");
    let err = client
        .send_chat("coach", &ada(), "hi")
        .await
        .expect_err("connection should fail");
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn history_alternates_senders_positionally() {
    let server = MockHttpServer::start().await;
    server.respond(
        "POST",
        "/history",
        200,
        r#"[{"id":1,"message":"Hi"},{"id":2,"message":"Hello, friend"},{"id":"3","message":"How are you?"}]"#,
    );

    let messages = client_for(&server)
        .get_chat_history(&ada(), "friend")
        .await
        .expect("history should load");

    let summary: Vec<_> = messages
        .iter()
        .map(|m| (m.id.as_str(), m.content.as_str(), m.sender))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("1", "Hi", Sender::User),
            ("2", "Hello, friend", Sender::Counterpart),
            ("3", "How are you?", Sender::User),
        ]
    );
    assert!(messages.iter().all(|m| m.character_id == "friend"));

    let body = server.requests_to("POST", "/history")[0].json();
    assert_eq!(body["ai_id"], "friend");
    assert_eq!(body["username"], "ada");
}

#[test]
fn convert_history_spaces_timestamps_one_minute_apart() {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    let entries = vec![
        HistoryEntry {
            id: serde_json::json!(10),
            message: "a".into(),
        },
        HistoryEntry {
            id: serde_json::json!(11),
            message: "b".into(),
        },
    ];
    let messages = convert_history(entries, "historian", start);
    assert_eq!(messages[0].timestamp, start);
    assert_eq!(messages[1].timestamp - messages[0].timestamp, chrono::Duration::minutes(1));
    assert!(convert_history(Vec::new(), "historian", start).is_empty());
}

#[test]
fn extract_backend_message_variants() {
    let cases = [
        (r#"{"detail":"User already exists"}"#, "User already exists"),
        (
            r#"{"detail":[{"loc":["body","username"],"msg":"field required"}]}"#,
            "field required",
        ),
        (r#"{"message":"  rate   limited  "}"#, "rate limited"),
        (r#"{"error":{"message":"boom"}}"#, "boom"),
        ("<html>Bad Gateway</html>", "<html>Bad Gateway</html>"),
        ("   ", "<empty response>"),
        (r#"{"unrelated":true}"#, r#"{"unrelated":true}"#),
    ];
    for (body, expected) in cases {
        assert_eq!(extract_backend_message(body), expected, "body={body}");
    }
}
