//! Integration test: mock backend with axum, drive the REST client and the
//! conversation controller through a send, a reply, an error status, and a
//! transport failure.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use lib::api::{ApiError, BackendClient};
use lib::chat::{Conversation, GREETING, SEND_FAILED};
use serde_json::json;

#[derive(serde::Deserialize)]
struct SendBody {
    message: String,
    user_id: String,
}

async fn chat_message(Json(body): Json<SendBody>) -> axum::response::Response {
    if body.message == "boom" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "calendar unavailable").into_response();
    }
    assert!(!body.user_id.is_empty());
    Json(json!({ "message": "Done!" })).into_response()
}

/// Serve a mock backend on a free loopback port; returns its base URL.
async fn spawn_mock_backend() -> String {
    let app = Router::new()
        .route(
            "/auth/login",
            get(|| async {
                Json(json!({
                    "auth_url": "https://accounts.google.com/o/oauth2/auth?client_id=test",
                    "state": "xyz",
                }))
            }),
        )
        .route("/chat/message", post(chat_message));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock backend");
    });
    format!("http://{}", addr)
}

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

#[tokio::test]
async fn send_appends_user_message_then_bot_reply() {
    let base = spawn_mock_backend().await;
    let client = BackendClient::new(Some(base));
    let mut conversation = Conversation::new();
    assert_eq!(conversation.messages().len(), 1);
    assert_eq!(conversation.messages()[0].text, GREETING);

    let outbound = conversation
        .submit("  Add team meeting tomorrow at 2pm  ")
        .expect("accepted");
    assert_eq!(outbound, "Add team meeting tomorrow at 2pm");
    assert!(conversation.pending());
    // The gate holds while the request is in flight.
    assert!(conversation.submit("another").is_none());

    match client.send_message(&outbound, "a@b.com").await {
        Ok(reply) => conversation.resolve(reply.message),
        Err(_) => conversation.fail(),
    }
    assert!(!conversation.pending());
    let messages = conversation.messages();
    assert_eq!(messages.len(), 3);
    assert!(messages[1].is_user);
    assert!(!messages[2].is_user);
    assert_eq!(messages[2].text, "Done!");
}

#[tokio::test]
async fn transport_failure_appends_fixed_error_message() {
    let client = BackendClient::new(Some(format!("http://127.0.0.1:{}", free_port())));
    let mut conversation = Conversation::new();
    let outbound = conversation.submit("list my events").expect("accepted");

    match client.send_message(&outbound, "a@b.com").await {
        Ok(reply) => conversation.resolve(reply.message),
        Err(_) => conversation.fail(),
    }
    assert!(!conversation.pending());
    assert_eq!(
        conversation.messages().last().map(|m| m.text.as_str()),
        Some(SEND_FAILED)
    );
}

#[tokio::test]
async fn error_status_surfaces_as_api_error() {
    let base = spawn_mock_backend().await;
    let client = BackendClient::new(Some(base));
    let err = client
        .send_message("boom", "a@b.com")
        .await
        .expect_err("500 should fail");
    match err {
        ApiError::Api(msg) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("calendar unavailable"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn get_login_url_parses_auth_url() {
    let base = spawn_mock_backend().await;
    let client = BackendClient::new(Some(base));
    let login = client.get_login_url().await.expect("login url");
    assert!(login.auth_url.starts_with("https://accounts.google.com/"));
    assert_eq!(login.state.as_deref(), Some("xyz"));
}
