//! calPal backend REST client (http://localhost:8000 by default).
//!
//! Two flows use it: login-URL retrieval before the OAuth redirect, and
//! chat-message send. `/auth/user/{email}` is part of the backend surface
//! but no app flow calls it.

use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Client for the calPal backend REST API.
#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("backend api error: {0}")]
    Api(String),
}

impl BackendClient {
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// GET /auth/login — URL to send the user's browser to for Google OAuth.
    pub async fn get_login_url(&self) -> Result<LoginUrl, ApiError> {
        let url = format!("{}/auth/login", self.base_url);
        let res = self.client.get(&url).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::Api(format!("{} {}", status, body)));
        }
        let data: LoginUrl = res.json().await?;
        Ok(data)
    }

    /// GET /auth/user/{email} — stored user record.
    pub async fn get_user(&self, email: &str) -> Result<UserRecord, ApiError> {
        let url = format!("{}/auth/user/{}", self.base_url, email);
        let res = self.client.get(&url).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::Api(format!("{} {}", status, body)));
        }
        let data: UserRecord = res.json().await?;
        Ok(data)
    }

    /// POST /chat/message — send a free-text command, get the assistant's reply.
    pub async fn send_message(&self, message: &str, user_id: &str) -> Result<ChatReply, ApiError> {
        let url = format!("{}/chat/message", self.base_url);
        let body = ChatMessageRequest {
            message: message.to_string(),
            user_id: user_id.to_string(),
        };
        let res = self.client.post(&url).json(&body).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::Api(format!("{} {}", status, body)));
        }
        let data: ChatReply = res.json().await?;
        Ok(data)
    }
}

#[derive(Debug, Serialize)]
struct ChatMessageRequest {
    message: String,
    user_id: String,
}

/// Response of GET /auth/login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginUrl {
    pub auth_url: String,
    /// OAuth state token minted by the backend; informational on this side.
    #[serde(default)]
    pub state: Option<String>,
}

/// Response of POST /chat/message.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub message: String,
}

/// Stored user record from GET /auth/user/{email}.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = BackendClient::new(Some("http://10.0.0.2:9000/".to_string()));
        assert_eq!(client.base_url, "http://10.0.0.2:9000");
    }

    #[test]
    fn default_base_url() {
        let client = BackendClient::new(None);
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }
}
