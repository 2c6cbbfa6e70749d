//! Chat transports.

use std::time::Duration;

use astralens_server_models::{AskRequest, AskResponse};

use crate::ChatError;

/// Default endpoint when `ASTRALENS_CHAT_URL` is unset.
pub const DEFAULT_CHAT_URL: &str = "http://127.0.0.1:8080/api/ask";

/// Upper bound on a single request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Sends one question and returns the answer.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Asks `question` and waits for the answer.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError`] if the request fails.
    async fn ask(&self, question: &str) -> Result<String, ChatError>;
}

/// JSON-over-HTTP transport.
pub struct HttpChatTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpChatTransport {
    /// Creates a transport posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Http`] if the HTTP client can't be built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Creates a transport from `ASTRALENS_CHAT_URL`, falling back to
    /// [`DEFAULT_CHAT_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Http`] if the HTTP client can't be built.
    pub fn from_env() -> Result<Self, ChatError> {
        let endpoint =
            std::env::var("ASTRALENS_CHAT_URL").unwrap_or_else(|_| DEFAULT_CHAT_URL.to_string());
        log::info!("Chat endpoint: {endpoint}");
        Self::new(endpoint)
    }

    /// The endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ChatTransport for HttpChatTransport {
    async fn ask(&self, question: &str) -> Result<String, ChatError> {
        let request = AskRequest {
            user_question: question.to_string(),
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response: AskResponse = serde_json::from_str(&body)?;
        Ok(response.answer)
    }
}
