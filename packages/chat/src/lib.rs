#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rate-limited chat client for the AI assistant endpoint.
//!
//! The endpoint takes `{ "user_question": ... }` and answers with
//! `{ "answer": ... }`. [`session::ChatSession`] wraps any
//! [`transport::ChatTransport`] with the client-side rules the viewer
//! enforces:
//!
//! - one request in flight at a time,
//! - a fixed five-second cooldown after every completed exchange,
//! - a fixed fallback answer when the endpoint can't be reached,
//! - the loading flag is released (and the cooldown started) on every exit
//!   path, including cancellation.

pub mod session;
pub mod transport;

pub use session::{COOLDOWN, ChatSession, FALLBACK_ANSWER};
pub use transport::{ChatTransport, HttpChatTransport};

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

/// Errors that can occur during chat operations.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The question was empty after trimming.
    #[error("Question is empty")]
    EmptyQuestion,

    /// Another request is still in flight.
    #[error("A request is already in progress")]
    Busy,

    /// The cooldown after the previous exchange hasn't elapsed.
    #[error("Please wait {}s before asking again", remaining.as_secs_f32().ceil())]
    CoolingDown {
        /// Time left until the next request is allowed.
        remaining: Duration,
    },

    /// HTTP request to the endpoint failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The endpoint answered with a non-success status.
    #[error("Endpoint returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for logging.
        body: String,
    },
}

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatRole {
    /// The person using the viewer.
    User,
    /// The AI assistant.
    Assistant,
}

/// One entry in the chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author.
    pub role: ChatRole,
    /// Message text.
    pub text: String,
}

impl ChatMessage {
    /// A message from the user.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    /// A message from the assistant.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}
