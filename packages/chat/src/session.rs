//! Chat session with in-flight and cooldown gating.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::transport::ChatTransport;
use crate::{ChatError, ChatMessage};

/// Lockout after each completed exchange.
pub const COOLDOWN: Duration = Duration::from_secs(5);

/// Answer recorded when the endpoint can't be reached.
pub const FALLBACK_ANSWER: &str = "Sorry, I couldn't reach the AI assistant. Please try again.";

#[derive(Debug, Default)]
struct ChatState {
    history: Vec<ChatMessage>,
    loading: bool,
    cooldown_until: Option<Instant>,
}

/// A conversation with the assistant.
///
/// Methods take `&self` so a session can be shared (e.g. behind an `Arc`)
/// between the input handler and the renderer. The state lock is never held
/// across an `.await`.
pub struct ChatSession<T: ChatTransport> {
    transport: T,
    cooldown: Duration,
    state: Mutex<ChatState>,
}

impl<T: ChatTransport> ChatSession<T> {
    /// Creates a session with the standard [`COOLDOWN`].
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_cooldown(transport, COOLDOWN)
    }

    /// Creates a session with a custom cooldown.
    #[must_use]
    pub fn with_cooldown(transport: T, cooldown: Duration) -> Self {
        Self {
            transport,
            cooldown,
            state: Mutex::new(ChatState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// Time left before another question is accepted, if any.
    #[must_use]
    pub fn cooldown_remaining(&self) -> Option<Duration> {
        let until = self.state().cooldown_until?;
        let remaining = until.saturating_duration_since(Instant::now());
        (!remaining.is_zero()).then_some(remaining)
    }

    /// A copy of the conversation so far.
    #[must_use]
    pub fn history(&self) -> Vec<ChatMessage> {
        self.state().history.clone()
    }

    /// Clears the conversation. Loading and cooldown state are kept.
    pub fn clear_history(&self) {
        self.state().history.clear();
    }

    /// Asks a question.
    ///
    /// On success the assistant's answer is appended to the history and
    /// returned. If the transport fails, [`FALLBACK_ANSWER`] is recorded and
    /// returned instead; the failure is only logged.
    ///
    /// # Errors
    ///
    /// Rejects the question without sending it when it is empty
    /// ([`ChatError::EmptyQuestion`]), another request is in flight
    /// ([`ChatError::Busy`]), or the cooldown is running
    /// ([`ChatError::CoolingDown`]).
    pub async fn ask(&self, question: &str) -> Result<ChatMessage, ChatError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ChatError::EmptyQuestion);
        }

        {
            let mut state = self.state();
            if state.loading {
                return Err(ChatError::Busy);
            }
            if let Some(until) = state.cooldown_until {
                let remaining = until.saturating_duration_since(Instant::now());
                if !remaining.is_zero() {
                    return Err(ChatError::CoolingDown { remaining });
                }
            }
            state.loading = true;
            state.history.push(ChatMessage::user(question));
        }

        let _release = InFlight { session: self };

        let reply = match self.transport.ask(question).await {
            Ok(answer) => ChatMessage::assistant(answer),
            Err(e) => {
                log::error!("Chat request failed: {e}");
                ChatMessage::assistant(FALLBACK_ANSWER)
            }
        };

        self.state().history.push(reply.clone());
        Ok(reply)
    }
}

/// Clears the loading flag and starts the cooldown when dropped, so a
/// cancelled `ask` future can't leave the session stuck.
struct InFlight<'a, T: ChatTransport> {
    session: &'a ChatSession<T>,
}

impl<T: ChatTransport> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        let mut state = self.session.state();
        state.loading = false;
        state.cooldown_until = Some(Instant::now() + self.session.cooldown);
    }
}
