//! Assistant chat transcript. Lives in memory only.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::advisor::HealthAdvisor;
use crate::client::TextGenerator;

/// First message of every transcript.
pub const GREETING: &str = "Namaste! I am your HealthHub Assistant. How can I help you today?";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyInput,

    #[error("Still waiting for the previous reply")]
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Clears the loading flag when dropped, including when a pending `send` is
/// abandoned mid-call.
struct LoadingGuard<'a>(&'a mut bool);

impl<'a> LoadingGuard<'a> {
    fn set(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

pub struct ChatSession<G> {
    advisor: HealthAdvisor<G>,
    transcript: Vec<ChatMessage>,
    loading: bool,
}

impl<G: TextGenerator> ChatSession<G> {
    pub fn new(advisor: HealthAdvisor<G>) -> Self {
        Self {
            advisor,
            transcript: vec![ChatMessage::new(ChatRole::Ai, GREETING)],
            loading: false,
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn advisor(&self) -> &HealthAdvisor<G> {
        &self.advisor
    }

    /// Send a message and append the reply, or the fallback apology when the
    /// remote call fails. Returns the appended reply.
    pub async fn send(&mut self, input: &str) -> Result<&ChatMessage, ChatError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ChatError::EmptyInput);
        }
        if self.loading {
            return Err(ChatError::Busy);
        }

        self.transcript.push(ChatMessage::new(ChatRole::User, input));
        let reply = {
            let _loading = LoadingGuard::set(&mut self.loading);
            self.advisor.health_advice(input).await
        };

        debug!(chars = reply.len(), turns = self.transcript.len(), "Assistant replied");
        self.transcript.push(ChatMessage::new(ChatRole::Ai, reply));
        Ok(&self.transcript[self.transcript.len() - 1])
    }

    /// Start over from the greeting.
    pub fn reset(&mut self) {
        self.transcript.truncate(1);
        self.loading = false;
    }
}
