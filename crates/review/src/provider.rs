//! The LLM provider port.
//!
//! The review domain only needs one capability from a language model: turn a
//! list of chat messages into a completion string. [`LlmProvider`] is that
//! port; the `llm` crate supplies the HTTP-backed implementation and tests
//! supply scripted ones.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{LlmError, ModelName, TokenUsage};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message in a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    /// Creates a `user` message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Creates a `system` message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }
}

/// Whether the provider should constrain its output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Free-form text.
    #[default]
    Text,
    /// A single JSON object.
    JsonObject,
}

/// A provider-independent chat-completion request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature. `None` leaves the provider default in place.
    pub temperature: Option<f32>,
    /// Sequences at which the provider stops generating.
    pub stop: Vec<String>,
    pub response_format: ResponseFormat,
}

impl CompletionRequest {
    /// Creates a request holding a single user message.
    pub fn from_user(content: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::user(content)],
            ..Self::default()
        }
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Adds a stop sequence.
    pub fn with_stop(mut self, stop: impl Into<String>) -> Self {
        self.stop.push(stop.into());
        self
    }

    /// Sets the response format.
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }
}

/// A provider's reply to a [`CompletionRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The text of the first choice.
    pub content: String,
    /// Token usage, when the provider reports it.
    pub usage: Option<TokenUsage>,
}

/// A chat-completion capable language model.
///
/// Implementations own transport, authentication and retries. A returned
/// [`LlmError`] is final: the caller does not retry it again.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// The model this provider sends requests to.
    fn model(&self) -> &ModelName;

    /// Submits `request` and waits for the full completion.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError>;
}
