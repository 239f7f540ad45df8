//! plancheck LLM provider infrastructure adapter.
//!
//! Implements the [`review::LlmProvider`] trait for the OpenAI
//! chat-completions API. Additional providers are added as new types in this
//! crate without any changes to the `review` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, request formatting, response
//! parsing, status-code classification, and exponential back-off live here.
//! The [`review`] crate sees only [`review::LlmProvider`] and
//! [`review::LlmError`].

pub mod config;
pub mod openai;

pub use config::{ApiKey, OpenAiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use openai::{BuildError, OpenAiProvider};
