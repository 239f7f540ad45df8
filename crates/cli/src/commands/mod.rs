//! Subcommand implementations.
//!
//! Each command takes its collaborators as arguments so tests can drive it
//! with a scripted provider and in-memory streams.

use std::sync::Arc;

use anyhow::Context;
use llm::{OpenAiConfig, OpenAiProvider};
use review::LlmProvider;
use thiserror::Error;

pub mod agent;
pub mod analyze;

/// User-facing command failures that carry no underlying cause.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("One or both files do not exist!")]
    MissingInputs,

    #[error("No input available for '{prompt}'")]
    NoInput { prompt: &'static str },
}

/// Builds the production provider.
pub fn openai_provider(config: &OpenAiConfig) -> anyhow::Result<Arc<dyn LlmProvider>> {
    let provider = OpenAiProvider::new(config.clone()).context("failed to create the HTTP client")?;
    Ok(Arc::new(provider))
}
