//! Test doubles for code that depends on [`LlmProvider`].
//!
//! Compiled for this crate's own tests and, through the `test-support`
//! feature, for downstream crates' tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{Completion, CompletionRequest, LlmError, LlmProvider, ModelName, TokenCount, TokenUsage};

/// Token usage reported for every scripted reply.
pub const SCRIPTED_USAGE: TokenUsage = TokenUsage {
    prompt: TokenCount::new(100),
    completion: TokenCount::new(20),
};

/// Replays canned replies in order and records every request it receives.
///
/// Once the script runs out, calls fail with [`LlmError::InvalidResponse`].
pub struct ScriptedProvider {
    model: ModelName,
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    /// Scripts successful replies.
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_results(replies.into_iter().map(|r| Ok(r.into())))
    }

    /// Scripts replies and provider failures.
    pub fn with_results<I>(results: I) -> Arc<Self>
    where
        I: IntoIterator<Item = Result<String, LlmError>>,
    {
        Arc::new(Self {
            model: ModelName::new("scripted").unwrap(),
            replies: Mutex::new(results.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn model(&self) -> &ModelName {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        self.requests.lock().unwrap().push(request);
        let next = self.replies.lock().unwrap().pop_front();
        let content = next.unwrap_or_else(|| {
            Err(LlmError::InvalidResponse {
                message: "script exhausted".into(),
            })
        })?;
        Ok(Completion {
            content,
            usage: Some(SCRIPTED_USAGE),
        })
    }
}
