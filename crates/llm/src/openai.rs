//! OpenAI chat-completions provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode};
use review::{
    ChatMessage, Completion, CompletionRequest, LlmError, LlmProvider, ModelName, ResponseFormat,
    RetryPolicy, TokenCount, TokenUsage,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::OpenAiConfig;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "no_stop")]
    stop: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<WireResponseFormat>,
}

fn no_stop(stop: &&[String]) -> bool {
    stop.is_empty()
}

#[derive(Debug, Serialize)]
struct WireResponseFormat {
    r#type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// The HTTP client could not be constructed.
#[derive(Debug, Error)]
#[error("Failed to build HTTP client: {0}")]
pub struct BuildError(#[from] reqwest::Error);

/// [`LlmProvider`] backed by an OpenAI-compatible `/chat/completions`
/// endpoint.
///
/// Retryable failures (timeouts, 429, 5xx) are retried with exponential
/// back-off up to [`OpenAiConfig::max_retries`] times.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    /// Creates a provider from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the TLS backend cannot be initialised.
    pub fn new(config: OpenAiConfig) -> Result<Self, BuildError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn send_once(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let body = ChatRequest {
            model: self.config.model.as_str(),
            messages: &request.messages,
            temperature: request.temperature,
            stop: &request.stop,
            response_format: match request.response_format {
                ResponseFormat::Text => None,
                ResponseFormat::JsonObject => Some(WireResponseFormat {
                    r#type: "json_object",
                }),
            },
        };

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(self.config.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                transport_error(e)
            } else {
                LlmError::InvalidResponse {
                    message: e.to_string(),
                }
            }
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse {
                message: "response contained no message content".to_string(),
            })?;

        Ok(Completion {
            content,
            usage: parsed.usage.map(|u| TokenUsage {
                prompt: TokenCount::new(u.prompt_tokens),
                completion: TokenCount::new(u.completion_tokens),
            }),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn model(&self) -> &ModelName {
        &self.config.model
    }

    #[instrument(skip_all, fields(model = %self.config.model, messages = request.messages.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        let mut retry = 0;
        loop {
            match self.send_once(&request).await {
                Ok(completion) => {
                    if let Some(usage) = completion.usage {
                        debug!(
                            prompt_tokens = usage.prompt.as_u64(),
                            completion_tokens = usage.completion.as_u64(),
                            "Completion received"
                        );
                    }
                    return Ok(completion);
                }
                Err(e) => {
                    let RetryPolicy::Retryable { after } = e.retry_policy() else {
                        return Err(e);
                    };
                    if retry >= self.config.max_retries {
                        warn!(attempts = retry + 1, error = %e, "Giving up after retries");
                        return Err(e);
                    }
                    let delay = retry_delay(self.config.backoff_for(retry), after);
                    warn!(
                        attempt = retry + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying completion request"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
            }
        }
    }
}

/// A provider-requested delay wins when it is longer than the schedule.
fn retry_delay(scheduled: Duration, requested: Option<Duration>) -> Duration {
    requested.map_or(scheduled, |r| r.max(scheduled))
}

fn transport_error(e: reqwest::Error) -> LlmError {
    LlmError::Transport {
        timed_out: e.is_timeout(),
        message: e.to_string(),
    }
}

async fn status_error(status: StatusCode, response: Response) -> LlmError {
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&text)
        .map(|env| env.error.message)
        .unwrap_or(text);

    match status.as_u16() {
        401 | 403 => LlmError::Authentication { message },
        429 => LlmError::RateLimited { retry_after },
        code @ 500..=599 => LlmError::Server {
            status: code,
            message,
        },
        code => LlmError::Api {
            status: code,
            message,
        },
    }
}
