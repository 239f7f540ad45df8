//! plancheck agent loop.
//!
//! Wraps requirement review in a single-tool ReAct loop: the model reads the
//! analyst prompt, decides when to call the `document_analysis` tool, reads
//! the tool's observation, and finally writes its own answer.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The executor sequences calls between the
//! [`review::LlmProvider`] port and the registered [`Tool`]s. It contains no
//! review rules of its own; [`DocumentAnalysisTool`] delegates to
//! [`review::RequirementReviewer`].

use thiserror::Error;

pub mod document_analysis;
pub mod executor;
pub mod react;
pub mod tool;

pub use document_analysis::{DocumentAnalysisTool, DEFAULT_PDF_PATH, DEFAULT_REQUIREMENTS_PATH};
pub use executor::{AgentExecutor, AgentOutcome, ToolInvocation, DEFAULT_MAX_ITERATIONS};
pub use react::{parse_step, react_prompt, AgentStep, StepParseError};
pub use tool::Tool;

/// Errors that end an agent run without a final answer.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The executor was built without any tools.
    #[error("An agent needs at least one tool")]
    NoTools,

    /// A model call failed.
    #[error("LLM call failed: {0}")]
    Provider(#[from] review::LlmError),

    /// The model never produced a final answer.
    #[error("Agent stopped after {max_iterations} iterations without a final answer")]
    IterationLimit { max_iterations: usize },
}
