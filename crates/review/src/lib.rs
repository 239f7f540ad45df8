//! Core review domain for plancheck.
//!
//! This crate contains every domain concept used to check a building document
//! against a list of textual requirements: the requirement and verdict types,
//! the fixed analysis prompt, the verdict parser, and the
//! [`RequirementReviewer`] that drives one LLM call per requirement.
//! Infrastructure crates implement the [`LlmProvider`] port defined here; they
//! never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ModelName`, `ToolName`, `AnalysisRunId`) |
//! | [`types`] | Value types (`Requirement`, `DocumentText`, `RequirementAnalysis`, `AnalysisReport`, etc.) |
//! | [`errors`] | Error and retry-policy types |
//! | [`provider`] | The `LlmProvider` port and its request/response types |
//! | [`requirements`] | Requirements-list parsing |
//! | [`prompt`] | Analysis prompt formatting |
//! | [`verdict`] | Reply-to-verdict parsing |
//! | [`reviewer`] | Sequential review driver |
//! | `testing` | Scripted provider for tests (`test-support` feature) |

pub mod errors;
pub mod identifiers;
pub mod prompt;
pub mod provider;
pub mod requirements;
pub mod reviewer;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod types;
pub mod verdict;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{LlmError, RetryPolicy, ReviewError, VerdictError};
pub use identifiers::{AnalysisRunId, ModelName, ToolName};
pub use prompt::analysis_prompt;
pub use provider::{
    ChatMessage, ChatRole, Completion, CompletionRequest, LlmProvider, ResponseFormat,
};
pub use requirements::parse_requirements;
pub use reviewer::RequirementReviewer;
pub use types::{
    AnalysisReport, AnalysisStatus, Assessment, DocumentText, Requirement, RequirementAnalysis,
    RequirementResult, StatusTally, Timestamp, TokenCount, TokenUsage,
};
pub use verdict::parse_verdict;
