//! Shared value types for the review domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (requirements are trimmed and non-empty,
//! a report holds exactly one result per requirement) and participate in
//! domain computations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AnalysisRunId, ModelName};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A single requirement line to verify against the document.
///
/// Always whitespace-trimmed and non-empty. Requirements are independent of
/// one another; their only relationship is their order in the input file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Requirement(String);

impl Requirement {
    /// Creates a [`Requirement`] from a line of text.
    ///
    /// Surrounding whitespace is trimmed. Returns `None` if nothing remains.
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the requirement text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Requirement {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "requirement must not be blank".to_string())
    }
}

impl From<Requirement> for String {
    fn from(req: Requirement) -> String {
        req.0
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// The flattened text of a document.
///
/// Page texts are concatenated in page order with no structure retained: no
/// page boundaries, layout, or headings. The page count is kept only for
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentText {
    text: String,
    page_count: usize,
}

impl DocumentText {
    /// Creates a [`DocumentText`] from already-concatenated text.
    pub fn new(text: impl Into<String>, page_count: usize) -> Self {
        Self {
            text: text.into(),
            page_count,
        }
    }

    /// Concatenates per-page texts in the order given.
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        let mut page_count = 0;
        for page in pages {
            text.push_str(page.as_ref());
            page_count += 1;
        }
        Self { text, page_count }
    }

    /// Returns the full document text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the number of pages the text was extracted from.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Returns the length of the text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns `true` if the text is empty or whitespace only.
    ///
    /// Unlike [`len`](Self::len), which counts raw bytes, this ignores
    /// whitespace, so a whitespace-only document has a non-zero length and is
    /// still blank.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Token accounting
// ---------------------------------------------------------------------------

/// Number of tokens consumed in an LLM API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TokenCount(u64);

impl TokenCount {
    /// Creates a [`TokenCount`] from a raw integer.
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TokenCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add for TokenCount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for TokenCount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

/// Prompt and completion token counts reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    pub prompt: TokenCount,
    /// Tokens produced in the completion.
    pub completion: TokenCount,
}

impl TokenUsage {
    /// Total tokens for the call.
    pub fn total(self) -> TokenCount {
        self.prompt + self.completion
    }
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.prompt += rhs.prompt;
        self.completion += rhs.completion;
    }
}

// ---------------------------------------------------------------------------
// Verdicts
// ---------------------------------------------------------------------------

/// The model's categorical verdict on a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// The document satisfies the requirement.
    Met,
    /// The document addresses the requirement but does not satisfy it.
    NotMet,
    /// The document does not address the requirement at all.
    NotAddressed,
}

impl AnalysisStatus {
    /// Returns the wire name (`"met"`, `"not_met"`, `"not_addressed"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Met => "met",
            Self::NotMet => "not_met",
            Self::NotAddressed => "not_addressed",
        }
    }
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured verdict for one requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementAnalysis {
    /// Whether the requirement is met.
    pub status: AnalysisStatus,
    /// The model's explanation of the verdict.
    pub explanation: String,
    /// Details of the shortfall when the requirement is not met.
    ///
    /// `None` when the model returned `null`, a blank string, or omitted it.
    pub error: Option<String>,
}

/// What became of one requirement during a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Assessment {
    /// The model returned a well-formed verdict.
    Analyzed(RequirementAnalysis),
    /// The model's reply could not be interpreted as a verdict.
    Failed {
        /// Why the reply was rejected.
        reason: String,
    },
}

impl Assessment {
    /// Returns the verdict status, if the requirement was analysed.
    pub fn status(&self) -> Option<AnalysisStatus> {
        match self {
            Self::Analyzed(analysis) => Some(analysis.status),
            Self::Failed { .. } => None,
        }
    }
}

/// A requirement paired with its assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementResult {
    /// The requirement that was checked.
    pub requirement: Requirement,
    /// The outcome of the check.
    pub assessment: Assessment,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Count of results per status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusTally {
    pub met: usize,
    pub not_met: usize,
    pub not_addressed: usize,
    pub failed: usize,
}

impl StatusTally {
    /// Tallies an ordered list of results.
    pub fn from_results(results: &[RequirementResult]) -> Self {
        let mut tally = Self::default();
        for result in results {
            match result.assessment.status() {
                Some(AnalysisStatus::Met) => tally.met += 1,
                Some(AnalysisStatus::NotMet) => tally.not_met += 1,
                Some(AnalysisStatus::NotAddressed) => tally.not_addressed += 1,
                None => tally.failed += 1,
            }
        }
        tally
    }

    /// Total number of results counted.
    pub fn total(&self) -> usize {
        self.met + self.not_met + self.not_addressed + self.failed
    }
}

/// The outcome of reviewing a requirements list against one document.
///
/// Holds exactly one [`RequirementResult`] per input requirement, in input
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: AnalysisRunId,
    pub model: ModelName,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub results: Vec<RequirementResult>,
    pub tally: StatusTally,
    /// Summed over every provider call that reported usage.
    pub usage: TokenUsage,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
