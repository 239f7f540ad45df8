//! Parsing of model replies into [`RequirementAnalysis`] verdicts.
//!
//! The expected reply is a single JSON object:
//!
//! ```json
//! { "status": "met" | "not_met" | "not_addressed",
//!   "explanation": "...",
//!   "error": "..." | null }
//! ```
//!
//! Models sometimes wrap that object in a Markdown code fence, so one
//! surrounding fence is removed before parsing, and a sentence around the
//! object is cut away. Everything else that does not match the schema is
//! rejected with a [`VerdictError`] holding the raw reply.

use serde::Deserialize;
use serde_json::Value;

use crate::{AnalysisStatus, RequirementAnalysis, VerdictError};

#[derive(Debug, Deserialize)]
struct RawVerdict {
    status: String,
    explanation: String,
    #[serde(default)]
    error: Option<String>,
}

/// Parses a model reply into a verdict.
///
/// # Errors
///
/// - [`VerdictError::InvalidJson`] if the reply (after fence removal) is not
///   JSON.
/// - [`VerdictError::Schema`] if it is JSON but not an object with a known
///   `status` and a string `explanation`.
pub fn parse_verdict(reply: &str) -> Result<RequirementAnalysis, VerdictError> {
    let body = json_object_slice(strip_code_fence(reply));

    let value: Value = serde_json::from_str(body).map_err(|e| VerdictError::InvalidJson {
        reason: e.to_string(),
        raw: reply.to_string(),
    })?;

    let raw: RawVerdict = serde_json::from_value(value).map_err(|e| VerdictError::Schema {
        reason: e.to_string(),
        raw: reply.to_string(),
    })?;

    let status = parse_status(&raw.status).ok_or_else(|| VerdictError::Schema {
        reason: format!("unknown status '{}'", raw.status),
        raw: reply.to_string(),
    })?;

    let error = raw
        .error
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty() && !e.eq_ignore_ascii_case("null"));

    Ok(RequirementAnalysis {
        status,
        explanation: raw.explanation.trim().to_string(),
        error,
    })
}

/// Accepts the wire names case-insensitively, with spaces or hyphens in place
/// of underscores.
fn parse_status(raw: &str) -> Option<AnalysisStatus> {
    let normalized: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect();

    match normalized.as_str() {
        "met" => Some(AnalysisStatus::Met),
        "not_met" => Some(AnalysisStatus::NotMet),
        "not_addressed" => Some(AnalysisStatus::NotAddressed),
        _ => None,
    }
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // Drop the info string (e.g. `json`), whether a newline or a space follows it.
    let tag_len = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    rest[tag_len..].trim()
}

/// Narrows `body` to its outermost `{ ... }` when prose surrounds the object.
fn json_object_slice(body: &str) -> &str {
    if body.starts_with('{') {
        return body;
    }
    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => body,
    }
}
