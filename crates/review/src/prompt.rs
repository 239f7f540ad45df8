//! Prompt formatting for single-requirement analysis.

use crate::{DocumentText, Requirement};

/// Builds the analysis prompt for one requirement.
///
/// The prompt embeds the requirement and the full document text, and asks for
/// a single JSON object with `status`, `explanation` and `error` fields.
pub fn analysis_prompt(requirement: &Requirement, document: &DocumentText) -> String {
    format!(
        "Analyze if the following requirement is met in the building document text.\n\
         Requirement: {requirement}\n\
         \n\
         Document text: {document}\n\
         \n\
         Respond in JSON format:\n\
         {{\n    \
             \"status\": \"met\" | \"not_met\" | \"not_addressed\",\n    \
             \"explanation\": \"detailed explanation\",\n    \
             \"error\": \"error details if not met, otherwise null\"\n\
         }}\n",
        requirement = requirement.as_str(),
        document = document.as_str(),
    )
}
