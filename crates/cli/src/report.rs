//! Report rendering for the console and for saved output.

use std::fmt::Write as _;

use review::{AnalysisReport, Assessment};

use crate::args::OutputFormat;

const SEPARATOR_WIDTH: usize = 50;

/// Renders `report` in the requested format.
pub fn render(report: &AnalysisReport, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => serde_json::to_string_pretty(report),
    }
}

/// Renders the human-readable report.
///
/// One block per requirement: requirement, status, explanation, and the error
/// detail when there is one, each block closed by a dashed separator.
pub fn render_text(report: &AnalysisReport) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut out = String::from("=== Analysis Results ===\n");

    for result in &report.results {
        let _ = writeln!(out, "\nRequirement: {}", result.requirement);
        match &result.assessment {
            Assessment::Analyzed(analysis) => {
                let _ = writeln!(out, "Status: {}", analysis.status);
                let _ = writeln!(out, "Explanation: {}", analysis.explanation);
                if let Some(error) = &analysis.error {
                    let _ = writeln!(out, "Error: {error}");
                }
            }
            Assessment::Failed { reason } => {
                let _ = writeln!(out, "Status: failed");
                let _ = writeln!(out, "Explanation: the model's reply could not be read ({reason})");
            }
        }
        let _ = writeln!(out, "{separator}");
    }

    let tally = &report.tally;
    let _ = writeln!(
        out,
        "\nMet: {}  Not met: {}  Not addressed: {}  Failed: {}",
        tally.met, tally.not_met, tally.not_addressed, tally.failed
    );
    out
}
