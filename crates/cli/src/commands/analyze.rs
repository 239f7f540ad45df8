//! `plancheck analyze`: review every requirement and print the report.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use review::{AnalysisReport, RequirementReviewer};
use tracing::{info, warn};

use super::CommandError;
use crate::args::{AnalyzeArgs, OutputFormat};
use crate::report;

const PDF_PROMPT: &str = "Enter the path to the building PDF file: ";
const REQUIREMENTS_PROMPT: &str = "Enter the path to the requirements text file: ";

/// Input paths for one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeInputs {
    pub pdf: PathBuf,
    pub requirements: PathBuf,
}

/// Takes paths from `args`, prompting on `out` and reading `input` for any
/// that are missing.
pub fn resolve_inputs<R, W>(
    args: &AnalyzeArgs,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<AnalyzeInputs>
where
    R: BufRead,
    W: Write,
{
    let pdf = match &args.pdf {
        Some(path) => path.clone(),
        None => prompt_path(PDF_PROMPT, input, out)?,
    };
    let requirements = match &args.requirements {
        Some(path) => path.clone(),
        None => prompt_path(REQUIREMENTS_PROMPT, input, out)?,
    };
    Ok(AnalyzeInputs { pdf, requirements })
}

fn prompt_path<R, W>(prompt: &'static str, input: &mut R, out: &mut W) -> anyhow::Result<PathBuf>
where
    R: BufRead,
    W: Write,
{
    write!(out, "{prompt}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(CommandError::NoInput {
            prompt: prompt.trim_end(),
        }
        .into());
    }
    Ok(PathBuf::from(line.trim()))
}

/// Runs the analysis and writes the report to `out` (and `--output`, if set).
///
/// For the text format, a progress line is written to `out` before each
/// requirement is sent. JSON output stays a single document.
///
/// # Errors
///
/// [`CommandError::MissingInputs`] if either file is absent. Otherwise any
/// extraction, read, or provider failure.
pub async fn run<R, W>(
    args: &AnalyzeArgs,
    reviewer: RequirementReviewer,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<AnalysisReport>
where
    R: BufRead,
    W: Write,
{
    let inputs = resolve_inputs(args, input, out)?;
    if !inputs.pdf.exists() || !inputs.requirements.exists() {
        return Err(CommandError::MissingInputs.into());
    }

    let text = document::pdf::extract_text(&inputs.pdf).context("Error reading files")?;
    let requirements = document::requirements::read_requirements(&inputs.requirements)
        .context("Error reading files")?;
    if requirements.is_empty() {
        warn!(path = %inputs.requirements.display(), "Requirements file has no requirements");
    }
    info!(
        pages = text.page_count(),
        chars = text.len(),
        requirements = requirements.len(),
        "Inputs loaded"
    );

    let show_progress = args.format == OutputFormat::Text;
    let report = reviewer
        .review_with_progress(&requirements, &text, |_, requirement| {
            if show_progress {
                let _ = writeln!(out, "\nAnalyzing requirement: {requirement}");
            }
        })
        .await?;

    let rendered = report::render(&report, args.format).context("failed to render the report")?;
    writeln!(out)?;
    write!(out, "{rendered}")?;
    if let Some(path) = &args.output {
        save(path, &rendered)?;
    }
    Ok(report)
}

fn save(path: &Path, rendered: &str) -> anyhow::Result<()> {
    std::fs::write(path, rendered)
        .with_context(|| format!("failed to write the report to '{}'", path.display()))?;
    info!(path = %path.display(), "Report saved");
    Ok(())
}
