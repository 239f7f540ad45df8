//! `plancheck agent`: run the ReAct agent with the document_analysis tool.

use std::io::Write;
use std::sync::Arc;

use agent::{AgentExecutor, AgentOutcome, DocumentAnalysisTool, Tool};
use review::RequirementReviewer;
use tracing::info;

use crate::args::AgentArgs;
use crate::config::AgentSettings;

/// Builds the executor for `args` over `settings` and prints the final answer.
///
/// Paths and the turn limit come from the flags when given, otherwise from
/// the resolved settings. The agent loop talks to the reviewer's provider.
pub async fn run<W: Write>(
    args: &AgentArgs,
    settings: &AgentSettings,
    reviewer: RequirementReviewer,
    out: &mut W,
) -> anyhow::Result<AgentOutcome> {
    let pdf = args.pdf.clone().unwrap_or_else(|| settings.pdf_path.clone());
    let requirements = args
        .requirements
        .clone()
        .unwrap_or_else(|| settings.requirements_path.clone());
    let max_iterations = args.max_iterations.unwrap_or(settings.max_iterations);

    let provider = reviewer.provider().clone();
    let tool: Arc<dyn Tool> = Arc::new(DocumentAnalysisTool::new(pdf, requirements, reviewer));
    let executor = AgentExecutor::new(provider, vec![tool])?.with_max_iterations(max_iterations);

    let outcome = executor.run(&args.question).await?;
    info!(
        iterations = outcome.iterations,
        tool_calls = outcome.steps.len(),
        "Agent finished"
    );

    writeln!(out, "{}", outcome.output)?;
    Ok(outcome)
}
