//! The `document_analysis` tool.
//!
//! Runs a full requirement review over a fixed building document and
//! requirements file and renders the verdicts as text for the model.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use review::{Assessment, RequirementReviewer, ToolName};
use tracing::{info, instrument, warn};

use crate::Tool;

/// Default location of the building document.
pub const DEFAULT_PDF_PATH: &str = "data/DesignCorrect.pdf";

/// Default location of the requirements list.
pub const DEFAULT_REQUIREMENTS_PATH: &str = "data/requirements.txt";

const NAME: &str = "document_analysis";
const DESCRIPTION: &str = "Analyzes if a building document meets specified requirements";

/// Checks a configured PDF against a configured requirements file.
///
/// The tool input is ignored; the model only decides *when* to run it.
#[derive(Debug)]
pub struct DocumentAnalysisTool {
    name: ToolName,
    pdf_path: PathBuf,
    requirements_path: PathBuf,
    reviewer: RequirementReviewer,
}

impl DocumentAnalysisTool {
    /// Creates the tool for the given input files.
    pub fn new(
        pdf_path: impl Into<PathBuf>,
        requirements_path: impl Into<PathBuf>,
        reviewer: RequirementReviewer,
    ) -> Self {
        Self {
            name: ToolName::new(NAME).expect("tool name literal is non-empty"),
            pdf_path: pdf_path.into(),
            requirements_path: requirements_path.into(),
            reviewer,
        }
    }

    /// Creates the tool for [`DEFAULT_PDF_PATH`] and [`DEFAULT_REQUIREMENTS_PATH`].
    pub fn with_default_paths(reviewer: RequirementReviewer) -> Self {
        Self::new(DEFAULT_PDF_PATH, DEFAULT_REQUIREMENTS_PATH, reviewer)
    }

    pub fn pdf_path(&self) -> &Path {
        &self.pdf_path
    }

    pub fn requirements_path(&self) -> &Path {
        &self.requirements_path
    }

    async fn analyze(&self) -> Result<String, String> {
        let text = document::extract_text(&self.pdf_path).map_err(|e| e.to_string())?;
        let requirements =
            document::read_requirements(&self.requirements_path).map_err(|e| e.to_string())?;

        let report = self
            .reviewer
            .review(&requirements, &text)
            .await
            .map_err(|e| e.to_string())?;

        let sections: Vec<String> = report
            .results
            .iter()
            .map(|result| {
                let analysis = match &result.assessment {
                    Assessment::Analyzed(a) => match &a.error {
                        Some(error) => format!("{}. {} Error: {}", a.status, a.explanation, error),
                        None => format!("{}. {}", a.status, a.explanation),
                    },
                    Assessment::Failed { reason } => format!("could not be analyzed ({reason})"),
                };
                format!("Requirement: {}\nAnalysis: {}\n", result.requirement, analysis)
            })
            .collect();

        info!(
            requirements = report.results.len(),
            met = report.tally.met,
            "document_analysis finished"
        );
        Ok(sections.join("\n"))
    }
}

#[async_trait]
impl Tool for DocumentAnalysisTool {
    fn name(&self) -> &ToolName {
        &self.name
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    #[instrument(skip_all, fields(pdf = %self.pdf_path.display()))]
    async fn run(&self, _input: &str) -> String {
        if !self.pdf_path.exists() || !self.requirements_path.exists() {
            warn!(
                requirements = %self.requirements_path.display(),
                "Input files missing"
            );
            return "Error: Required files not found in data directory".to_string();
        }

        match self.analyze().await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "document_analysis failed");
                format!("Error during analysis: {e}")
            }
        }
    }
}
