//! End-to-end tests for the `analyze` and `agent` commands with a scripted
//! model and generated input files.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use document::fixtures::pdf_with_pages;
use plancheck::args::{AgentArgs, AnalyzeArgs, OutputFormat};
use plancheck::commands::{self, CommandError};
use plancheck::config::AgentSettings;
use pretty_assertions::assert_eq;
use review::testing::ScriptedProvider;
use review::{AnalysisStatus, Assessment, RequirementReviewer};

const MET: &str = r#"{"status": "met", "explanation": "Two exits are shown.", "error": null}"#;
const NOT_MET: &str =
    "```json\n{\"status\": \"not_met\", \"explanation\": \"Corridor is 36 in.\", \"error\": \"Needs 44 in\"}\n```";

fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let pdf = dir.join("plan.pdf");
    let reqs = dir.join("requirements.txt");
    std::fs::write(&pdf, pdf_with_pages(&["Exit A and Exit B", "Corridor 36 in"])).unwrap();
    std::fs::write(&reqs, "Two exits required\n\n  Corridors at least 44 in  \n").unwrap();
    (pdf, reqs)
}

fn analyze_args(pdf: PathBuf, reqs: PathBuf) -> AnalyzeArgs {
    AnalyzeArgs {
        pdf: Some(pdf),
        requirements: Some(reqs),
        format: OutputFormat::Text,
        output: None,
    }
}

#[tokio::test]
async fn analyze_prints_a_block_per_requirement() {
    let dir = tempfile::tempdir().unwrap();
    let (pdf, reqs) = write_inputs(dir.path());
    let provider = ScriptedProvider::new([MET, NOT_MET]);
    let mut out = Vec::new();

    let report = commands::analyze::run(
        &analyze_args(pdf, reqs),
        RequirementReviewer::new(provider.clone()),
        &mut Cursor::new(Vec::new()),
        &mut out,
    )
    .await
    .unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[1].requirement.as_str(), "Corridors at least 44 in");
    assert_eq!(
        report.results[1].assessment.status(),
        Some(AnalysisStatus::NotMet)
    );

    let printed = String::from_utf8(out).unwrap();
    let first = printed.find("Analyzing requirement: Two exits required\n").unwrap();
    let second = printed
        .find("Analyzing requirement: Corridors at least 44 in\n")
        .unwrap();
    let results = printed.find("=== Analysis Results ===").unwrap();
    assert!(first < second && second < results);
    assert!(printed.contains(
        "Requirement: Corridors at least 44 in\nStatus: not_met\nExplanation: Corridor is 36 in.\nError: Needs 44 in\n"
    ));
    assert_eq!(printed.matches(&"-".repeat(50)).count(), 2);

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].messages[0].content.contains("Requirement: Two exits required"));
    assert!(requests[0].messages[0].content.contains("Exit A and Exit B"));
}

#[tokio::test]
async fn analyze_keeps_going_after_a_malformed_reply() {
    let dir = tempfile::tempdir().unwrap();
    let (pdf, reqs) = write_inputs(dir.path());
    let provider = ScriptedProvider::new(["I think it is fine.", MET]);

    let report = commands::analyze::run(
        &analyze_args(pdf, reqs),
        RequirementReviewer::new(provider),
        &mut Cursor::new(Vec::new()),
        &mut Vec::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.results.len(), 2);
    assert!(matches!(report.results[0].assessment, Assessment::Failed { .. }));
    assert_eq!(report.tally.failed, 1);
    assert_eq!(report.tally.met, 1);
}

#[tokio::test]
async fn analyze_writes_json_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let (pdf, reqs) = write_inputs(dir.path());
    let output = dir.path().join("report.json");
    let args = AnalyzeArgs {
        format: OutputFormat::Json,
        output: Some(output.clone()),
        ..analyze_args(pdf, reqs)
    };

    let mut out = Vec::new();
    commands::analyze::run(
        &args,
        RequirementReviewer::new(ScriptedProvider::new([MET, NOT_MET])),
        &mut Cursor::new(Vec::new()),
        &mut out,
    )
    .await
    .unwrap();

    let printed: serde_json::Value = serde_json::from_str(&String::from_utf8(out).unwrap()).unwrap();
    assert_eq!(printed["tally"]["met"], 1);

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(saved["results"][0]["assessment"]["status"], "met");
    assert_eq!(saved["results"][1]["assessment"]["error"], "Needs 44 in");
    assert_eq!(saved["tally"]["not_met"], 1);
}

#[tokio::test]
async fn analyze_reads_prompted_paths() {
    let dir = tempfile::tempdir().unwrap();
    let (pdf, reqs) = write_inputs(dir.path());
    let typed = format!("{}\n{}\n", pdf.display(), reqs.display());
    let mut out = Vec::new();
    let args = AnalyzeArgs {
        pdf: None,
        requirements: None,
        format: OutputFormat::Text,
        output: None,
    };

    let report = commands::analyze::run(
        &args,
        RequirementReviewer::new(ScriptedProvider::new([MET, MET])),
        &mut Cursor::new(typed.into_bytes()),
        &mut out,
    )
    .await
    .unwrap();

    assert_eq!(report.tally.met, 2);
    assert!(String::from_utf8(out)
        .unwrap()
        .starts_with("Enter the path to the building PDF file: "));
}

#[tokio::test]
async fn analyze_rejects_missing_files_before_calling_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new([MET]);

    let err = commands::analyze::run(
        &analyze_args(dir.path().join("absent.pdf"), dir.path().join("absent.txt")),
        RequirementReviewer::new(provider.clone()),
        &mut Cursor::new(Vec::new()),
        &mut Vec::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<CommandError>(),
        Some(CommandError::MissingInputs)
    ));
    assert_eq!(err.to_string(), "One or both files do not exist!");
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn agent_runs_the_tool_and_prints_the_final_answer() {
    let dir = tempfile::tempdir().unwrap();
    let (pdf, reqs) = write_inputs(dir.path());
    let provider = ScriptedProvider::new([
        "Thought: I should analyze the document\nAction: document_analysis\nAction Input: all",
        MET,
        NOT_MET,
        "Thought: I now know the final answer\nFinal Answer: One requirement is not met.",
    ]);
    let settings = AgentSettings {
        max_iterations: 15,
        pdf_path: pdf,
        requirements_path: reqs,
    };
    let args = AgentArgs {
        pdf: None,
        requirements: None,
        question: "Does the building comply?".into(),
        max_iterations: None,
    };
    let mut out = Vec::new();

    let reviewer = RequirementReviewer::new(provider.clone());
    let outcome = commands::agent::run(&args, &settings, reviewer, &mut out)
        .await
        .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "One requirement is not met.\n");
    assert_eq!(outcome.steps.len(), 1);
    assert!(outcome.steps[0]
        .observation
        .contains("Requirement: Corridors at least 44 in\nAnalysis: not_met."));

    let requests = provider.requests();
    assert_eq!(requests.len(), 4);
    assert!(requests[3].messages[0].content.contains("Observation: Requirement: Two exits required"));
}

#[tokio::test]
async fn agent_flag_overrides_iteration_limit() {
    let dir = tempfile::tempdir().unwrap();
    let settings = AgentSettings {
        max_iterations: 15,
        pdf_path: dir.path().join("absent.pdf"),
        requirements_path: dir.path().join("absent.txt"),
    };
    let args = AgentArgs {
        pdf: None,
        requirements: None,
        question: "go".into(),
        max_iterations: Some(1),
    };
    let provider = ScriptedProvider::new(["Action: document_analysis\nAction Input: x"]);

    let err = commands::agent::run(
        &args,
        &settings,
        RequirementReviewer::new(provider.clone()),
        &mut Vec::new(),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("after 1 iterations"));
    assert_eq!(provider.requests().len(), 1);
}
