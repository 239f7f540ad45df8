//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{LogFormat, Overrides, API_KEY_ENV};

/// Check a building document against a list of requirements with an LLM.
///
/// `analyze` asks the model for a met / not_met / not_addressed verdict on
/// each requirement. `agent` lets the model decide when to run that analysis
/// and summarise it.
#[derive(Parser, Debug)]
#[command(name = "plancheck", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the TOML configuration file (default: ./plancheck.toml if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Chat model to use.
    #[arg(long, global = true, env = "PLANCHECK_MODEL")]
    pub model: Option<String>,

    /// Chat-completions endpoint root.
    #[arg(long, global = true, env = "PLANCHECK_BASE_URL")]
    pub base_url: Option<String>,

    /// File holding the API key (takes precedence over OPENAI_API_KEY).
    #[arg(long, global = true)]
    pub api_key_file: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Retries for transient provider failures.
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Request JSON-mode replies (`response_format: json_object`). Only some
    /// models support it.
    #[arg(long, global = true, env = "PLANCHECK_JSON_MODE", value_name = "BOOL")]
    pub json_mode: Option<bool>,

    /// Log output format.
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyse every requirement against the document and print the verdicts.
    Analyze(AnalyzeArgs),

    /// Let an agent decide when to run the analysis and report its answer.
    Agent(AgentArgs),
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Building PDF. Prompted for when omitted.
    #[arg(long)]
    pub pdf: Option<PathBuf>,

    /// Requirements text file, one requirement per line. Prompted for when omitted.
    #[arg(long)]
    pub requirements: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the report to this file.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AgentArgs {
    /// Building PDF the analysis tool reads.
    #[arg(long)]
    pub pdf: Option<PathBuf>,

    /// Requirements file the analysis tool reads.
    #[arg(long)]
    pub requirements: Option<PathBuf>,

    /// Question put to the agent.
    #[arg(
        long,
        default_value = "Analyze the building document and tell me if it meets all requirements."
    )]
    pub question: String,

    /// Upper bound on model turns.
    #[arg(long)]
    pub max_iterations: Option<usize>,
}

impl Cli {
    /// Collects the configuration overrides carried by flags and environment.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            api_key_file: self.api_key_file.clone(),
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
            json_mode: self.json_mode,
            log_format: self.log_format,
            env_api_key: std::env::var(API_KEY_ENV).ok(),
        }
    }
}
