//! Layered configuration.
//!
//! Precedence, lowest to highest: built-in defaults, the TOML config file,
//! environment variables, command-line flags. Environment variables and flags
//! arrive together through clap (`#[arg(env = ...)]`), so clap already applies
//! flag-over-env; this module only has to layer those over the file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use llm::{ApiKey, OpenAiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use review::{LlmProvider, ModelName, RequirementReviewer, ResponseFormat};
use serde::Deserialize;
use thiserror::Error;

use agent::{DEFAULT_MAX_ITERATIONS, DEFAULT_PDF_PATH, DEFAULT_REQUIREMENTS_PATH};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "plancheck.toml";

/// Key file read when no key is supplied another way.
pub const DEFAULT_API_KEY_FILE: &str = "openai_key.txt";

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration errors, reported before any work starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file '{}' could not be read: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file '{}' is invalid: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("No API key: set OPENAI_API_KEY or provide a key file ('{}' could not be read)", path.display())]
    MissingApiKey { path: PathBuf },

    #[error("Invalid setting '{key}': {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

// ---------------------------------------------------------------------------
// File layer
// ---------------------------------------------------------------------------

/// Contents of `plancheck.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key_file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub json_mode: Option<bool>,
    pub log_format: Option<LogFormat>,
    pub agent: AgentFileConfig,
}

/// The `[agent]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentFileConfig {
    pub max_iterations: Option<usize>,
    pub pdf_path: Option<PathBuf>,
    pub requirements_path: Option<PathBuf>,
}

impl FileConfig {
    /// Parses TOML text.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Invalid {
            path: origin.to_path_buf(),
            source: Box::new(source),
        })
    }

    /// Loads the config file.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// used if present and an empty configuration otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Unreadable {
            path: path.clone(),
            source,
        })?;
        Self::parse(&text, &path)
    }
}

// ---------------------------------------------------------------------------
// Flag / environment layer
// ---------------------------------------------------------------------------

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key_file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub json_mode: Option<bool>,
    pub log_format: Option<LogFormat>,
    /// Value of [`API_KEY_ENV`], if set.
    pub env_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved settings
// ---------------------------------------------------------------------------

/// Agent-specific settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    pub max_iterations: usize,
    pub pdf_path: PathBuf,
    pub requirements_path: PathBuf,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub provider: OpenAiConfig,
    /// Ask the provider for `response_format: json_object`. Off by default:
    /// models such as `gpt-4` reject it.
    pub json_mode: bool,
    pub log_format: LogFormat,
    pub agent: AgentSettings,
}

impl Settings {
    /// Layers `overrides` over `file` over the defaults and loads the API key.
    ///
    /// Key lookup order: an explicit `--api-key-file`, then [`API_KEY_ENV`],
    /// then the config file's `api_key_file`, then [`DEFAULT_API_KEY_FILE`].
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self, ConfigError> {
        let model_raw = overrides
            .model
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let model = ModelName::new(model_raw).ok_or_else(|| ConfigError::InvalidValue {
            key: "model",
            message: "must not be empty".to_string(),
        })?;

        let timeout_secs = overrides.timeout_secs.or(file.timeout_secs).unwrap_or(120);
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }

        let max_iterations = file
            .agent
            .max_iterations
            .unwrap_or(DEFAULT_MAX_ITERATIONS);
        if max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                key: "agent.max_iterations",
                message: "must be greater than zero".to_string(),
            });
        }

        let api_key = match (overrides.api_key_file, overrides.env_api_key) {
            (Some(path), _) => read_api_key(&path)?,
            (None, Some(env)) => match ApiKey::new(env) {
                Some(key) => key,
                None => read_api_key(&key_file_or_default(file.api_key_file))?,
            },
            (None, None) => read_api_key(&key_file_or_default(file.api_key_file))?,
        };

        let base_url = overrides
            .base_url
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let max_retries = overrides.max_retries.or(file.max_retries).unwrap_or(2);

        let provider = OpenAiConfig::new(api_key, model)
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(timeout_secs))
            .with_retries(max_retries, Duration::from_secs(1));

        Ok(Self {
            provider,
            json_mode: overrides.json_mode.or(file.json_mode).unwrap_or(false),
            log_format: overrides.log_format.or(file.log_format).unwrap_or_default(),
            agent: AgentSettings {
                max_iterations,
                pdf_path: file
                    .agent
                    .pdf_path
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_PDF_PATH)),
                requirements_path: file
                    .agent
                    .requirements_path
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_REQUIREMENTS_PATH)),
            },
        })
    }

    /// Builds the requirement reviewer these settings describe.
    pub fn reviewer(&self, provider: Arc<dyn LlmProvider>) -> RequirementReviewer {
        let format = if self.json_mode {
            ResponseFormat::JsonObject
        } else {
            ResponseFormat::Text
        };
        RequirementReviewer::new(provider).with_response_format(format)
    }
}

fn key_file_or_default(configured: Option<PathBuf>) -> PathBuf {
    configured.unwrap_or_else(|| PathBuf::from(DEFAULT_API_KEY_FILE))
}

fn read_api_key(path: &Path) -> Result<ApiKey, ConfigError> {
    std::fs::read_to_string(path)
        .ok()
        .and_then(ApiKey::new)
        .ok_or_else(|| ConfigError::MissingApiKey {
            path: path.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use review::testing::ScriptedProvider;

    fn with_env_key() -> Overrides {
        Overrides {
            env_api_key: Some("sk-env".into()),
            ..Overrides::default()
        }
    }

    #[test]
    fn defaults_apply_when_nothing_is_configured() {
        let settings = Settings::resolve(FileConfig::default(), with_env_key()).unwrap();

        assert_eq!(settings.provider.model.as_str(), "gpt-4");
        assert_eq!(settings.provider.base_url, "https://api.openai.com/v1");
        assert_eq!(settings.provider.timeout, Duration::from_secs(120));
        assert_eq!(settings.provider.max_retries, 2);
        assert_eq!(settings.provider.api_key.expose(), "sk-env");
        assert!(!settings.json_mode);
        assert_eq!(settings.log_format, LogFormat::Pretty);
        assert_eq!(
            settings.agent,
            AgentSettings {
                max_iterations: 15,
                pdf_path: PathBuf::from("data/DesignCorrect.pdf"),
                requirements_path: PathBuf::from("data/requirements.txt"),
            }
        );
    }

    #[test]
    fn file_values_override_defaults_and_flags_override_file() {
        let file = FileConfig::parse(
            r#"
                model = "gpt-4o"
                base_url = "http://localhost:8080/v1"
                timeout_secs = 30
                json_mode = true
                log_format = "json"

                [agent]
                max_iterations = 4
                pdf_path = "plans/a.pdf"
            "#,
            Path::new("plancheck.toml"),
        )
        .unwrap();
        let overrides = Overrides {
            model: Some("gpt-4-turbo".into()),
            ..with_env_key()
        };

        let settings = Settings::resolve(file, overrides).unwrap();

        assert_eq!(settings.provider.model.as_str(), "gpt-4-turbo");
        assert_eq!(settings.provider.base_url, "http://localhost:8080/v1");
        assert_eq!(settings.provider.timeout, Duration::from_secs(30));
        assert!(settings.json_mode);
        assert_eq!(settings.log_format, LogFormat::Json);
        assert_eq!(settings.agent.max_iterations, 4);
        assert_eq!(settings.agent.pdf_path, PathBuf::from("plans/a.pdf"));
        assert_eq!(
            settings.agent.requirements_path,
            PathBuf::from("data/requirements.txt")
        );
    }

    #[test]
    fn json_mode_flag_overrides_file() {
        let file = FileConfig {
            json_mode: Some(true),
            ..FileConfig::default()
        };
        let overrides = Overrides {
            json_mode: Some(false),
            ..with_env_key()
        };
        assert!(!Settings::resolve(file, overrides).unwrap().json_mode);
    }

    #[tokio::test]
    async fn default_reviewer_requests_plain_text_replies() {
        let settings = Settings::resolve(FileConfig::default(), with_env_key()).unwrap();
        let provider = ScriptedProvider::new([r#"{"status": "met", "explanation": "ok"}"#]);
        let requirements = review::parse_requirements("Two exits");

        settings
            .reviewer(provider.clone())
            .review(&requirements, &review::DocumentText::new("plan", 1))
            .await
            .unwrap();

        assert_eq!(provider.requests()[0].response_format, ResponseFormat::Text);
    }

    #[tokio::test]
    async fn json_mode_reviewer_requests_json_objects() {
        let overrides = Overrides {
            json_mode: Some(true),
            ..with_env_key()
        };
        let settings = Settings::resolve(FileConfig::default(), overrides).unwrap();
        let provider = ScriptedProvider::new([r#"{"status": "met", "explanation": "ok"}"#]);

        settings
            .reviewer(provider.clone())
            .review(
                &review::parse_requirements("Two exits"),
                &review::DocumentText::new("plan", 1),
            )
            .await
            .unwrap();

        assert_eq!(
            provider.requests()[0].response_format,
            ResponseFormat::JsonObject
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = FileConfig::parse("modle = \"gpt-4\"", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn explicit_missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let overrides = Overrides {
            timeout_secs: Some(0),
            ..with_env_key()
        };
        let err = Settings::resolve(FileConfig::default(), overrides).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "timeout_secs",
                ..
            }
        ));
    }

    #[test]
    fn explicit_key_file_beats_environment() {
        let dir = tempfile::tempdir().unwrap();
        let key_path = dir.path().join("key.txt");
        std::fs::write(&key_path, "sk-file\n").unwrap();
        let overrides = Overrides {
            api_key_file: Some(key_path),
            ..with_env_key()
        };

        let settings = Settings::resolve(FileConfig::default(), overrides).unwrap();
        assert_eq!(settings.provider.api_key.expose(), "sk-file");
    }

    #[test]
    fn configured_key_file_is_used_without_environment() {
        let dir = tempfile::tempdir().unwrap();
        let key_path = dir.path().join("key.txt");
        std::fs::write(&key_path, "  sk-configured  ").unwrap();
        let file = FileConfig {
            api_key_file: Some(key_path),
            ..FileConfig::default()
        };

        let settings = Settings::resolve(file, Overrides::default()).unwrap();
        assert_eq!(settings.provider.api_key.expose(), "sk-configured");
    }

    #[test]
    fn missing_key_everywhere_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = FileConfig {
            api_key_file: Some(dir.path().join("absent.txt")),
            ..FileConfig::default()
        };

        let err = Settings::resolve(file, Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey { .. }));
    }
}
