//! Configuration management for the PRIS analysis engine.
//!
//! Configuration is merged from multiple sources, later ones winning:
//! - Built-in defaults
//! - Config file (`.pris/config.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! Relative data paths are resolved against the workspace root.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::logging::LogFormat;

/// Providers the engine knows how to construct.
pub const KNOWN_PROVIDERS: [&str; 2] = ["openai", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .pris/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider ("openai" or "ollama")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// API key for the LLM provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Text or JSON log lines
    pub log_format: LogFormat,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Reactor dataset (CSV export of PRIS)
    pub dataset: PathBuf,

    /// Pre-built vector index file
    pub index: PathBuf,

    /// Optional guided catalog override (YAML)
    pub catalog: Option<PathBuf>,

    /// Query embedding settings; must match the ones the index was built with
    pub embedding: EmbeddingSettings,

    /// Optional deadline wrapped around each external call, in seconds
    pub deadline_secs: Option<u64>,

    /// Optional cap on generated tokens per synthesis call
    pub max_tokens: Option<u32>,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Custom endpoint, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ProviderConfig::OpenAI { endpoint, .. } => endpoint.as_deref(),
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }
}

/// Embedding settings used to vectorize queries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingSettings {
    /// "trigram", "ollama" or "openai"
    pub provider: String,

    pub model: String,

    pub dimensions: usize,

    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    data: Option<DataConfig>,
    embedding: Option<EmbeddingSettings>,
    synthesis: Option<SynthesisConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    format: Option<LogFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DataConfig {
    dataset: Option<String>,
    index: Option<String>,
    catalog: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SynthesisConfig {
    #[serde(rename = "deadlineSecs")]
    deadline_secs: Option<u64>,
    #[serde(rename = "maxTokens")]
    max_tokens: Option<u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            log_format: LogFormat::Text,
            llm: None,
            dataset: PathBuf::from("PRIS.csv"),
            index: PathBuf::from(".pris/index.sqlite"),
            catalog: None,
            embedding: EmbeddingSettings::default(),
            deadline_secs: None,
            max_tokens: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file, environment variables and defaults.
    ///
    /// Environment variables:
    /// - `PRIS_WORKSPACE`: Override workspace path
    /// - `PRIS_CONFIG`: Path to config file
    /// - `PRIS_PROVIDER`: LLM provider
    /// - `PRIS_MODEL`: Model identifier
    /// - `PRIS_API_KEY`: API key
    /// - `PRIS_DATASET`: Reactor dataset CSV
    /// - `PRIS_INDEX`: Vector index file
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use pris_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Dataset: {:?}", config.dataset_path());
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`AppConfig::load`], with an explicit workspace and config file
    /// taking precedence over `PRIS_WORKSPACE` and `PRIS_CONFIG`.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| std::env::var("PRIS_WORKSPACE").ok().map(PathBuf::from)) {
            config.workspace = workspace;
        }

        if let Some(config_file) = config_file.or_else(|| std::env::var("PRIS_CONFIG").ok().map(PathBuf::from)) {
            config.config_file = Some(config_file);
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.pris_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("PRIS_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("PRIS_MODEL") {
            config.model = model;
        }

        if let Ok(dataset) = std::env::var("PRIS_DATASET") {
            config.dataset = PathBuf::from(dataset);
        }

        if let Ok(index) = std::env::var("PRIS_INDEX") {
            config.index = PathBuf::from(index);
        }

        config.api_key = std::env::var("PRIS_API_KEY").ok();
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into a copy of this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
        }

        if let Some(data) = config_file.data {
            if let Some(dataset) = data.dataset {
                result.dataset = PathBuf::from(dataset);
            }
            if let Some(index) = data.index {
                result.index = PathBuf::from(index);
            }
            if let Some(catalog) = data.catalog {
                result.catalog = Some(PathBuf::from(catalog));
            }
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(synthesis) = config_file.synthesis {
            result.deadline_secs = synthesis.deadline_secs;
            result.max_tokens = synthesis.max_tokens;
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = match provider_config {
                    ProviderConfig::OpenAI { model, .. } => model.clone(),
                    ProviderConfig::Ollama { model, .. } => model.clone(),
                };
            }

            result.llm = Some(llm);
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        dataset: Option<PathBuf>,
        index: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(dataset) = dataset {
            self.dataset = dataset;
        }

        if let Some(index) = index {
            self.index = index;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .pris directory.
    pub fn pris_dir(&self) -> PathBuf {
        self.workspace.join(".pris")
    }

    /// Directory holding optional prompt template overrides.
    pub fn prompts_dir(&self) -> PathBuf {
        self.pris_dir().join("prompts")
    }

    /// Dataset path resolved against the workspace.
    pub fn dataset_path(&self) -> PathBuf {
        self.resolve(&self.dataset)
    }

    /// Index path resolved against the workspace.
    pub fn index_path(&self) -> PathBuf {
        self.resolve(&self.index)
    }

    /// Catalog override path resolved against the workspace.
    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog.as_ref().map(|p| self.resolve(p))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Get the configuration block for a provider.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Resolve the API key for a provider.
    ///
    /// `PRIS_API_KEY` wins, then the provider's `apiKeyEnv`, then `OPENAI_API_KEY`
    /// for the OpenAI provider.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        if let Some(ProviderConfig::OpenAI { api_key_env, .. }) = self.get_provider_config(provider)
        {
            if let Ok(key) = std::env::var(api_key_env) {
                return Some(key);
            }
        }

        if provider == "openai" {
            return std::env::var("OPENAI_API_KEY").ok();
        }

        None
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.as_str();

        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if provider == "openai" && self.resolve_api_key(provider).is_none() {
            return Err(AppError::Config(
                "OpenAI provider requires an API key (PRIS_API_KEY or OPENAI_API_KEY)".to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if self.deadline_secs == Some(0) {
            return Err(AppError::Config(
                "synthesis.deadlineSecs must be greater than zero".to_string(),
            ));
        }

        if self.max_tokens == Some(0) {
            return Err(AppError::Config(
                "synthesis.maxTokens must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.dataset, PathBuf::from("PRIS.csv"));
        assert!(config.deadline_secs.is_none());
        assert!(!config.verbose);
    }

    #[test]
    fn test_paths_resolve_against_workspace() {
        let config = AppConfig {
            workspace: PathBuf::from("/data/pris"),
            ..AppConfig::default()
        };
        assert_eq!(config.dataset_path(), PathBuf::from("/data/pris/PRIS.csv"));
        assert_eq!(
            config.index_path(),
            PathBuf::from("/data/pris/.pris/index.sqlite")
        );
        assert!(config.prompts_dir().ends_with(".pris/prompts"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some("openai".to_string()),
            Some("gpt-4".to_string()),
            Some(PathBuf::from("/tmp/pris.csv")),
            None,
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "openai");
        assert_eq!(overridden.model, "gpt-4");
        assert_eq!(overridden.dataset_path(), PathBuf::from("/tmp/pris.csv"));
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  activeProvider: openai
  providers:
    openai:
      apiKeyEnv: MY_OPENAI_KEY
      model: gpt-4
data:
  dataset: data/PRIS.csv
  catalog: catalog.yaml
embedding:
  provider: ollama
  model: nomic-embed-text
  dimensions: 768
synthesis:
  deadlineSecs: 90
  maxTokens: 2048
"#,
        )
        .unwrap();

        let base = AppConfig {
            workspace: temp.path().to_path_buf(),
            ..AppConfig::default()
        };
        let merged = base.merge_yaml(&path).unwrap();

        assert_eq!(merged.provider, "openai");
        assert_eq!(merged.model, "gpt-4");
        assert_eq!(merged.dataset_path(), temp.path().join("data/PRIS.csv"));
        assert_eq!(merged.catalog_path(), Some(temp.path().join("catalog.yaml")));
        assert_eq!(merged.embedding.dimensions, 768);
        assert_eq!(merged.deadline_secs, Some(90));
        assert_eq!(merged.max_tokens, Some(2048));
    }

    #[test]
    fn test_load_from_explicit_workspace_reads_its_config() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join(".pris")).unwrap();
        std::fs::write(
            temp.path().join(".pris/config.yaml"),
            "synthesis:\n  deadlineSecs: 30\n",
        )
        .unwrap();

        let config = AppConfig::load_from(Some(temp.path().to_path_buf()), None).unwrap();
        assert_eq!(config.workspace, temp.path());
        assert_eq!(config.deadline_secs, Some(30));
    }

    #[test]
    fn test_load_from_missing_workspace_fails() {
        let result = AppConfig::load_from(Some(PathBuf::from("/definitely/not/here")), None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let config = AppConfig {
            provider: "unknown".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_openai_with_explicit_key() {
        let config = AppConfig {
            provider: "openai".to_string(),
            api_key: Some("sk-test".to_string()),
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_deadline() {
        let config = AppConfig {
            deadline_secs: Some(0),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_max_tokens() {
        let config = AppConfig {
            max_tokens: Some(0),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
