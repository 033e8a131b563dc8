//! Configuration management for the medrag answer pipeline.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Built-in defaults
//! - Config file (`medrag.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources win. The configuration covers the full surface the
//! pipeline reads: retrieval fan-out and threshold, namespace resolution,
//! history window budgets, working language, and provider selection.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider for the refinement stages ("gemini", "ollama")
    pub provider: String,

    /// Model identifier for the refinement stages
    pub model: String,

    /// Explicit API key override (normally resolved from the environment)
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Retrieval settings
    pub retrieval: RetrievalConfig,

    /// Query embedding settings
    pub embedding: EmbeddingSettings,

    /// Conversation history settings
    pub history: HistoryConfig,

    /// Refinement pipeline settings
    pub pipeline: PipelineConfig,
}

/// Vector retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Query endpoint of the vector index (e.g. a Pinecone index host URL)
    #[serde(rename = "indexHost")]
    pub index_host: Option<String>,

    /// Retrieval fan-out: number of nearest neighbors to fetch
    #[serde(rename = "topK")]
    pub top_k: u32,

    /// Minimum similarity score for a passage to be considered relevant.
    /// Deployment-tunable; observed variants ranged 0.2-0.57.
    pub threshold: f32,

    /// Namespace used when no mapping applies. Empty selects the index's
    /// default partition.
    #[serde(rename = "defaultNamespace")]
    pub default_namespace: String,

    /// Channel identifier -> namespace mapping
    #[serde(rename = "namespaceMap", default)]
    pub namespace_map: HashMap<String, String>,
}

/// Query embedding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Embedding provider ("gemini", "mock")
    pub provider: String,

    /// Embedding model identifier; must match the index's dimensionality
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,
}

/// Conversation history configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Path to the SQLite conversation log
    pub path: PathBuf,

    /// Maximum turns composed into one history window
    #[serde(rename = "windowLimit")]
    pub window_limit: usize,

    /// Total serialized character budget for one window
    #[serde(rename = "charBudget")]
    pub char_budget: usize,

    /// Per-turn text truncation length
    #[serde(rename = "turnMaxChars")]
    pub turn_max_chars: usize,
}

/// Refinement pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Language the retrieval and refinement stages operate in
    #[serde(rename = "workingLanguage")]
    pub working_language: String,

    /// Run the terminal language-normalization stage
    #[serde(rename = "normalizeLanguage")]
    pub normalize_language: bool,

    /// Timeout applied to each external call (embedding, index, LLM stage)
    #[serde(rename = "requestTimeoutSecs")]
    pub request_timeout_secs: u64,

    /// Bound on concurrent pipeline runs
    #[serde(rename = "maxWorkers")]
    pub max_workers: usize,

    /// Optional directory with stage prompt overrides (*.hbs)
    #[serde(rename = "promptDir")]
    pub prompt_dir: Option<PathBuf>,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    embedding: Option<EmbeddingSettings>,
    retrieval: Option<RetrievalConfig>,
    history: Option<HistoryConfig>,
    pipeline: Option<PipelineConfig>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            index_host: None,
            top_k: 5,
            threshold: 0.4,
            default_namespace: String::new(),
            namespace_map: HashMap::new(),
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-embedding-001".to_string(),
            dimensions: 3072,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("medrag-history.db"),
            window_limit: 8,
            char_budget: 1500,
            turn_max_chars: 400,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            working_language: "English".to_string(),
            normalize_language: true,
            request_timeout_secs: 30,
            max_workers: 2,
            prompt_dir: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            retrieval: RetrievalConfig::default(),
            embedding: EmbeddingSettings::default(),
            history: HistoryConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `MEDRAG_CONFIG`: Path to config file (default: ./medrag.yaml)
    /// - `MEDRAG_PROVIDER`: LLM provider
    /// - `MEDRAG_MODEL`: Model identifier
    /// - `MEDRAG_API_KEY`: Explicit API key override
    /// - `MEDRAG_NAMESPACE`: Default retrieval namespace
    /// - `MEDRAG_TOP_K`: Retrieval fan-out
    /// - `PINECONE_INDEX_HOST`: Vector index query endpoint
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("MEDRAG_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Load from YAML config file if it exists
        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("medrag.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("MEDRAG_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("MEDRAG_MODEL") {
            config.model = model;
        }

        if let Ok(namespace) = std::env::var("MEDRAG_NAMESPACE") {
            config.retrieval.default_namespace = namespace;
        }

        if let Ok(top_k) = std::env::var("MEDRAG_TOP_K") {
            config.retrieval.top_k = top_k.parse().map_err(|_| {
                AppError::Config(format!("MEDRAG_TOP_K is not a number: {}", top_k))
            })?;
        }

        if let Ok(host) = std::env::var("PINECONE_INDEX_HOST") {
            config.retrieval.index_host = Some(host);
        }

        config.api_key = std::env::var("MEDRAG_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(history) = config_file.history {
            result.history = history;
        }

        if let Some(pipeline) = config_file.pipeline {
            result.pipeline = pipeline;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over both the config file and environment
    /// variables.
    pub fn with_overrides(
        mut self,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Resolve the LLM API key for a provider from the environment.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        // Explicit MEDRAG_API_KEY wins
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match provider {
            "gemini" => std::env::var("GEMINI_API_KEY").ok(),
            // Ollama is local and keyless
            _ => None,
        }
    }

    /// Resolve the vector index API key from the environment.
    pub fn resolve_index_api_key(&self) -> Option<String> {
        std::env::var("PINECONE_API_KEY")
            .or_else(|_| std::env::var("PINECONE_KEY"))
            .ok()
    }

    /// Resolve the retrieval namespace for a channel identifier.
    ///
    /// Looks up the channel in the configured namespace map (the map key is
    /// a channel id or the digits of a display number); falls back to the
    /// default namespace.
    pub fn resolve_namespace(&self, channel: Option<&str>) -> String {
        if let Some(channel) = channel {
            if let Some(ns) = self.retrieval.namespace_map.get(channel) {
                return ns.clone();
            }
            let digits: String = channel.chars().filter(|c| c.is_ascii_digit()).collect();
            if let Some(ns) = self.retrieval.namespace_map.get(&digits) {
                return ns.clone();
            }
        }
        self.retrieval.default_namespace.clone()
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["gemini", "ollama"];

        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        if self.provider == "gemini" && self.resolve_api_key("gemini").is_none() {
            return Err(AppError::Config(
                "Gemini provider requires GEMINI_API_KEY (or MEDRAG_API_KEY)".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.retrieval.threshold) {
            return Err(AppError::Config(format!(
                "Relevance threshold must be in [0.0, 1.0], got {}",
                self.retrieval.threshold
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "gemini");
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.threshold, 0.4);
        assert_eq!(config.history.window_limit, 8);
        assert_eq!(config.history.char_budget, 1500);
        assert!(!config.verbose);
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            Some("ollama".to_string()),
            Some("llama3.2".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.2");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_threshold_range() {
        let mut config = AppConfig::default();
        config.provider = "ollama".to_string();
        config.retrieval.threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_namespace_mapped() {
        let mut config = AppConfig::default();
        config
            .retrieval
            .namespace_map
            .insert("734690309731285".to_string(), "blood-donation".to_string());
        config.retrieval.default_namespace = "general".to_string();

        assert_eq!(
            config.resolve_namespace(Some("734690309731285")),
            "blood-donation"
        );
        assert_eq!(config.resolve_namespace(Some("unmapped")), "general");
        assert_eq!(config.resolve_namespace(None), "general");
    }

    #[test]
    fn test_resolve_namespace_display_number_digits() {
        let mut config = AppConfig::default();
        config
            .retrieval
            .namespace_map
            .insert("15551515454".to_string(), "pregnancy".to_string());

        // Display numbers carry punctuation; only digits are matched
        assert_eq!(
            config.resolve_namespace(Some("+1 (555) 151-5454")),
            "pregnancy"
        );
    }

    #[test]
    fn test_merge_yaml_sections() {
        let yaml = r#"
llm:
  provider: ollama
  model: llama3.2
retrieval:
  topK: 3
  threshold: 0.57
  defaultNamespace: "blood-donation"
history:
  path: "/data/history.db"
  windowLimit: 4
  charBudget: 800
  turnMaxChars: 200
"#;
        let dir = std::env::temp_dir().join("medrag-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("medrag.yaml");
        std::fs::write(&path, yaml).unwrap();

        let mut config = AppConfig::default();
        let merged = config.merge_yaml(&path).unwrap();

        assert_eq!(merged.provider, "ollama");
        assert_eq!(merged.retrieval.top_k, 3);
        assert_eq!(merged.retrieval.threshold, 0.57);
        assert_eq!(merged.retrieval.default_namespace, "blood-donation");
        assert_eq!(merged.history.window_limit, 4);
        assert_eq!(merged.history.char_budget, 800);
    }
}
