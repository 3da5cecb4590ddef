//! Configuration management for Sourced.
//!
//! Configuration is assembled once at process start and passed by reference
//! into every component. Sources, lowest precedence first:
//! - Built-in defaults
//! - YAML config file (`SOURCED_CONFIG` or `.sourced/config.yaml`)
//! - Environment variables
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::types::ProviderType;

/// Trigger phrases that mark a query as a likely prompt-injection attempt.
pub const DEFAULT_TRIGGER_PHRASES: [&str; 12] = [
    "ignore previous instructions",
    "disregard all previous",
    "new instructions:",
    "act as a",
    "as an ai language model",
    "system prompt",
    "show me your prompt",
    "print out the following",
    "developer mode",
    "jailbreak",
    "i am a developer",
    "forget everything",
];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file that was merged, if any
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Log filter override
    pub log_level: Option<String>,

    /// Log output format ("pretty" or "json")
    pub log_format: String,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Language-model backend settings
    pub llm: LlmConfig,

    /// Web search settings
    pub search: SearchConfig,

    /// Page fetch settings
    pub fetch: FetchConfig,

    /// Injection guard heuristics
    pub guard: GuardConfig,

    /// Deadline for a whole pipeline invocation, in seconds
    pub request_timeout_secs: Option<u64>,
}

/// Language-model backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LlmConfig {
    /// Provider name ("openai", "ollama")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Custom endpoint base URL
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Resolved API key; never read from or written to the config file
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Maximum tokens to generate per answer
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            endpoint: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            max_tokens: 200,
            temperature: 0.0,
        }
    }
}

/// A keyword that restricts the search to one organization's site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRule {
    /// Case-insensitive keyword matched anywhere in the query
    pub keyword: String,

    /// Domain passed to the `site:` operator
    pub site: String,
}

impl SiteRule {
    pub fn new(keyword: impl Into<String>, site: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            site: site.into(),
        }
    }
}

/// Web search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchConfig {
    /// Number of sources to retrieve per question
    pub max_results: usize,

    /// Delay between consecutive page fetches, in milliseconds
    pub pause_ms: u64,

    /// Search endpoint (DuckDuckGo HTML interface)
    pub endpoint: String,

    /// Timeout for the search request, in seconds
    pub timeout_secs: u64,

    /// Query rewriting rules, first match wins
    pub site_rules: Vec<SiteRule>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 2,
            pause_ms: 300,
            endpoint: "https://html.duckduckgo.com/html/".to_string(),
            timeout_secs: 10,
            site_rules: vec![SiteRule::new("cloudwalk", "cloudwalk.io")],
        }
    }
}

/// Page fetch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FetchConfig {
    /// User-Agent header sent with every page request
    pub user_agent: String,

    /// Per-page timeout, in seconds
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Sourced-RAGBot/1.0".to_string(),
            timeout_secs: 8,
        }
    }
}

/// Injection guard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuardConfig {
    /// Symbol ratio above which a query is suspicious
    pub symbol_density_threshold: f64,

    /// Queries of this many characters or fewer skip the density check
    pub min_length: usize,

    /// Lowercase phrases matched as substrings of the normalized query
    pub trigger_phrases: Vec<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            symbol_density_threshold: 0.25,
            min_length: 15,
            trigger_phrases: DEFAULT_TRIGGER_PHRASES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// Full configuration file structure. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    llm: Option<LlmConfig>,
    search: Option<SearchConfig>,
    fetch: Option<FetchConfig>,
    guard: Option<GuardConfig>,
    logging: Option<LoggingConfig>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    format: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            log_level: None,
            log_format: "pretty".to_string(),
            verbose: false,
            no_color: false,
            llm: LlmConfig::default(),
            search: SearchConfig::default(),
            fetch: FetchConfig::default(),
            guard: GuardConfig::default(),
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional YAML file and the environment.
    ///
    /// Environment variables:
    /// - `SOURCED_CONFIG`: Path to config file (when `config_file` is `None`)
    /// - `SOURCED_PROVIDER`: LLM provider
    /// - `SOURCED_MODEL`, then `OPENAI_MODEL`: Model identifier
    /// - `SOURCED_ENDPOINT`: LLM endpoint base URL
    /// - `SOURCED_API_KEY`, then the variable named by `llm.apiKeyEnv`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use sourced_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load config");
    /// println!("Model: {}", config.llm.model);
    /// ```
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let mut config = Self::default();

        let explicit = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("SOURCED_CONFIG").ok().map(PathBuf::from));

        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                config = config.merge_yaml(&path)?;
            }
            None => {
                let default_path = PathBuf::from(".sourced/config.yaml");
                if default_path.exists() {
                    config = config.merge_yaml(&default_path)?;
                }
            }
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("SOURCED_PROVIDER") {
            config.llm.provider = provider;
        }

        if let Ok(model) = std::env::var("SOURCED_MODEL").or_else(|_| std::env::var("OPENAI_MODEL"))
        {
            config.llm.model = model;
        }

        if let Ok(endpoint) = std::env::var("SOURCED_ENDPOINT") {
            config.llm.endpoint = Some(endpoint);
        }

        config.llm.api_key = std::env::var("SOURCED_API_KEY")
            .or_else(|_| std::env::var(&config.llm.api_key_env))
            .ok()
            .filter(|key| !key.trim().is_empty());

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var_os("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();
        result.config_file = Some(path.to_path_buf());

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.llm = LlmConfig {
                api_key: result.llm.api_key.take(),
                ..llm
            };
        }

        if let Some(search) = config_file.search {
            result.search = search;
        }

        if let Some(fetch) = config_file.fetch {
            result.fetch = fetch;
        }

        if let Some(guard) = config_file.guard {
            result.guard = guard;
        }

        if config_file.request_timeout_secs.is_some() {
            result.request_timeout_secs = config_file.request_timeout_secs;
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over the file and environment.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.llm.provider = provider;
        }

        if let Some(model) = model {
            self.llm.model = model;
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

    /// Whether the active provider needs an API key.
    pub fn requires_api_key(&self) -> bool {
        ProviderType::parse(&self.llm.provider).is_some_and(|p| p.requires_api_key())
    }

    /// Validate the configuration before building the answer pipeline.
    ///
    /// A missing credential is fatal here rather than on the first request.
    pub fn validate(&self) -> AppResult<()> {
        if ProviderType::parse(&self.llm.provider).is_none() {
            let supported: Vec<&str> = ProviderType::ALL.iter().map(|p| p.as_str()).collect();
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.llm.provider,
                supported.join(", ")
            )));
        }

        if self.llm.model.trim().is_empty() {
            return Err(AppError::Config("No model identifier configured".to_string()));
        }

        if self.requires_api_key() && self.llm.api_key.is_none() {
            return Err(AppError::Config(format!(
                "API key not found in environment variable: {}",
                self.llm.api_key_env
            )));
        }

        if self.search.max_results == 0 {
            return Err(AppError::Config(
                "search.maxResults must be at least 1".to_string(),
            ));
        }

        let threshold = self.guard.symbol_density_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(AppError::Config(format!(
                "guard.symbolDensityThreshold must be in (0, 1], got {}",
                threshold
            )));
        }

        Ok(())
    }
}
