use serde::{Deserialize, Serialize};

/// Hard cap imposed by the directory API on `page_size`.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Upper bound for the completion budget sent to the language model.
pub const MAX_LLM_TOKENS: u32 = 2000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub limiter: LimiterConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub matcher: MatcherConfig,

    #[serde(default)]
    pub directory: DirectoryConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub http_server: HttpServerConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.matcher.threshold) {
            return Err(format!(
                "matcher.threshold must be within [0, 1], got {}",
                self.matcher.threshold
            ));
        }
        if self.limiter.max_concurrent == 0 {
            return Err("limiter.max_concurrent must be at least 1".to_string());
        }
        if self.retry.read_max_attempts == 0 || self.retry.write_max_attempts == 0 {
            return Err("retry attempt counts must be at least 1".to_string());
        }
        if self.directory.page_size == 0 {
            return Err("directory.page_size must be at least 1".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "taskbridge_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Spacing and concurrency for every outbound directory call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterConfig {
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Wait applied to a throttle response that carries no usable `Retry-After`.
    #[serde(default = "default_throttle_fallback_ms")]
    pub throttle_fallback_ms: u64,
}

fn default_min_interval_ms() -> u64 {
    333
}

fn default_max_concurrent() -> usize {
    1
}

fn default_throttle_fallback_ms() -> u64 {
    400
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            max_concurrent: default_max_concurrent(),
            throttle_fallback_ms: default_throttle_fallback_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_read_max_attempts")]
    pub read_max_attempts: u32,

    #[serde(default = "default_write_max_attempts")]
    pub write_max_attempts: u32,

    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
}

fn default_read_max_attempts() -> u32 {
    2
}

fn default_write_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    250
}

fn default_jitter_ms() -> u64 {
    100
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            read_max_attempts: default_read_max_attempts(),
            write_max_attempts: default_write_max_attempts(),
            backoff_ms: default_backoff_ms(),
            jitter_ms: default_jitter_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Maximum accepted distance: 0 = identical, 1 = unrelated.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.4
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_directory_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_directory_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Unset means "list workspace users" rather than query a database.
    #[serde(default)]
    pub people_database_id: Option<String>,

    #[serde(default)]
    pub projects_database_id: Option<String>,

    #[serde(default)]
    pub tasks_database_id: String,

    #[serde(default = "default_memoize_per_request")]
    pub memoize_per_request: bool,
}

fn default_directory_base_url() -> String {
    "https://api.notion.com/v1".to_string()
}

fn default_api_version() -> String {
    "2022-06-28".to_string()
}

fn default_directory_timeout_ms() -> u64 {
    30_000
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_memoize_per_request() -> bool {
    true
}

impl DirectoryConfig {
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_directory_base_url(),
            api_key: String::new(),
            api_version: default_api_version(),
            timeout_ms: default_directory_timeout_ms(),
            page_size: default_page_size(),
            people_database_id: None,
            projects_database_id: None,
            tasks_database_id: String::new(),
            memoize_per_request: default_memoize_per_request(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> u32 {
    MAX_LLM_TOKENS
}

fn default_llm_timeout_ms() -> u64 {
    60_000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: String::new(),
            model: default_llm_model(),
            max_tokens: default_max_tokens(),
            timeout_ms: default_llm_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_host")]
    pub host: String,

    #[serde(default = "default_http_port")]
    pub port: u16,
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    3000
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Shown in the `Source` select and the audit callout of created tasks.
    #[serde(default = "default_workflow_source")]
    pub source: String,
}

fn default_workflow_source() -> String {
    "iOS Shortcut".to_string()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            source: default_workflow_source(),
        }
    }
}
