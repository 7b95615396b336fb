use std::time::Duration;

use serde::Deserialize;

use crate::api::state::DEFAULT_MAX_UPLOAD_BYTES;
use crate::domain::{
    default_step_definitions, ChainControllerConfig, DomainError, PollConfig, StepDefinition,
};
use crate::infrastructure::llm::{
    GeminiServiceFactory, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
    DEFAULT_GEMINI_UPLOAD_URL,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub chain: ChainConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Gemini service settings
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Preset API key; callers may still supply their own per workflow
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub upload_url: String,
    pub request_timeout_secs: u64,
}

/// Step chain settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub poll_interval_ms: u64,
    /// Zero waits indefinitely for the document to become ready
    pub ready_timeout_secs: u64,
    pub reuse_session_on_rerun: bool,
    pub steps: Vec<StepDefinition>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            upload_url: DEFAULT_GEMINI_UPLOAD_URL.to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("upload_url", &self.upload_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl GeminiConfig {
    /// Configured key, falling back to `GEMINI_API_KEY`
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn service_factory(&self) -> GeminiServiceFactory {
        GeminiServiceFactory::new(&self.model)
            .with_base_url(&self.base_url)
            .with_upload_url(&self.upload_url)
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs))
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            ready_timeout_secs: 300,
            reuse_session_on_rerun: false,
            steps: default_step_definitions().to_vec(),
        }
    }
}

impl ChainConfig {
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.poll_interval_ms),
            deadline: (self.ready_timeout_secs > 0)
                .then(|| Duration::from_secs(self.ready_timeout_secs)),
        }
    }

    pub fn controller_config(&self) -> Result<ChainControllerConfig, DomainError> {
        ChainControllerConfig::from_definitions(self.steps.clone(), self.reuse_session_on_rerun)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InstructionMode;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.gemini.model, "gemini-3-pro-preview");
        assert_eq!(config.chain.steps.len(), 3);
        assert!(!config.chain.reuse_session_on_rerun);

        let poll = config.chain.poll_config();
        assert_eq!(poll.interval, Duration::from_secs(1));
        assert_eq!(poll.deadline, Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_zero_timeout_waits_indefinitely() {
        let chain = ChainConfig {
            ready_timeout_secs: 0,
            ..ChainConfig::default()
        };

        assert_eq!(chain.poll_config().deadline, None);
    }

    #[test]
    fn test_deserialize_from_toml() {
        let raw = r#"
            [gemini]
            model = "gemini-test"

            [chain]
            reuse_session_on_rerun = true

            [[chain.steps]]
            title = "One"
            prompt = "First"

            [[chain.steps]]
            title = "Two"
            prompt = "Second"
            mode = "injected_context"

            [[chain.steps]]
            title = "Three"
            prompt = "Third"
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.gemini.model, "gemini-test");
        assert_eq!(config.gemini.request_timeout_secs, 120);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.max_upload_bytes, 50 * 1024 * 1024);

        let controller = config.chain.controller_config().unwrap();
        assert!(controller.reuse_session_on_rerun);
        assert_eq!(controller.steps[1].prompt, "Second");
        assert_eq!(controller.steps[1].mode, InstructionMode::InjectedContext);
        assert_eq!(controller.steps[2].mode, InstructionMode::Continuation);
    }

    #[test]
    fn test_wrong_step_count_rejected() {
        let chain = ChainConfig {
            steps: default_step_definitions()[..2].to_vec(),
            ..ChainConfig::default()
        };

        assert!(chain.controller_config().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let gemini = GeminiConfig {
            api_key: Some("secret-key".to_string()),
            ..GeminiConfig::default()
        };

        let debug = format!("{:?}", gemini);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }
}
