use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use themis_chat::ChatConfig;
use themis_persist::MemoryLimits;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatSettings,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: String,
    #[serde(default)]
    pub openai_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds before a request (including an open stream) is cut
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Mongodb,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    #[serde(default = "default_database")]
    pub database: String,
    /// JSON array of legal documents served by the in-memory backend
    #[serde(default)]
    pub documents_path: Option<String>,
}

fn default_database() -> String {
    "themis".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// OpenAI-compatible endpoint; the public OpenAI API when unset
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub cache_capacity: usize,
    pub cache_reload_window: usize,
    pub history_limit: usize,
    pub summary_cap: usize,
    pub short_history: usize,
    pub recent_threads: usize,
    pub facts: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        let chat = ChatConfig::default();
        let memory = MemoryLimits::default();
        Self {
            cache_capacity: chat.cache_capacity,
            cache_reload_window: chat.cache_reload_window,
            history_limit: chat.history_limit,
            summary_cap: memory.summary_cap,
            short_history: memory.short_history,
            recent_threads: memory.recent_threads,
            facts: memory.facts,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables prefixed `THEMIS_`, sections split by `__`
    ///    (e.g. `THEMIS_LLM__MAX_TOKENS`)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            // 1. Load default config
            .add_source(File::with_name("config/default").required(false))
            // 2. Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // 3. Environment variables override everything
            .add_source(
                Environment::with_prefix("THEMIS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;

        let mut cfg: Config = config.try_deserialize()?;

        // Load secrets from ENV (not in TOML)
        cfg.openai_api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::Message("OPENAI_API_KEY environment variable is required".to_string()))?;
        if cfg.storage.backend == StorageBackend::Mongodb {
            cfg.mongodb_uri = std::env::var("MONGODB_URI")
                .map_err(|_| ConfigError::Message("MONGODB_URI environment variable is required".to_string()))?;
        }

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder()
            .add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Orchestrator settings derived from the `llm` and `chat` sections
    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            model: self.llm.model.clone(),
            temperature: self.llm.temperature,
            max_tokens: self.llm.max_tokens,
            cache_capacity: self.chat.cache_capacity,
            cache_reload_window: self.chat.cache_reload_window,
            history_limit: self.chat.history_limit,
            memory: MemoryLimits {
                summary_cap: self.chat.summary_cap,
                short_history: self.chat.short_history,
                recent_threads: self.chat.recent_threads,
                facts: self.chat.facts,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 3000

        [cors]
        enabled = true
        origins = ["http://localhost:3000"]

        [storage]
        backend = "memory"
        documents_path = "config/documents.json"

        [llm]
        model = "gpt-4o-mini"
        temperature = 0.2
        max_tokens = 1024

        [chat]
        cache_capacity = 30

        [logging]
        level = "debug"
        format = "json"
    "#;

    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(TOML).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_secs, 300);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.database, "themis");
        assert!(config.llm.base_url.is_none());
    }

    #[test]
    fn test_chat_config_mapping() {
        let config: Config = toml::from_str(TOML).unwrap();
        let chat = config.chat_config();
        assert_eq!(chat.model, "gpt-4o-mini");
        assert_eq!(chat.max_tokens, 1024);
        assert_eq!(chat.cache_capacity, 30);
        assert_eq!(chat.cache_reload_window, 60);
        assert_eq!(chat.memory.summary_cap, 100_000);
        assert_eq!(chat.memory.recent_threads, 10);
    }
}
