// Configuration layer for provider client creation

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::openai::OpenAIClient;
use crate::traits::ChatClient;

/// Configuration for an OpenAI-compatible provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    /// Base URL (optional, defaults to https://api.openai.com/v1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Factory for creating chat clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_chat_client(config: ProviderConfig) -> Result<Arc<dyn ChatClient>> {
        let mut client = OpenAIClient::new(config.api_key)?;
        if let Some(base_url) = config.base_url.filter(|u| !u.trim().is_empty()) {
            client = client.with_base_url(base_url);
        }
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;

    #[test]
    fn test_missing_key_is_configuration_error() {
        let err = ClientFactory::create_chat_client(ProviderConfig::openai("")).err().unwrap();
        let llm_err = err.downcast_ref::<LlmError>().unwrap();
        assert!(llm_err.is_configuration());
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = ProviderConfig::openai("k").with_base_url("http://localhost:1234/v1");
        let json = serde_json::to_string(&config).unwrap();
        let back: ProviderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.base_url.as_deref(), Some("http://localhost:1234/v1"));
    }
}
