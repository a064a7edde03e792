use thiserror::Error;

use themis_llm::LlmError;
use themis_persist::PersistError;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Thread {thread_id} belongs to another user")]
    ThreadOwnership { thread_id: String },

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upstream completion failed with status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Stable machine-readable code surfaced to clients
    pub fn code(&self) -> &'static str {
        match self {
            ChatError::Configuration(_) => "CONFIGURATION_ERROR",
            ChatError::ThreadOwnership { .. } => "THREAD_OWNERSHIP_MISMATCH",
            ChatError::ThreadNotFound(_) => "THREAD_NOT_FOUND",
            ChatError::InvalidInput(_) => "INVALID_INPUT",
            ChatError::Upstream { .. } => "UPSTREAM_ERROR",
            ChatError::Persist(_) => "PERSISTENCE_ERROR",
            ChatError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Classify a provider client error
    pub fn from_llm(err: anyhow::Error) -> Self {
        match err.downcast_ref::<LlmError>() {
            Some(LlmError::Upstream { status, body }) => ChatError::Upstream {
                status: *status,
                body: body.clone(),
            },
            Some(LlmError::EmptyResponse) => ChatError::Upstream {
                status: 200,
                body: String::new(),
            },
            Some(e) if e.is_configuration() => ChatError::Configuration(e.to_string()),
            _ => ChatError::Internal(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
