use thiserror::Error;

/// Typed failures raised by the provider client.
///
/// They travel inside `anyhow::Error`; callers that need the status code
/// use `downcast_ref::<LlmError>()`.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Missing API key for completion provider")]
    MissingApiKey,

    #[error("Invalid provider configuration: {0}")]
    InvalidConfig(String),

    #[error("Upstream API error ({status}): {body}")]
    Upstream {
        status: u16,
        body: String,
    },

    #[error("Upstream returned an empty response body")]
    EmptyResponse,
}

impl LlmError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::InvalidConfig(_))
    }
}
