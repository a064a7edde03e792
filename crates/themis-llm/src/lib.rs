pub mod types;
pub mod traits;
pub mod streaming;
pub mod sse;
pub mod openai;
pub mod config;
pub mod error;

pub use traits::{ChatClient, ChatRequest, ChatOptions, EventStream};

pub use streaming::{StreamEvent, parse_chat_sse_stream, parse_chat_sse_stream_counted};
pub use sse::{SseDecoder, SseFrame};
pub use openai::OpenAIClient;
pub use config::{ClientFactory, ProviderConfig};
pub use error::LlmError;
pub use types::Message;
