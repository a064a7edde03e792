use std::pin::Pin;
use std::sync::Arc;

use futures::{future, Stream, StreamExt};
use themis_llm::{ChatClient, ChatOptions, ChatRequest, Message, StreamEvent};

use crate::error::{ChatError, Result};
use crate::language::Language;

/// Text deltas of one completion, in arrival order
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Two-message streaming completion against the configured provider
#[derive(Clone)]
pub struct CompletionRelay {
    client: Arc<dyn ChatClient>,
    model: String,
}

impl CompletionRelay {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// System message with the language instruction first, then the user message
    pub fn build_messages(system_prompt: &str, user_prompt: &str, language: Language) -> Vec<Message> {
        vec![
            Message::system(format!("{}\n\n{}", language.instruction(), system_prompt)),
            Message::human(user_prompt),
        ]
    }

    pub async fn stream(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
        max_tokens: u32,
        language: Language,
    ) -> Result<DeltaStream> {
        let request = ChatRequest::new(
            self.model.clone(),
            Self::build_messages(system_prompt, user_prompt, language),
        )
        .with_options(ChatOptions::new().temperature(temperature).max_tokens(max_tokens));

        let events = self
            .client
            .chat_stream(request)
            .await
            .map_err(ChatError::from_llm)?;

        let deltas = events.filter_map(|event| {
            future::ready(match event {
                Ok(StreamEvent::Message { content }) => Some(Ok(content)),
                Ok(StreamEvent::Done { .. }) => None,
                Err(e) => Some(Err(ChatError::from_llm(e))),
            })
        });
        Ok(Box::pin(deltas))
    }
}
