use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::sse::{SseDecoder, SseFrame};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Message {
        content: String,
    },

    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatStreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: Delta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatStreamChunk {
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
    }

    fn to_stream_events(&self) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        if let Some(content) = self.content() {
            if !content.is_empty() {
                events.push(StreamEvent::Message {
                    content: content.to_string(),
                });
            }
        }

        if let Some(finish_reason) = self.choices.first().and_then(|c| c.finish_reason.as_ref()) {
            events.push(StreamEvent::Done {
                finish_reason: Some(finish_reason.clone()),
            });
        }

        events
    }
}

/// Parse an OpenAI chat-completions SSE body
///
/// Malformed JSON frames are dropped. The stream ends at `[DONE]` or at the
/// first frame carrying a `finish_reason`.
pub fn parse_chat_sse_stream<S, B, E>(
    bytes: S,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    parse_chat_sse_stream_counted(bytes, Arc::new(AtomicU64::new(0)))
}

/// Same as [`parse_chat_sse_stream`], adding skipped frames to `skipped`
pub fn parse_chat_sse_stream_counted<S, B, E>(
    bytes: S,
    skipped: Arc<AtomicU64>,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(bytes);
        let mut decoder = SseDecoder::with_capacity(8192);
        let mut saw_frame = false;
        let mut finished = false;

        'read: while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(chunk) => {
                    for frame in decoder.push(chunk.as_ref()) {
                        saw_frame = true;
                        for event in decode_frame(frame, &mut decoder) {
                            let done = matches!(event, StreamEvent::Done { .. });
                            yield Ok(event);
                            if done {
                                finished = true;
                                break 'read;
                            }
                        }
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    finished = true;
                    break 'read;
                }
            }
        }

        if !finished {
            if let Some(frame) = decoder.finish() {
                saw_frame = true;
                for event in decode_frame(frame, &mut decoder) {
                    let done = matches!(event, StreamEvent::Done { .. });
                    yield Ok(event);
                    if done {
                        break;
                    }
                }
            }

            if !saw_frame {
                yield Err(LlmError::EmptyResponse.into());
            }
        }

        let dropped = decoder.skipped();
        if dropped > 0 {
            skipped.fetch_add(dropped, Ordering::Relaxed);
            tracing::debug!(skipped_frames = dropped, "Dropped malformed SSE frames");
        }
    })
}

fn decode_frame(frame: SseFrame, decoder: &mut SseDecoder) -> Vec<StreamEvent> {
    match frame {
        SseFrame::Done => vec![StreamEvent::Done { finish_reason: None }],
        SseFrame::Data(data) => match serde_json::from_str::<ChatStreamChunk>(&data) {
            Ok(chunk) => chunk.to_stream_events(),
            Err(e) => {
                decoder.record_skip();
                tracing::debug!(error = %e, "Skipping malformed chat chunk");
                Vec::new()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn body(parts: &[&'static str]) -> impl Stream<Item = std::result::Result<&'static [u8], String>> {
        stream::iter(parts.iter().map(|p| Ok(p.as_bytes())).collect::<Vec<_>>())
    }

    #[tokio::test]
    async fn test_content_then_done() {
        let events: Vec<_> = parse_chat_sse_stream(body(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
            "data: [DONE]\n\n",
        ]))
        .collect()
        .await;

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].as_ref().unwrap(),
            &StreamEvent::Message { content: "Hi".to_string() }
        );
        assert_eq!(
            events[1].as_ref().unwrap(),
            &StreamEvent::Done { finish_reason: None }
        );
    }

    #[tokio::test]
    async fn test_malformed_frames_are_skipped_and_counted() {
        let counter = Arc::new(AtomicU64::new(0));
        let events: Vec<_> = parse_chat_sse_stream_counted(
            body(&[
                "data: {not json}\n\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\n",
                "data: [DONE]\n\n",
            ]),
            Arc::clone(&counter),
        )
        .collect()
        .await;

        let contents: Vec<_> = events
            .into_iter()
            .filter_map(|e| match e.unwrap() {
                StreamEvent::Message { content } => Some(content),
                _ => None,
            })
            .collect();
        assert_eq!(contents, vec!["ok".to_string()]);
        assert_eq!(counter.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_done_sentinel_stops_reading() {
        let events: Vec<_> = parse_chat_sse_stream(body(&[
            "data: [DONE]\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\n",
        ]))
        .collect()
        .await;

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Ok(StreamEvent::Done { .. })));
    }

    #[tokio::test]
    async fn test_finish_reason_ends_stream() {
        let events: Vec<_> = parse_chat_sse_stream(body(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"a\"},\"finish_reason\":\"stop\"}]}\n\n",
        ]))
        .collect()
        .await;

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1].as_ref().unwrap(),
            &StreamEvent::Done { finish_reason: Some("stop".to_string()) }
        );
    }

    #[tokio::test]
    async fn test_empty_body_is_an_error() {
        let events: Vec<_> = parse_chat_sse_stream(body(&[])).collect().await;

        assert_eq!(events.len(), 1);
        let err = events[0].as_ref().unwrap_err();
        assert!(matches!(err.downcast_ref::<LlmError>(), Some(LlmError::EmptyResponse)));
    }
}
