use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

use tokio_stream::wrappers::ReceiverStream;
use themis_chat::{Attachment, ChatEvent, MessageTurn, UserIdentity};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub user_id: String,
    pub user_email: String,
    pub text: String,
    /// Scenario key; the thread's stored scenario when omitted
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRequest>,
}

/// Attachment with its already-extracted text
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AttachmentRequest {
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl From<AttachmentRequest> for Attachment {
    fn from(req: AttachmentRequest) -> Self {
        Attachment {
            name: req.name,
            mime_type: req.mime_type,
            text: req.text,
        }
    }
}

/// Send a message and stream the response using Server-Sent Events
///
/// Each frame is `data: {"content": ..}`, `data: {"error": ..}` or the final
/// `data: {"completed": true}` (with `formatted` when tables were reflowed).
#[utoipa::path(
    post,
    path = "/threads/{thread_id}/messages",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Streaming response", content_type = "text/event-stream"),
        (status = 400, description = "Empty message"),
        (status = 403, description = "Thread owned by another user")
    ),
    tag = "messages"
)]
pub async fn send_message_stream(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    if req.user_id.trim().is_empty() || req.user_email.trim().is_empty() {
        return Err(ApiError::BadRequest("user_id and user_email are required".to_string()));
    }

    let caller = UserIdentity::new(req.user_id, req.user_email);
    let turn = MessageTurn {
        text: req.text,
        scenario: req.scenario,
        attachments: req.attachments.into_iter().map(Attachment::from).collect(),
    };

    // Ownership and input are checked here, so a denial is a plain HTTP error
    let receiver = state.chat.send_message(&caller, &thread_id, turn).await?;

    let sse_stream = ReceiverStream::new(receiver).map(move |event| {
        let sse_event = match Event::default().json_data(&event) {
            Ok(sse_event) => sse_event,
            Err(e) => {
                tracing::error!(thread_id = %thread_id, error = %e, "Failed to encode stream frame");
                encode_fallback(&event)
            }
        };
        Ok::<Event, Infallible>(sse_event)
    });

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

fn encode_fallback(event: &ChatEvent) -> Event {
    if event.is_terminal() {
        Event::default().data(r#"{"completed":true}"#)
    } else {
        Event::default().data(r#"{"error":"stream encoding failed"}"#)
    }
}
