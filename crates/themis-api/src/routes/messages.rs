use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use themis_chat::{DBMessage, UserIdentity};
use crate::{error::ApiResult, routes::IdentityQuery, state::AppState};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListMessagesQuery {
    pub user_id: String,
    pub user_email: String,
    /// Most recent messages to return, capped by `chat.history_limit`
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttachmentResponse {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub id: String,
    pub thread_id: String,
    pub scenario: String,
    /// `user` or `assistant`
    pub sender: String,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentResponse>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListMessagesResponse {
    pub messages: Vec<MessageResponse>,
}

/// List stored messages of a thread, oldest first
#[utoipa::path(
    get,
    path = "/threads/{thread_id}/messages",
    params(
        ("thread_id" = String, Path, description = "Thread ID"),
        ListMessagesQuery
    ),
    responses(
        (status = 200, description = "Thread history", body = ListMessagesResponse),
        (status = 403, description = "Thread owned by another user")
    ),
    tag = "messages"
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Query(query): Query<ListMessagesQuery>,
) -> ApiResult<Json<ListMessagesResponse>> {
    let caller = UserIdentity::new(query.user_id, query.user_email);
    let messages = state.chat.history(&caller, &thread_id, query.limit).await?;

    Ok(Json(ListMessagesResponse {
        messages: messages.into_iter().map(message_to_response).collect(),
    }))
}

/// Delete every message of a thread and reset its memory
#[utoipa::path(
    delete,
    path = "/threads/{thread_id}/messages",
    params(
        ("thread_id" = String, Path, description = "Thread ID"),
        IdentityQuery
    ),
    responses(
        (status = 204, description = "History cleared"),
        (status = 403, description = "Thread owned by another user")
    ),
    tag = "messages"
)]
pub async fn clear_messages(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Query(query): Query<IdentityQuery>,
) -> ApiResult<StatusCode> {
    state.chat.clear_history(&query.identity(), &thread_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn message_to_response(message: DBMessage) -> MessageResponse {
    MessageResponse {
        id: message.id,
        thread_id: message.thread_id,
        scenario: message.scenario,
        sender: message.sender.as_str().to_string(),
        text: message.text,
        attachments: message
            .attachments
            .into_iter()
            .map(|a| AttachmentResponse { name: a.name, mime_type: a.mime_type })
            .collect(),
        created_at: message.created_at,
    }
}
