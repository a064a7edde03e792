use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use themis_chat::{ThreadMeta, UserIdentity};
use crate::{
    error::{ApiError, ApiResult},
    routes::IdentityQuery,
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateThreadRequest {
    pub user_id: String,
    pub user_email: String,
    /// Scenario key; unknown keys fall back to `general`
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryTurnResponse {
    pub sender: String,
    pub text: String,
    pub at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThreadResponse {
    pub thread_id: String,
    pub scenario: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub summary: String,
    pub short_history: Vec<HistoryTurnResponse>,
    pub message_count: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_message_at: chrono::DateTime<chrono::Utc>,
}

// Explicit fields: serde_urlencoded cannot parse numbers through `flatten`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListThreadsQuery {
    pub user_id: String,
    pub user_email: String,
    /// Maximum number of threads to return (default: 20, max: 100)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListThreadsResponse {
    pub threads: Vec<ThreadResponse>,
    pub has_more: bool,
}

/// Create a new thread owned by the caller
#[utoipa::path(
    post,
    path = "/threads",
    request_body = CreateThreadRequest,
    responses(
        (status = 201, description = "Thread created", body = ThreadResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "threads"
)]
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateThreadRequest>,
) -> ApiResult<(StatusCode, Json<ThreadResponse>)> {
    if req.user_id.trim().is_empty() || req.user_email.trim().is_empty() {
        return Err(ApiError::BadRequest("user_id and user_email are required".to_string()));
    }

    let caller = UserIdentity::new(req.user_id, req.user_email);
    let scenario = req.scenario.unwrap_or_default();
    let meta = state.chat.open_thread(&caller, &scenario, req.title).await?;

    Ok((StatusCode::CREATED, Json(thread_to_response(meta))))
}

/// List the caller's threads, most recently active first
#[utoipa::path(
    get,
    path = "/threads",
    params(ListThreadsQuery),
    responses(
        (status = 200, description = "List of threads", body = ListThreadsResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "threads"
)]
pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListThreadsQuery>,
) -> ApiResult<Json<ListThreadsResponse>> {
    let limit = query.limit.clamp(1, 100);
    let caller = UserIdentity::new(query.user_id, query.user_email);

    let threads = state.chat.list_threads(&caller, limit).await?;

    let has_more = threads.len() == limit;
    let threads = threads.into_iter().map(thread_to_response).collect();

    Ok(Json(ListThreadsResponse { threads, has_more }))
}

/// Get the memory metadata of a thread
#[utoipa::path(
    get,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID"),
        IdentityQuery
    ),
    responses(
        (status = 200, description = "Thread details", body = ThreadResponse),
        (status = 403, description = "Thread owned by another user"),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Query(query): Query<IdentityQuery>,
) -> ApiResult<Json<ThreadResponse>> {
    let meta = state.chat.thread(&query.identity(), &thread_id).await?;
    Ok(Json(thread_to_response(meta)))
}

/// Delete a thread, its messages and its memory
#[utoipa::path(
    delete,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID"),
        IdentityQuery
    ),
    responses(
        (status = 204, description = "Thread deleted"),
        (status = 403, description = "Thread owned by another user")
    ),
    tag = "threads"
)]
pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    Query(query): Query<IdentityQuery>,
) -> ApiResult<StatusCode> {
    state.chat.delete_thread(&query.identity(), &thread_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn thread_to_response(meta: ThreadMeta) -> ThreadResponse {
    ThreadResponse {
        thread_id: meta.thread_id,
        scenario: meta.scenario,
        user_id: meta.user_id,
        title: meta.title,
        summary: meta.summary,
        short_history: meta
            .short_history
            .into_iter()
            .map(|turn| HistoryTurnResponse {
                sender: turn.sender.as_str().to_string(),
                text: turn.text,
                at: turn.at,
            })
            .collect(),
        message_count: meta.message_count,
        created_at: meta.created_at,
        last_message_at: meta.last_message_at,
    }
}
