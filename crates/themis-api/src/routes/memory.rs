use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use themis_chat::{UserIdentity, UserMemory};
use crate::{error::ApiResult, routes::IdentityQuery, state::AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RememberFactRequest {
    pub user_id: String,
    pub user_email: String,
    pub fact: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecentThreadResponse {
    pub thread_id: String,
    pub scenario: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub summary: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserMemoryResponse {
    pub user_email: String,
    pub recent_threads: Vec<RecentThreadResponse>,
    pub facts: Vec<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Cross-thread memory of the caller
#[utoipa::path(
    get,
    path = "/memory",
    params(IdentityQuery),
    responses(
        (status = 200, description = "User memory", body = UserMemoryResponse)
    ),
    tag = "memory"
)]
pub async fn get_memory(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdentityQuery>,
) -> ApiResult<Json<UserMemoryResponse>> {
    let memory = state.chat.user_memory(&query.identity()).await?;
    Ok(Json(memory_to_response(memory)))
}

/// Remember a durable fact about the caller
#[utoipa::path(
    post,
    path = "/memory/facts",
    request_body = RememberFactRequest,
    responses(
        (status = 200, description = "Updated user memory", body = UserMemoryResponse),
        (status = 400, description = "Empty fact")
    ),
    tag = "memory"
)]
pub async fn remember_fact(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RememberFactRequest>,
) -> ApiResult<Json<UserMemoryResponse>> {
    let caller = UserIdentity::new(req.user_id, req.user_email);
    let memory = state.chat.remember_fact(&caller, &req.fact).await?;
    Ok(Json(memory_to_response(memory)))
}

fn memory_to_response(memory: UserMemory) -> UserMemoryResponse {
    UserMemoryResponse {
        user_email: memory.user_email,
        recent_threads: memory
            .recent_threads
            .into_iter()
            .map(|t| RecentThreadResponse {
                thread_id: t.thread_id,
                scenario: t.scenario,
                title: t.title,
                summary: t.summary,
                updated_at: t.updated_at,
            })
            .collect(),
        facts: memory.facts,
        updated_at: memory.updated_at,
    }
}
