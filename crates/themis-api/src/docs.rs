use axum::Json;
use utoipa::OpenApi;

use crate::{handlers::stream, routes::{health, memory, messages, threads}};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Themis API",
        description = "Legal chat threads with per-user memory, streamed over SSE"
    ),
    paths(
        health::health_check,
        threads::create_thread,
        threads::list_threads,
        threads::get_thread,
        threads::delete_thread,
        messages::list_messages,
        messages::clear_messages,
        stream::send_message_stream,
        memory::get_memory,
        memory::remember_fact,
    ),
    components(schemas(
        health::HealthResponse,
        threads::CreateThreadRequest,
        threads::ThreadResponse,
        threads::HistoryTurnResponse,
        threads::ListThreadsResponse,
        messages::MessageResponse,
        messages::AttachmentResponse,
        messages::ListMessagesResponse,
        stream::SendMessageRequest,
        stream::AttachmentRequest,
        memory::RememberFactRequest,
        memory::RecentThreadResponse,
        memory::UserMemoryResponse,
    )),
    tags(
        (name = "health", description = "Service status"),
        (name = "threads", description = "Thread lifecycle and memory metadata"),
        (name = "messages", description = "History and streamed replies"),
        (name = "memory", description = "Cross-thread user memory")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
