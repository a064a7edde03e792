use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    docs,
    handlers::stream,
    middleware::logging,
    routes::{health, memory, messages, threads},
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Threads
        .route("/threads", post(threads::create_thread).get(threads::list_threads))
        .route(
            "/threads/:thread_id",
            get(threads::get_thread).delete(threads::delete_thread),
        )
        // Messages
        .route(
            "/threads/:thread_id/messages",
            get(messages::list_messages)
                .post(stream::send_message_stream)
                .delete(messages::clear_messages),
        )
        // Memory
        .route("/memory", get(memory::get_memory))
        .route("/memory/facts", post(memory::remember_fact))
        // Docs
        .route("/api/docs/openapi.json", get(docs::openapi_json));

    api_routes
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors.allow_origin(Any)
        } else {
            let parsed_origins: Vec<axum::http::HeaderValue> = config
                .cors
                .origins
                .iter()
                .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
                .collect();

            cors.allow_origin(parsed_origins)
        }
    } else {
        CorsLayer::permissive()
    }
}
