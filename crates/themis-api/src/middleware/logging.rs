use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Request logging middleware
///
/// SSE responses are logged when headers go out, not when the stream ends.
pub async fn log_request(
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    // Query strings carry caller emails, so only the path is logged
    if status.is_server_error() {
        tracing::warn!(
            method = %method,
            uri = %path,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            uri = %path,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request processed"
        );
    }

    response
}
