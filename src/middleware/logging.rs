/**
 * Request Logging Middleware
 * 
 * Logs all requests for monitoring and security auditing
 */
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};

/// Logging middleware for the planning-session API
pub async fn request_logging_middleware(
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let ip = request
        .extensions()
        .get::<std::net::IpAddr>()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    info!("request: {} {} from {}", method, uri, ip);

    let response = next.run(request).await;
    let duration = start.elapsed();

    if response.status().is_server_error() {
        warn!(
            "response: {} {} - status {} - {:?}",
            method, uri, response.status(), duration
        );
    } else {
        info!(
            "response: {} {} - status {} - {:?}",
            method, uri, response.status(), duration
        );
    }

    response
}
