/**
 * Security Middleware
 * Security headers, payload size limits, WebSocket origin checks
 */
use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};

const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Security headers middleware
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();

    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static("default-src 'self'"),
    );
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}

/// Validate JSON payload size against a content-length header
pub async fn validate_payload_size(request: Request, next: Next) -> Result<Response, StatusCode> {
    if let Some(content_length) = request.headers().get("content-length") {
        if let Ok(length_str) = content_length.to_str() {
            if let Ok(length) = length_str.parse::<usize>() {
                if length > MAX_BODY_SIZE {
                    tracing::warn!(bytes = length, "request body too large");
                    return Err(StatusCode::PAYLOAD_TOO_LARGE);
                }
            }
        }
    }

    Ok(next.run(request).await)
}

/// Validate a WebSocket upgrade's `Origin` header against the configured
/// CORS origin.
pub fn validate_websocket_origin(origin: &str, allowed_origins: &[String]) -> bool {
    allowed_origins
        .iter()
        .any(|allowed| origin == allowed || origin.starts_with(&format!("{allowed}://")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn websocket_origin_matches_exact_or_scheme_prefix() {
        let allowed = vec!["http://localhost:5173".to_string()];
        assert!(validate_websocket_origin("http://localhost:5173", &allowed));
        assert!(!validate_websocket_origin("http://evil.example.com", &allowed));
    }
}
