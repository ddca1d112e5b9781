//! Common types used throughout the gate pipeline.
//!
//! This module fixes the HTTP request and response representations the
//! stages exchange.

use bytes::Bytes;
use http_body_util::Full;

/// The HTTP request type flowing through the pipeline.
///
/// A standard `http::Request` with a fully buffered `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type produced by the pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building JSON responses.
pub trait ResponseExt {
    /// Builds a response carrying a pre-serialized JSON payload.
    fn json(status: http::StatusCode, payload: Bytes) -> Response;

    /// Builds a JSON error response with a code and message.
    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response;
}

impl ResponseExt for Response {
    fn json(status: http::StatusCode, payload: Bytes) -> Response {
        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(payload))
            .expect("failed to build JSON response")
    }

    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": code,
                "message": message
            }
        });

        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .expect("failed to build JSON error response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_json_response() {
        let response = Response::json(StatusCode::OK, Bytes::from_static(b"[1,2]"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_json_error_response() {
        let response = Response::json_error(
            StatusCode::NOT_IMPLEMENTED,
            "not_implemented",
            "no handler is registered",
        );
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
