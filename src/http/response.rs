//! HTTP response building module
//!
//! Provides builders for the responses the simulation routes return, decoupled from
//! the handlers that decide which one to send.

use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use std::convert::Infallible;

/// Body type shared by buffered and streamed responses
pub type ResponseBody = UnsyncBoxBody<Bytes, Infallible>;

/// Wrap a buffered payload as a [`ResponseBody`]
pub fn full<T: Into<Bytes>>(chunk: T) -> ResponseBody {
    Full::new(chunk.into()).boxed_unsync()
}

fn empty() -> ResponseBody {
    full(Bytes::new())
}

/// Build health check response: `{"status":"ok"}`
pub fn build_health_response() -> Response<ResponseBody> {
    let body = serde_json::json!({ "status": "ok" }).to_string();
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(full(body))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(empty())
        })
}

/// Build plain text response with an arbitrary status
pub fn build_text_response(status: StatusCode, message: String) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(full(message))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(empty())
        })
}

/// Build 400 Bad Request response
pub fn build_400_response(message: String) -> Response<ResponseBody> {
    build_text_response(StatusCode::BAD_REQUEST, message)
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found".to_string())
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    let mut response = build_text_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "405 Method Not Allowed".to_string(),
    );
    response.headers_mut().insert(
        header::ALLOW,
        HeaderValue::from_static("GET, HEAD, OPTIONS"),
    );
    response
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(header::ALLOW, "GET, HEAD, OPTIONS");

    if enable_cors {
        builder = builder
            .header(header::ACCESS_CONTROL_ALLOW_METHODS, "GET, HEAD, OPTIONS")
            .header(header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Range")
            .header(header::ACCESS_CONTROL_MAX_AGE, "86400");
    }

    builder.body(empty()).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        Response::new(empty())
    })
}

/// Build 302 redirect response
pub fn build_redirect_response(target: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, target)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(full("Redirecting..."))
        .unwrap_or_else(|e| {
            log_build_error("302", &e);
            Response::new(empty())
        })
}

/// Binary download metadata
pub struct Attachment<'a> {
    pub filename: &'a str,
    /// Value for an explicit `Content-Length` header; `None` leaves framing to hyper
    pub content_length: Option<u64>,
    pub accept_ranges: bool,
}

/// Build 200 `application/octet-stream` attachment response
pub fn build_attachment_response(
    attachment: &Attachment<'_>,
    body: ResponseBody,
) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", attachment.filename),
        );

    if attachment.accept_ranges {
        builder = builder.header(header::ACCEPT_RANGES, "bytes");
    }
    if let Some(len) = attachment.content_length {
        builder = builder.header(header::CONTENT_LENGTH, len);
    }

    builder.body(body).unwrap_or_else(|e| {
        log_build_error("attachment", &e);
        Response::new(empty())
    })
}

/// Add `Server` and, when enabled, permissive CORS headers to any response
pub fn apply_common_headers(
    response: &mut Response<ResponseBody>,
    server_name: &str,
    enable_cors: bool,
) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(server_name) {
        headers.insert(header::SERVER, value);
    }
    if enable_cors {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        headers.insert(
            header::ACCESS_CONTROL_EXPOSE_HEADERS,
            HeaderValue::from_static("Content-Disposition, Content-Length, Accept-Ranges"),
        );
    }
}

/// Declared body length: explicit `Content-Length` first, then an exact size hint
pub fn declared_length(response: &Response<ResponseBody>) -> Option<u64> {
    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .or_else(|| response.body().size_hint().exact())
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
