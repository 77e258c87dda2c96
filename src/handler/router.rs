//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation, route
//! matching, dispatching, common headers and access logging.

use hyper::header::{self, HeaderMap};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::query::QueryParams;
use super::{download, redirect, status};
use super::{
    DOWNLOAD_4XX_PATH, DOWNLOAD_NO_LENGTH_PATH, DOWNLOAD_PATH, HEALTHCHECK_PATH,
    REDIRECT_DOWNLOAD_PATH,
};
use crate::config::{AppState, SimulationConfig};
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted and dropped up front.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let config = &state.config;
    let (req, _) = req.into_parts();

    let mut access = config.logging.access_log.then(|| {
        AccessLogEntry::new(
            remote_addr.ip().to_string(),
            req.method.to_string(),
            req.uri.path().to_string(),
        )
    });
    if let Some(entry) = access.as_mut() {
        fill_request_fields(entry, req.uri.query(), req.version, &req.headers);
    }

    // 1. Check HTTP method, then dispatch by path
    let mut response = match check_http_method(&req.method, config.http.enable_cors) {
        Some(resp) => resp,
        None => route_request(req.uri.path(), req.uri.query(), &config.simulation).await,
    };

    // 2. Headers every response carries
    http::apply_common_headers(
        &mut response,
        &config.http.server_name,
        config.http.enable_cors,
    );

    // 3. Access log
    if let Some(mut entry) = access {
        entry.status = response.status().as_u16();
        entry.body_bytes = http::declared_length(&response);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &config.logging.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Route request based on path; parameter errors become 400 responses
async fn route_request(
    path: &str,
    query: Option<&str>,
    sim: &SimulationConfig,
) -> Response<ResponseBody> {
    let params = QueryParams::parse(query);

    let result = match path {
        HEALTHCHECK_PATH => Ok(http::build_health_response()),
        DOWNLOAD_PATH => download::serve_download(&params, sim),
        DOWNLOAD_NO_LENGTH_PATH => download::serve_download_no_length(&params, sim),
        REDIRECT_DOWNLOAD_PATH => redirect::serve_redirect_download(&params, sim).await,
        DOWNLOAD_4XX_PATH => Ok(status::serve_simulated_error(&params, sim)),
        _ => Ok(http::build_404_response()),
    };

    result.unwrap_or_else(|e| {
        logger::log_warning(&format!("Rejected {path}: {e}"));
        http::build_400_response(e.to_string())
    })
}

fn fill_request_fields(
    entry: &mut AccessLogEntry,
    query: Option<&str>,
    version: Version,
    headers: &HeaderMap,
) {
    let header_string = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    entry.query = query.map(ToString::to_string);
    entry.http_version = match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
    .to_string();
    entry.referer = header_string(header::REFERER);
    entry.user_agent = header_string(header::USER_AGENT);
}
