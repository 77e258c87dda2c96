//! Simulated error route

use hyper::{Response, StatusCode};

use super::query::QueryParams;
use crate::config::SimulationConfig;
use crate::http::{self, ResponseBody};

/// Status codes hyper can send as a final response
const VALID_CODES: std::ops::RangeInclusive<u16> = 200..=599;

/// Resolve `code` to a status; `None` when it is not a usable status code
pub fn parse_status(params: &QueryParams, default: u16) -> Option<StatusCode> {
    let code = params.u64_or("code", u64::from(default)).ok()?;
    let code = u16::try_from(code).ok().filter(|c| VALID_CODES.contains(c))?;
    StatusCode::from_u16(code).ok()
}

/// `GET /api/download-4xx?code=N`
pub fn serve_simulated_error(params: &QueryParams, sim: &SimulationConfig) -> Response<ResponseBody> {
    match parse_status(params, sim.default_error_code) {
        Some(status) => http::build_text_response(
            status,
            format!("Simulated HTTP {} error", status.as_u16()),
        ),
        None => http::build_400_response("Invalid code".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;

    fn sim() -> SimulationConfig {
        Config::defaults().unwrap().simulation
    }

    async fn send(query: Option<&str>) -> (StatusCode, String) {
        let response = serve_simulated_error(&QueryParams::parse(query), &sim());
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_requested_code() {
        assert_eq!(
            send(Some("code=503")).await,
            (StatusCode::SERVICE_UNAVAILABLE, "Simulated HTTP 503 error".to_string())
        );
        assert_eq!(
            send(Some("code=404")).await,
            (StatusCode::NOT_FOUND, "Simulated HTTP 404 error".to_string())
        );
    }

    #[tokio::test]
    async fn test_default_code() {
        assert_eq!(
            send(None).await,
            (StatusCode::UNAUTHORIZED, "Simulated HTTP 401 error".to_string())
        );
    }

    #[tokio::test]
    async fn test_invalid_code() {
        for query in ["code=abc", "code=", "code=-1", "code=99", "code=600", "code=70000"] {
            assert_eq!(
                send(Some(query)).await,
                (StatusCode::BAD_REQUEST, "Invalid code".to_string()),
                "query: {query}"
            );
        }
    }
}
