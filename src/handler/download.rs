//! Streaming download routes
//!
//! `/api/download` declares the full `Content-Length` up front and may stop short
//! of it; `/api/download-no-length` never declares a length at all.

use http_body_util::BodyExt;
use hyper::Response;

use super::query::{QueryError, QueryParams};
use crate::config::SimulationConfig;
use crate::http::{self, Attachment, RandomStream, ResponseBody};
use crate::logger;

const FILE_NAME: &str = "file.bin";
const NO_LENGTH_FILE_NAME: &str = "file-no-length.bin";

/// Read the `size` parameter in chunk units
pub fn read_size(params: &QueryParams, sim: &SimulationConfig) -> Result<u64, QueryError> {
    params.bounded_u64_or("size", sim.default_size_mb, sim.max_size_mb)
}

/// Convert a count of chunk units into bytes
pub fn units_to_bytes(units: u64, sim: &SimulationConfig) -> Result<u64, QueryError> {
    units
        .checked_mul(sim.chunk_size as u64)
        .ok_or(QueryError::TooLarge {
            name: "size",
            max: sim.max_size_mb,
        })
}

/// `GET /api/download?size=N&abortAfter=M`
pub fn serve_download(
    params: &QueryParams,
    sim: &SimulationConfig,
) -> Result<Response<ResponseBody>, QueryError> {
    let size_mb = read_size(params, sim)?;
    let abort_after_mb = params
        .bounded_u64_or("abortAfter", size_mb, sim.max_size_mb)?
        .min(size_mb);

    let total = units_to_bytes(size_mb, sim)?;
    let abort_at = units_to_bytes(abort_after_mb, sim)?;
    if abort_at < total {
        logger::log_debug(&format!(
            "Download of {size_mb}MB will drop after {abort_after_mb}MB"
        ));
    }

    let stream = RandomStream::new(total, abort_at, sim.chunk_size, sim.chunk_delay());
    let attachment = Attachment {
        filename: FILE_NAME,
        content_length: Some(total),
        accept_ranges: true,
    };
    Ok(http::build_attachment_response(
        &attachment,
        stream.boxed_unsync(),
    ))
}

/// `GET /api/download-no-length?size=N`
pub fn serve_download_no_length(
    params: &QueryParams,
    sim: &SimulationConfig,
) -> Result<Response<ResponseBody>, QueryError> {
    let total = units_to_bytes(read_size(params, sim)?, sim)?;

    let stream = RandomStream::new(total, total, sim.chunk_size, sim.chunk_delay());
    let attachment = Attachment {
        filename: NO_LENGTH_FILE_NAME,
        content_length: None,
        accept_ranges: false,
    };
    Ok(http::build_attachment_response(
        &attachment,
        stream.boxed_unsync(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use hyper::header;

    const CHUNK: usize = 4096;

    fn sim() -> SimulationConfig {
        let mut sim = Config::defaults().unwrap().simulation;
        sim.chunk_size = CHUNK;
        sim.chunk_delay_ms = 0;
        sim
    }

    async fn body_len(response: Response<ResponseBody>) -> usize {
        response.into_body().collect().await.unwrap().to_bytes().len()
    }

    fn content_length(response: &Response<ResponseBody>) -> Option<u64> {
        response
            .headers()
            .get(header::CONTENT_LENGTH)
            .map(|v| v.to_str().unwrap().parse().unwrap())
    }

    #[tokio::test]
    async fn test_download_full_length() {
        for size in [0_usize, 1, 3] {
            let params = QueryParams::parse(Some(&format!("size={size}")));
            let response = serve_download(&params, &sim()).unwrap();
            assert_eq!(content_length(&response), Some((size * CHUNK) as u64));
            assert_eq!(response.headers()[header::ACCEPT_RANGES], "bytes");
            assert_eq!(body_len(response).await, size * CHUNK);
        }
    }

    #[tokio::test]
    async fn test_download_default_size() {
        let response = serve_download(&QueryParams::parse(None), &sim()).unwrap();
        assert_eq!(content_length(&response), Some(10 * CHUNK as u64));
    }

    #[tokio::test]
    async fn test_download_truncates_at_abort_boundary() {
        for abort_after in [0_usize, 1, 2] {
            let params = QueryParams::parse(Some(&format!("size=3&abortAfter={abort_after}")));
            let response = serve_download(&params, &sim()).unwrap();
            assert_eq!(content_length(&response), Some(3 * CHUNK as u64));
            assert_eq!(body_len(response).await, abort_after * CHUNK);
        }
    }

    #[tokio::test]
    async fn test_abort_after_larger_than_size_is_ignored() {
        let params = QueryParams::parse(Some("size=2&abortAfter=5"));
        let response = serve_download(&params, &sim()).unwrap();
        assert_eq!(body_len(response).await, 2 * CHUNK);
    }

    #[test]
    fn test_download_rejects_bad_parameters() {
        let params = QueryParams::parse(Some("size=ten"));
        assert_eq!(
            serve_download(&params, &sim()).unwrap_err(),
            QueryError::Invalid("size")
        );

        let params = QueryParams::parse(Some("size=1&abortAfter=x"));
        assert_eq!(
            serve_download(&params, &sim()).unwrap_err(),
            QueryError::Invalid("abortAfter")
        );

        let params = QueryParams::parse(Some("size=5000"));
        assert!(matches!(
            serve_download(&params, &sim()).unwrap_err(),
            QueryError::TooLarge { name: "size", .. }
        ));
    }

    #[test]
    fn test_abort_after_above_maximum_is_rejected() {
        let params = QueryParams::parse(Some("size=2&abortAfter=5000"));
        let err = serve_download(&params, &sim()).unwrap_err();
        assert_eq!(
            err,
            QueryError::TooLarge {
                name: "abortAfter",
                max: 4096
            }
        );
        assert_eq!(err.to_string(), "abortAfter exceeds maximum of 4096");

        // At the maximum it is still only clamped to size
        let params = QueryParams::parse(Some("size=2&abortAfter=4096"));
        assert!(serve_download(&params, &sim()).is_ok());
    }

    #[tokio::test]
    async fn test_no_length_download() {
        for size in [0_usize, 2] {
            let params = QueryParams::parse(Some(&format!("size={size}")));
            let response = serve_download_no_length(&params, &sim()).unwrap();
            assert!(response.headers().get(header::CONTENT_LENGTH).is_none());
            assert_eq!(
                response.headers()[header::CONTENT_DISPOSITION],
                "attachment; filename=file-no-length.bin"
            );
            assert_eq!(body_len(response).await, size * CHUNK);
        }
    }

    #[test]
    fn test_no_length_ignores_abort_after() {
        let params = QueryParams::parse(Some("size=2&abortAfter=nonsense"));
        assert!(serve_download_no_length(&params, &sim()).is_ok());
    }
}
