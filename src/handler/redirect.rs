//! Redirect chain route
//!
//! Each hop is a separate request; the remaining hop count and the payload size
//! travel in the `Location` URL.

use hyper::{Response, StatusCode};

use super::download::units_to_bytes;
use super::query::{QueryError, QueryParams};
use super::REDIRECT_DOWNLOAD_PATH;
use crate::config::SimulationConfig;
use crate::http::{self, Attachment, ResponseBody};
use crate::logger;

const FILE_NAME: &str = "redirected_file.bin";

/// Read `size` for a payload generated as one block in memory
fn read_block_size(params: &QueryParams, sim: &SimulationConfig) -> Result<u64, QueryError> {
    params.bounded_u64_or(
        "size",
        sim.default_size_mb,
        sim.max_block_size_mb.min(sim.max_size_mb),
    )
}

/// `Location` of the next hop
pub fn next_hop_location(redirects: u64, size_mb: u64) -> String {
    format!("{REDIRECT_DOWNLOAD_PATH}?redirects={redirects}&size={size_mb}")
}

/// `GET /api/redirect-download?redirects=N&size=S`
pub async fn serve_redirect_download(
    params: &QueryParams,
    sim: &SimulationConfig,
) -> Result<Response<ResponseBody>, QueryError> {
    let redirects = params.bounded_u64_or("redirects", 0, sim.max_redirects)?;
    // An oversized chain is rejected at its first hop
    let size_mb = read_block_size(params, sim)?;
    logger::log_debug(&format!(
        "Redirect hop: redirects={redirects} size={size_mb} MB"
    ));

    if redirects > 0 {
        return Ok(http::build_redirect_response(&next_hop_location(
            redirects - 1,
            size_mb,
        )));
    }

    let len = usize::try_from(units_to_bytes(size_mb, sim)?).map_err(|_| QueryError::TooLarge {
        name: "size",
        max: sim.max_block_size_mb,
    })?;

    // One block, generated off the reactor
    let block = match tokio::task::spawn_blocking(move || http::random_bytes(len)).await {
        Ok(block) => block,
        Err(e) => {
            logger::log_error(&format!("Payload generation failed: {e}"));
            return Ok(http::build_text_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "500 Internal Server Error".to_string(),
            ));
        }
    };

    let attachment = Attachment {
        filename: FILE_NAME,
        content_length: None,
        accept_ranges: false,
    };
    Ok(http::build_attachment_response(
        &attachment,
        http::full(block),
    ))
}
