//! Request handler module
//!
//! Routes requests to the download simulation handlers. Handlers keep all of their
//! state inside the request they serve.

pub mod download;
pub mod query;
pub mod redirect;
pub mod router;
pub mod status;

// Re-export main entry point
pub use router::handle_request;

pub const HEALTHCHECK_PATH: &str = "/healthcheck";
pub const DOWNLOAD_PATH: &str = "/api/download";
pub const DOWNLOAD_NO_LENGTH_PATH: &str = "/api/download-no-length";
pub const REDIRECT_DOWNLOAD_PATH: &str = "/api/redirect-download";
pub const DOWNLOAD_4XX_PATH: &str = "/api/download-4xx";

/// Every route served, in startup banner order
pub const ROUTES: [&str; 5] = [
    HEALTHCHECK_PATH,
    DOWNLOAD_PATH,
    DOWNLOAD_NO_LENGTH_PATH,
    REDIRECT_DOWNLOAD_PATH,
    DOWNLOAD_4XX_PATH,
];
