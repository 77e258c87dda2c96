//! HTTP protocol layer module
//!
//! Response builders and the random payload bodies, decoupled from route handling.

pub mod response;
pub mod stream;

// Re-export commonly used types
pub use response::{
    apply_common_headers, build_400_response, build_404_response, build_405_response,
    build_attachment_response, build_health_response, build_options_response,
    build_redirect_response, build_text_response, declared_length, full, Attachment,
    ResponseBody,
};
pub use stream::{random_bytes, RandomStream};
