//! Request handler module
//!
//! Responsible for request routing dispatch and the not-found fallback.

pub mod error_page;
pub mod router;

// Re-export main entry points
pub use error_page::{
    render_not_found, resolve_error_page, ErrorPage, ErrorPageConfig, ErrorPageSource,
};
pub use router::{handle_request, serve};
