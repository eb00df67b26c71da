//! HTTP protocol layer module
//!
//! Protocol-level building blocks shared by the responder and the request
//! pipeline: content-type inference, cache-control resolution and body types.

pub mod body;
pub mod cache;
pub mod mime;

// Re-export commonly used types
pub use body::{FileBody, ResponseBody};
pub use cache::{resolve_cache_control, CacheDirective, CachePolicyTable, DEFAULT_CACHE_CONTROL};
pub use mime::{MimeTable, DEFAULT_CONTENT_TYPE};
