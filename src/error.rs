//! Error types for response construction
//!
//! Two families live here: `ResponderError` for misuse of the response builder,
//! and `ResolveError` for content lookups that did not produce a file.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by [`Responder`](crate::responder::Responder) operations.
///
/// Every variant except `Serialize` indicates a bug in the calling handler,
/// not a runtime condition of the request.
#[derive(Debug, Error)]
pub enum ResponderError {
    /// A mandatory dependency was not supplied to the builder.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The response was already handed to the sink.
    #[error("response already finalized")]
    AlreadyFinalized,

    /// `send_file` was called more than once for the same response.
    #[error("send_file already called for this response")]
    FileAlreadyRequested,

    /// Status code outside the range accepted by HTTP.
    #[error("invalid status code: {0}")]
    InvalidStatus(u16),

    /// Header name or value that cannot be put on the wire.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader {
        /// Header name as given by the caller
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// Structured payload could not be serialized.
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ResponderError {
    /// Whether this error is a contract violation by the caller
    pub const fn is_contract_violation(&self) -> bool {
        !matches!(self, Self::Serialize(_))
    }
}

/// Failure to resolve a logical path to a readable file.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Nothing servable exists at the path (includes directories with no index).
    #[error("not found: {path}")]
    NotFound {
        /// Logical path as requested
        path: String,
    },

    /// The file exists but could not be opened or inspected.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Filesystem path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ResolveError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
