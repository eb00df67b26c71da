//! Static file responder
//!
//! A per-request [`responder::Responder`] builds each HTTP response: it infers
//! content types, streams files resolved by a [`provider::ContentProvider`],
//! and falls back to a configurable not-found page. The `server` and
//! `handler` modules wire it into a hyper HTTP/1 server.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod provider;
pub mod responder;
pub mod server;

pub use error::{ResolveError, ResponderError};
pub use responder::{FileOutcome, Responder};
