//! Content provider module
//!
//! A content provider turns a logical request path into an open file, or
//! reports that nothing servable lives there.

mod fs;

pub use fs::FsProvider;

use crate::error::ResolveError;
use crate::http::FileBody;
use async_trait::async_trait;
use hyper::body::Bytes;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Resolves logical paths to readable files
///
/// Implementations must return `ResolveError::NotFound` rather than an I/O
/// error when the path does not exist, including a directory that has no
/// index file.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn resolve(&self, logical_path: &str) -> Result<ResolvedFile, ResolveError>;
}

/// An opened file ready to be streamed
#[derive(Debug)]
pub struct ResolvedFile {
    path: PathBuf,
    len: u64,
    file: File,
}

impl ResolvedFile {
    pub const fn new(path: PathBuf, len: u64, file: File) -> Self {
        Self { path, len, file }
    }

    /// Filesystem path the logical path resolved to (after index lookup)
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn len(&self) -> u64 {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read the whole file into memory
    pub async fn read_to_bytes(mut self) -> io::Result<Bytes> {
        let mut buf = Vec::with_capacity(usize::try_from(self.len).unwrap_or_default());
        self.file.read_to_end(&mut buf).await?;
        Ok(Bytes::from(buf))
    }

    pub fn into_body(self) -> FileBody {
        FileBody::new(self.file, self.len)
    }
}
