//! Filesystem content provider
//!
//! Serves files below a document root, with index file support for
//! directory paths.

use super::{ContentProvider, ResolvedFile};
use crate::error::ResolveError;
use crate::logger;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Content provider backed by a directory on disk
#[derive(Debug, Clone)]
pub struct FsProvider {
    root: PathBuf,
    index_files: Vec<String>,
}

impl FsProvider {
    pub fn new(root: impl Into<PathBuf>, index_files: Vec<String>) -> Self {
        Self {
            root: root.into(),
            index_files,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the first index file inside `dir`
    async fn find_index(&self, dir: &Path) -> Option<PathBuf> {
        for index_file in &self.index_files {
            let candidate = dir.join(index_file);
            if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
                return Some(candidate);
            }
        }
        None
    }
}

#[async_trait]
impl ContentProvider for FsProvider {
    async fn resolve(&self, logical_path: &str) -> Result<ResolvedFile, ResolveError> {
        let not_found = || ResolveError::not_found(logical_path);

        let root = match fs::canonicalize(&self.root).await {
            Ok(p) => p,
            Err(e) => {
                logger::log_warning(&format!(
                    "Document root not found or inaccessible '{}': {e}",
                    self.root.display()
                ));
                return Err(not_found());
            }
        };

        let mut file_path = root.join(relative_path(logical_path));

        let metadata = fs::metadata(&file_path)
            .await
            .map_err(|e| io_error(&file_path, e, logical_path))?;
        if metadata.is_dir() {
            file_path = self.find_index(&file_path).await.ok_or_else(not_found)?;
        }

        // Symlinks may still point outside the root
        let canonical = fs::canonicalize(&file_path)
            .await
            .map_err(|e| io_error(&file_path, e, logical_path))?;
        if !canonical.starts_with(&root) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {logical_path} -> {}",
                canonical.display()
            ));
            return Err(not_found());
        }

        let file = fs::File::open(&canonical)
            .await
            .map_err(|e| io_error(&canonical, e, logical_path))?;
        let metadata = file
            .metadata()
            .await
            .map_err(|e| io_error(&canonical, e, logical_path))?;
        if !metadata.is_file() {
            return Err(not_found());
        }

        Ok(ResolvedFile::new(canonical, metadata.len(), file))
    }
}

/// Strip the leading slash and any `.`/`..` segments from a request path
fn relative_path(logical_path: &str) -> PathBuf {
    logical_path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect()
}

fn io_error(path: &Path, source: io::Error, logical_path: &str) -> ResolveError {
    if source.kind() == io::ErrorKind::NotFound {
        ResolveError::not_found(logical_path)
    } else {
        ResolveError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
