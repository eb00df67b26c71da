//! Not-found page selection
//!
//! Candidates are tried in order: the request-scope override (read straight
//! from disk), the site's configured page (read through the content
//! provider), then the bundled default. The first readable one wins.

use crate::error::ResponderError;
use crate::http::MimeTable;
use crate::logger;
use crate::provider::ContentProvider;
use crate::responder::{Responder, ResponseSink};
use hyper::body::Bytes;
use std::path::PathBuf;

/// Content type of the override and bundled pages
pub const ERROR_PAGE_CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// Bundled page used when nothing else is readable
pub const DEFAULT_ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>404 Not Found</title>
<style>
body { font-family: sans-serif; color: #333; margin: 4em auto; max-width: 40em; text-align: center; }
h1 { font-size: 3em; margin-bottom: 0.2em; }
</style>
</head>
<body>
<h1>404</h1>
<p>The page you requested could not be found.</p>
</body>
</html>
"#;

/// Candidate error page sources for one request
#[derive(Debug, Clone, Default)]
pub struct ErrorPageConfig {
    /// Filesystem path that takes priority over everything else
    pub override_path: Option<PathBuf>,
    /// Logical path resolved through the content provider
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPageSource {
    Override,
    Config,
    Builtin,
}

#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub body: Bytes,
    pub content_type: &'static str,
    pub source: ErrorPageSource,
}

impl ErrorPage {
    fn builtin() -> Self {
        Self {
            body: Bytes::from_static(DEFAULT_ERROR_PAGE.as_bytes()),
            content_type: ERROR_PAGE_CONTENT_TYPE,
            source: ErrorPageSource::Builtin,
        }
    }
}

/// Pick the first readable error page
pub async fn resolve_error_page(
    config: &ErrorPageConfig,
    provider: &dyn ContentProvider,
    mime: &MimeTable,
) -> ErrorPage {
    if let Some(path) = &config.override_path {
        match tokio::fs::read(path).await {
            Ok(content) => {
                return ErrorPage {
                    body: Bytes::from(content),
                    content_type: ERROR_PAGE_CONTENT_TYPE,
                    source: ErrorPageSource::Override,
                }
            }
            Err(e) => logger::log_error_page_fallback("override", &path.display().to_string(), &e),
        }
    }

    if let Some(logical_path) = &config.config_path {
        match provider.resolve(logical_path).await {
            Ok(file) => {
                let content_type = mime.content_type_for_path(file.path());
                match file.read_to_bytes().await {
                    Ok(body) => {
                        return ErrorPage {
                            body,
                            content_type,
                            source: ErrorPageSource::Config,
                        }
                    }
                    Err(e) => logger::log_error_page_fallback("configured", logical_path, &e),
                }
            }
            Err(e) => logger::log_error_page_fallback("configured", logical_path, &e),
        }
    }

    ErrorPage::builtin()
}

/// Write the selected error page as a 404 and finalize the response
pub async fn render_not_found<S: ResponseSink>(
    res: &mut Responder<S>,
    config: &ErrorPageConfig,
) -> Result<ErrorPageSource, ResponderError> {
    let page = resolve_error_page(config, res.provider(), res.mime_table()).await;
    res.status(404)?
        .header("Content-Type", page.content_type)?
        .send(page.body)?
        .finish()?;
    Ok(page.source)
}
