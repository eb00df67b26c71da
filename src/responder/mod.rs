//! Per-request response builder
//!
//! A [`Responder`] owns the in-progress response for one request. Handlers
//! chain `status`, `ext`, `header`, `send` and `send_file` on it, then call
//! `finish` (or `redirect`) to hand the response to the sink. After that every
//! mutator fails with [`ResponderError::AlreadyFinalized`].
//!
//! ```ignore
//! let mut res = Responder::builder()
//!     .sink(ResponseSlot::default())
//!     .provider(provider)
//!     .build()?;
//!
//! match res.send_file("/index.html").await? {
//!     FileOutcome::Ready(_) => res.finish()?,
//!     FileOutcome::Failed(_) => res.send("not here")?.finish()?,
//! }
//! ```

mod draft;
mod sink;

pub use draft::{
    DraftBody, Payload, ResponseDraft, BINARY_CONTENT_TYPE, JSON_CONTENT_TYPE, TEXT_CONTENT_TYPE,
};
pub use sink::{ResponseSink, ResponseSlot};

use crate::error::{ResolveError, ResponderError};
use crate::http::MimeTable;
use crate::provider::ContentProvider;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, LOCATION};
use hyper::StatusCode;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Content type of redirect bodies
pub const REDIRECT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

type HeadersHook = Box<dyn FnOnce(&mut HeaderMap) + Send>;

/// What `send_file` learned about a resolved file
#[derive(Debug, Clone)]
pub struct FileHeaders {
    /// Effective content type (an explicit `ext` wins over inference)
    pub content_type: HeaderValue,
    pub content_length: u64,
    pub path: PathBuf,
}

/// Result of `send_file`
///
/// `Ready` means headers are known and the file is queued; nothing has been
/// written yet, so the caller may still change headers or status. `Failed`
/// leaves the response open with status 404 and no body.
#[derive(Debug)]
pub enum FileOutcome {
    Ready(FileHeaders),
    Failed(ResolveError),
}

impl FileOutcome {
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Builder enforcing the responder's mandatory dependencies
pub struct ResponderBuilder<S> {
    sink: Option<S>,
    provider: Option<Arc<dyn ContentProvider>>,
    mime: Option<&'static MimeTable>,
}

impl<S> Default for ResponderBuilder<S> {
    fn default() -> Self {
        Self {
            sink: None,
            provider: None,
            mime: None,
        }
    }
}

impl<S: ResponseSink> ResponderBuilder<S> {
    #[must_use]
    pub fn sink(mut self, sink: S) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn ContentProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use a specific inference table instead of the process-wide one
    #[must_use]
    pub const fn mime_table(mut self, table: &'static MimeTable) -> Self {
        self.mime = Some(table);
        self
    }

    pub fn build(self) -> Result<Responder<S>, ResponderError> {
        let sink = self
            .sink
            .ok_or(ResponderError::InvalidArgument("a response sink is required"))?;
        let provider = self
            .provider
            .ok_or(ResponderError::InvalidArgument("a content provider is required"))?;

        Ok(Responder {
            sink,
            provider,
            mime: self.mime.unwrap_or_else(MimeTable::global),
            draft: ResponseDraft::default(),
            headers_hook: None,
            file_requested: false,
        })
    }
}

/// Stateful, chainable response builder for a single request
pub struct Responder<S> {
    sink: S,
    provider: Arc<dyn ContentProvider>,
    mime: &'static MimeTable,
    draft: ResponseDraft,
    headers_hook: Option<HeadersHook>,
    file_requested: bool,
}

impl<S: ResponseSink> Responder<S> {
    pub fn builder() -> ResponderBuilder<S> {
        ResponderBuilder::default()
    }

    /// Set the status code without ending the response
    pub fn status(&mut self, code: u16) -> Result<&mut Self, ResponderError> {
        self.ensure_open()?;
        self.draft.status =
            StatusCode::from_u16(code).map_err(|_| ResponderError::InvalidStatus(code))?;
        Ok(self)
    }

    /// Set a header; `Content-Type` counts as an explicit content type
    pub fn header(&mut self, name: &str, value: &str) -> Result<&mut Self, ResponderError> {
        self.ensure_open()?;
        let invalid = |reason: String| ResponderError::InvalidHeader {
            name: name.to_owned(),
            reason,
        };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;

        if header_name == CONTENT_TYPE {
            self.draft.explicit_type = Some(header_value);
        } else {
            self.draft.headers.insert(header_name, header_value);
        }
        Ok(self)
    }

    /// Set the content type from an extension (`"js"`, `".js"`) or a filename (`"app.js"`)
    pub fn ext(&mut self, value: &str) -> Result<&mut Self, ResponderError> {
        self.ensure_open()?;
        let content_type = self.mime.content_type_for(value);
        self.draft.explicit_type = Some(HeaderValue::from_static(content_type));
        Ok(self)
    }

    /// Queue an in-memory body
    ///
    /// Text defaults to HTML, JSON values to `application/json`, raw bytes to
    /// octet-stream; an explicit content type overrides the default.
    pub fn send(&mut self, payload: impl Into<Payload>) -> Result<&mut Self, ResponderError> {
        self.ensure_open()?;
        let payload = payload.into();
        let default_type = payload.default_content_type();
        let bytes = payload.into_bytes()?;

        self.draft.inferred_type = Some(HeaderValue::from_static(default_type));
        self.draft.body = DraftBody::Buffer(bytes);
        Ok(self)
    }

    /// Serialize a value and queue it as a JSON body
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self, ResponderError> {
        let value = serde_json::to_value(value)?;
        self.send(value)
    }

    /// Resolve a logical path through the content provider and queue the file
    ///
    /// The only call that suspends. Resolution failures come back as
    /// `FileOutcome::Failed`, never as `Err`; `Err` is reserved for misuse, such
    /// as calling this twice for the same response.
    pub async fn send_file(&mut self, logical_path: &str) -> Result<FileOutcome, ResponderError> {
        self.ensure_open()?;
        if self.file_requested {
            return Err(ResponderError::FileAlreadyRequested);
        }
        self.file_requested = true;

        match self.provider.resolve(logical_path).await {
            Ok(file) => {
                let inferred = HeaderValue::from_static(self.mime.content_type_for_path(file.path()));
                self.draft.inferred_type = Some(inferred);

                let headers = FileHeaders {
                    content_type: self
                        .draft
                        .content_type()
                        .cloned()
                        .unwrap_or_else(|| HeaderValue::from_static(BINARY_CONTENT_TYPE)),
                    content_length: file.len(),
                    path: file.path().to_path_buf(),
                };
                self.draft.body = DraftBody::File(file);
                Ok(FileOutcome::Ready(headers))
            }
            Err(err) => {
                self.draft.status = StatusCode::NOT_FOUND;
                self.draft.body = DraftBody::Empty;
                Ok(FileOutcome::Failed(err))
            }
        }
    }

    /// Register a hook that sees the final headers right before delivery
    ///
    /// Runs once, after Content-Type and Content-Length are set. Registering
    /// again replaces the previous hook.
    pub fn on_headers<F>(&mut self, hook: F) -> Result<&mut Self, ResponderError>
    where
        F: FnOnce(&mut HeaderMap) + Send + 'static,
    {
        self.ensure_open()?;
        self.headers_hook = Some(Box::new(hook));
        Ok(self)
    }

    /// Redirect with 301 Moved Permanently and finalize
    pub fn redirect(&mut self, location: &str) -> Result<(), ResponderError> {
        self.redirect_with_code(location, 301)
    }

    /// Redirect with a custom status code and finalize
    pub fn redirect_with_code(&mut self, location: &str, code: u16) -> Result<(), ResponderError> {
        self.ensure_open()?;
        let status = StatusCode::from_u16(code).map_err(|_| ResponderError::InvalidStatus(code))?;
        let location_value =
            HeaderValue::from_str(location).map_err(|e| ResponderError::InvalidHeader {
                name: LOCATION.to_string(),
                reason: e.to_string(),
            })?;

        self.draft.status = status;
        self.draft.headers.insert(LOCATION, location_value);
        self.draft.explicit_type = Some(HeaderValue::from_static(REDIRECT_CONTENT_TYPE));
        self.draft.body = DraftBody::Buffer(format!("Redirecting to {location} ...").into());
        self.finish()
    }

    /// Finalize the response and hand it to the sink
    pub fn finish(&mut self) -> Result<(), ResponderError> {
        self.ensure_open()?;
        self.draft.finalized = true;

        let mut response = self.draft.take_response();
        if let Some(hook) = self.headers_hook.take() {
            hook(response.headers_mut());
        }
        self.sink.deliver(response);
        Ok(())
    }

    pub const fn status_code(&self) -> StatusCode {
        self.draft.status
    }

    pub fn content_type(&self) -> Option<&HeaderValue> {
        self.draft.content_type()
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.draft.headers
    }

    pub fn location(&self) -> Option<&HeaderValue> {
        self.draft.headers.get(LOCATION)
    }

    pub const fn is_finalized(&self) -> bool {
        self.draft.finalized
    }

    /// Whether a body (buffer or file) is queued
    pub fn has_body(&self) -> bool {
        !matches!(self.draft.body, DraftBody::Empty)
    }

    pub fn provider(&self) -> &dyn ContentProvider {
        self.provider.as_ref()
    }

    pub const fn mime_table(&self) -> &'static MimeTable {
        self.mime
    }

    pub const fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    const fn ensure_open(&self) -> Result<(), ResponderError> {
        if self.draft.finalized {
            Err(ResponderError::AlreadyFinalized)
        } else {
            Ok(())
        }
    }
}
