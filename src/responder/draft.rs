//! In-progress response state

use crate::http::{body, ResponseBody};
use crate::provider::ResolvedFile;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Response, StatusCode};

/// Default type for text payloads
pub const TEXT_CONTENT_TYPE: &str = "text/html; charset=utf-8";
/// Default type for structured payloads
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
/// Default type for raw byte payloads
pub const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

/// Payload accepted by `Responder::send`
#[derive(Debug, Clone)]
pub enum Payload {
    Text(String),
    Bytes(Bytes),
    Json(serde_json::Value),
}

impl Payload {
    pub const fn default_content_type(&self) -> &'static str {
        match self {
            Self::Text(_) => TEXT_CONTENT_TYPE,
            Self::Bytes(_) => BINARY_CONTENT_TYPE,
            Self::Json(_) => JSON_CONTENT_TYPE,
        }
    }

    pub fn into_bytes(self) -> Result<Bytes, serde_json::Error> {
        match self {
            Self::Text(text) => Ok(Bytes::from(text)),
            Self::Bytes(bytes) => Ok(bytes),
            Self::Json(value) => serde_json::to_vec(&value).map(Bytes::from),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// Where the body will come from once the response is finalized
#[derive(Debug, Default)]
pub enum DraftBody {
    #[default]
    Empty,
    Buffer(Bytes),
    File(ResolvedFile),
}

impl DraftBody {
    pub fn len(&self) -> u64 {
        match self {
            Self::Empty => 0,
            Self::Buffer(bytes) => bytes.len() as u64,
            Self::File(file) => file.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn into_body(self) -> ResponseBody {
        match self {
            Self::Empty => body::empty(),
            Self::Buffer(bytes) => body::full(bytes),
            Self::File(file) => file.into_body().boxed(),
        }
    }
}

/// Mutable accumulator for one response
///
/// An explicitly chosen content type always wins over one inferred from the
/// payload or the file extension, whatever order they were set in.
#[derive(Debug)]
pub struct ResponseDraft {
    pub(super) status: StatusCode,
    pub(super) explicit_type: Option<HeaderValue>,
    pub(super) inferred_type: Option<HeaderValue>,
    pub(super) headers: HeaderMap,
    pub(super) body: DraftBody,
    pub(super) finalized: bool,
}

impl Default for ResponseDraft {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            explicit_type: None,
            inferred_type: None,
            headers: HeaderMap::new(),
            body: DraftBody::Empty,
            finalized: false,
        }
    }
}

impl ResponseDraft {
    pub fn content_type(&self) -> Option<&HeaderValue> {
        self.explicit_type.as_ref().or(self.inferred_type.as_ref())
    }

    /// Move the accumulated state into a response, leaving the draft empty
    pub(super) fn take_response(&mut self) -> Response<ResponseBody> {
        let mut headers = std::mem::take(&mut self.headers);
        if let Some(content_type) = self.explicit_type.take().or_else(|| self.inferred_type.take()) {
            headers.insert(CONTENT_TYPE, content_type);
        }

        let body = std::mem::take(&mut self.body);
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));

        let mut response = Response::new(body.into_body());
        *response.status_mut() = self.status;
        *response.headers_mut() = headers;
        response
    }
}
