//! MIME type inference module
//!
//! Maps file extensions to Content-Type values. The table is built once per
//! process and shared read-only; responders receive it by reference.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// Fallback for extensions the table does not know
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

static GLOBAL_TABLE: OnceLock<MimeTable> = OnceLock::new();

const BUILTIN_TYPES: &[(&str, &str)] = &[
    // Text
    ("html", "text/html; charset=utf-8"),
    ("htm", "text/html; charset=utf-8"),
    ("css", "text/css; charset=utf-8"),
    ("txt", "text/plain; charset=utf-8"),
    ("md", "text/markdown; charset=utf-8"),
    ("csv", "text/csv; charset=utf-8"),
    ("xml", "application/xml; charset=utf-8"),
    // JavaScript/WASM
    ("js", "application/javascript; charset=utf-8"),
    ("mjs", "application/javascript; charset=utf-8"),
    ("json", "application/json; charset=utf-8"),
    ("map", "application/json; charset=utf-8"),
    ("wasm", "application/wasm"),
    // Images
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("webp", "image/webp"),
    ("avif", "image/avif"),
    // Video
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("ogv", "video/ogg"),
    ("mov", "video/quicktime"),
    // Audio
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("flac", "audio/flac"),
    ("m4a", "audio/mp4"),
    // Fonts
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    ("eot", "application/vnd.ms-fontobject"),
    // Documents
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("webmanifest", "application/manifest+json"),
];

/// Extension → Content-Type lookup table
#[derive(Debug, Clone)]
pub struct MimeTable {
    types: HashMap<String, &'static str>,
}

impl MimeTable {
    /// Table containing the built-in extensions
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_TYPES.iter().copied())
    }

    /// Build a table from `(extension, content_type)` pairs
    ///
    /// Extensions are normalized the same way lookups are, so `".JS"` and `"js"`
    /// name the same entry.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, &'static str)>,
    {
        let types = entries
            .into_iter()
            .map(|(ext, content_type)| (normalize(ext), content_type))
            .collect();
        Self { types }
    }

    /// Process-wide table, built on first use
    pub fn global() -> &'static Self {
        GLOBAL_TABLE.get_or_init(Self::builtin)
    }

    /// Look up an extension (case-insensitive, leading dot optional)
    pub fn lookup(&self, extension: &str) -> Option<&'static str> {
        self.types.get(&normalize(extension)).copied()
    }

    /// Content type for a bare extension or a filename carrying one
    ///
    /// # Examples
    /// ```
    /// use static_responder::http::mime::MimeTable;
    /// let table = MimeTable::builtin();
    /// assert_eq!(table.content_type_for("js"), "application/javascript; charset=utf-8");
    /// assert_eq!(table.content_type_for("app.js"), "application/javascript; charset=utf-8");
    /// assert_eq!(table.content_type_for("archive.xyz"), "application/octet-stream");
    /// ```
    pub fn content_type_for(&self, value: &str) -> &'static str {
        self.lookup(extension_of(value)).unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// Content type for a filesystem path, falling back to octet-stream
    pub fn content_type_for_path(&self, path: &Path) -> &'static str {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| self.lookup(e))
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for MimeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Extract the extension token from `"js"`, `".js"` or `"dir/app.js"`
pub fn extension_of(value: &str) -> &str {
    let name = value.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(value);
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

fn normalize(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}
