//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, health probes,
//! configured redirects, then static content with the error page fallback.

use crate::config::{AppState, Site};
use crate::error::ResponderError;
use crate::handler::error_page::render_not_found;
use crate::http::{body, resolve_cache_control, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use crate::responder::{FileOutcome, Responder, ResponseSink, ResponseSlot};
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Method, Request, Response, StatusCode};
use serde_json::json;
use std::borrow::Cow;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let logging = &state.config.logging;
    let entry = logging.access_log.then(|| {
        AccessLogEntry::from_request(
            remote_addr,
            req.method(),
            req.uri(),
            req.version(),
            req.headers(),
        )
    });

    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    drop(req);

    let site = state.site().await;
    let response = serve(&method, &path, &site).await;

    if let Some(mut entry) = entry {
        entry.finish(
            response.status().as_u16(),
            announced_length(&response),
            started.elapsed(),
        );
        logger::log_access(&entry, &logging.access_log_format);
    }
    Ok(response)
}

/// Serve one request against a site snapshot
///
/// Never fails: contract errors are logged and answered with a plain 500.
pub async fn serve(method: &Method, path: &str, site: &Site) -> Response<ResponseBody> {
    let mut res = match Responder::builder()
        .sink(ResponseSlot::default())
        .provider(Arc::clone(&site.provider))
        .build()
    {
        Ok(res) => res,
        Err(e) => {
            logger::log_error(&format!("Failed to create responder: {e}"));
            return internal_error();
        }
    };

    let path = decode_path(path);
    if let Err(e) = dispatch(&mut res, method, &path, site).await {
        logger::log_error(&format!("Failed to respond to {method} {path}: {e}"));
    }

    let response = res.into_sink().take().unwrap_or_else(internal_error);
    if *method == Method::HEAD {
        let (parts, _) = response.into_parts();
        Response::from_parts(parts, body::empty())
    } else {
        response
    }
}

async fn dispatch<S: ResponseSink>(
    res: &mut Responder<S>,
    method: &Method,
    path: &str,
    site: &Site,
) -> Result<(), ResponderError> {
    // 1. Check HTTP method
    match method {
        &Method::GET | &Method::HEAD => {}
        &Method::OPTIONS => {
            return res.status(204)?.header("Allow", ALLOWED_METHODS)?.finish();
        }
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            return res
                .status(405)?
                .header("Allow", ALLOWED_METHODS)?
                .ext("txt")?
                .send("405 Method Not Allowed")?
                .finish();
        }
    }

    // 2. Health probes
    if site.config.health.is_probe(path) {
        return res
            .header("Cache-Control", "no-cache")?
            .json(&json!({ "status": "ok" }))?
            .finish();
    }

    // 3. Configured redirects (exact match)
    if let Some(rule) = site.config.redirects.get(path) {
        return res.redirect_with_code(&rule.target, rule.code);
    }

    // 4. Static content
    match res.send_file(path).await? {
        FileOutcome::Ready(_) => {
            let cache_control = resolve_cache_control(path, &site.config.cache_control);
            res.header("Cache-Control", &cache_control)?.finish()
        }
        FileOutcome::Failed(err) => {
            logger::log_not_found(path, &err);
            render_not_found(res, &site.error_page_config()).await?;
            Ok(())
        }
    }
}

/// Percent-decode a request path, keeping it as sent if it is not UTF-8
fn decode_path(path: &str) -> Cow<'_, str> {
    urlencoding::decode(path).unwrap_or(Cow::Borrowed(path))
}

fn announced_length(response: &Response<ResponseBody>) -> u64 {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn internal_error() -> Response<ResponseBody> {
    let mut response = Response::new(body::full("500 Internal Server Error"));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RedirectRule, SiteConfig};
    use crate::handler::error_page::DEFAULT_ERROR_PAGE;
    use crate::http::CacheDirective;
    use crate::provider::FsProvider;
    use http_body_util::BodyExt;
    use hyper::header::{ALLOW, CACHE_CONTROL, LOCATION};

    fn site(dir: &tempfile::TempDir) -> Site {
        std::fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        std::fs::write(dir.path().join("app.js"), "let a = 1;").unwrap();

        let mut config = SiteConfig {
            root: dir.path().to_string_lossy().into_owned(),
            ..SiteConfig::default()
        };
        config
            .cache_control
            .insert("/index.html".to_string(), CacheDirective::Seconds(1000));
        config
            .cache_control
            .insert("app.js".to_string(), CacheDirective::Enabled(false));
        config.redirects.insert(
            "/old".to_string(),
            RedirectRule {
                target: "/index.html".to_string(),
                code: 302,
            },
        );

        Site {
            provider: Arc::new(FsProvider::new(dir.path(), config.index_files.clone())),
            error_page_override: None,
            config,
        }
    }

    async fn text(response: Response<ResponseBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_serves_file_with_cache_control() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(&dir);

        let response = serve(&Method::GET, "/index.html", &site).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CACHE_CONTROL], "public, max-age=1000");
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(text(response).await, "<h1>home</h1>");

        let response = serve(&Method::GET, "/app.js", &site).await;
        assert_eq!(response.headers()[CACHE_CONTROL], "no-cache");
    }

    #[tokio::test]
    async fn test_directory_uses_index_and_default_cache() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(&dir);

        let response = serve(&Method::GET, "/", &site).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CACHE_CONTROL], "public, max-age=3600");
    }

    #[tokio::test]
    async fn test_missing_file_renders_builtin_page() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(&dir);

        let response = serve(&Method::GET, "/missing.html", &site).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=UTF-8");
        assert!(response.headers().get(CACHE_CONTROL).is_none());
        assert_eq!(text(response).await, DEFAULT_ERROR_PAGE);
    }

    #[tokio::test]
    async fn test_head_keeps_headers_without_body() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(&dir);

        let response = serve(&Method::HEAD, "/index.html", &site).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_LENGTH], "13");
        assert_eq!(announced_length(&response), 13);
        assert_eq!(text(response).await, "");
    }

    #[tokio::test]
    async fn test_percent_encoded_path_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(&dir);
        std::fs::write(dir.path().join("my file.html"), "spaced").unwrap();

        let response = serve(&Method::GET, "/my%20file.html", &site).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await, "spaced");
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/a%20b/c.css"), "/a b/c.css");
        assert_eq!(decode_path("/plain.html"), "/plain.html");
        // Invalid UTF-8 once decoded stays as sent
        assert_eq!(decode_path("/bad%FF.html"), "/bad%FF.html");
    }

    #[tokio::test]
    async fn test_redirect_rule() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(&dir);

        let response = serve(&Method::GET, "/old", &site).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/index.html");
        assert_eq!(text(response).await, "Redirecting to /index.html ...");
    }

    #[tokio::test]
    async fn test_health_probe_json() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(&dir);

        let response = serve(&Method::GET, "/healthz", &site).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
        assert_eq!(text(response).await, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_method_handling() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(&dir);

        let response = serve(&Method::POST, "/index.html", &site).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], ALLOWED_METHODS);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");

        let response = serve(&Method::OPTIONS, "/", &site).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[ALLOW], ALLOWED_METHODS);
    }
}
