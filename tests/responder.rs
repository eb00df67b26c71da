use async_trait::async_trait;
use http_body_util::BodyExt;
use hyper::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use hyper::{Method, Response, StatusCode};
use static_responder::config::{Site, SiteConfig};
use static_responder::handler::{self, render_not_found, ErrorPageConfig, ErrorPageSource};
use static_responder::http::{resolve_cache_control, CacheDirective, CachePolicyTable, ResponseBody};
use static_responder::provider::{ContentProvider, FsProvider, ResolvedFile};
use static_responder::responder::{ResponseSlot, Responder};
use static_responder::{FileOutcome, ResolveError};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn fixture_site() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::write(root.join("index.html"), "index file content").unwrap();
    std::fs::write(root.join("style.css"), "body { color: #333; }").unwrap();
    std::fs::write(root.join("app.js"), "console.log('app');").unwrap();
    std::fs::write(root.join("data.json"), r#"{"ok":true}"#).unwrap();
    std::fs::write(root.join("logo.svg"), "<svg/>").unwrap();
    std::fs::write(root.join("404.html"), "<h1>site 404</h1>").unwrap();
    std::fs::create_dir(root.join("empty")).unwrap();
    dir
}

fn responder_for(root: &Path) -> Responder<ResponseSlot> {
    Responder::builder()
        .sink(ResponseSlot::default())
        .provider(Arc::new(FsProvider::new(root, vec!["index.html".to_string()])))
        .build()
        .unwrap()
}

fn delivered(res: Responder<ResponseSlot>) -> Response<ResponseBody> {
    res.into_sink().take().expect("no response delivered")
}

async fn body_string(response: Response<ResponseBody>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn send_file_sets_type_and_length_per_extension() {
    let dir = fixture_site();
    let cases = [
        ("/index.html", "text/html; charset=utf-8"),
        ("/style.css", "text/css; charset=utf-8"),
        ("/app.js", "application/javascript; charset=utf-8"),
        ("/data.json", "application/json; charset=utf-8"),
        ("/logo.svg", "image/svg+xml"),
    ];

    for (path, content_type) in cases {
        let on_disk = std::fs::read(dir.path().join(&path[1..])).unwrap();
        let mut res = responder_for(dir.path());
        assert!(res.send_file(path).await.unwrap().is_ready(), "{path}");
        res.finish().unwrap();

        let response = delivered(res);
        assert_eq!(response.headers()[CONTENT_TYPE], content_type, "{path}");
        assert_eq!(
            response.headers()[CONTENT_LENGTH],
            on_disk.len().to_string().as_str()
        );
        assert_eq!(body_string(response).await.as_bytes(), on_disk.as_slice());
    }
}

#[tokio::test]
async fn directory_without_index_reports_not_found() {
    let dir = fixture_site();
    let mut res = responder_for(dir.path());

    let outcome = res.send_file("/empty/").await.unwrap();
    let FileOutcome::Failed(err) = outcome else {
        panic!("directory without index must not resolve");
    };
    assert!(err.is_not_found());
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert!(!res.is_finalized());
}

#[tokio::test]
async fn large_file_streams_completely() {
    let dir = fixture_site();
    let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(dir.path().join("big.bin"), &content).unwrap();

    let mut res = responder_for(dir.path());
    let FileOutcome::Ready(headers) = res.send_file("/big.bin").await.unwrap() else {
        panic!("big.bin should resolve");
    };
    assert_eq!(headers.content_length, 200_000);
    assert_eq!(headers.content_type, "application/octet-stream");
    res.finish().unwrap();

    let bytes = delivered(res).into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), content.as_slice());
}

#[tokio::test]
async fn error_page_override_wins() {
    let dir = fixture_site();
    let elsewhere = tempfile::tempdir().unwrap();
    let override_path = elsewhere.path().join("custom-404.html");
    std::fs::write(&override_path, "<h1>override</h1>").unwrap();

    let mut res = responder_for(dir.path());
    assert!(!res.send_file("/missing.html").await.unwrap().is_ready());
    let source = render_not_found(
        &mut res,
        &ErrorPageConfig {
            override_path: Some(override_path),
            config_path: Some("/404.html".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(source, ErrorPageSource::Override);

    let response = delivered(res);
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=UTF-8");
    assert_eq!(body_string(response).await, "<h1>override</h1>");
}

#[tokio::test]
async fn missing_override_falls_back_to_site_page() {
    let dir = fixture_site();
    let mut res = responder_for(dir.path());
    assert!(!res.send_file("/missing.html").await.unwrap().is_ready());

    let source = render_not_found(
        &mut res,
        &ErrorPageConfig {
            override_path: Some(dir.path().join("no-such-override.html")),
            config_path: Some("/404.html".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(source, ErrorPageSource::Config);

    let response = delivered(res);
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    assert_eq!(body_string(response).await, "<h1>site 404</h1>");
}

#[tokio::test]
async fn no_error_page_uses_builtin_default() {
    let dir = fixture_site();
    let mut res = responder_for(dir.path());
    assert!(!res.send_file("/missing.html").await.unwrap().is_ready());

    let source = render_not_found(&mut res, &ErrorPageConfig::default())
        .await
        .unwrap();
    assert_eq!(source, ErrorPageSource::Builtin);

    let response = delivered(res);
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=UTF-8");
    assert!(body_string(response).await.contains("404"));
}

#[test]
fn cache_control_rules() {
    let mut table = CachePolicyTable::new();
    table.insert("index.html".to_string(), CacheDirective::Seconds(1000));
    table.insert("none.html".to_string(), CacheDirective::Enabled(false));
    table.insert(
        "private.html".to_string(),
        CacheDirective::Header("private, max-age=300".to_string()),
    );

    assert_eq!(
        resolve_cache_control("/index.html", &table),
        "public, max-age=1000"
    );
    assert_eq!(resolve_cache_control("/none.html", &table), "no-cache");
    assert_eq!(
        resolve_cache_control("/private.html", &table),
        "private, max-age=300"
    );
    assert_eq!(
        resolve_cache_control("/other.html", &table),
        "public, max-age=3600"
    );
}

#[tokio::test]
async fn site_pipeline_applies_cache_and_error_page() {
    let dir = fixture_site();
    let mut config = SiteConfig {
        root: dir.path().to_string_lossy().into_owned(),
        error_page: Some("/404.html".to_string()),
        ..SiteConfig::default()
    };
    config
        .cache_control
        .insert("style.css".to_string(), CacheDirective::Seconds(60));

    let site = Site {
        provider: Arc::new(FsProvider::new(dir.path(), config.index_files.clone())),
        error_page_override: None,
        config,
    };

    let response = handler::serve(&Method::GET, "/style.css", &site).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CACHE_CONTROL], "public, max-age=60");

    let response = handler::serve(&Method::GET, "/nope", &site).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(response).await, "<h1>site 404</h1>");
}

#[tokio::test]
async fn redirect_sets_location_and_body() {
    let dir = fixture_site();
    let mut res = responder_for(dir.path());
    res.redirect("/test").unwrap();

    let response = delivered(res);
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.headers()[LOCATION], "/test");
    assert_eq!(
        response.headers()[CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(body_string(response).await, "Redirecting to /test ...");
}

/// Provider that never finds anything and counts lookups
#[derive(Default)]
struct EmptyProvider {
    lookups: AtomicUsize,
}

#[async_trait]
impl ContentProvider for EmptyProvider {
    async fn resolve(&self, logical_path: &str) -> Result<ResolvedFile, ResolveError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Err(ResolveError::not_found(logical_path))
    }
}

#[tokio::test]
async fn custom_provider_is_consulted_for_files_and_error_pages() {
    let provider = Arc::new(EmptyProvider::default());
    let mut res = Responder::builder()
        .sink(ResponseSlot::default())
        .provider(provider.clone())
        .build()
        .unwrap();

    assert!(!res.send_file("/anything").await.unwrap().is_ready());
    let source = render_not_found(
        &mut res,
        &ErrorPageConfig {
            override_path: None,
            config_path: Some("/404.html".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(source, ErrorPageSource::Builtin);
    assert_eq!(provider.lookups.load(Ordering::SeqCst), 2);
    assert_eq!(delivered(res).status(), StatusCode::NOT_FOUND);
}
