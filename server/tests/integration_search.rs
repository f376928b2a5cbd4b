use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sitesearch_core::index::{Document, IndexWriter};
use sitesearch_core::persist::{self, IndexPaths};
use sitesearch_core::tokenizer::PorterStemmer;
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;

fn build_tiny_index(dir: &Path) {
    let paths = IndexPaths::new(dir);
    persist::reset(&paths).unwrap();
    let mut writer = IndexWriter::new();
    writer.upsert(Document::from_page(
        "https://site.test/rust.html",
        Some("Rust Page"),
        "Rust is great. rust systems programming.",
    ));
    writer.upsert(Document::from_page(
        "https://site.test/learn.html",
        Some("Learning"),
        "Learning rust slowly.",
    ));
    writer.commit(&paths, &PorterStemmer::default()).unwrap();
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let resp = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn search_renders_ranked_results() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let app = server::build_app(dir.path().to_path_buf());

    let (status, body) = get(app, "/search?q=rust").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("2 result(s)"));
    // tf 2 beats tf 1
    let first = body.find("https://site.test/rust.html").unwrap();
    let second = body.find("https://site.test/learn.html").unwrap();
    assert!(first < second);
    assert!(body.contains("matched: rust"));
}

#[tokio::test]
async fn empty_query_is_a_usage_error() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let app = server::build_app(dir.path().to_path_buf());

    let (status, body) = get(app, "/search?q=%20%20").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Please enter a search query."));
}

#[tokio::test]
async fn unbuilt_index_reports_error_not_zero_results() {
    let dir = tempdir().unwrap();
    let app = server::build_app(dir.path().join("never-built"));

    let (status, body) = get(app, "/search?q=rust").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Index does not exist"));
    assert!(!body.contains("result(s)"));
}

#[tokio::test]
async fn home_serves_the_search_form() {
    let dir = tempdir().unwrap();
    let app = server::build_app(dir.path().to_path_buf());

    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<form action="/search""#));
    assert!(body.contains(r#"name="q""#));
}

#[tokio::test]
async fn unknown_words_are_reported_missing() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let app = server::build_app(dir.path().to_path_buf());

    let (_, body) = get(app, "/search?q=rust+zzzznotaword").await;
    assert!(body.contains("missing: zzzznotaword"));
}
