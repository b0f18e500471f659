use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;
use textsearch_core::{Document, IndexConfig, IndexKind};
use textsearch_server::{router, AppState};
use tower::ServiceExt;

fn tiny_docs() -> Vec<Document> {
    vec![
        Document { id: 0, text: "Rust is great. rust systems programming with rust.".into(), title: Some("Doc 0".into()), url: None },
        Document { id: 1, text: "Learning rust and other languages.".into(), title: Some("Doc 1".into()), url: Some("https://example.com/1".into()) },
        Document { id: 2, text: "Gardening tips for spring.".into(), title: Some("Doc 2".into()), url: None },
    ]
}

fn app(kind: IndexKind, admin_token: Option<&str>) -> Router {
    let state = AppState::new(tiny_docs(), &IndexConfig::new(kind).with_workers(2), admin_token.map(String::from)).unwrap();
    router(state)
}

async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    call(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn search_returns_ranked_results() {
    for kind in [IndexKind::Sequential, IndexKind::Parallel] {
        let (status, json) = get(app(kind, None), "/search?q=rust&k=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_hits"].as_u64().unwrap(), 2);
        let arr = json["results"].as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["doc_id"].as_u64().unwrap(), 0);
        assert_eq!(arr[1]["doc_id"].as_u64().unwrap(), 1);
        assert_eq!(arr[1]["url"].as_str().unwrap(), "https://example.com/1");
        assert!(arr[0]["snippet"].as_str().unwrap().contains("<em>Rust</em>"));
    }
}

#[tokio::test]
async fn stopword_query_has_no_hits() {
    let (status, json) = get(app(IndexKind::Sequential, None), "/search?q=the").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_hits"].as_u64().unwrap(), 0);
    assert!(json["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn doc_and_stats_endpoints() {
    let (_, json) = get(app(IndexKind::Sequential, None), "/doc/2").await;
    assert_eq!(json["title"].as_str().unwrap(), "Doc 2");

    let (_, json) = get(app(IndexKind::Sequential, None), "/doc/99").await;
    assert_eq!(json["error"].as_str().unwrap(), "not found");

    let (_, json) = get(app(IndexKind::Parallel, None), "/stats").await;
    assert_eq!(json["document_count"].as_u64().unwrap(), 3);
    assert!(json["term_count"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn batch_requires_admin_token() {
    let req = Request::post("/index/batch")
        .header("content-type", "application/json")
        .body(Body::from(r#"[{"text":"tulip bulbs"}]"#))
        .unwrap();
    let (status, _) = call(app(IndexKind::Sequential, None), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn batch_adds_searchable_documents() {
    let app = app(IndexKind::Parallel, Some("secret"));
    let req = Request::post("/index/batch")
        .header("content-type", "application/json")
        .header("X-ADMIN-TOKEN", "secret")
        .body(Body::from(r#"[{"title":"Tulips","text":"tulip bulbs in spring"}]"#))
        .unwrap();
    let (status, json) = call(app.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["added"].as_u64().unwrap(), 1);
    assert_eq!(json["document_count"].as_u64().unwrap(), 4);

    let (_, json) = get(app, "/search?q=tulips").await;
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["doc_id"].as_u64().unwrap(), 3);
    assert_eq!(arr[0]["title"].as_str().unwrap(), "Tulips");
}

#[tokio::test]
async fn build_app_loads_corpus_from_disk() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("docs.jsonl"), "{\"title\":\"Donut\",\"text\":\"A donut on a glass plate.\"}\n").unwrap();
    let app = textsearch_server::build_app(&dir.path().to_string_lossy(), &IndexConfig::new(IndexKind::Sequential)).unwrap();
    let (status, body) = get(app, "/search?q=donuts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["title"].as_str().unwrap(), "Donut");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_searches_on_parallel_engine() {
    let app = app(IndexKind::Parallel, None);
    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { get(app, "/search?q=rust%20programming").await })
        })
        .collect();
    let mut bodies = Vec::new();
    for task in tasks {
        let (status, json) = task.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        bodies.push(json["results"].clone());
    }
    assert_eq!(bodies[0].as_array().unwrap().len(), 2);
    assert!(bodies.iter().all(|b| *b == bodies[0]));
}
