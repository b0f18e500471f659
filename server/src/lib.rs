use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use parking_lot::RwLock;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use textsearch_core::corpus::load_documents;
use textsearch_core::{DocId, Document, IndexConfig, IndexStats, Indexer};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const SNIPPET_BEFORE: usize = 100;
const SNIPPET_AFTER: usize = 200;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f32,
    pub title: Option<String>,
    pub url: Option<String>,
    pub snippet: Option<String>,
}

#[derive(Deserialize)]
pub struct NewDoc {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(alias = "abstract", alias = "body")]
    pub text: String,
}

/// Loaded documents and the index built over them. Ids are positions in `docs`.
pub struct Corpus {
    docs: Vec<Document>,
    index: Box<dyn Indexer>,
}

#[derive(Clone)]
pub struct AppState {
    corpus: Arc<RwLock<Corpus>>,
    admin_token: Option<String>,
}

impl AppState {
    pub fn new(docs: Vec<Document>, config: &IndexConfig, admin_token: Option<String>) -> Result<Self> {
        let mut index = config.build()?;
        index.add(&docs);
        let stats = index.stats();
        tracing::info!(engine = %config.kind, num_docs = stats.document_count, num_terms = stats.term_count, "index ready");
        Ok(Self { corpus: Arc::new(RwLock::new(Corpus { docs, index })), admin_token })
    }
}

pub fn build_app(input: &str, config: &IndexConfig) -> Result<Router> {
    let docs = load_documents(input)?;
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    Ok(router(AppState::new(docs, config, admin_token)?))
}

pub fn router(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/stats", get(stats_handler))
        .route("/index/batch", post(index_batch))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Searching may run the parallel engine's worker pool, so it happens on the
/// blocking thread pool rather than on a runtime worker.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let response = tokio::task::spawn_blocking(move || run_search(&state, params))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("search task failed: {e}")))?;
    Ok(Json(response))
}

fn run_search(state: &AppState, params: SearchParams) -> SearchResponse {
    let start = std::time::Instant::now();
    let corpus = state.corpus.read();
    let scored = corpus.index.search(&params.q);
    let total_hits = scored.len();
    let k = params.k.clamp(1, 100);

    let raw_terms: Vec<&str> = params.q.split_whitespace().collect();
    let results = scored
        .into_iter()
        .take(k)
        .filter_map(|r| {
            let doc = corpus.docs.get(r.doc_id as usize)?;
            Some(SearchHit {
                doc_id: r.doc_id,
                score: r.score,
                title: doc.title.clone(),
                url: doc.url.clone(),
                snippet: snippet(&doc.text, &raw_terms),
            })
        })
        .collect();
    drop(corpus);

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, total_hits, ?elapsed, "search");
    SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits, results }
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Json<serde_json::Value> {
    let corpus = state.corpus.read();
    match corpus.docs.get(doc_id as usize) {
        Some(doc) => Json(serde_json::json!({
            "doc_id": doc.id,
            "title": doc.title,
            "url": doc.url,
            "text": doc.text,
        })),
        None => Json(serde_json::json!({ "error": "not found" })),
    }
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<IndexStats> {
    Json(state.corpus.read().index.stats())
}

/// Append documents to the live index. Ids continue after the loaded corpus;
/// IDF is derived at query time, so later searches see the grown corpus.
async fn index_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(batch): Json<Vec<NewDoc>>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    tokio::task::spawn_blocking(move || add_batch(&state, batch))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("index task failed: {e}")))?
        .map(Json)
}

fn add_batch(state: &AppState, batch: Vec<NewDoc>) -> Result<serde_json::Value, (StatusCode, String)> {
    let mut corpus = state.corpus.write();
    let first = corpus.docs.len();
    let mut docs = Vec::with_capacity(batch.len());
    for (offset, d) in batch.into_iter().enumerate() {
        let id = DocId::try_from(first + offset).map_err(|_| (StatusCode::INSUFFICIENT_STORAGE, "document id space exhausted".to_string()))?;
        docs.push(Document { id, text: d.text, title: d.title, url: d.url });
    }
    corpus.index.add(&docs);
    let added = docs.len();
    corpus.docs.extend(docs);
    let stats = corpus.index.stats();
    tracing::info!(added, num_docs = stats.document_count, "indexed batch");
    Ok(serde_json::json!({ "added": added, "document_count": stats.document_count, "term_count": stats.term_count }))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

/// Text around the first case-insensitive match of any raw query word, with
/// matches wrapped in `<em>`. Falls back to the opening of the text.
fn snippet(text: &str, raw_terms: &[&str]) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let first = raw_terms.iter().find_map(|t| find_case_insensitive(text, t));
    let window = match first {
        Some(idx) => {
            let start = floor_boundary(text, idx.saturating_sub(SNIPPET_BEFORE));
            let end = floor_boundary(text, (idx + SNIPPET_AFTER).min(text.len()));
            &text[start..end]
        }
        None => &text[..floor_boundary(text, SNIPPET_AFTER.min(text.len()))],
    };
    Some(highlight_terms(window, raw_terms))
}

fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let pat = term_regex(needle)?;
    pat.find(haystack).map(|m| m.start())
}

fn highlight_terms(snippet: &str, terms: &[&str]) -> String {
    let mut s = snippet.to_string();
    for pat in terms.iter().filter_map(|t| term_regex(t)) {
        s = pat.replace_all(&s, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).to_string();
    }
    s
}

fn term_regex(term: &str) -> Option<regex::Regex> {
    if term.trim().is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(term)).case_insensitive(true).build().ok()
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
