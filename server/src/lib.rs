use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use sitesearch_core::persist::{IndexPaths, StoreError};
use sitesearch_core::query::{SearchResult, Searcher};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub index_dir: Arc<PathBuf>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

pub fn build_app(index_dir: PathBuf) -> Router {
    let state = AppState { index_dir: Arc::new(index_dir) };
    Router::new()
        .route("/", get(home))
        .route("/search", get(search_page))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn home() -> Html<String> {
    Html(render_form(None))
}

async fn search_page(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Html<String> {
    let query = params.q.trim().to_string();
    if query.is_empty() {
        return Html(render_form(Some("Please enter a search query.")));
    }

    // Opened per request: a crawl finished after server start is served
    // without a restart.
    let paths = IndexPaths::new(state.index_dir.as_ref());
    match Searcher::open(&paths) {
        Ok(searcher) => {
            let results = searcher.search(&query);
            Html(render_results(&query, &results))
        }
        Err(StoreError::NotBuilt) => Html(render_form(Some(
            "Error: Index does not exist. Please run the crawler first.",
        ))),
        Err(err) => {
            tracing::error!(%err, "failed to open index");
            Html(render_form(Some("Error: the search index could not be read.")))
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn render_form(error: Option<&str>) -> String {
    let notice = match error {
        Some(msg) => format!(r#"<p class="error">{}</p>"#, escape(msg)),
        None => String::new(),
    };
    format!(
        r#"<!doctype html>
<html>
<head><title>Site Search</title></head>
<body>
<h1>Site Search</h1>
{notice}
<form action="/search" method="get">
  <input type="text" name="q" placeholder="search this site" autofocus>
  <button type="submit">Search</button>
</form>
</body>
</html>"#
    )
}

fn render_results(query: &str, results: &[SearchResult]) -> String {
    let mut items = String::new();
    for hit in results {
        let matched = escape(&hit.matching_words.join(", "));
        let missing = escape(&hit.missing_words.join(", "));
        items.push_str(&format!(
            r#"<li>
  <a href="{url}">{title}</a>
  <p>{teaser}</p>
  <small>matched: {matched} | missing: {missing} | score: {score:.4} | words: {rank}</small>
</li>
"#,
            url = escape(&hit.url),
            title = escape(&hit.title),
            teaser = escape(&hit.teaser),
            score = hit.tfidf_score,
            rank = hit.rank,
        ));
    }
    let summary = if results.is_empty() {
        "No results found.".to_string()
    } else {
        format!("{} result(s)", results.len())
    };
    format!(
        r#"<!doctype html>
<html>
<head><title>Results for {q}</title></head>
<body>
<h1>Results for &quot;{q}&quot;</h1>
<form action="/search" method="get">
  <input type="text" name="q" value="{q}">
  <button type="submit">Search</button>
</form>
<p>{summary}</p>
<ol>
{items}</ol>
</body>
</html>"#,
        q = escape(query),
    )
}
