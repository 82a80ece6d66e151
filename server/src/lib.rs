use anyhow::{Context, Result};
use axum::{extract::{RawQuery, State}, routing::get, Json, Router};
use ngram_core::persist::{index_path, read_index};
use ngram_core::{GeneratorConfig, Hit, IndexFormat, Searcher};
use std::path::{Path, PathBuf};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared by every request. `None` when search is disabled.
#[derive(Clone)]
pub struct AppState {
    pub searcher: Option<Searcher>,
}

/// Where the index to serve comes from.
pub struct ServeOptions {
    /// Site base directory holding config/ and generated/
    pub directory: PathBuf,
    /// Explicit index file; the format is taken from its extension. Without
    /// it, `generated/indexes.<ext>` of the configured format is served.
    pub index: Option<PathBuf>,
}

/// Load the index described by the site configuration.
///
/// Returns `Ok(None)` when search is disabled. A missing or unreadable index
/// is an error: the caller must not start serving.
pub fn load_searcher(config: &GeneratorConfig, opts: &ServeOptions) -> Result<Option<Searcher>> {
    if !config.search.enabled {
        tracing::info!("search disabled, index not loaded");
        return Ok(None);
    }
    let (path, format) = match &opts.index {
        Some(path) => (path.clone(), IndexFormat::from_path(path)?),
        None => {
            let format = config.indexes.format();
            (index_path(&GeneratorConfig::generated_dir(&opts.directory), format), format)
        }
    };
    let index = read_index(format, &path).with_context(|| format!("loading index {}", path.display()))?;
    let searcher = Searcher::new(index, config.indexes.n)?;
    Ok(Some(searcher))
}

pub fn build_app(searcher: Option<Searcher>) -> Router {
    let app_state = AppState { searcher };

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
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Load configuration and index for the site at `directory` and build the app.
pub fn build_app_from_dir<P: AsRef<Path>>(directory: P) -> Result<Router> {
    let config = GeneratorConfig::load(&directory)?;
    let opts = ServeOptions { directory: directory.as_ref().to_path_buf(), index: None };
    Ok(build_app(load_searcher(&config, &opts)?))
}

/// `GET /search?q=term+term`. Always answers 200 with a (possibly empty)
/// JSON array of `{path, point}`.
pub async fn search_handler(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Json<Vec<Hit>> {
    let Some(searcher) = state.searcher.as_ref() else {
        return Json(Vec::new());
    };
    let query = raw.as_deref().and_then(query_param).unwrap_or_default();
    let hits = searcher.search(&query);
    tracing::debug!(query = %query, hits = hits.len(), "search");
    Json(hits)
}

/// Extract `q` from a raw query string. Percent escapes are decoded but `+`
/// is left alone: it separates terms.
fn query_param(raw: &str) -> Option<String> {
    raw.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key != "q" {
            return None;
        }
        urlencoding::decode(value).ok().map(|v| v.into_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_survives_decoding() {
        assert_eq!(query_param("q=Go+Rust").as_deref(), Some("Go+Rust"));
        assert_eq!(query_param("k=2&q=%E6%A4%9C%E7%B4%A2").as_deref(), Some("検索"));
        assert_eq!(query_param("q=a%2Bb").as_deref(), Some("a+b"));
        assert_eq!(query_param("q").as_deref(), Some(""));
        assert_eq!(query_param("other=1"), None);
    }
}
