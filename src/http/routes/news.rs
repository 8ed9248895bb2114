use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::global::Global;
use crate::types::NewsItem;

pub fn routes() -> Router<Arc<Global>> {
    Router::new().route("/news", get(get_news))
}

/// First non-blank `query` value. Repeated keys and unrelated parameters are ignored.
fn keyword(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(key, _)| key == "query")
        .map(|(_, value)| value.trim())
        .filter(|k| !k.is_empty())
}

/// GET /news
/// GET /news?query={keyword}
///
/// Top news from every provider, or search results when `query` is given.
/// Provider failures only shrink the list; the status stays 200.
#[tracing::instrument(skip_all, fields(keyword = tracing::field::Empty))]
async fn get_news(
    State(global): State<Arc<Global>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Vec<NewsItem>> {
    let items = match keyword(&params) {
        Some(keyword) => {
            tracing::Span::current().record("keyword", keyword);
            global.aggregator.search_news(keyword).await
        }
        None => global.aggregator.list_news().await,
    };

    Json(items)
}
