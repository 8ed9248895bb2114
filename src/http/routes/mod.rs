use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::global::Global;

pub mod news;

pub fn routes() -> Router<Arc<Global>> {
    Router::new()
        .route("/", get(root))
        .merge(news::routes())
}

#[derive(serde::Serialize)]
struct RootResponse {
    message: &'static str,
    version: &'static str,
    uptime: u64,
    endpoints: Vec<&'static str>,
    providers: Vec<&'static str>,
}

#[tracing::instrument(skip(global))]
async fn root(State(global): State<Arc<Global>>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "News Aggregator API",
        version: env!("CARGO_PKG_VERSION"),
        uptime: global.started_at.elapsed().as_secs(),
        endpoints: vec!["/news", "/news?query={keyword}"],
        providers: global.aggregator.provider_names(),
    })
}
