use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use axum::extract::Request;
use axum::response::Response;
use axum::Router;
use hyper::Method;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer, MaxAge};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::global::Global;

pub mod error;
pub mod routes;


/// Browsers may read the feed from any origin; nothing here takes a body.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(AllowMethods::list([Method::GET, Method::HEAD]))
        .allow_headers(AllowHeaders::any())
        .max_age(MaxAge::exact(Duration::from_secs(3600)))
}

fn request_span(req: &Request) -> Span {
    tracing::info_span!(
        "news_request",
        method = %req.method(),
        path = req.uri().path(),
        search = req.uri().query().is_some_and(|q| q.contains("query=")),
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    )
}

fn record_response<B>(res: &Response<B>, latency: Duration, span: &Span) {
    let status = res.status();
    span.record("status", status.as_u16());
    span.record("latency_ms", latency.as_millis() as u64);

    if status.is_success() {
        tracing::info!(status = status.as_u16(), "served");
    } else {
        tracing::warn!(status = status.as_u16(), "served with error status");
    }
}

pub fn app(global: Arc<Global>) -> Router {
    let layers = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_request(())
                .on_response(record_response)
                .on_failure(()),
        )
        .layer(cors_layer())
        .layer(CompressionLayer::new());

    Router::new()
        .merge(routes::routes())
        .fallback(not_found)
        .with_state(global)
        .layer(layers)
}

async fn not_found(method: Method, uri: axum::http::Uri) -> error::ApiError {
    tracing::debug!(%method, %uri, "no route");
    error::ApiError::route_not_found()
}

/// Serves until `shutdown` resolves, then drains in-flight requests.
#[tracing::instrument(name = "http", skip_all)]
pub async fn run(global: Arc<Global>, shutdown: impl Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
    let addr = (global.config.server.host.as_str(), global.config.server.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}:{}", addr.0, addr.1))?;

    let bound = listener.local_addr().context("failed to read bound address")?;
    tracing::info!(%bound, providers = ?global.aggregator.provider_names(), "serving news");

    axum::serve(
        listener,
        app(global).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .context("http server error")
}
