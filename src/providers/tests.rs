use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::routing::post;
use axum::{Form, Json, Router};
use serde_json::{json, Value};
use tracing_test::traced_test;

use super::*;
use crate::config::{NewsApiConfig, RedditConfig, Settings};
use crate::error::Error;
use crate::types::SortBy;

#[derive(Debug, Clone)]
struct Seen {
    path: String,
    query: HashMap<String, String>,
    headers: HeaderMap,
}

type Log = Arc<Mutex<Vec<Seen>>>;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Fake provider answering every GET with `status` and `body`, recording what it saw.
async fn fake_provider(status: StatusCode, body: Value) -> (String, Log) {
    let log: Log = Arc::default();
    let seen = log.clone();

    let router = Router::new().fallback(
        move |uri: Uri, Query(query): Query<HashMap<String, String>>, headers: HeaderMap| {
            let seen = seen.clone();
            let body = body.clone();
            async move {
                seen.lock().unwrap().push(Seen {
                    path: uri.path().to_string(),
                    query,
                    headers,
                });
                (status, Json(body))
            }
        },
    );

    (serve(router).await, log)
}

async fn unreachable_base() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn reddit_config(base_url: &str) -> RedditConfig {
    let mut config = Settings::defaults().unwrap().reddit;
    config.base_url = base_url.to_string();
    config.token = Some("secret-token".into());
    config.user_agent = Some("news-bot/1.0".into());
    config
}

fn newsapi_config(base_url: &str) -> NewsApiConfig {
    let mut config = Settings::defaults().unwrap().newsapi;
    config.base_url = base_url.to_string();
    config.api_key = Some("api-key".into());
    config
}

fn session() -> Session {
    Session::open("news-aggregator-tests").unwrap()
}

fn hot_listing() -> Value {
    json!({
        "kind": "Listing",
        "data": {
            "dist": 1,
            "children": [{ "kind": "t3", "data": { "title": "T2", "url": "U2", "score": 10 } }]
        }
    })
}

fn headlines() -> Value {
    json!({
        "status": "ok",
        "totalResults": 1,
        "articles": [{ "source": { "name": "Wire" }, "title": "T", "url": "U" }]
    })
}

#[tokio::test]
async fn reddit_hot_listing_sends_auth_headers_and_limit() {
    let (base, log) = fake_provider(StatusCode::OK, hot_listing()).await;
    let adapter = RedditAdapter::new(&reddit_config(&base)).unwrap();

    let items = adapter.list_news(&session(), &ListQuery::default()).await;

    assert_eq!(items, vec![NewsItem::new(Some("T2"), Some("U2"), "reddit")]);

    let seen = log.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].path, "/r/news/hot");
    assert_eq!(seen[0].query.get("limit").map(String::as_str), Some("2"));
    assert_eq!(seen[0].headers["authorization"], "bearer secret-token");
    assert_eq!(seen[0].headers["user-agent"], "news-bot/1.0");
}

#[tokio::test]
async fn reddit_hot_listing_honors_category_and_page_size() {
    let (base, log) = fake_provider(StatusCode::OK, hot_listing()).await;
    let adapter = RedditAdapter::new(&reddit_config(&base)).unwrap();

    let query = ListQuery {
        page_size: 5,
        category: Some("worldnews".into()),
    };
    adapter.list_news(&session(), &query).await;

    let seen = log.lock().unwrap();
    assert_eq!(seen[0].path, "/r/worldnews/hot");
    assert_eq!(seen[0].query.get("limit").map(String::as_str), Some("5"));
}

#[tokio::test]
#[traced_test]
async fn reddit_non_200_yields_empty_list() {
    let (base, _log) = fake_provider(StatusCode::FORBIDDEN, json!({ "error": 403 })).await;
    let adapter = RedditAdapter::new(&reddit_config(&base)).unwrap();

    let items = adapter.list_news(&session(), &ListQuery::default()).await;

    assert!(items.is_empty());
    assert!(logs_contain("hot listing request failed"));
}

#[tokio::test]
async fn reddit_search_only_forwards_keyword_and_fixed_limit() {
    let (base, log) = fake_provider(StatusCode::OK, hot_listing()).await;
    let adapter = RedditAdapter::new(&reddit_config(&base)).unwrap();

    let query = SearchQuery {
        keyword: "bitcoin".into(),
        page_size: 10,
        category: Some("technology".into()),
        sort_by: Some(SortBy::Popularity),
    };
    let items = adapter.search_news(&session(), &query).await;

    assert_eq!(items.len(), 1);

    let seen = log.lock().unwrap();
    assert_eq!(seen[0].path, "/r/news/search");
    assert_eq!(seen[0].query.len(), 2);
    assert_eq!(seen[0].query.get("q").map(String::as_str), Some("bitcoin"));
    assert_eq!(seen[0].query.get("limit").map(String::as_str), Some("2"));
}

#[tokio::test]
#[traced_test]
async fn reddit_search_non_200_yields_empty_list() {
    let (base, _log) = fake_provider(StatusCode::TOO_MANY_REQUESTS, json!({})).await;
    let adapter = RedditAdapter::new(&reddit_config(&base)).unwrap();

    let items = adapter.search_news(&session(), &SearchQuery::new("rust")).await;

    assert!(items.is_empty());
    assert!(logs_contain("search request failed"));
}

#[tokio::test]
async fn reddit_unreachable_host_yields_empty_list() {
    let adapter = RedditAdapter::new(&reddit_config(&unreachable_base().await)).unwrap();

    assert!(adapter.list_news(&session(), &ListQuery::default()).await.is_empty());
}

#[tokio::test]
async fn reddit_undecodable_body_yields_empty_list() {
    let (base, _log) = fake_provider(StatusCode::OK, json!("not a listing")).await;
    let adapter = RedditAdapter::new(&reddit_config(&base)).unwrap();

    assert!(adapter.list_news(&session(), &ListQuery::default()).await.is_empty());
}

#[tokio::test]
async fn newsapi_top_headlines_request_shape() {
    let (base, log) = fake_provider(StatusCode::OK, headlines()).await;
    let adapter = NewsApiAdapter::new(&newsapi_config(&base), "news-aggregator-tests").unwrap();

    let items = adapter.list_news(&session(), &ListQuery::default()).await;

    assert_eq!(items, vec![NewsItem::new(Some("T"), Some("U"), "newsapi")]);

    let seen = log.lock().unwrap();
    assert_eq!(seen[0].path, "/top-headlines");
    assert_eq!(seen[0].query.get("category").map(String::as_str), Some("general"));
    assert_eq!(seen[0].query.get("language").map(String::as_str), Some("en"));
    assert_eq!(seen[0].query.get("pageSize").map(String::as_str), Some("2"));
    assert_eq!(seen[0].headers["x-api-key"], "api-key");
    assert_eq!(seen[0].headers["user-agent"], "news-aggregator-tests");
}

#[tokio::test]
async fn newsapi_everything_request_shape() {
    let (base, log) = fake_provider(StatusCode::OK, headlines()).await;
    let adapter = NewsApiAdapter::new(&newsapi_config(&base), "news-aggregator-tests").unwrap();

    let mut query = SearchQuery::new("bitcoin");
    query.sort_by = Some(SortBy::PublishedAt);
    query.category = Some("science".into());
    let items = adapter.search_news(&session(), &query).await;

    assert_eq!(items.len(), 1);

    let seen = log.lock().unwrap();
    assert_eq!(seen[0].path, "/everything");
    assert_eq!(seen[0].query.get("q").map(String::as_str), Some("bitcoin"));
    assert_eq!(seen[0].query.get("sortBy").map(String::as_str), Some("publishedAt"));
    assert_eq!(seen[0].query.get("language").map(String::as_str), Some("en"));
    assert!(!seen[0].query.contains_key("category"));
}

#[tokio::test]
async fn newsapi_search_defaults_to_relevancy() {
    let (base, log) = fake_provider(StatusCode::OK, headlines()).await;
    let adapter = NewsApiAdapter::new(&newsapi_config(&base), "news-aggregator-tests").unwrap();

    adapter.search_news(&session(), &SearchQuery::new("rust")).await;

    let seen = log.lock().unwrap();
    assert_eq!(seen[0].query.get("sortBy").map(String::as_str), Some("relevancy"));
}

#[tokio::test]
#[traced_test]
async fn newsapi_error_status_yields_empty_list() {
    let body = json!({ "status": "error", "code": "apiKeyInvalid", "message": "nope" });
    let (base, _log) = fake_provider(StatusCode::UNAUTHORIZED, body).await;
    let adapter = NewsApiAdapter::new(&newsapi_config(&base), "news-aggregator-tests").unwrap();

    assert!(adapter.list_news(&session(), &ListQuery::default()).await.is_empty());
    assert!(logs_contain("top-headlines request failed"));
}

#[tokio::test]
#[traced_test]
async fn newsapi_search_error_status_yields_empty_list() {
    let body = json!({ "status": "error", "code": "rateLimited", "message": "slow down" });
    let (base, log) = fake_provider(StatusCode::TOO_MANY_REQUESTS, body).await;
    let adapter = NewsApiAdapter::new(&newsapi_config(&base), "news-aggregator-tests").unwrap();

    assert!(adapter.search_news(&session(), &SearchQuery::new("bitcoin")).await.is_empty());
    assert!(logs_contain("everything request failed"));
    assert_eq!(log.lock().unwrap()[0].path, "/everything");
}

#[tokio::test]
async fn newsapi_unknown_category_skips_request() {
    let (base, log) = fake_provider(StatusCode::OK, headlines()).await;
    let adapter = NewsApiAdapter::new(&newsapi_config(&base), "news-aggregator-tests").unwrap();

    let query = ListQuery {
        page_size: 2,
        category: Some("weather".into()),
    };

    assert!(adapter.list_news(&session(), &query).await.is_empty());
    assert!(log.lock().unwrap().is_empty());
}

#[derive(Debug, Clone)]
struct TokenRequest {
    form: HashMap<String, String>,
    headers: HeaderMap,
}

async fn fake_token_endpoint(body: Value) -> (String, Arc<Mutex<Vec<TokenRequest>>>) {
    let log: Arc<Mutex<Vec<TokenRequest>>> = Arc::default();
    let seen = log.clone();

    let router = Router::new().route(
        "/api/v1/access_token",
        post(move |headers: HeaderMap, Form(form): Form<HashMap<String, String>>| {
            let seen = seen.clone();
            let body = body.clone();
            async move {
                seen.lock().unwrap().push(TokenRequest { form, headers });
                Json(body)
            }
        }),
    );

    (serve(router).await, log)
}

fn token_config(base: &str) -> RedditConfig {
    let mut config = Settings::defaults().unwrap().reddit;
    config.token_url = format!("{base}/api/v1/access_token");
    config.user_agent = Some("news-bot/1.0".into());
    config.client_id = Some("id".into());
    config.client_secret = Some("secret".into());
    config
}

#[tokio::test]
async fn generate_token_uses_password_grant() {
    let (base, log) = fake_token_endpoint(json!({ "access_token": "fresh", "token_type": "bearer" })).await;

    let token = RedditAdapter::generate_token(&token_config(&base), "alice", "hunter2")
        .await
        .unwrap();

    assert_eq!(token, "fresh");

    let seen = log.lock().unwrap();
    assert_eq!(seen[0].form.get("grant_type").map(String::as_str), Some("password"));
    assert_eq!(seen[0].form.get("username").map(String::as_str), Some("alice"));
    assert_eq!(seen[0].form.get("password").map(String::as_str), Some("hunter2"));
    assert_eq!(seen[0].headers["authorization"], "Basic aWQ6c2VjcmV0");
    assert_eq!(seen[0].headers["user-agent"], "news-bot/1.0");
}

#[tokio::test]
async fn generate_token_without_access_token_fails() {
    let (base, _log) = fake_token_endpoint(json!({ "error": "invalid_grant" })).await;

    let err = RedditAdapter::generate_token(&token_config(&base), "alice", "wrong")
        .await
        .err()
        .unwrap();

    assert!(matches!(err, Error::MissingAccessToken));
}

#[tokio::test]
async fn generate_token_requires_script_credentials() {
    let mut config = token_config("http://127.0.0.1:9");
    config.client_secret = None;

    let err = RedditAdapter::generate_token(&config, "alice", "hunter2")
        .await
        .err()
        .unwrap();

    assert!(matches!(err, Error::MissingCredential("reddit.client_secret")));
}

#[test]
fn registry_registers_reddit_then_newsapi() {
    let mut settings = Settings::defaults().unwrap();
    settings.newsapi.api_key = Some("k".into());
    settings.reddit.token = Some("t".into());
    settings.reddit.user_agent = Some("ua".into());

    let names: Vec<_> = registry(&settings).unwrap().iter().map(|a| a.name()).collect();

    assert_eq!(names, ["reddit", "newsapi"]);
}

#[test]
fn registry_fails_without_credentials() {
    let settings = Settings::defaults().unwrap();

    assert!(registry(&settings).is_err());
}
