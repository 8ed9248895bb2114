//! newsapi.org adapter.
//!
//! References:
//! - <https://newsapi.org/docs/authentication>
//! - <https://newsapi.org/docs/endpoints/top-headlines>
//! - <https://newsapi.org/docs/endpoints/everything>

use std::str::FromStr;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{require, ExtractNews, NewsAdapter, Session};
use crate::config::NewsApiConfig;
use crate::error::{Error, Result};
use crate::types::{ListQuery, NewsItem, SearchQuery, SortBy};

const SOURCE: &str = "newsapi";
const LANGUAGE: &str = "en";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Business,
    Entertainment,
    General,
    Health,
    Science,
    Sports,
    Technology,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Entertainment => "entertainment",
            Self::General => "general",
            Self::Health => "health",
            Self::Science => "science",
            Self::Sports => "sports",
            Self::Technology => "technology",
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "business" => Ok(Self::Business),
            "entertainment" => Ok(Self::Entertainment),
            "general" => Ok(Self::General),
            "health" => Ok(Self::Health),
            "science" => Ok(Self::Science),
            "sports" => Ok(Self::Sports),
            "technology" => Ok(Self::Technology),
            other => Err(Error::UnknownCategory(other.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewsApiResponse {
    #[serde(default)]
    status: Value,
    #[serde(rename = "totalResults")]
    total_results: Option<u64>,
    articles: Option<Vec<Article>>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    url: Option<String>,
}

/// The API reports `"ok"`, older fixtures use `true`.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Synchronous adapter: owns its client and is awaited in line by the aggregator.
pub struct NewsApiAdapter {
    client: reqwest::Client,
    base_url: String,
    category: Category,
    sort_by: SortBy,
}

impl NewsApiAdapter {
    pub fn new(config: &NewsApiConfig, user_agent: &str) -> Result<Self> {
        let api_key = require(config.api_key.as_deref(), "newsapi.api_key")?;

        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| Error::InvalidHeader("X-Api-Key", e))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("X-Api-Key", key);

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            category: config.category.parse()?,
            sort_by: config.sort_by.parse()?,
        })
    }

    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<NewsApiResponse> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self.client.get(&url).query(params).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::UnexpectedStatus(SOURCE, status));
        }

        Ok(response.json().await?)
    }
}

impl ExtractNews for NewsApiAdapter {
    type Raw = NewsApiResponse;

    fn check_news_exist(&self, raw: &NewsApiResponse) -> bool {
        is_truthy(&raw.status) && raw.total_results.is_some_and(|n| n != 0)
    }

    fn extract_news(&self, raw: &NewsApiResponse) -> Vec<NewsItem> {
        if !self.check_news_exist(raw) {
            return Vec::new();
        }

        raw.articles
            .iter()
            .flatten()
            .map(|article| NewsItem::new(article.title.as_deref(), article.url.as_deref(), SOURCE))
            .collect()
    }
}

#[async_trait]
impl NewsAdapter for NewsApiAdapter {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn async_supported(&self) -> bool {
        false
    }

    #[tracing::instrument(name = "newsapi::list_news", skip_all)]
    async fn list_news(&self, _session: &Session, query: &ListQuery) -> Vec<NewsItem> {
        let category = match query.category.as_deref().map(Category::from_str).transpose() {
            Ok(category) => category.unwrap_or(self.category),
            Err(e) => {
                warn!(error = %e, "rejected top-headlines request");
                return Vec::new();
            }
        };

        let page_size = query.page_size.to_string();
        let params = [
            ("category", category.as_str()),
            ("language", LANGUAGE),
            ("pageSize", page_size.as_str()),
        ];

        match self.fetch("top-headlines", &params).await {
            Ok(raw) => {
                let items = self.extract_news(&raw);
                debug!(count = items.len(), category = category.as_str(), "fetched top headlines");
                items
            }
            Err(e) => {
                warn!(error = %e, category = category.as_str(), "top-headlines request failed");
                Vec::new()
            }
        }
    }

    /// `/everything` has no category filter, so `query.category` is not sent.
    #[tracing::instrument(name = "newsapi::search_news", skip_all, fields(keyword = %query.keyword))]
    async fn search_news(&self, _session: &Session, query: &SearchQuery) -> Vec<NewsItem> {
        let sort_by = query.sort_by.unwrap_or(self.sort_by);
        let page_size = query.page_size.to_string();
        let params = [
            ("q", query.keyword.as_str()),
            ("language", LANGUAGE),
            ("pageSize", page_size.as_str()),
            ("sortBy", sort_by.as_str()),
        ];

        match self.fetch("everything", &params).await {
            Ok(raw) => {
                let items = self.extract_news(&raw);
                debug!(count = items.len(), "fetched search results");
                items
            }
            Err(e) => {
                warn!(error = %e, "everything request failed");
                Vec::new()
            }
        }
    }
}
