//! Reddit adapter over the OAuth API.
//!
//! Requests are authenticated with a bearer token minted ahead of time, see
//! [`RedditAdapter::generate_token`] and the `reddit-token` binary.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{require, ExtractNews, NewsAdapter, Session};
use crate::config::RedditConfig;
use crate::error::{Error, Result};
use crate::types::{ListQuery, NewsItem, SearchQuery};

const SOURCE: &str = "reddit";
const SEARCH_PATH: &str = "/r/news/search";
const SEARCH_LIMIT: &str = "2";

#[derive(Debug, Deserialize)]
pub struct Listing {
    data: Option<ListingData>,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    dist: Option<u64>,
    children: Option<Vec<Child>>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Option<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: Option<String>,
}

/// Asynchronous adapter: borrows the request's [`Session`] for every call.
pub struct RedditAdapter {
    headers: HeaderMap,
    base_url: String,
    category: String,
}

impl RedditAdapter {
    pub fn new(config: &RedditConfig) -> Result<Self> {
        let token = require(config.token.as_deref(), "reddit.token")?;
        let user_agent = require(config.user_agent.as_deref(), "reddit.user_agent")?;

        let mut authorization = HeaderValue::from_str(&format!("bearer {token}"))
            .map_err(|e| Error::InvalidHeader("Authorization", e))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).map_err(|e| Error::InvalidHeader("User-Agent", e))?,
        );

        Ok(Self {
            headers,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            category: config.category.clone(),
        })
    }

    /// Mints a bearer token through the password grant of a "script" app.
    ///
    /// The client id and secret come from <https://www.reddit.com/prefs/apps>
    /// under "developed applications". Not used on the request path.
    pub async fn generate_token(config: &RedditConfig, username: &str, password: &str) -> Result<String> {
        let client_id = require(config.client_id.as_deref(), "reddit.client_id")?;
        let client_secret = require(config.client_secret.as_deref(), "reddit.client_secret")?;
        let user_agent = require(config.user_agent.as_deref(), "reddit.user_agent")?;

        let response = reqwest::Client::new()
            .post(&config.token_url)
            .basic_auth(client_id, Some(client_secret))
            .header(USER_AGENT, user_agent)
            .form(&[
                ("grant_type", "password"),
                ("username", username),
                ("password", password),
            ])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::UnexpectedStatus("reddit oauth", status));
        }

        let body: AccessToken = response.json().await?;
        body.access_token
            .filter(|t| !t.is_empty())
            .ok_or(Error::MissingAccessToken)
    }

    async fn fetch(&self, session: &Session, path: &str, params: &[(&str, &str)]) -> Result<Listing> {
        let url = format!("{}{}", self.base_url, path);
        let response = session
            .client()
            .get(&url)
            .headers(self.headers.clone())
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::UnexpectedStatus(SOURCE, status));
        }

        Ok(response.json().await?)
    }
}

impl ExtractNews for RedditAdapter {
    type Raw = Listing;

    fn check_news_exist(&self, raw: &Listing) -> bool {
        raw.data
            .as_ref()
            .and_then(|data| data.dist)
            .is_some_and(|dist| dist != 0)
    }

    fn extract_news(&self, raw: &Listing) -> Vec<NewsItem> {
        if !self.check_news_exist(raw) {
            return Vec::new();
        }

        raw.data
            .iter()
            .flat_map(|data| data.children.iter().flatten())
            .map(|child| {
                let post = child.data.as_ref();
                NewsItem::new(
                    post.and_then(|p| p.title.as_deref()),
                    post.and_then(|p| p.url.as_deref()),
                    SOURCE,
                )
            })
            .collect()
    }
}

#[async_trait]
impl NewsAdapter for RedditAdapter {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn async_supported(&self) -> bool {
        true
    }

    #[tracing::instrument(name = "reddit::list_news", skip_all)]
    async fn list_news(&self, session: &Session, query: &ListQuery) -> Vec<NewsItem> {
        let subreddit = query.category.as_deref().unwrap_or(&self.category);
        let path = format!("/r/{subreddit}/hot");
        let limit = query.page_size.to_string();

        match self.fetch(session, &path, &[("limit", limit.as_str())]).await {
            Ok(raw) => {
                let items = self.extract_news(&raw);
                debug!(count = items.len(), subreddit, "fetched hot listing");
                items
            }
            Err(e) => {
                warn!(error = %e, subreddit, "hot listing request failed");
                Vec::new()
            }
        }
    }

    // Always searches r/news with a fixed limit; category, page size and sort
    // order are accepted for interface parity only.
    #[tracing::instrument(name = "reddit::search_news", skip_all, fields(keyword = %query.keyword))]
    async fn search_news(&self, session: &Session, query: &SearchQuery) -> Vec<NewsItem> {
        let params = [("limit", SEARCH_LIMIT), ("q", query.keyword.as_str())];

        match self.fetch(session, SEARCH_PATH, &params).await {
            Ok(raw) => {
                let items = self.extract_news(&raw);
                debug!(count = items.len(), "fetched search results");
                items
            }
            Err(e) => {
                warn!(error = %e, "search request failed");
                Vec::new()
            }
        }
    }
}
