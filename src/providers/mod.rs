//! News providers.
//!
//! Every provider implements two traits:
//!
//! * [`NewsAdapter`] is the object-safe half the aggregator drives: it fetches
//!   a listing or a search and always hands back normalized [`NewsItem`]s.
//!   Provider failures are logged inside the adapter and surface as an empty
//!   list.
//! * [`ExtractNews`] is the pure half that turns a provider's raw payload
//!   into [`NewsItem`]s. The raw type never leaves the adapter.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::config::Settings;
use crate::error::Result;
use crate::types::{ListQuery, NewsItem, SearchQuery};

pub mod newsapi;
pub mod reddit;

#[cfg(test)]
mod tests;

pub use newsapi::NewsApiAdapter;
pub use reddit::RedditAdapter;

#[async_trait]
pub trait NewsAdapter: Send + Sync {
    /// Literal written into [`NewsItem::source`].
    fn name(&self) -> &'static str;

    /// Whether calls may run concurrently over the request's [`Session`].
    /// Adapters returning `false` are awaited one at a time before any
    /// concurrent adapter starts.
    fn async_supported(&self) -> bool;

    async fn list_news(&self, session: &Session, query: &ListQuery) -> Vec<NewsItem>;

    async fn search_news(&self, session: &Session, query: &SearchQuery) -> Vec<NewsItem>;
}

pub trait ExtractNews {
    type Raw: DeserializeOwned + Send;

    fn check_news_exist(&self, raw: &Self::Raw) -> bool;

    /// Returns an empty list whenever [`check_news_exist`](Self::check_news_exist)
    /// is false. Missing titles or links become empty strings.
    fn extract_news(&self, raw: &Self::Raw) -> Vec<NewsItem>;
}

/// HTTP session shared by every concurrent adapter call of a single request.
///
/// Dropping it releases the pooled connections.
#[derive(Debug)]
pub struct Session {
    client: reqwest::Client,
}

impl Session {
    pub fn open(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

/// Builds the process-wide adapter registry in registration order.
pub fn registry(settings: &Settings) -> Result<Vec<Arc<dyn NewsAdapter>>> {
    let reddit = RedditAdapter::new(&settings.reddit)?;
    let newsapi = NewsApiAdapter::new(&settings.newsapi, &settings.server.user_agent)?;

    let adapters: Vec<Arc<dyn NewsAdapter>> = vec![Arc::new(reddit), Arc::new(newsapi)];
    Ok(adapters)
}

/// Treats `None` and empty strings alike; both mean the credential was never provided.
pub(crate) fn require<'a>(value: Option<&'a str>, key: &'static str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(crate::error::Error::MissingCredential(key))
}
