use std::sync::Arc;

use futures_util::future::{self, join_all, BoxFuture, FutureExt};

use crate::providers::{NewsAdapter, Session};
use crate::types::{ListQuery, NewsItem, SearchQuery};


/// Fans a request out to every registered adapter and merges the results.
///
/// Adapters without async support are awaited one after another first. The
/// remaining adapters are then started together over one [`Session`] and
/// joined. The merged list holds the synchronous blocks followed by the
/// asynchronous blocks, each group in registration order.
pub struct Aggregator {
    adapters: Vec<Arc<dyn NewsAdapter>>,
    user_agent: String,
}

enum Operation<'q> {
    List(&'q ListQuery),
    Search(&'q SearchQuery),
}

impl Operation<'_> {
    fn invoke<'a>(&'a self, adapter: &'a dyn NewsAdapter, session: &'a Session) -> BoxFuture<'a, Vec<NewsItem>> {
        match self {
            Self::List(query) => adapter.list_news(session, query),
            Self::Search(query) => adapter.search_news(session, query),
        }
    }
}

impl Aggregator {
    pub fn new(adapters: Vec<Arc<dyn NewsAdapter>>, user_agent: impl Into<String>) -> Self {
        Self {
            adapters,
            user_agent: user_agent.into(),
        }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub async fn list_news(&self) -> Vec<NewsItem> {
        let query = ListQuery::default();
        self.gather(Operation::List(&query)).await
    }

    pub async fn search_news(&self, keyword: &str) -> Vec<NewsItem> {
        let query = SearchQuery::new(keyword);
        self.gather(Operation::Search(&query)).await
    }

    /// A session that cannot be opened is treated like every provider failing.
    async fn gather(&self, op: Operation<'_>) -> Vec<NewsItem> {
        let session = match Session::open(&self.user_agent) {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, "failed to open provider session");
                return Vec::new();
            }
        };

        let (concurrent, sequential): (Vec<_>, Vec<_>) =
            self.adapters.iter().partition(|a| a.async_supported());

        let mut pending: Vec<BoxFuture<'_, Vec<NewsItem>>> = Vec::with_capacity(self.adapters.len());

        for &adapter in &sequential {
            let items = op.invoke(adapter.as_ref(), &session).await;
            pending.push(future::ready(items).boxed());
        }

        for &adapter in &concurrent {
            pending.push(op.invoke(adapter.as_ref(), &session));
        }

        let items: Vec<NewsItem> = join_all(pending).await.into_iter().flatten().collect();

        tracing::debug!(
            sequential = sequential.len(),
            concurrent = concurrent.len(),
            items = items.len(),
            "aggregated news"
        );

        items
    }
}
