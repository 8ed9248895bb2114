use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_PAGE_SIZE: u32 = 2;

/// A single headline in the unified response format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    pub link: String,
    pub source: String,
}

impl NewsItem {
    pub fn new(headline: Option<&str>, link: Option<&str>, source: &str) -> Self {
        Self {
            headline: headline.unwrap_or_default().to_string(),
            link: link.unwrap_or_default().to_string(),
            source: source.to_string(),
        }
    }
}

/// Arguments for a top/hot listing. `None` fields fall back to the provider default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page_size: u32,
    pub category: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            category: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub page_size: u32,
    pub category: Option<String>,
    pub sort_by: Option<SortBy>,
}

impl SearchQuery {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            page_size: DEFAULT_PAGE_SIZE,
            category: None,
            sort_by: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    /// Articles more closely related to the keyword come first.
    #[serde(rename = "relevancy")]
    Relevancy,
    /// Articles from popular sources and publishers come first.
    #[serde(rename = "popularity")]
    Popularity,
    /// Newest articles come first.
    #[serde(rename = "publishedAt")]
    PublishedAt,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevancy => "relevancy",
            Self::Popularity => "popularity",
            Self::PublishedAt => "publishedAt",
        }
    }
}

impl FromStr for SortBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relevancy" => Ok(Self::Relevancy),
            "popularity" => Ok(Self::Popularity),
            "publishedAt" => Ok(Self::PublishedAt),
            other => Err(Error::UnknownSortOrder(other.to_string())),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
