use reqwest::header::InvalidHeaderValue;
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
    #[error("invalid {0} header value")]
    InvalidHeader(&'static str, #[source] InvalidHeaderValue),
    #[error("unknown news category: {0}")]
    UnknownCategory(String),
    #[error("unknown sort order: {0}")]
    UnknownSortOrder(String),
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0} returned unexpected status {1}")]
    UnexpectedStatus(&'static str, StatusCode),
    #[error("token response has no access_token")]
    MissingAccessToken,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
