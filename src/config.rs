use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::env;

const DEFAULTS: &str = include_str!("../config/default.yaml");

/// Flat provider variables, as found in a typical `.env`, and the keys they set.
const FLAT_VARS: [(&str, &str); 5] = [
    ("NEWS_API_KEY", "newsapi.api_key"),
    ("REDDIT_TOKEN", "reddit.token"),
    ("REDDIT_USER_AGENT", "reddit.user_agent"),
    ("REDDIT_CLIENT_ID", "reddit.client_id"),
    ("REDDIT_CLIENT_SECRET", "reddit.client_secret"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsApiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub category: String,
    pub sort_by: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditConfig {
    pub token: Option<String>,
    pub user_agent: Option<String>,
    /// Script app credentials, only used when minting a token.
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub base_url: String,
    pub token_url: String,
    pub category: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub newsapi: NewsApiConfig,
    pub reddit: RedditConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        let config_file = match environment.as_str() {
            "production" => "prod",
            _ => "dev",
        };

        let builder = Self::base()
            .add_source(File::with_name(&format!("config/{}.yaml", config_file)).required(false))
            .add_source(File::with_name("config/local.yaml").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"));

        flat_overrides(builder, |var| env::var(var).ok())?
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only, no files or environment.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::base().build()?.try_deserialize()
    }

    fn base() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(DEFAULTS, FileFormat::Yaml))
    }
}

/// Applies [`FLAT_VARS`]. Blank values are skipped so an empty `.env` entry
/// does not mask the same key set through `APP__`.
fn flat_overrides(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (var, key) in FLAT_VARS {
        let value = lookup(var).filter(|v| !v.trim().is_empty());
        builder = builder.set_override_option(key, value)?;
    }
    Ok(builder)
}
