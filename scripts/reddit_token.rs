//! Mints a Reddit bearer token for `REDDIT_TOKEN`.
//!
//! Usage: `reddit-token <username> <password>`, or set `REDDIT_USERNAME` and
//! `REDDIT_PASSWORD`. Needs `REDDIT_CLIENT_ID`, `REDDIT_CLIENT_SECRET` and
//! `REDDIT_USER_AGENT` in the environment or `.env`.

use anyhow::Context as _;
use news_aggregator::config::Settings;
use news_aggregator::providers::RedditAdapter;
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

fn credential(arg: Option<String>, var: &str) -> anyhow::Result<String> {
    arg.or_else(|| std::env::var(var).ok())
        .with_context(|| format!("pass it as an argument or set {var}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new("info"))
        .with(fmt_layer)
        .init();

    dotenvy::dotenv().ok();

    let config = Settings::new().context("failed to load configuration")?;

    let mut args = std::env::args().skip(1);
    let username = credential(args.next(), "REDDIT_USERNAME").context("missing reddit username")?;
    let password = credential(args.next(), "REDDIT_PASSWORD").context("missing reddit password")?;

    tracing::info!(%username, token_url = %config.reddit.token_url, "requesting reddit token");

    let token = RedditAdapter::generate_token(&config.reddit, &username, &password)
        .await
        .context("failed to mint reddit token")?;

    println!("{token}");

    Ok(())
}
