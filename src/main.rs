use anyhow::Context as _;
use news_aggregator::config::Settings;
use news_aggregator::global::Global;
use news_aggregator::http;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real deployments set the environment directly.
    dotenvy::dotenv().ok();

    let config = Settings::new().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_file(true)
        .with_line_number(true)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .parse_lossy(&config.logging.level),
        )
        .init();

    tracing::info!("starting news aggregator");

    let global = Global::init(config)?;

    tracing::info!("all providers initialized");

    http::run(global, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
