use std::sync::Arc;

use anyhow::Context as _;

use crate::aggregator::Aggregator;
use crate::config::Settings;
use crate::providers;

pub struct Global {
    pub config: Settings,
    pub aggregator: Aggregator,
    pub started_at: std::time::Instant,
}

impl Global {
    pub fn init(config: Settings) -> anyhow::Result<Arc<Self>> {
        let adapters = providers::registry(&config).context("news provider setup")?;
        let aggregator = Aggregator::new(adapters, config.server.user_agent.clone());

        tracing::info!(providers = ?aggregator.provider_names(), "registered news providers");

        Ok(Self::new(config, aggregator))
    }

    pub fn new(config: Settings, aggregator: Aggregator) -> Arc<Self> {
        Arc::new(Self {
            config,
            aggregator,
            started_at: std::time::Instant::now(),
        })
    }
}
