use std::sync::Arc;

use image_pipe_core::{Config, Pipeline, StoreProvider, TransformConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    pipeline: Pipeline,
    stores: Arc<dyn StoreProvider>,
    http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, stores: Arc<dyn StoreProvider>, http: reqwest::Client) -> Self {
        Self {
            pipeline: Pipeline::new(config.pipeline.clone()),
            config,
            stores,
            http,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn transform(&self) -> &TransformConfig {
        &self.config.transform
    }

    /// Store clients, one per destination bucket.
    pub fn stores(&self) -> &dyn StoreProvider {
        self.stores.as_ref()
    }

    /// Client used to fetch sources. Cloning shares its connection pool.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}
