//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::db;
use crate::error::Result;
use crate::store::{SqliteStore, Store};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Open the configured SQLite database and build state around it
    pub async fn connect(config: Config) -> Result<Self> {
        let pool = db::create_pool(&config.database).await?;
        tracing::info!("Database initialized at {}", config.database.url);

        Ok(Self::new(config, Arc::new(SqliteStore::new(pool))))
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the storage collaborator
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }
}
