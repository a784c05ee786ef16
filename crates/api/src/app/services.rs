use std::sync::Arc;

use secrecy::ExposeSecret;

use catalog_infra::catalog::ProductCatalog;
use catalog_infra::product_store::{InMemoryProductStore, PostgresProductStore, ProductStore};

use crate::config::{ApiConfig, AppEnvironment};

pub type DynProductStore = Arc<dyn ProductStore>;

/// Process-wide services shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: ProductCatalog<DynProductStore>,
    /// Include store error text in 500 responses.
    pub expose_error_details: bool,
}

impl AppServices {
    pub fn new(store: DynProductStore, environment: AppEnvironment) -> Self {
        Self {
            catalog: ProductCatalog::new(store),
            expose_error_details: !environment.is_production(),
        }
    }

    /// Services over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryProductStore::new()), AppEnvironment::Development)
    }

    /// Release the store connection.
    pub async fn shutdown(&self) {
        self.catalog.store().close().await;
    }
}

/// Open the configured store once for the lifetime of the process.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let store: DynProductStore = match &config.database_url {
        Some(url) => {
            let store =
                PostgresProductStore::connect(url.expose_secret(), config.database_max_connections)
                    .await?;
            store.ensure_schema().await?;
            tracing::info!(
                max_connections = config.database_max_connections,
                "using postgres product store"
            );
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; products are kept in memory and lost on restart");
            Arc::new(InMemoryProductStore::new())
        }
    };

    Ok(AppServices::new(store, config.environment))
}
