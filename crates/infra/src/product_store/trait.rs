use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use catalog_core::ProductId;
use catalog_products::Product;

use super::query::{ProductFilter, Window};

/// A product as persisted, with the bookkeeping the store owns.
///
/// `created_at`/`updated_at` are assigned by the store and never taken from
/// client input. `revision` counts writes and is storage-only: it is stripped
/// before a record leaves the query service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredProduct {
    pub product: Product,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub revision: u64,
}

/// Product store operation error.
///
/// These are **infrastructure errors** as opposed to domain errors
/// (validation, missing records).
#[derive(Debug, Error)]
pub enum ProductStoreError {
    /// The unique id guard rejected an insert.
    #[error("product {0} already exists")]
    DuplicateId(ProductId),

    /// Connection, query or pool failure.
    #[error("store backend failure: {0}")]
    Backend(String),

    /// A persisted row could not be turned back into a product.
    #[error("failed to decode stored product: {0}")]
    Decode(String),
}

/// Async product collection.
///
/// Every operation touches at most one document, except `find`/`count` which
/// only read. Implementations must return `find` results ordered by id
/// ascending and must enforce id uniqueness on `insert` themselves; the query
/// service's pre-check is not enough under concurrent creators.
#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    /// Matching products, ordered by id ascending, restricted to `window`.
    async fn find(
        &self,
        filter: &ProductFilter,
        window: Window,
    ) -> Result<Vec<StoredProduct>, ProductStoreError>;

    /// Number of products matching `filter`, ignoring any window.
    async fn count(&self, filter: &ProductFilter) -> Result<u64, ProductStoreError>;

    async fn get(&self, id: ProductId) -> Result<Option<StoredProduct>, ProductStoreError>;

    /// Persist a new product. Fails with `DuplicateId` if the id is taken.
    async fn insert(&self, product: Product) -> Result<StoredProduct, ProductStoreError>;

    /// Replace an existing product. `Ok(None)` if no product has that id.
    async fn update(&self, product: Product) -> Result<Option<StoredProduct>, ProductStoreError>;

    /// Hard delete. Returns whether a product was removed.
    async fn delete(&self, id: ProductId) -> Result<bool, ProductStoreError>;

    /// Release underlying resources (connection pools). Called once on shutdown.
    async fn close(&self) {}
}

#[async_trait::async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn find(
        &self,
        filter: &ProductFilter,
        window: Window,
    ) -> Result<Vec<StoredProduct>, ProductStoreError> {
        (**self).find(filter, window).await
    }

    async fn count(&self, filter: &ProductFilter) -> Result<u64, ProductStoreError> {
        (**self).count(filter).await
    }

    async fn get(&self, id: ProductId) -> Result<Option<StoredProduct>, ProductStoreError> {
        (**self).get(id).await
    }

    async fn insert(&self, product: Product) -> Result<StoredProduct, ProductStoreError> {
        (**self).insert(product).await
    }

    async fn update(&self, product: Product) -> Result<Option<StoredProduct>, ProductStoreError> {
        (**self).update(product).await
    }

    async fn delete(&self, id: ProductId) -> Result<bool, ProductStoreError> {
        (**self).delete(id).await
    }

    async fn close(&self) {
        (**self).close().await
    }
}
