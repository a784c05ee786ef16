use thiserror::Error;
use tracing::instrument;

use catalog_core::{DomainError, FieldError, ProductId};
use catalog_products::{normalize_on_create, normalize_on_update, ProductFields};

use crate::product_store::{ProductStore, ProductStoreError};

use super::query::ProductQuery;
use super::view::{ProductPage, ProductView};

/// Typed outcome of a catalog operation; the transport maps it 1:1 to a status.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Input failed validation; every violated field is listed.
    #[error("validation failed: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Validation(Vec<FieldError>),

    #[error("product not found")]
    NotFound,

    /// Duplicate product id.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Underlying store failure. Never retried here.
    #[error(transparent)]
    Store(ProductStoreError),
}

impl From<DomainError> for CatalogError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(errors) => Self::Validation(errors),
            DomainError::InvalidId(msg) => Self::Validation(vec![FieldError::new("id", msg)]),
            DomainError::NotFound => Self::NotFound,
            DomainError::Conflict(msg) => Self::Conflict(msg),
        }
    }
}

impl From<ProductStoreError> for CatalogError {
    fn from(err: ProductStoreError) -> Self {
        match err {
            ProductStoreError::DuplicateId(id) => Self::Conflict(duplicate_message(id)),
            other => Self::Store(other),
        }
    }
}

fn duplicate_message(id: ProductId) -> String {
    format!("a product with id {id} already exists")
}

/// The catalog query service.
///
/// Holds the long-lived store handle; every operation touches at most one
/// document, so there is no partial-failure state to unwind.
#[derive(Debug, Clone)]
pub struct ProductCatalog<S> {
    store: S,
}

impl<S> ProductCatalog<S>
where
    S: ProductStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// One page of products matching the query, ordered by id ascending.
    #[instrument(
        skip(self, query),
        fields(page = query.page(), limit = query.limit()),
        err
    )]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, CatalogError> {
        let total = self.store.count(&query.filter).await?;
        let rows = self.store.find(&query.filter, query.window()).await?;
        Ok(ProductPage::new(query, total, rows))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn get_product(&self, id: ProductId) -> Result<ProductView, CatalogError> {
        self.store
            .get(id)
            .await?
            .map(ProductView::from)
            .ok_or(CatalogError::NotFound)
    }

    /// Normalize and persist a new product.
    ///
    /// The existence pre-check gives a clean `Conflict` in the common case;
    /// the store's unique guard covers creators racing past it.
    #[instrument(skip(self, input), err)]
    pub async fn create_product(&self, input: &ProductFields) -> Result<ProductView, CatalogError> {
        let product = normalize_on_create(input)?;
        let id = product.id;

        if self.store.get(id).await?.is_some() {
            return Err(CatalogError::Conflict(duplicate_message(id)));
        }

        let stored = self.store.insert(product).await?;
        tracing::info!(product_id = %id, "product created");
        Ok(ProductView::from(stored))
    }

    /// Apply a partial update. Last write wins between concurrent updaters.
    #[instrument(skip(self, patch), fields(product_id = %id), err)]
    pub async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductFields,
    ) -> Result<ProductView, CatalogError> {
        let existing = self.store.get(id).await?.ok_or(CatalogError::NotFound)?;
        let product = normalize_on_update(&existing.product, patch)?;

        // The record can vanish between read and write (concurrent delete).
        let stored = self
            .store
            .update(product)
            .await?
            .ok_or(CatalogError::NotFound)?;
        tracing::info!(product_id = %id, revision = stored.revision, "product updated");
        Ok(ProductView::from(stored))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CatalogError> {
        if !self.store.delete(id).await? {
            return Err(CatalogError::NotFound);
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }
}
