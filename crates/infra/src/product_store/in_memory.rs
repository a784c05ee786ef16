use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;

use catalog_core::ProductId;
use catalog_products::Product;

use super::query::{ProductFilter, Window};
use super::r#trait::{ProductStore, ProductStoreError, StoredProduct};

/// In-memory product store for tests/dev.
///
/// Keyed by id in a `BTreeMap`, so iteration order is already the listing order.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    inner: RwLock<BTreeMap<ProductId, StoredProduct>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> ProductStoreError {
    ProductStoreError::Backend("in-memory product store lock poisoned".to_string())
}

#[async_trait::async_trait]
impl ProductStore for InMemoryProductStore {
    async fn find(
        &self,
        filter: &ProductFilter,
        window: Window,
    ) -> Result<Vec<StoredProduct>, ProductStoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let skip = usize::try_from(window.skip).unwrap_or(usize::MAX);

        Ok(map
            .values()
            .filter(|stored| filter.matches(&stored.product))
            .skip(skip)
            .take(window.limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<u64, ProductStoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().filter(|stored| filter.matches(&stored.product)).count() as u64)
    }

    async fn get(&self, id: ProductId) -> Result<Option<StoredProduct>, ProductStoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn insert(&self, product: Product) -> Result<StoredProduct, ProductStoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;

        // Checked under the write lock: this is the authoritative uniqueness guard.
        match map.entry(product.id) {
            Entry::Occupied(_) => Err(ProductStoreError::DuplicateId(product.id)),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let stored = StoredProduct {
                    product,
                    created_at: now,
                    updated_at: now,
                    revision: 0,
                };
                Ok(slot.insert(stored).clone())
            }
        }
    }

    async fn update(&self, product: Product) -> Result<Option<StoredProduct>, ProductStoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;

        let Some(stored) = map.get_mut(&product.id) else {
            return Ok(None);
        };
        stored.product = product;
        stored.updated_at = Utc::now();
        stored.revision += 1;
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, ProductStoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_products::{normalize_on_create, ProductFields};
    use serde_json::json;

    fn product(id: i64, name: &str) -> Product {
        let fields: ProductFields = serde_json::from_value(json!({
            "id": id,
            "name": name,
            "price": 2.5,
            "category": "tools",
            "images": ["http://x/a.png"]
        }))
        .unwrap();
        normalize_on_create(&fields).unwrap()
    }

    fn all() -> Window {
        Window { skip: 0, limit: 250 }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let store = InMemoryProductStore::new();
        store.insert(product(1, "A")).await.unwrap();

        let err = store.insert(product(1, "B")).await.unwrap_err();
        match err {
            ProductStoreError::DuplicateId(id) => assert_eq!(id.value(), 1),
            other => panic!("Expected DuplicateId, got {other:?}"),
        }
        assert_eq!(store.get(product(1, "A").id).await.unwrap().unwrap().product.name, "A");
    }

    #[tokio::test]
    async fn find_is_ordered_by_id_and_windowed() {
        let store = InMemoryProductStore::new();
        for id in [5, 2, 9, 1, 7] {
            store.insert(product(id, "P")).await.unwrap();
        }

        let ids = |rows: Vec<StoredProduct>| rows.into_iter().map(|r| r.product.id.value()).collect::<Vec<_>>();
        assert_eq!(ids(store.find(&ProductFilter::default(), all()).await.unwrap()), vec![1, 2, 5, 7, 9]);
        assert_eq!(
            ids(store.find(&ProductFilter::default(), Window { skip: 1, limit: 2 }).await.unwrap()),
            vec![2, 5]
        );
        assert!(store
            .find(&ProductFilter::default(), Window { skip: 10, limit: 2 })
            .await
            .unwrap()
            .is_empty());
        assert_eq!(store.count(&ProductFilter::default()).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn update_bumps_revision_and_keeps_created_at() {
        let store = InMemoryProductStore::new();
        let created = store.insert(product(1, "A")).await.unwrap();

        let updated = store.update(product(1, "B")).await.unwrap().unwrap();
        assert_eq!(updated.product.name, "B");
        assert_eq!(updated.revision, 1);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        assert!(store.update(product(2, "C")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_hard_and_reports_absence() {
        let store = InMemoryProductStore::new();
        store.insert(product(1, "A")).await.unwrap();

        assert!(store.delete(product(1, "A").id).await.unwrap());
        assert!(!store.delete(product(1, "A").id).await.unwrap());
        assert!(store.get(product(1, "A").id).await.unwrap().is_none());
    }
}
