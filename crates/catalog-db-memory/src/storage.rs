use async_trait::async_trait;
use catalog_core::{Product, now_utc};
use catalog_storage::prelude::*;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Product store backed by a concurrent hash map.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    data: DashMap<Uuid, Product>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored products.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn ensure_live(cancel: &CancellationToken) -> StorageResult<()> {
    if cancel.is_cancelled() {
        return Err(StorageError::Cancelled);
    }
    Ok(())
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn get(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> StorageResult<Option<Product>> {
        ensure_live(cancel)?;
        Ok(self.data.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_all(&self, cancel: &CancellationToken) -> StorageResult<Vec<Product>> {
        ensure_live(cancel)?;
        let mut products: Vec<Product> = self.data.iter().map(|e| e.value().clone()).collect();
        products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn insert(&self, product: &Product, cancel: &CancellationToken) -> StorageResult<Product> {
        ensure_live(cancel)?;
        match self.data.entry(product.id) {
            Entry::Occupied(_) => Err(StorageError::already_exists(product.id)),
            Entry::Vacant(slot) => {
                let stored = slot.insert(product.clone());
                tracing::debug!(product_id = %product.id, "product inserted");
                Ok(stored.value().clone())
            }
        }
    }

    async fn update(
        &self,
        product: &Product,
        cancel: &CancellationToken,
    ) -> StorageResult<Product> {
        ensure_live(cancel)?;
        let mut stored = self
            .data
            .get_mut(&product.id)
            .ok_or_else(|| StorageError::not_found(product.id))?;
        stored.apply_changes(
            product.name.clone(),
            product.description.clone(),
            product.price.clone(),
            product.stock,
        );
        stored.updated_at = Some(now_utc());
        tracing::debug!(product_id = %product.id, "product updated");
        Ok(stored.value().clone())
    }

    async fn delete(&self, id: Uuid, cancel: &CancellationToken) -> StorageResult<()> {
        ensure_live(cancel)?;
        if self.data.remove(&id).is_some() {
            tracing::debug!(product_id = %id, "product deleted");
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::BigDecimal;

    fn widget() -> Product {
        Product::new("Widget", "Small", BigDecimal::from(5), 10)
    }

    #[tokio::test]
    async fn insert_then_get() {
        let store = InMemoryProductStore::new();
        let cancel = CancellationToken::new();
        let product = widget();
        let stored = store.insert(&product, &cancel).await.unwrap();
        assert_eq!(stored, product);
        assert_eq!(store.len(), 1);

        let fetched = store.get(product.id, &cancel).await.unwrap();
        assert_eq!(fetched, Some(product));
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = InMemoryProductStore::new();
        let cancel = CancellationToken::new();
        let product = widget();
        store.insert(&product, &cancel).await.unwrap();

        let err = store.insert(&product, &cancel).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn update_stamps_updated_at_and_keeps_created_at() {
        let store = InMemoryProductStore::new();
        let cancel = CancellationToken::new();
        let mut product = widget();
        store.insert(&product, &cancel).await.unwrap();

        product.apply_changes("Gadget", "Large", BigDecimal::from(8), 1);
        let stored = store.update(&product, &cancel).await.unwrap();
        assert_eq!(stored.name, "Gadget");
        assert_eq!(stored.created_at, product.created_at);
        assert!(stored.updated_at.is_some());
    }

    #[tokio::test]
    async fn update_of_missing_product_fails() {
        let store = InMemoryProductStore::new();
        let err = store
            .update(&widget(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_of_missing_product_is_noop() {
        let store = InMemoryProductStore::new();
        store
            .delete(Uuid::new_v4(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn get_all_orders_by_creation() {
        let store = InMemoryProductStore::new();
        let cancel = CancellationToken::new();
        let first = widget();
        let mut second = widget();
        second.created_at = first.created_at + time::Duration::seconds(1);
        store.insert(&second, &cancel).await.unwrap();
        store.insert(&first, &cancel).await.unwrap();

        let all = store.get_all(&cancel).await.unwrap();
        assert_eq!(all.iter().map(|p| p.id).collect::<Vec<_>>(), vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits_writes() {
        let store = InMemoryProductStore::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = store.insert(&widget(), &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(store.is_empty());
    }
}
