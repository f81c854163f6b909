use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;

use marketplace_core::{DomainError, DomainResult, Entity, ProductId};

use crate::product::Product;

/// Closure applied by [`CatalogStore::update`].
pub type Mutator<'a> = &'a mut dyn FnMut(&mut Product) -> DomainResult<()>;

/// Owner of every product record.
///
/// Each operation is atomic with respect to every other one. Callers only
/// ever get clones back, never a handle into the store.
pub trait CatalogStore: Send + Sync {
    /// Add a record. Fails with `Conflict` if its id is already present.
    fn insert(&self, product: Product) -> DomainResult<Product>;

    fn get(&self, id: &ProductId) -> DomainResult<Product>;

    /// Snapshot of all records, in insertion order.
    fn list_all(&self) -> Vec<Product>;

    /// Apply `mutator` to the record and refresh its `updated_at`.
    ///
    /// If the mutator fails the stored record is left exactly as it was.
    fn update(&self, id: &ProductId, mutator: Mutator<'_>) -> DomainResult<Product>;

    /// Remove the record, returning what was stored.
    fn delete(&self, id: &ProductId) -> DomainResult<Product>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn insert(&self, product: Product) -> DomainResult<Product> {
        (**self).insert(product)
    }

    fn get(&self, id: &ProductId) -> DomainResult<Product> {
        (**self).get(id)
    }

    fn list_all(&self) -> Vec<Product> {
        (**self).list_all()
    }

    fn update(&self, id: &ProductId, mutator: Mutator<'_>) -> DomainResult<Product> {
        (**self).update(id, mutator)
    }

    fn delete(&self, id: &ProductId) -> DomainResult<Product> {
        (**self).delete(id)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

#[derive(Debug)]
struct Slot {
    // Insertion sequence number; gives `list_all` a stable order.
    seq: u64,
    product: Product,
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<ProductId, Slot>,
    next_seq: u64,
}

/// In-memory store guarded by a single `RwLock`.
///
/// Mutations run against a working copy that is swapped in whole, so the map
/// never holds a half-applied change. That also makes a poisoned lock safe to
/// recover from.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<Inner>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn insert(&self, product: Product) -> DomainResult<Product> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let id = *product.id();
        if inner.records.contains_key(&id) {
            return Err(DomainError::conflict(format!("product {id} already exists")));
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.records.insert(
            id,
            Slot {
                seq,
                product: product.clone(),
            },
        );
        Ok(product)
    }

    fn get(&self, id: &ProductId) -> DomainResult<Product> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .records
            .get(id)
            .map(|slot| slot.product.clone())
            .ok_or(DomainError::NotFound)
    }

    fn list_all(&self) -> Vec<Product> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut slots: Vec<&Slot> = inner.records.values().collect();
        slots.sort_by_key(|slot| slot.seq);
        slots.into_iter().map(|slot| slot.product.clone()).collect()
    }

    fn update(&self, id: &ProductId, mutator: Mutator<'_>) -> DomainResult<Product> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let slot = inner.records.get_mut(id).ok_or(DomainError::NotFound)?;

        let mut working = slot.product.clone();
        mutator(&mut working)?;

        // Identity and creation time are fixed for the life of the record.
        working.id = slot.product.id;
        working.created_at = slot.product.created_at;
        working.touch(Utc::now().max(slot.product.updated_at()));

        slot.product = working.clone();
        Ok(working)
    }

    fn delete(&self, id: &ProductId) -> DomainResult<Product> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner
            .records
            .remove(id)
            .map(|slot| slot.product)
            .ok_or(DomainError::NotFound)
    }

    fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::tests::new_product;
    use std::thread;

    fn product(name: &str) -> Product {
        Product::create(new_product(name, "books", 10.0), Utc::now()).unwrap()
    }

    #[test]
    fn insert_then_get_returns_same_record() {
        let store = InMemoryCatalogStore::new();
        let p = product("Dune");
        store.insert(p.clone()).unwrap();

        assert_eq!(store.get(p.id()).unwrap(), p);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let store = InMemoryCatalogStore::new();
        let p = product("Dune");
        store.insert(p.clone()).unwrap();

        let err = store.insert(p).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = InMemoryCatalogStore::new();
        assert_eq!(store.get(&ProductId::new()), Err(DomainError::NotFound));
    }

    #[test]
    fn list_all_keeps_insertion_order() {
        let store = InMemoryCatalogStore::new();
        let names = ["c", "a", "b", "d"];
        for name in names {
            store.insert(product(name)).unwrap();
        }

        let listed: Vec<String> = store.list_all().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(listed, names);
    }

    #[test]
    fn update_refreshes_updated_at_and_keeps_identity() {
        let store = InMemoryCatalogStore::new();
        let p = store.insert(product("Dune")).unwrap();

        let updated = store
            .update(p.id(), &mut |rec: &mut Product| {
                rec.id = ProductId::new();
                rec.is_sold = true;
                Ok(())
            })
            .unwrap();

        assert_eq!(updated.id(), p.id());
        assert_eq!(updated.created_at(), p.created_at());
        assert!(updated.updated_at() >= p.updated_at());
        assert!(store.get(p.id()).unwrap().is_sold());
    }

    #[test]
    fn failed_update_changes_nothing() {
        let store = InMemoryCatalogStore::new();
        let p = store.insert(product("Dune")).unwrap();

        let err = store
            .update(p.id(), &mut |rec: &mut Product| {
                rec.name = "half-written".to_string();
                Err(DomainError::invalid_argument("nope"))
            })
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidArgument(_)));
        assert_eq!(store.get(p.id()).unwrap(), p);
    }

    #[test]
    fn update_missing_is_not_found_and_skips_mutator() {
        let store = InMemoryCatalogStore::new();
        let mut called = false;
        let err = store
            .update(&ProductId::new(), &mut |_: &mut Product| {
                called = true;
                Ok(())
            })
            .unwrap_err();

        assert_eq!(err, DomainError::NotFound);
        assert!(!called);
    }

    #[test]
    fn delete_removes_and_frees_id() {
        let store = InMemoryCatalogStore::new();
        let p = store.insert(product("Dune")).unwrap();

        assert_eq!(store.delete(p.id()).unwrap(), p);
        assert_eq!(store.get(p.id()), Err(DomainError::NotFound));
        assert_eq!(store.delete(p.id()), Err(DomainError::NotFound));
        assert!(store.is_empty());

        store.insert(p.clone()).unwrap();
        assert_eq!(store.get(p.id()).unwrap(), p);
    }

    #[test]
    fn concurrent_updates_do_not_lose_writes() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let p = store.insert(product("Dune")).unwrap();
        let id = p.id_typed();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        store
                            .update(&id, &mut |rec: &mut Product| {
                                rec.availability += 1;
                                rec.quantity += 1;
                                Ok(())
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let final_state = store.get(&id).unwrap();
        assert_eq!(final_state.availability(), 5 + 800);
        assert_eq!(final_state.quantity(), final_state.availability());
    }

    #[test]
    fn concurrent_inserts_all_land() {
        let store = Arc::new(InMemoryCatalogStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        store.insert(product(&format!("{t}-{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.len(), 400);
        assert_eq!(store.list_all().len(), 400);
    }
}
