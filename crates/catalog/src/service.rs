//! Service facade: the operations the HTTP adapter calls.
//!
//! Every operation returns either the resulting record(s) or a
//! [`DomainError`]; nothing here knows about status codes.

use chrono::Utc;
use tracing::{debug, info, instrument};

use marketplace_core::{DomainResult, ProductId, SellerId};

use crate::filter::ProductFilter;
use crate::product::{NewProduct, Product, ProductPatch, availability_arg};
use crate::search::SearchQuery;
use crate::store::{CatalogStore, InMemoryCatalogStore};

#[derive(Debug, Default)]
pub struct CatalogService<S = InMemoryCatalogStore> {
    store: S,
}

impl CatalogService<InMemoryCatalogStore> {
    pub fn in_memory() -> Self {
        Self::new(InMemoryCatalogStore::new())
    }
}

impl<S> CatalogService<S>
where
    S: CatalogStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[instrument(skip_all, fields(name = %input.name))]
    pub fn create(&self, input: NewProduct) -> DomainResult<Product> {
        let product = Product::create(input, Utc::now())?;
        let product = self.store.insert(product)?;
        info!(product_id = %product.id_typed(), "product created");
        Ok(product)
    }

    pub fn get(&self, id: &ProductId) -> DomainResult<Product> {
        debug!(product_id = %id, "get product");
        self.store.get(id)
    }

    /// All products passing `filters`, in creation order.
    pub fn list(&self, filters: &ProductFilter) -> Vec<Product> {
        let products: Vec<Product> = self
            .store
            .list_all()
            .into_iter()
            .filter(|p| filters.matches(p))
            .collect();
        debug!(
            count = products.len(),
            filtered = !filters.is_empty(),
            "list products"
        );
        products
    }

    pub fn list_by_seller(&self, seller_id: SellerId) -> Vec<Product> {
        self.list(&ProductFilter::by_seller(seller_id))
    }

    pub fn search(&self, query: &SearchQuery) -> Vec<Product> {
        let products = query.apply(self.store.list_all());
        debug!(query = %query.query, count = products.len(), "search products");
        products
    }

    #[instrument(skip(self, patch))]
    pub fn update(&self, id: &ProductId, patch: &ProductPatch) -> DomainResult<Product> {
        patch.validate()?;
        let product = self.store.update(id, &mut |p: &mut Product| patch.apply_to(p))?;
        info!(empty_patch = patch.is_empty(), "product updated");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub fn update_availability(&self, id: &ProductId, availability: i64) -> DomainResult<Product> {
        let product = self.store.update(id, &mut |p: &mut Product| {
            p.availability = availability_arg(availability)?;
            Ok(())
        })?;
        info!("availability updated");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub fn mark_sold(&self, id: &ProductId) -> DomainResult<Product> {
        let product = self.store.update(id, &mut |p: &mut Product| {
            p.is_sold = true;
            Ok(())
        })?;
        info!("product marked sold");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub fn archive(&self, id: &ProductId) -> DomainResult<Product> {
        let product = self.set_archived(id, true)?;
        info!("product archived");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub fn restore(&self, id: &ProductId) -> DomainResult<Product> {
        let product = self.set_archived(id, false)?;
        info!("product restored");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub fn delete(&self, id: &ProductId) -> DomainResult<Product> {
        let product = self.store.delete(id)?;
        info!("product deleted");
        Ok(product)
    }

    fn set_archived(&self, id: &ProductId, archived: bool) -> DomainResult<Product> {
        self.store.update(id, &mut |p: &mut Product| {
            p.is_archived = archived;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::tests::new_product;
    use marketplace_core::{DomainError, Entity};
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    fn service() -> CatalogService {
        CatalogService::in_memory()
    }

    #[test]
    fn create_then_get_round_trips() {
        let svc = service();
        let created = svc.create(new_product("Dune", "books", 9.0)).unwrap();
        assert_eq!(svc.get(created.id()).unwrap(), created);
    }

    #[test]
    fn create_with_taken_id_conflicts() {
        let svc = service();
        let id = ProductId::new();
        let mut first = new_product("Dune", "books", 9.0);
        first.id = Some(id);
        svc.create(first.clone()).unwrap();

        let err = svc.create(first).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn create_rejects_invalid_input_without_storing() {
        let svc = service();
        let err = svc.create(new_product("Dune", "books", 0.0)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(svc.store().is_empty());
    }

    #[test]
    fn lifecycle_scenario() {
        let svc = service();
        let mut input = new_product("A", "books", 10.0);
        input.availability = 5;
        input.quantity = 5;
        let a = svc.create(input).unwrap();
        let id = a.id_typed();

        let p = svc.update_availability(&id, 3).unwrap();
        assert_eq!(p.availability(), 3);

        let p = svc.mark_sold(&id).unwrap();
        assert!(p.is_sold());
        assert_eq!(p.availability(), 3);
        assert!(!p.is_archived());

        let p = svc.archive(&id).unwrap();
        assert!(p.is_archived());
        assert!(p.is_sold());

        let sold = svc.list(&ProductFilter {
            is_sold: Some(true),
            ..Default::default()
        });
        assert!(sold.iter().any(|p| p.id_typed() == id));

        svc.delete(&id).unwrap();
        assert_eq!(svc.get(&id), Err(DomainError::NotFound));
    }

    #[test]
    fn list_by_category_returns_only_that_category() {
        let svc = service();
        svc.create(new_product("Dune", "books", 9.0)).unwrap();
        svc.create(new_product("Emma", "books", 7.0)).unwrap();
        svc.create(new_product("Phone", "electronics", 300.0)).unwrap();

        let books = svc.list(&ProductFilter {
            category: Some("books".to_string()),
            ..Default::default()
        });
        let names: Vec<&str> = books.iter().map(|p| p.name()).collect();
        assert_eq!(names, ["Dune", "Emma"]);
    }

    #[test]
    fn inverted_price_range_lists_nothing() {
        let svc = service();
        svc.create(new_product("Dune", "books", 9.0)).unwrap();
        let found = svc.list(&ProductFilter {
            min_price: Some(50.0),
            max_price: Some(1.0),
            ..Default::default()
        });
        assert!(found.is_empty());
    }

    #[test]
    fn list_by_seller_returns_only_their_products() {
        let svc = service();
        let seller = SellerId::new();
        let mut mine = new_product("Dune", "books", 9.0);
        mine.seller_id = seller;
        let mine = svc.create(mine).unwrap();
        svc.create(new_product("Emma", "books", 7.0)).unwrap();

        assert_eq!(svc.list_by_seller(seller), vec![mine]);
        assert!(svc.list_by_seller(SellerId::new()).is_empty());
    }

    #[test]
    fn search_empty_query_returns_everything() {
        let svc = service();
        svc.create(new_product("Dune", "books", 9.0)).unwrap();
        svc.create(new_product("Phone", "electronics", 300.0)).unwrap();

        assert_eq!(svc.search(&SearchQuery::new("")).len(), 2);
        assert_eq!(svc.search(&SearchQuery::new("PHONE")).len(), 1);
    }

    #[test]
    fn archive_and_restore_are_idempotent() {
        let svc = service();
        let id = svc.create(new_product("Dune", "books", 9.0)).unwrap().id_typed();

        assert!(svc.archive(&id).unwrap().is_archived());
        assert!(svc.archive(&id).unwrap().is_archived());
        assert!(!svc.restore(&id).unwrap().is_archived());
        assert!(!svc.restore(&id).unwrap().is_archived());
    }

    #[test]
    fn lifecycle_operations_on_missing_id_are_not_found() {
        let svc = service();
        let id = ProductId::new();

        assert_eq!(svc.mark_sold(&id), Err(DomainError::NotFound));
        assert_eq!(svc.archive(&id), Err(DomainError::NotFound));
        assert_eq!(svc.restore(&id), Err(DomainError::NotFound));
        assert_eq!(svc.delete(&id), Err(DomainError::NotFound));
        assert_eq!(svc.update_availability(&id, 1), Err(DomainError::NotFound));
        assert_eq!(
            svc.update(&id, &ProductPatch::default()),
            Err(DomainError::NotFound)
        );
    }

    #[test]
    fn negative_availability_is_invalid_argument_and_changes_nothing() {
        let svc = service();
        let created = svc.create(new_product("Dune", "books", 9.0)).unwrap();

        let err = svc.update_availability(created.id(), -1).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
        assert_eq!(svc.get(created.id()).unwrap(), created);
    }

    #[test]
    fn zero_availability_does_not_mark_sold() {
        let svc = service();
        let id = svc.create(new_product("Dune", "books", 9.0)).unwrap().id_typed();

        let p = svc.update_availability(&id, 0).unwrap();
        assert_eq!(p.availability(), 0);
        assert!(!p.is_sold());
    }

    #[test]
    fn update_merges_present_fields_only() {
        let svc = service();
        let created = svc.create(new_product("Dune", "books", 9.0)).unwrap();

        let patch = ProductPatch {
            name: Some("Dune Messiah".to_string()),
            ..Default::default()
        };
        let updated = svc.update(created.id(), &patch).unwrap();

        assert_eq!(updated.name(), "Dune Messiah");
        assert_eq!(updated.price(), created.price());
        assert_eq!(updated.created_at(), created.created_at());
        assert!(updated.updated_at() >= created.updated_at());
    }

    #[test]
    fn invalid_update_is_rejected_before_mutation() {
        let svc = service();
        let created = svc.create(new_product("Dune", "books", 9.0)).unwrap();

        let patch = ProductPatch {
            name: Some("Dune Messiah".to_string()),
            price: Some(-1.0),
            ..Default::default()
        };
        let err = svc.update(created.id(), &patch).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(svc.get(created.id()).unwrap(), created);
    }

    #[test]
    fn deleted_id_can_be_reused() {
        let svc = service();
        let id = ProductId::new();
        let mut input = new_product("Dune", "books", 9.0);
        input.id = Some(id);

        svc.create(input.clone()).unwrap();
        svc.delete(&id).unwrap();
        let again = svc.create(input).unwrap();
        assert_eq!(again.id_typed(), id);
    }

    #[test]
    fn concurrent_mutations_leave_consistent_record() {
        let svc = Arc::new(service());
        let id = svc.create(new_product("Dune", "books", 9.0)).unwrap().id_typed();

        let handles: Vec<_> = (0..8)
            .map(|i: i32| {
                let svc = svc.clone();
                thread::spawn(move || {
                    for n in 0..50i32 {
                        let price = f64::from(i * 100 + n + 1);
                        let patch = ProductPatch {
                            price: Some(price),
                            quantity: Some(i64::from(i * 100 + n + 1)),
                            ..Default::default()
                        };
                        svc.update(&id, &patch).unwrap();
                        if n % 2 == 0 {
                            svc.archive(&id).unwrap();
                        } else {
                            svc.restore(&id).unwrap();
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        // Each patch wrote price and quantity together; no torn writes.
        let p = svc.get(&id).unwrap();
        assert_eq!(p.price(), f64::from(p.quantity()));
    }

    proptest! {
        /// `list(f)` returns exactly the stored products satisfying `f`.
        #[test]
        fn list_returns_exactly_matching_products(
            prices in prop::collection::vec(1.0f64..100.0, 1..12),
            min_price in proptest::option::of(1.0f64..100.0),
            max_price in proptest::option::of(1.0f64..100.0),
            sold_mask in any::<u16>(),
            want_sold in proptest::option::of(any::<bool>()),
        ) {
            let svc = service();
            let mut all = Vec::new();
            for (i, price) in prices.iter().enumerate() {
                let category = if i % 2 == 0 { "books" } else { "electronics" };
                let p = svc.create(new_product("Item", category, *price)).unwrap();
                let p = if sold_mask & (1 << i) != 0 { svc.mark_sold(p.id()).unwrap() } else { p };
                all.push(p);
            }

            let filter = ProductFilter { min_price, max_price, is_sold: want_sold, ..Default::default() };
            let listed = svc.list(&filter);

            let expected: Vec<ProductId> = all
                .iter()
                .filter(|p| min_price.is_none_or(|m| p.price() >= m))
                .filter(|p| max_price.is_none_or(|m| p.price() <= m))
                .filter(|p| want_sold.is_none_or(|s| p.is_sold() == s))
                .map(|p| p.id_typed())
                .collect();
            let got: Vec<ProductId> = listed.iter().map(|p| p.id_typed()).collect();
            prop_assert_eq!(got, expected);
        }
    }
}
