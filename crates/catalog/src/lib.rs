//! Catalog domain module.
//!
//! This crate owns product listings: the record itself, the in-memory store
//! holding them, the filter/search engines, and the service facade the HTTP
//! adapter calls into. Everything here is synchronous and free of IO.

pub mod filter;
pub mod product;
pub mod search;
pub mod service;
pub mod store;

pub use filter::ProductFilter;
pub use product::{NewProduct, Product, ProductPatch};
pub use search::SearchQuery;
pub use service::CatalogService;
pub use store::{CatalogStore, InMemoryCatalogStore};

pub use marketplace_core::{DomainError, DomainResult, ProductId, SellerId};
