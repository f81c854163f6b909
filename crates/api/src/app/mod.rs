//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs that are not plain catalog types
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use marketplace_catalog::CatalogService;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Catalog handle shared by every handler.
pub type SharedCatalog = Arc<CatalogService>;

/// Build the full HTTP router around a fresh, empty catalog.
pub fn build_app() -> Router {
    build_app_with(Arc::new(CatalogService::in_memory()))
}

/// Build the router around an existing catalog (tests seed it directly).
pub fn build_app_with(catalog: SharedCatalog) -> Router {
    Router::new()
        .route("/", get(routes::system::root))
        .route("/health", get(routes::system::health))
        .nest("/products", routes::products::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_log))
                .layer(Extension(catalog)),
        )
}
