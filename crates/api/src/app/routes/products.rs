use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};

use marketplace_catalog::{DomainError, NewProduct, ProductFilter, ProductPatch, SearchQuery};

use crate::app::dto::{AvailabilityQuery, DeleteResponse, UpdateAvailabilityRequest};
use crate::app::errors;
use crate::app::SharedCatalog;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/search", post(search_products))
        .route("/seller/:seller_id", get(list_products_by_seller))
        .route(
            "/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/:id/availability", patch(update_availability))
        .route("/:id/mark-sold", patch(mark_sold))
        .route("/:id/archive", patch(archive_product))
        .route("/:id/restore", patch(restore_product))
}

pub async fn create_product(
    Extension(catalog): Extension<SharedCatalog>,
    Json(body): Json<NewProduct>,
) -> axum::response::Response {
    match catalog.create(body) {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(catalog): Extension<SharedCatalog>,
    filter: Result<Query<ProductFilter>, QueryRejection>,
) -> axum::response::Response {
    // Unparseable bounds (e.g. a negative `min_availability`) are reported
    // like out-of-range ones.
    let Query(filter) = match filter {
        Ok(v) => v,
        Err(rejection) => {
            return errors::json_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                rejection.body_text(),
            );
        }
    };
    if let Err(e) = filter.validate() {
        return errors::domain_error_to_response(e);
    }
    (StatusCode::OK, Json(catalog.list(&filter))).into_response()
}

pub async fn list_products_by_seller(
    Extension(catalog): Extension<SharedCatalog>,
    Path(seller_id): Path<String>,
) -> axum::response::Response {
    let seller_id = match errors::parse_seller_id(&seller_id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    (StatusCode::OK, Json(catalog.list_by_seller(seller_id))).into_response()
}

pub async fn search_products(
    Extension(catalog): Extension<SharedCatalog>,
    Json(query): Json<SearchQuery>,
) -> axum::response::Response {
    if let Some(Err(e)) = query.filters.as_ref().map(ProductFilter::validate) {
        return errors::domain_error_to_response(e);
    }
    (StatusCode::OK, Json(catalog.search(&query))).into_response()
}

pub async fn get_product(
    Extension(catalog): Extension<SharedCatalog>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match catalog.get(&id) {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(catalog): Extension<SharedCatalog>,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match catalog.update(&id, &patch) {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Accepts the new count either as a JSON body or as `?availability=`.
/// The query parameter is only consulted when no JSON body was sent.
pub async fn update_availability(
    Extension(catalog): Extension<SharedCatalog>,
    Path(id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
    body: Result<Json<UpdateAvailabilityRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let from_body = match body {
        Ok(Json(b)) => Some(b.availability),
        Err(JsonRejection::MissingJsonContentType(_)) => None,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let availability = match from_body.or(query.availability) {
        Some(v) => v,
        None => {
            return errors::domain_error_to_response(DomainError::invalid_argument(
                "availability is required",
            ));
        }
    };
    match catalog.update_availability(&id, availability) {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn mark_sold(
    Extension(catalog): Extension<SharedCatalog>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match catalog.mark_sold(&id) {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn archive_product(
    Extension(catalog): Extension<SharedCatalog>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match catalog.archive(&id) {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn restore_product(
    Extension(catalog): Extension<SharedCatalog>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match catalog.restore(&id) {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(catalog): Extension<SharedCatalog>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match catalog.delete(&id) {
        Ok(product) => (StatusCode::OK, Json(DeleteResponse::new(product.id_typed()))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
