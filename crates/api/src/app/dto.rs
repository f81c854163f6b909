use serde::{Deserialize, Serialize};

use marketplace_catalog::ProductId;

// Create, update, filter and search bodies deserialize straight into the
// catalog's own types (`NewProduct`, `ProductPatch`, `ProductFilter`,
// `SearchQuery`). Only the shapes below are HTTP-specific.

/// Body of `PATCH /products/:id/availability`.
#[derive(Debug, Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub availability: i64,
}

/// Query form of the same request (`?availability=3`).
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityQuery {
    pub availability: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
    pub id: ProductId,
}

impl DeleteResponse {
    pub fn new(id: ProductId) -> Self {
        Self {
            message: "Product deleted successfully",
            id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
